/// Keyboard-wedge accumulator. A scanner types its payload as key events and
/// finishes with Enter; manual typing arrives the same way.
#[derive(Debug, Clone, Default)]
pub struct ScanBuffer {
    buffer: String,
    armed: bool,
}

impl ScanBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start accepting keys; set once a roster is available.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Feed one key name (`"a"`, `"7"`, `"Enter"`, `"Shift"`, ...).
    ///
    /// Returns the trimmed payload when Enter completes a non-empty buffer.
    pub fn push_key(&mut self, key: &str) -> Option<String> {
        if !self.armed {
            return None;
        }
        if key == "Enter" {
            return self.submit();
        }
        if key.chars().count() == 1 {
            self.buffer.push_str(key);
        }
        None
    }

    /// Flush the buffer as if Enter was pressed.
    pub fn submit(&mut self) -> Option<String> {
        let tag = std::mem::take(&mut self.buffer);
        let tag = tag.trim();
        if tag.is_empty() {
            None
        } else {
            Some(tag.to_string())
        }
    }
}
