use crate::error::{AttendanceError, Result};
use crate::roster::{normalize, RosterRecord, RosterStore};
use serde::Serialize;

pub const UNKNOWN_NAME: &str = "Unknown Name";
pub const UNKNOWN_YEAR: &str = "Unknown";

/// A confirmed-attending student. Never mutated once appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentRecord {
    pub student_id: String,
    pub student_name: String,
    pub year: String,
    pub rfid: String,
}

/// Insertion-ordered, append-only list of present students for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentSet {
    records: Vec<PresentRecord>,
}

impl PresentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PresentRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PresentRecord> {
        self.records.iter()
    }

    fn push(&mut self, record: PresentRecord) {
        self.records.push(record);
    }

    /// True when any member shares the normalized name, id or rfid. Blank keys
    /// compare equal, so two roster rows that both lack an id collide.
    fn overlaps(&self, name: &str, id: &str, rfid: &str) -> bool {
        let name = normalize(name);
        let id = normalize(id);
        let rfid = normalize(rfid);
        let same = |a: &str, b: &str| normalize(a) == b;
        self.records.iter().any(|p| {
            same(&p.student_name, &name) || same(&p.student_id, &id) || same(&p.rfid, &rfid)
        })
    }

    fn has_student_id(&self, id: &str) -> bool {
        !id.is_empty() && self.records.iter().any(|p| p.student_id.trim() == id)
    }
}

impl FromIterator<PresentRecord> for PresentSet {
    fn from_iter<I: IntoIterator<Item = PresentRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Per-token classification of one submitted input.
///
/// `added` and `already_present` carry the matched student's display name;
/// `not_found` carries the raw token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutcome {
    pub added: Vec<String>,
    pub already_present: Vec<String>,
    pub not_found: Vec<String>,
}

impl ResolveOutcome {
    /// Whether the present set grew; callers re-render only in that case.
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.added.is_empty() {
            parts.push(format!("Added: {}", self.added.join(", ")));
        }
        if !self.already_present.is_empty() {
            parts.push(format!("Already present: {}", self.already_present.join(", ")));
        }
        if !self.not_found.is_empty() {
            parts.push(format!("Not found: {}", self.not_found.join(", ")));
        }
        if parts.is_empty() {
            return "No matches added.".to_string();
        }
        parts.join(" • ")
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == ';'
}

/// Split raw input on runs of whitespace, commas and semicolons.
pub fn tokenize(raw: &str) -> Vec<String> {
    raw.split(is_separator)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tokenize against a roster: a comma/semicolon segment that matches a record
/// as a whole (e.g. a full name with a space) stays one token; any other
/// segment is split on whitespace.
pub fn roster_tokens(raw: &str, roster: &RosterStore) -> Vec<String> {
    let mut out = Vec::new();
    for segment in raw.split(|c: char| c == ',' || c == ';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if segment.contains(char::is_whitespace) && lookup(roster, segment).is_some() {
            out.push(segment.to_string());
        } else {
            out.extend(tokenize(segment));
        }
    }
    out
}

/// Priority order: name, then student id, then rfid.
fn lookup<'a>(roster: &'a RosterStore, token: &str) -> Option<&'a RosterRecord> {
    roster
        .find_by_name(token)
        .or_else(|| roster.find_by_id(token))
        .or_else(|| roster.find_by_rfid(token))
}

fn or_else<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn effective_record(matched: &RosterRecord, token: &str) -> PresentRecord {
    PresentRecord {
        student_id: or_else(&matched.student_id, &matched.rfid).to_string(),
        student_name: or_else(&matched.student_name, UNKNOWN_NAME).to_string(),
        year: or_else(&matched.year, UNKNOWN_YEAR).to_string(),
        rfid: or_else(&matched.rfid, token).to_string(),
    }
}

/// Resolve raw operator input into present-set additions.
///
/// Tokens are handled left to right and independently; a miss never aborts
/// the remaining tokens.
pub fn resolve(raw: &str, roster: &RosterStore, present: &mut PresentSet) -> Result<ResolveOutcome> {
    if tokenize(raw).is_empty() {
        return Err(AttendanceError::EmptyInput);
    }
    if roster.is_empty() {
        return Err(AttendanceError::RosterNotLoaded);
    }

    let mut outcome = ResolveOutcome::default();
    for token in roster_tokens(raw, roster) {
        let Some(matched) = lookup(roster, &token) else {
            outcome.not_found.push(token);
            continue;
        };
        let candidate = effective_record(matched, &token);
        if present.overlaps(&candidate.student_name, &candidate.student_id, &candidate.rfid) {
            outcome.already_present.push(candidate.student_name);
            continue;
        }
        outcome.added.push(candidate.student_name.clone());
        present.push(candidate);
    }
    Ok(outcome)
}

/// Manual entry by student id (rfid accepted as a fallback key). The added
/// record keeps its rfid blank and is de-duplicated by student id only.
pub fn add_by_id(raw: &str, roster: &RosterStore, present: &mut PresentSet) -> Result<PresentRecord> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(AttendanceError::EmptyInput);
    }
    if roster.is_empty() {
        return Err(AttendanceError::RosterNotLoaded);
    }

    let matched = roster
        .records()
        .iter()
        .find(|r| {
            (!r.student_id.trim().is_empty() && r.student_id.trim() == id)
                || (!r.rfid.trim().is_empty() && r.rfid.trim() == id)
        })
        .ok_or_else(|| AttendanceError::StudentNotFound(id.to_string()))?;

    let record = PresentRecord {
        student_id: matched.student_id.trim().to_string(),
        student_name: matched.student_name.trim().to_string(),
        year: or_else(&matched.year, UNKNOWN_YEAR).trim().to_string(),
        rfid: String::new(),
    };
    if present.has_student_id(&record.student_id) {
        let label = or_else(&record.student_name, &record.student_id).to_string();
        return Err(AttendanceError::AlreadyPresent(label));
    }
    present.push(record.clone());
    Ok(record)
}
