use std::time::Duration;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// API key plus the sheet to read the master list from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetCredentials {
    pub api_key: String,
    pub sheet_id: String,
    pub sheet_name: String,
}

impl SheetCredentials {
    pub fn new(api_key: &str, sheet_id: &str, sheet_name: &str) -> Self {
        Self {
            api_key: api_key.trim().to_string(),
            sheet_id: sheet_id.trim().to_string(),
            sheet_name: sheet_name.trim().to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.sheet_id.is_empty() && !self.sheet_name.is_empty()
    }

    /// Field-wise override: non-blank values from `other` win.
    pub fn merged(&self, other: &SheetCredentials) -> SheetCredentials {
        let pick = |mine: &str, theirs: &str| {
            if theirs.is_empty() {
                mine.to_string()
            } else {
                theirs.to_string()
            }
        };
        SheetCredentials {
            api_key: pick(&self.api_key, &other.api_key),
            sheet_id: pick(&self.sheet_id, &other.sheet_id),
            sheet_name: pick(&self.sheet_name, &other.sheet_name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sheets_base_url: String,
    pub fetch_timeout: Duration,
    pub default_credentials: SheetCredentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            default_credentials: SheetCredentials::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |key: &str| get(key).unwrap_or_default();

        let base = var("ATTENDD_SHEETS_BASE_URL");
        let sheets_base_url = if base.trim().is_empty() {
            defaults.sheets_base_url
        } else {
            base.trim().trim_end_matches('/').to_string()
        };
        let fetch_timeout = var("ATTENDD_FETCH_TIMEOUT_SECS")
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.fetch_timeout);

        Config {
            sheets_base_url,
            fetch_timeout,
            default_credentials: SheetCredentials::new(
                &var("ATTENDD_API_KEY"),
                &var("ATTENDD_SHEET_ID"),
                &var("ATTENDD_SHEET_NAME"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = Config::from_lookup(lookup(&[]));
        assert_eq!(cfg.sheets_base_url, DEFAULT_SHEETS_BASE_URL);
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(15));
        assert!(!cfg.default_credentials.is_complete());
    }

    #[test]
    fn environment_overrides_are_trimmed() {
        let cfg = Config::from_lookup(lookup(&[
            ("ATTENDD_SHEETS_BASE_URL", " http://127.0.0.1:9/v4/ "),
            ("ATTENDD_FETCH_TIMEOUT_SECS", "3"),
            ("ATTENDD_API_KEY", " key "),
            ("ATTENDD_SHEET_ID", "sheet"),
            ("ATTENDD_SHEET_NAME", "Roster"),
        ]));
        assert_eq!(cfg.sheets_base_url, "http://127.0.0.1:9/v4");
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(3));
        assert_eq!(cfg.default_credentials, SheetCredentials::new("key", "sheet", "Roster"));
        assert!(cfg.default_credentials.is_complete());
    }

    #[test]
    fn merged_keeps_defaults_for_blank_overrides() {
        let base = SheetCredentials::new("k", "s", "n");
        let merged = base.merged(&SheetCredentials::new("", "s2", " "));
        assert_eq!(merged, SheetCredentials::new("k", "s2", "n"));
    }
}
