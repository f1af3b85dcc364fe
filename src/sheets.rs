use crate::config::{Config, SheetCredentials};
use crate::error::{AttendanceError, Result};
use crate::roster::{records_from_rows, RosterRecord};
use anyhow::{anyhow, Context};
use reqwest::blocking::Client;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

/// Fixed grid read from the sheet; the header row is row 1.
const SHEET_RANGE: &str = "A1:ZZ10000";

/// Anything that can produce a fresh master list.
pub trait RosterSource {
    fn fetch_roster(&self, creds: &SheetCredentials) -> Result<Vec<RosterRecord>>;
}

/// Google Sheets `values` endpoint.
pub struct SheetsClient {
    base_url: String,
    client: Client,
}

impl SheetsClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            base_url: config.sheets_base_url.clone(),
            client,
        })
    }

    fn values_url(&self, creds: &SheetCredentials) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.base_url).context("invalid sheets base url")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("sheets base url cannot carry a path"))?
            .pop_if_empty()
            .push(&creds.sheet_id)
            .push("values")
            .push(&format!("{}!{}", creds.sheet_name, SHEET_RANGE));
        url.query_pairs_mut().append_pair("key", &creds.api_key);
        Ok(url)
    }

    fn get_rows(&self, creds: &SheetCredentials) -> anyhow::Result<Vec<Vec<String>>> {
        let url = self.values_url(creds)?;
        debug!(sheet = %creds.sheet_name, "fetching master list");
        let response = self.client.get(url).send().context("sheets request failed")?;
        let status = response.status();
        let body = response.text().context("read sheets response")?;
        let data: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

        if !status.is_success() || data.get("error").is_some() {
            let message = data
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "Sheets API error".to_string());
            return Err(anyhow!(message));
        }
        if data.is_null() {
            return Err(anyhow!("malformed sheets response"));
        }
        Ok(parse_values(&data))
    }
}

impl RosterSource for SheetsClient {
    fn fetch_roster(&self, creds: &SheetCredentials) -> Result<Vec<RosterRecord>> {
        if !creds.is_complete() {
            return Err(AttendanceError::RosterNotLoaded);
        }
        let rows = self.get_rows(creds).map_err(|e| {
            warn!(error = %e, "master list fetch failed");
            AttendanceError::RosterFetchFailed(format!("{e:#}"))
        })?;
        let (_, records) = records_from_rows(&rows);
        Ok(records)
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Pull the `values` grid out of a Sheets response; absent means no rows.
pub fn parse_values(data: &Value) -> Vec<Vec<String>> {
    data.get("values")
        .and_then(|v| v.as_array())
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| cells.iter().map(cell_text).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}
