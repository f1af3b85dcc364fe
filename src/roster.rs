use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One row of the master list. Every field is free text and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRecord {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub rfid: String,
}

/// Comparison form shared by every lookup and duplicate check.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Master list for one session. Replaced wholesale on each load.
#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    records: Vec<RosterRecord>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a freshly fetched list. The old contents are dropped only after
    /// the new list is fully built by the caller.
    pub fn load(&mut self, records: Vec<RosterRecord>) {
        self.records = records;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RosterRecord] {
        &self.records
    }

    pub fn find_by_name(&self, token: &str) -> Option<&RosterRecord> {
        self.find_by(token, |r| &r.student_name)
    }

    pub fn find_by_id(&self, token: &str) -> Option<&RosterRecord> {
        self.find_by(token, |r| &r.student_id)
    }

    pub fn find_by_rfid(&self, token: &str) -> Option<&RosterRecord> {
        self.find_by(token, |r| &r.rfid)
    }

    fn find_by<F>(&self, token: &str, field: F) -> Option<&RosterRecord>
    where
        F: Fn(&RosterRecord) -> &String,
    {
        let needle = normalize(token);
        if needle.is_empty() {
            return None;
        }
        self.records.iter().find(|r| normalize(field(r)) == needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnField {
    StudentId,
    StudentName,
    Year,
    Rfid,
}

/// Header patterns per field, tried left to right over the header row.
const COLUMN_RULES: &[(ColumnField, &str)] = &[
    (ColumnField::StudentId, r"student.?id|^id$"),
    (ColumnField::StudentName, r"student.?name|^name$"),
    (ColumnField::Year, r"year.?level|year"),
    (ColumnField::Rfid, r"rfid"),
];

static COLUMN_MATCHERS: Lazy<Vec<(ColumnField, Regex)>> = Lazy::new(|| {
    COLUMN_RULES
        .iter()
        .filter_map(|(field, src)| {
            Regex::new(&format!("(?i){src}"))
                .ok()
                .map(|re| (*field, re))
        })
        .collect()
});

/// Column positions of the four roster fields within a header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIndexMap {
    pub student_id: Option<usize>,
    pub student_name: Option<usize>,
    pub year: Option<usize>,
    pub rfid: Option<usize>,
}

impl FieldIndexMap {
    fn slot(&mut self, field: ColumnField) -> &mut Option<usize> {
        match field {
            ColumnField::StudentId => &mut self.student_id,
            ColumnField::StudentName => &mut self.student_name,
            ColumnField::Year => &mut self.year,
            ColumnField::Rfid => &mut self.rfid,
        }
    }

    fn extract(&self, row: &[String]) -> RosterRecord {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .cloned()
                .unwrap_or_default()
        };
        RosterRecord {
            student_id: cell(self.student_id),
            student_name: cell(self.student_name),
            year: cell(self.year),
            rfid: cell(self.rfid),
        }
    }
}

/// Map each roster field to the first header column that matches its rules.
pub fn infer_columns(headers: &[String]) -> FieldIndexMap {
    let trimmed: Vec<&str> = headers.iter().map(|h| h.trim()).collect();
    let mut map = FieldIndexMap::default();
    for (field, re) in COLUMN_MATCHERS.iter() {
        *map.slot(*field) = trimmed.iter().position(|h| re.is_match(h));
    }
    map
}

/// Interpret a sheet grid: the first row is the header, the rest are students.
pub fn records_from_rows(rows: &[Vec<String>]) -> (FieldIndexMap, Vec<RosterRecord>) {
    let Some((header, body)) = rows.split_first() else {
        return (FieldIndexMap::default(), Vec::new());
    };
    let map = infer_columns(header);
    let records = body.iter().map(|row| map.extract(row)).collect();
    (map, records)
}
