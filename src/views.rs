use crate::error::{AttendanceError, Result};
use crate::presence::{PresentSet, UNKNOWN_YEAR};
use serde::Serialize;
use std::collections::HashSet;

pub const EXPORT_HEADERS: [&str; 4] = ["Student ID", "Student Name", "Year Level", "RFID"];

/// Display-time normalization: one record per `rfid:` key, or `id:` key when
/// the rfid is blank. First occurrence wins; order is preserved.
pub fn dedupe(present: &PresentSet) -> PresentSet {
    let mut seen: HashSet<String> = HashSet::new();
    present
        .iter()
        .filter(|p| {
            let key = if p.rfid.is_empty() {
                format!("id:{}", p.student_id)
            } else {
                format!("rfid:{}", p.rfid)
            };
            seen.insert(key)
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    /// Student id, or the rfid when no id is on file.
    pub display_id: String,
    pub student_name: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearGroup {
    pub year: String,
    pub students: Vec<DisplayRow>,
}

/// Canonical array-index form: digits with no leading zero, below `u32::MAX`.
fn year_index(year: &str) -> Option<u32> {
    let n = year.parse::<u32>().ok()?;
    (n < u32::MAX && n.to_string() == year).then_some(n)
}

/// De-duplicated present list grouped by year level. Plain numeric years come
/// first in ascending order; every other year follows in order of first
/// appearance.
pub fn group_by_year(present: &PresentSet) -> Vec<YearGroup> {
    let mut groups: Vec<YearGroup> = Vec::new();
    for p in dedupe(present).iter() {
        let year = if p.year.is_empty() { UNKNOWN_YEAR } else { p.year.as_str() };
        let row = DisplayRow {
            display_id: if p.student_id.is_empty() {
                p.rfid.clone()
            } else {
                p.student_id.clone()
            },
            student_name: p.student_name.clone(),
            year: p.year.clone(),
        };
        match groups.iter_mut().find(|g| g.year == year) {
            Some(g) => g.students.push(row),
            None => groups.push(YearGroup {
                year: year.to_string(),
                students: vec![row],
            }),
        }
    }
    let (mut numeric, other): (Vec<YearGroup>, Vec<YearGroup>) =
        groups.into_iter().partition(|g| year_index(&g.year).is_some());
    numeric.sort_by_key(|g| year_index(&g.year));
    numeric.extend(other);
    numeric
}

/// Export rows, de-duplicated by `id:` key (trimmed) or `rfid:` key when the
/// id is blank.
pub fn export_rows(present: &PresentSet) -> Vec<[String; 4]> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut rows = Vec::new();
    for p in present.records() {
        let id = p.student_id.trim();
        let rfid = p.rfid.trim();
        let key = if id.is_empty() {
            format!("rfid:{rfid}")
        } else {
            format!("id:{id}")
        };
        if seen.insert(key) {
            rows.push([
                id.to_string(),
                p.student_name.clone(),
                p.year.clone(),
                rfid.to_string(),
            ]);
        }
    }
    rows
}

fn csv_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn csv_line<S: AsRef<str>>(cells: &[S]) -> String {
    cells
        .iter()
        .map(|c| csv_quote(c.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header plus one line per exported student, every cell quoted.
pub fn to_csv(present: &PresentSet) -> Result<(String, usize)> {
    if present.is_empty() {
        return Err(AttendanceError::NoAttendance);
    }
    let rows = export_rows(present);
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(csv_line(&EXPORT_HEADERS[..]));
    lines.extend(rows.iter().map(|r| csv_line(&r[..])));
    Ok((lines.join("\n"), rows.len()))
}
