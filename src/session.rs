use crate::config::SheetCredentials;
use crate::error::{AttendanceError, Result};
use crate::input::ScanBuffer;
use crate::presence::{self, PresentRecord, PresentSet, ResolveOutcome};
use crate::roster::{records_from_rows, FieldIndexMap, RosterStore};
use crate::sheets::RosterSource;
use crate::views::{self, YearGroup};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// One attendance-taking session: its master list, its present list and the
/// scanner buffer feeding it.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub started_at: DateTime<Utc>,
    credentials: SheetCredentials,
    roster: RosterStore,
    present: PresentSet,
    scanner: ScanBuffer,
}

impl Session {
    pub fn new(credentials: SheetCredentials) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            credentials,
            roster: RosterStore::new(),
            present: PresentSet::new(),
            scanner: ScanBuffer::new(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_complete()
    }

    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    pub fn present(&self) -> &PresentSet {
        &self.present
    }

    pub fn scanner(&self) -> &ScanBuffer {
        &self.scanner
    }

    /// Fetch the master list. On failure the previous roster stays in place.
    pub fn load_roster(
        &mut self,
        source: &dyn RosterSource,
        overrides: Option<&SheetCredentials>,
    ) -> Result<usize> {
        let creds = match overrides {
            Some(o) => self.credentials.merged(o),
            None => self.credentials.clone(),
        };
        if !creds.is_complete() {
            return Err(AttendanceError::RosterNotLoaded);
        }
        let records = source.fetch_roster(&creds)?;
        self.credentials = creds;
        self.roster.load(records);
        self.scanner.arm();
        info!(session = %self.id, rows = self.roster.len(), "master list loaded");
        Ok(self.roster.len())
    }

    /// Load the master list from an already-fetched grid (header row first).
    pub fn import_rows(&mut self, rows: &[Vec<String>]) -> (FieldIndexMap, usize) {
        let (columns, records) = records_from_rows(rows);
        self.roster.load(records);
        self.scanner.arm();
        info!(session = %self.id, rows = self.roster.len(), "master list imported");
        (columns, self.roster.len())
    }

    /// Resolve one submitted input, fetching the roster first when it is
    /// missing and credentials are on hand.
    pub fn submit(&mut self, raw: &str, source: &dyn RosterSource) -> Result<ResolveOutcome> {
        if presence::tokenize(raw).is_empty() {
            return Err(AttendanceError::EmptyInput);
        }
        if self.roster.is_empty() {
            self.load_roster(source, None)?;
        }
        let outcome = presence::resolve(raw, &self.roster, &mut self.present)?;
        info!(
            session = %self.id,
            added = outcome.added.len(),
            already_present = outcome.already_present.len(),
            not_found = outcome.not_found.len(),
            "scan resolved"
        );
        Ok(outcome)
    }

    /// Feed one key from the scanner; Enter submits the buffered tag.
    pub fn press_key(
        &mut self,
        key: &str,
        source: &dyn RosterSource,
    ) -> Option<Result<ResolveOutcome>> {
        let tag = self.scanner.push_key(key)?;
        Some(self.submit(&tag, source))
    }

    pub fn add_by_id(&mut self, raw: &str) -> Result<PresentRecord> {
        let record = presence::add_by_id(raw, &self.roster, &mut self.present)?;
        info!(session = %self.id, student = %record.student_id, "added by id");
        Ok(record)
    }

    pub fn year_groups(&self) -> Vec<YearGroup> {
        views::group_by_year(&self.present)
    }

    pub fn export_csv(&self) -> Result<(String, usize)> {
        views::to_csv(&self.present)
    }
}

/// Owns every open session; each is independent of the others.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<String, Session>,
    defaults: SheetCredentials,
}

impl SessionManager {
    pub fn new(defaults: SheetCredentials) -> Self {
        Self {
            sessions: HashMap::new(),
            defaults,
        }
    }

    pub fn open(&mut self, overrides: &SheetCredentials) -> &Session {
        let session = Session::new(self.defaults.merged(overrides));
        info!(session = %session.id, "session opened");
        let id = session.id.clone();
        self.sessions.entry(id).or_insert(session)
    }

    pub fn get(&self, id: &str) -> Result<&Session> {
        self.sessions
            .get(id)
            .ok_or_else(|| AttendanceError::SessionNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Session> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| AttendanceError::SessionNotFound(id.to_string()))
    }

    pub fn close(&mut self, id: &str) -> bool {
        let closed = self.sessions.remove(id).is_some();
        if closed {
            info!(session = %id, "session closed");
        }
        closed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}
