use thiserror::Error;

/// Session-level and request-level failures of the attendance core.
///
/// Per-token misses are not errors; they are reported in the `notFound`
/// list of a resolve outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    #[error("enter a name/ID or scan a tag")]
    EmptyInput,

    #[error("master list not loaded; press Start first or provide credentials")]
    RosterNotLoaded,

    #[error("failed to fetch master list: {0}")]
    RosterFetchFailed(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("no attendance data to export")]
    NoAttendance,

    #[error("no student found for ID: {0}")]
    StudentNotFound(String),

    #[error("{0} is already present")]
    AlreadyPresent(String),
}

impl AttendanceError {
    /// Stable wire code used in IPC error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            AttendanceError::EmptyInput => "empty_input",
            AttendanceError::RosterNotLoaded => "roster_not_loaded",
            AttendanceError::RosterFetchFailed(_) => "roster_fetch_failed",
            AttendanceError::SessionNotFound(_) => "session_not_found",
            AttendanceError::NoAttendance => "no_attendance",
            AttendanceError::StudentNotFound(_) => "not_found",
            AttendanceError::AlreadyPresent(_) => "already_present",
        }
    }
}

pub type Result<T> = std::result::Result<T, AttendanceError>;
