use serde::Deserialize;

use crate::session::SessionManager;
use crate::sheets::RosterSource;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub sessions: SessionManager,
    pub source: Box<dyn RosterSource>,
}
