use crate::ipc::helpers::{credentials_from_params, get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use chrono::SecondsFormat;
use serde_json::json;

fn session_open(state: &mut AppState, params: &serde_json::Value) -> serde_json::Value {
    let overrides = credentials_from_params(params);
    let session = state.sessions.open(&overrides);
    json!({
        "sessionId": session.id,
        "startedAt": session.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        "hasCredentials": session.has_credentials(),
    })
}

fn session_close(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_str(params, "sessionId")?;
    // false when the id was unknown or already closed
    Ok(json!({ "closed": state.sessions.close(&session_id) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.open" => Some(respond(&req.id, Ok(session_open(state, &req.params)))),
        "session.close" => Some(respond(&req.id, session_close(state, &req.params))),
        _ => None,
    }
}
