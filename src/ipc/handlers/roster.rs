use crate::ipc::helpers::{credentials_from_params, get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::sheets::parse_values;
use serde_json::json;

fn roster_load(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_str(params, "sessionId")?;
    let overrides = credentials_from_params(params);
    let source = state.source.as_ref();
    let session = state.sessions.get_mut(&session_id)?;
    let count = session.load_roster(source, Some(&overrides))?;
    Ok(json!({ "count": count }))
}

fn roster_import(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_str(params, "sessionId")?;
    if !params.get("values").map(|v| v.is_array()).unwrap_or(false) {
        return Err(HandlerErr::bad_params("values must be an array of rows"));
    }
    let rows = parse_values(params);
    let session = state.sessions.get_mut(&session_id)?;
    let (columns, count) = session.import_rows(&rows);
    Ok(json!({ "count": count, "columns": columns }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.load" => Some(respond(&req.id, roster_load(state, &req.params))),
        "roster.import" => Some(respond(&req.id, roster_import(state, &req.params))),
        _ => None,
    }
}
