use crate::ipc::helpers::{get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::presence::ResolveOutcome;
use serde_json::json;

fn outcome_json(outcome: &ResolveOutcome, present_count: usize) -> serde_json::Value {
    json!({
        "added": outcome.added,
        "alreadyPresent": outcome.already_present,
        "notFound": outcome.not_found,
        "message": outcome.summary(),
        "changed": outcome.changed(),
        "presentCount": present_count,
    })
}

fn scan_submit(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_str(params, "sessionId")?;
    let input = get_required_str(params, "input")?;
    let source = state.source.as_ref();
    let session = state.sessions.get_mut(&session_id)?;
    let outcome = session.submit(&input, source)?;
    Ok(outcome_json(&outcome, session.present().len()))
}

fn scan_key(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_str(params, "sessionId")?;
    let key = get_required_str(params, "key")?;
    let source = state.source.as_ref();
    let session = state.sessions.get_mut(&session_id)?;
    match session.press_key(&key, source) {
        None => Ok(json!({
            "submitted": false,
            "armed": session.scanner().is_armed(),
            "buffered": session.scanner().pending().chars().count(),
        })),
        Some(result) => {
            let outcome = result?;
            Ok(json!({
                "submitted": true,
                "outcome": outcome_json(&outcome, session.present().len()),
            }))
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "scan.submit" => Some(respond(&req.id, scan_submit(state, &req.params))),
        "scan.key" => Some(respond(&req.id, scan_key(state, &req.params))),
        _ => None,
    }
}
