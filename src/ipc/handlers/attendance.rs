use crate::ipc::helpers::{get_optional_str, get_required_str, respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn write_text_file(path: &str, contents: &str) -> Result<(), HandlerErr> {
    let out = PathBuf::from(path);
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent).map_err(|e| HandlerErr {
            code: "export_failed",
            message: e.to_string(),
            details: Some(json!({ "path": path })),
        })?;
    }
    std::fs::write(&out, contents).map_err(|e| HandlerErr {
        code: "export_failed",
        message: e.to_string(),
        details: Some(json!({ "path": path })),
    })?;
    Ok(())
}

fn add_by_id(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_str(params, "sessionId")?;
    let student_id = get_required_str(params, "studentId")?;
    let session = state.sessions.get_mut(&session_id)?;
    let added = session.add_by_id(&student_id)?;
    Ok(json!({
        "added": added,
        "presentCount": session.present().len(),
    }))
}

fn attendance_list(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_str(params, "sessionId")?;
    let session = state.sessions.get(&session_id)?;
    let groups = session.year_groups();
    let count: usize = groups.iter().map(|g| g.students.len()).sum();
    Ok(json!({
        "groups": groups,
        "count": count,
        "rosterCount": session.roster().len(),
    }))
}

fn export_csv(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session_id = get_required_str(params, "sessionId")?;
    let out_path = get_optional_str(params, "outPath");
    let session = state.sessions.get(&session_id)?;
    let (csv, row_count) = session.export_csv()?;
    if let Some(path) = out_path.as_deref() {
        write_text_file(path, &csv)?;
        info!(session = %session.id, rows = row_count, path, "attendance exported");
    }
    Ok(json!({
        "csv": csv,
        "rowCount": row_count,
        "path": out_path,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.addById" => Some(respond(&req.id, add_by_id(state, &req.params))),
        "attendance.list" => Some(respond(&req.id, attendance_list(state, &req.params))),
        "attendance.exportCsv" => Some(respond(&req.id, export_csv(state, &req.params))),
        _ => None,
    }
}
