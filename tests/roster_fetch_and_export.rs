use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar(env: &[(&str, &str)]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_attendd");
    let mut cmd = Command::new(exe);
    cmd.env_remove("ATTENDD_API_KEY")
        .env_remove("ATTENDD_SHEET_ID")
        .env_remove("ATTENDD_SHEET_NAME")
        .env("ATTENDD_SHEETS_BASE_URL", "http://127.0.0.1:9")
        .env("ATTENDD_FETCH_TIMEOUT_SECS", "2");
    for (k, v) in env {
        cmd.env(k, v);
    }
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn attendd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

#[test]
fn roster_load_failure_is_reported_and_session_survives() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);

    let opened = request(&mut stdin, &mut reader, "1", "session.open", json!({}));
    let sid = opened["result"]["sessionId"].as_str().expect("sessionId").to_string();

    let missing = request(
        &mut stdin,
        &mut reader,
        "2",
        "roster.load",
        json!({ "sessionId": sid, "apiKey": "k", "sheetId": "abc" }),
    );
    assert_eq!(error_code(&missing), "roster_not_loaded");

    let failed = request(
        &mut stdin,
        &mut reader,
        "3",
        "roster.load",
        json!({ "sessionId": sid, "apiKey": "k", "sheetId": "abc", "sheetName": "Sheet1" }),
    );
    assert_eq!(error_code(&failed), "roster_fetch_failed");

    // Credentials were not retained by the failed load.
    let scan = request(
        &mut stdin,
        &mut reader,
        "4",
        "scan.submit",
        json!({ "sessionId": sid, "input": "S1" }),
    );
    assert_eq!(error_code(&scan), "roster_not_loaded");

    let imported = request(
        &mut stdin,
        &mut reader,
        "5",
        "roster.import",
        json!({ "sessionId": sid, "values": [["id", "name"], ["S1", "Ana"]] }),
    );
    assert_eq!(imported["result"]["count"], json!(1));
    let scan = request(
        &mut stdin,
        &mut reader,
        "6",
        "scan.submit",
        json!({ "sessionId": sid, "input": "S1" }),
    );
    assert_eq!(scan["result"]["added"], json!(["Ana"]));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn on_demand_load_with_default_credentials_surfaces_fetch_failure() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[
        ("ATTENDD_API_KEY", "k"),
        ("ATTENDD_SHEET_ID", "abc"),
        ("ATTENDD_SHEET_NAME", "Sheet1"),
    ]);

    let opened = request(&mut stdin, &mut reader, "1", "session.open", json!({}));
    assert_eq!(opened["result"]["hasCredentials"], json!(true));
    let sid = opened["result"]["sessionId"].as_str().expect("sessionId").to_string();

    let scan = request(
        &mut stdin,
        &mut reader,
        "2",
        "scan.submit",
        json!({ "sessionId": sid, "input": "S1" }),
    );
    assert_eq!(error_code(&scan), "roster_fetch_failed");

    let health = request(&mut stdin, &mut reader, "3", "health", json!({}));
    assert_eq!(health["ok"], json!(true));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn export_writes_csv_file_when_path_given() {
    let workspace = temp_dir("attendd-export");
    let csv_out = workspace.join("nested").join("attendance.csv");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);

    let opened = request(&mut stdin, &mut reader, "1", "session.open", json!({}));
    let sid = opened["result"]["sessionId"].as_str().expect("sessionId").to_string();
    let _ = request(
        &mut stdin,
        &mut reader,
        "2",
        "roster.import",
        json!({
            "sessionId": sid,
            "values": [["Student ID", "Name", "Year Level"], ["S1", "Ana \"AJ\"", "3"]]
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.addById",
        json!({ "sessionId": sid, "studentId": "S1" }),
    );
    let exported = request(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.exportCsv",
        json!({ "sessionId": sid, "outPath": csv_out.to_string_lossy() }),
    );
    assert_eq!(exported["ok"], json!(true), "{}", exported);
    assert_eq!(exported["result"]["rowCount"], json!(1));

    let written = std::fs::read_to_string(&csv_out).expect("read csv");
    assert_eq!(
        written,
        "\"Student ID\",\"Student Name\",\"Year Level\",\"RFID\"\n\"S1\",\"Ana \"\"AJ\"\"\",\"3\",\"\""
    );

    drop(stdin);
    let _ = child.wait();
}
