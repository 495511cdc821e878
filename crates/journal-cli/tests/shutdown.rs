//! Integration tests for `journal serve` over stdio: graceful exit on EOF
//! and signals, and a tool call that reaches the data file.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn journal_binary() -> std::path::PathBuf {
    assert_cmd::cargo::cargo_bin!("journal").into()
}

fn spawn_serve(dir: &TempDir) -> Child {
    Command::new(journal_binary())
        .arg("--data-file")
        .arg(dir.path().join("journal.json"))
        .arg("serve")
        .env_remove("JOURNAL_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn journal serve")
}

/// Send a JSON-RPC message as newline-delimited JSON.
fn send_jsonrpc(stdin: &mut impl Write, msg: &serde_json::Value) {
    let line = serde_json::to_string(msg).unwrap();
    writeln!(stdin, "{line}").unwrap();
    stdin.flush().unwrap();
}

/// Initialize, wait for the server's reply, then confirm with the
/// initialized notification.
fn mcp_handshake(child: &mut Child, stdout: &mut impl BufRead) {
    let stdin = child.stdin.as_mut().expect("stdin pipe");
    send_jsonrpc(
        stdin,
        &serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "test", "version": "0.1.0" }
            }
        }),
    );

    let reply = read_message(stdout);
    assert_eq!(reply["id"], 1);
    assert!(reply["result"]["capabilities"]["tools"].is_object());

    send_jsonrpc(
        stdin,
        &serde_json::json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }),
    );
}

fn read_message(stdout: &mut impl BufRead) -> serde_json::Value {
    let mut line = String::new();
    stdout.read_line(&mut line).expect("read stdout");
    serde_json::from_str(&line).expect("server should emit JSON-RPC lines")
}

fn wait_with_deadline(child: Child) -> (std::process::Output, Duration) {
    let start = Instant::now();
    let output = child.wait_with_output().expect("wait");
    (output, start.elapsed())
}

/// After a full handshake, closing stdin should trigger clean shutdown.
#[test]
fn serve_exits_on_stdin_eof() {
    let dir = TempDir::new().unwrap();
    let mut child = spawn_serve(&dir);
    let mut stdout = BufReader::new(child.stdout.take().expect("stdout pipe"));
    mcp_handshake(&mut child, &mut stdout);

    drop(child.stdin.take());
    let (output, elapsed) = wait_with_deadline(child);

    assert!(
        output.status.success(),
        "journal serve should exit 0 on stdin EOF, got {}",
        output.status
    );
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
}

#[cfg(unix)]
#[test]
fn serve_exits_on_sigterm() {
    let dir = TempDir::new().unwrap();
    let mut child = spawn_serve(&dir);
    let mut stdout = BufReader::new(child.stdout.take().expect("stdout pipe"));
    mcp_handshake(&mut child, &mut stdout);

    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGTERM);
    }

    let start = Instant::now();
    let status = child.wait().expect("wait");
    let elapsed = start.elapsed();

    assert!(status.success(), "SIGTERM should exit 0, got {status}");
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
}

#[test]
fn tool_call_writes_data_file() {
    let dir = TempDir::new().unwrap();
    let mut child = spawn_serve(&dir);
    let mut stdout = BufReader::new(child.stdout.take().expect("stdout pipe"));
    mcp_handshake(&mut child, &mut stdout);

    let stdin = child.stdin.as_mut().expect("stdin pipe");
    send_jsonrpc(
        stdin,
        &serde_json::json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {
                "name": "journal_write",
                "arguments": {
                    "path": "project-alpha/api",
                    "entry": "Sketched the v2 routes.",
                    "work_context": "api design"
                }
            }
        }),
    );

    let reply = read_message(&mut stdout);
    assert_eq!(reply["id"], 2);
    assert_eq!(
        reply["result"]["content"][0]["text"],
        "Added entry to journal section 'project-alpha/api'"
    );

    drop(child.stdin.take());
    child.wait().expect("wait");

    let raw = std::fs::read_to_string(dir.path().join("journal.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let api = &json["sections"]["project-alpha"]["subsections"]["api"];
    assert_eq!(api["entries"][0]["content"], "Sketched the v2 routes.");
}
