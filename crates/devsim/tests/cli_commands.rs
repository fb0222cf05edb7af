#![cfg(all(unix, feature = "cli"))]

use std::io::{BufRead, BufReader};
use std::net::UdpSocket;
use std::process::{Child, Command, Stdio};

use serde_json::Value;

struct Served {
    child: Child,
    udp: String,
    tcp: String,
}

impl Drop for Served {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn serve(extra: &[&str]) -> Served {
    let mut child = Command::new(env!("CARGO_BIN_EXE_devsim"))
        .args(["--log-level", "error", "--format", "json", "serve"])
        .args(["--udp", "127.0.0.1:0", "--tcp", "127.0.0.1:0"])
        .args(extra)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("serve command should start");

    let stdout = child.stdout.take().expect("stdout should be piped");
    let mut line = String::new();
    BufReader::new(stdout)
        .read_line(&mut line)
        .expect("serve should announce its endpoints");
    let announced: Value = serde_json::from_str(&line).expect("announcement should be JSON");

    Served {
        udp: announced["udp"].as_str().expect("udp address").to_string(),
        tcp: announced["tcp"].as_str().expect("tcp address").to_string(),
        child,
    }
}

fn send(addr: &str, transport: &str, msg_type: &str) -> (i32, Value) {
    let output = Command::new(env!("CARGO_BIN_EXE_devsim"))
        .args(["--log-level", "error", "--format", "json", "send", addr])
        .args(["--transport", transport, "--type", msg_type])
        .output()
        .expect("send should run");
    let code = output.status.code().expect("send should exit normally");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value = serde_json::from_str(stdout.trim()).unwrap_or(Value::Null);
    (code, value)
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_devsim"))
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("devsim {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn serve_answers_both_transports() {
    let served = serve(&[]);

    let (code, reply) = send(&served.udp, "udp", "status");
    assert_eq!(code, 0);
    assert_eq!(reply["type_name"], "STATE");
    assert_eq!(reply["payload"], "IDLE");

    let (code, reply) = send(&served.tcp, "tcp", "ping");
    assert_eq!(code, 0);
    assert_eq!(reply["payload"], "PONG");
    assert_eq!(reply["schema_id"], "urn:devsim:cli:v1:response");

    let (code, reply) = send(&served.tcp, "tcp", "start");
    assert_eq!(code, 1);
    assert_eq!(reply["type_name"], "ERR");
    assert_eq!(reply["payload"], "BAD_STATE");
}

#[test]
fn serve_configured_can_stream() {
    let served = serve(&["--configure"]);

    let (code, reply) = send(&served.udp, "udp", "start");
    assert_eq!(code, 0);
    assert_eq!(reply["payload"], "STREAMING");

    let (_, reply) = send(&served.tcp, "tcp", "status");
    assert_eq!(reply["payload"], "STREAMING");
}

#[test]
fn corrupted_reply_exits_60() {
    let served = serve(&["--corrupt-rate", "1.0"]);

    let (code, _) = send(&served.udp, "udp", "ping");
    assert_eq!(code, 60);
}

#[test]
fn send_timeout_returns_124() {
    let silent = UdpSocket::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = silent.local_addr().expect("local addr").to_string();

    let output = Command::new(env!("CARGO_BIN_EXE_devsim"))
        .args(["--log-level", "error", "send", &addr, "--timeout", "200ms"])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(124));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("timed out"));
}

#[test]
fn serve_rejects_out_of_range_rate() {
    let output = Command::new(env!("CARGO_BIN_EXE_devsim"))
        .args(["--log-level", "error", "serve", "--drop-rate", "1.5"])
        .args(["--udp", "127.0.0.1:0", "--tcp", "127.0.0.1:0"])
        .output()
        .expect("serve should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn send_rejects_unknown_type() {
    let output = Command::new(env!("CARGO_BIN_EXE_devsim"))
        .args(["send", "127.0.0.1:9", "--type", "launch"])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(64));
}
