//! Serves a data directory from the binary and scrapes every endpoint.

#![cfg(feature = "api")]

mod common;

use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;

use common::{config_toml, write_data_dir};

struct ChildGuard {
    child: Child,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn served_endpoints_return_exposition_and_json() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    write_data_dir(dir.path());
    let addr = allocate_bind_addr();
    let config_path = dir.path().join("shed.toml");
    fs::write(&config_path, config_toml(dir.path(), &addr)).expect("config should be written");

    let _child = spawn_server(&config_path);
    wait_for_server(&addr, Duration::from_secs(8));

    let (status, metrics) = http_get(&addr, "/metrics").expect("/metrics request should succeed");
    assert_eq!(status, 200);
    assert!(metrics.contains("# TYPE greatriverenergy_conservation_gauge gauge"));
    assert!(metrics.contains("greatriverenergy_shed_count{program=\"Cycled Air Conditioning\"} 7"));

    let (status, history) =
        http_get(&addr, "/history?days=2").expect("/history request should succeed");
    assert_eq!(status, 200);
    assert!(history.contains("# TYPE greatriverenergy_shed_event gauge"));

    let (status, countdown) =
        http_get(&addr, "/countdown").expect("/countdown request should succeed");
    assert_eq!(status, 200);
    let json: Value = serde_json::from_str(&countdown).expect("countdown body should be JSON");
    let classes = json
        .get("classes")
        .and_then(Value::as_object)
        .expect("classes should be an object");
    // Fixture events are years old, so every class collects an empty log.
    for class in ["R", "CI"] {
        assert!(
            classes[class].get("programs").is_some_and(Value::is_object),
            "class {class}: {countdown}"
        );
    }
}

fn allocate_bind_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral port bind should succeed");
    let addr = listener
        .local_addr()
        .expect("local_addr should be available")
        .to_string();
    drop(listener);
    addr
}

fn spawn_server(config: &std::path::Path) -> ChildGuard {
    let child = Command::new(env!("CARGO_BIN_EXE_shed-timeline"))
        .arg("--config")
        .arg(config)
        .arg("--serve")
        .env_remove("LISTEN")
        .env_remove("PORT")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("shed-timeline process should spawn");

    ChildGuard { child }
}

fn wait_for_server(bind_addr: &str, timeout: Duration) {
    let start = Instant::now();
    loop {
        if let Ok((status, _)) = http_get(bind_addr, "/metrics") {
            if status == 200 {
                return;
            }
        }

        if start.elapsed() >= timeout {
            panic!("timed out waiting for server on {bind_addr}");
        }

        thread::sleep(Duration::from_millis(50));
    }
}

fn http_get(bind_addr: &str, path: &str) -> Result<(u16, String), String> {
    let mut stream = TcpStream::connect(bind_addr).map_err(|err| format!("connect: {err}"))?;
    let request = format!("GET {path} HTTP/1.1\r\nHost: {bind_addr}\r\nConnection: close\r\n\r\n");
    stream
        .write_all(request.as_bytes())
        .map_err(|err| format!("write: {err}"))?;

    let mut raw = String::new();
    stream
        .read_to_string(&mut raw)
        .map_err(|err| format!("read: {err}"))?;

    let (head, body) = raw
        .split_once("\r\n\r\n")
        .ok_or_else(|| "invalid HTTP response".to_string())?;
    let status_line = head
        .lines()
        .next()
        .ok_or_else(|| "missing status line".to_string())?;
    let status_code = status_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| "missing status code".to_string())?
        .parse::<u16>()
        .map_err(|err| format!("invalid status code: {err}"))?;

    Ok((status_code, body.to_string()))
}
