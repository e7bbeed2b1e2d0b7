//! Process-level tests for the standalone engine handle.
//!
//! Uses plain shell utilities as stand-ins for the mock engine binary;
//! the handle only cares about process lifecycle and output plumbing.

use std::io::Write;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wirefleet::engine::{sink_from, MockEngine, StandaloneEngine, StartError};

/// Write target the test can inspect while the pump threads feed it.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    condition()
}

#[test]
fn test_lifecycle_of_long_running_process() {
    let mut engine = StandaloneEngine::new("sh", ".", sink_from(Vec::new()));
    assert!(!engine.is_running());

    engine
        .start(&["-c".to_string(), "sleep 30".to_string()])
        .unwrap();
    assert!(engine.is_running());

    engine.stop();
    engine.shutdown();
    assert!(!engine.is_running());
}

#[test]
fn test_exited_process_reports_not_running() {
    let mut engine = StandaloneEngine::new("true", ".", sink_from(Vec::new()));
    engine.start(&[]).unwrap();

    assert!(wait_until(Duration::from_secs(2), || !engine.is_running()));
    engine.stop();
    engine.shutdown();
}

#[test]
fn test_console_output_reaches_sink() {
    let buf = SharedBuf::default();
    let mut engine = StandaloneEngine::new("sh", ".", sink_from(buf.clone()));
    engine
        .start(&["-c".to_string(), "echo mappings loaded >&2; echo ready".to_string()])
        .unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        let out = buf.contents();
        out.contains("ready") && out.contains("mappings loaded")
    }));
    engine.shutdown();
}

#[test]
fn test_missing_binary_is_launch_error() {
    let mut engine = StandaloneEngine::new(
        "/nonexistent/mock-engine",
        ".",
        sink_from(Vec::new()),
    );
    match engine.start(&[]) {
        Err(StartError::Launch(_)) => {}
        other => panic!("expected launch error, got {other:?}"),
    }
    assert!(!engine.is_running());
}

#[test]
fn test_root_dir_is_created_under_workdir() {
    let workdir = tempfile::tempdir().unwrap();
    let mut engine = StandaloneEngine::new("true", workdir.path(), sink_from(Vec::new()));
    engine
        .start(&["--root-dir".to_string(), "proxy-7/mock-42".to_string()])
        .unwrap();

    assert!(workdir.path().join("proxy-7/mock-42").is_dir());
    engine.stop();
    engine.shutdown();
}

#[test]
fn test_occupied_port_is_rejected() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut engine = StandaloneEngine::new("true", ".", sink_from(Vec::new()));
    let err = engine
        .start(&["--port".to_string(), port.to_string()])
        .unwrap_err();
    assert_eq!(err, StartError::PortInUse(port));
    assert!(!engine.is_running());
}
