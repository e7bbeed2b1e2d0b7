//! Child-process implementation of the mock engine contract.
//!
//! Launches the standalone engine binary with the constructed argument
//! list and pumps its console output into the caller-supplied sink.

use super::{EngineFactory, MockEngine, OutputSink, StartError};
use parking_lot::Mutex;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use tracing::{debug, warn};

pub struct StandaloneEngine {
    binary: PathBuf,
    workdir: PathBuf,
    sink: OutputSink,
    child: Mutex<Option<Child>>,
}

impl StandaloneEngine {
    pub fn new(binary: impl Into<PathBuf>, workdir: impl Into<PathBuf>, sink: OutputSink) -> Self {
        Self {
            binary: binary.into(),
            workdir: workdir.into(),
            sink,
            child: Mutex::new(None),
        }
    }

    fn pump<R: Read + Send + 'static>(stream: R, sink: OutputSink) {
        thread::spawn(move || {
            let reader = BufReader::new(stream);
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        let mut sink = sink.lock();
                        let _ = writeln!(sink, "{line}");
                    }
                    Err(_) => break,
                }
            }
        });
    }
}

/// Advisory probe for a friendlier error than the engine's own bind
/// failure. The listener is released before the engine launches.
fn probe_port(port: u16) -> Result<(), StartError> {
    match TcpListener::bind(("127.0.0.1", port)) {
        Ok(_) => Ok(()),
        Err(_) => Err(StartError::PortInUse(port)),
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

impl MockEngine for StandaloneEngine {
    fn start(&mut self, args: &[String]) -> Result<(), StartError> {
        if let Some(port) = flag_value(args, "--port").and_then(|v| v.parse::<u16>().ok()) {
            probe_port(port)?;
        }
        if let Some(root) = flag_value(args, "--root-dir") {
            let root = self.workdir.join(root);
            std::fs::create_dir_all(&root)
                .map_err(|e| StartError::InvalidRootDir(format!("{}: {}", root.display(), e)))?;
        }

        let mut child = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StartError::Launch(format!("{}: {}", self.binary.display(), e)))?;

        debug!(binary = %self.binary.display(), pid = child.id(), "mock engine launched");

        if let Some(stdout) = child.stdout.take() {
            Self::pump(stdout, self.sink.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            Self::pump(stderr, self.sink.clone());
        }

        *self.child.lock() = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(child) = self.child.lock().as_mut() {
            if let Err(err) = child.kill() {
                debug!(%err, "mock engine already exited");
            }
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut child) = self.child.lock().take() {
            // Reap whether or not stop was effective.
            let _ = child.kill();
            match child.wait() {
                Ok(status) => debug!(%status, "mock engine reaped"),
                Err(err) => warn!(%err, "failed to reap mock engine"),
            }
        }
    }

    fn is_running(&self) -> bool {
        let mut child = self.child.lock();
        match child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

/// Produces [`StandaloneEngine`] handles for one engine installation.
pub struct StandaloneEngineFactory {
    binary: PathBuf,
    workdir: PathBuf,
}

impl StandaloneEngineFactory {
    pub fn new(binary: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            workdir: workdir.into(),
        }
    }
}

impl EngineFactory for StandaloneEngineFactory {
    fn create(&self, sink: OutputSink) -> Box<dyn MockEngine> {
        Box::new(StandaloneEngine::new(
            self.binary.clone(),
            self.workdir.clone(),
            sink,
        ))
    }
}
