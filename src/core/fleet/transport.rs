//! Remote execution transports.
//!
//! The shipped transport runs `cmsvault serve --stdio` on the target host
//! over ssh, with the request on stdin and the reply on stdout.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::core::config::RemoteConfig;
use crate::core::domain::Host;
use crate::error::TransportError;

/// Exit status ssh uses for its own failures.
const SSH_FAILURE: i32 = 255;

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Moves one request to a host and brings back the raw reply.
pub trait Transport {
    fn exchange(&self, host: &Host, payload: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// Transport over the system ssh client.
#[derive(Debug, Clone)]
pub struct SshTransport {
    ssh: String,
    command: String,
    user: Option<String>,
    connect_timeout: Duration,
    exec_timeout: Duration,
}

impl SshTransport {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            ssh: config.ssh.clone(),
            command: config.command.clone(),
            user: config.user.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            exec_timeout: Duration::from_secs(config.exec_timeout_secs),
        }
    }

    /// Locate the ssh binary. Looked up per exchange so a missing client
    /// only fails the hosts that actually need it.
    fn program(&self) -> Result<PathBuf, TransportError> {
        let program = which::which(&self.ssh)
            .map_err(|e| TransportError::Unavailable(format!("{}: {}", self.ssh, e)))?;
        trace!(ssh = %program.display(), "ssh located");
        Ok(program)
    }

    fn destination(&self, host: &Host) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, host),
            None => host.to_string(),
        }
    }

    fn args(&self, host: &Host) -> Vec<String> {
        vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs()),
            self.destination(host),
            self.command.clone(),
            "serve".to_string(),
            "--stdio".to_string(),
        ]
    }

    /// Wait for the child, killing it once the execution timeout passes.
    fn wait(&self, host: &Host, child: &mut Child) -> Result<i32, TransportError> {
        let deadline = Instant::now() + self.exec_timeout;
        loop {
            let status = child.try_wait().map_err(|e| TransportError::ConnectionFailed {
                host: host.to_string(),
                reason: e.to_string(),
            })?;
            if let Some(status) = status {
                return Ok(status.code().unwrap_or(SSH_FAILURE));
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(TransportError::Timeout {
                    host: host.to_string(),
                    seconds: self.exec_timeout.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn drain(mut stream: impl Read + Send + 'static) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf);
        buf
    })
}

impl Transport for SshTransport {
    fn exchange(&self, host: &Host, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        let program = self.program()?;
        let args = self.args(host);
        trace!(host = %host, ?args, "spawning ssh");

        let connection_failed = |reason: String| TransportError::ConnectionFailed {
            host: host.to_string(),
            reason,
        };

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| connection_failed(format!("failed to spawn ssh: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .map(drain)
            .ok_or_else(|| connection_failed("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .map(drain)
            .ok_or_else(|| connection_failed("stderr not captured".to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(payload) {
                trace!(host = %host, error = %e, "remote closed stdin early");
            }
        }

        let status = self.wait(host, &mut child)?;
        let stdout = stdout.join().unwrap_or_default();
        let stderr = String::from_utf8_lossy(&stderr.join().unwrap_or_default())
            .trim()
            .to_string();

        debug!(host = %host, status, reply_len = stdout.len(), "ssh finished");

        match status {
            0 => Ok(stdout),
            SSH_FAILURE => Err(connection_failed(stderr)),
            status => Err(TransportError::RemoteExit {
                host: host.to_string(),
                status,
                stderr,
            }),
        }
    }
}
