//! WHOIS fetch collaborator.
//!
//! Runs the system `whois` command and hands back its text. Classification
//! happens elsewhere; this module only fetches, bounds the fetch with a
//! timeout and normalizes line endings.

use super::Probe;
use crate::classify::normalize;
use crate::error::SweepError;
use std::time::Duration;
use tokio::process::Command;

/// WHOIS client backed by the system's `whois` command.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    /// Timeout for one whois invocation
    timeout: Duration,
    /// Server passed as `whois -h <server>`; None lets whois pick
    server: Option<String>,
}

impl WhoisClient {
    /// Create a new WHOIS client with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            server: None,
        }
    }

    /// Create a new WHOIS client with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            server: None,
        }
    }

    /// Query a specific server instead of letting whois follow referrals.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Fetch the raw WHOIS text for `domain`.
    ///
    /// # Errors
    ///
    /// Returns `SweepError` if:
    /// - The `whois` command is not available on the system
    /// - The query does not finish within the timeout
    ///
    /// A non-zero exit status is not an error: many whois builds exit 1 for
    /// unregistered domains while still printing a usable answer.
    pub async fn lookup(&self, domain: &str) -> Result<String, SweepError> {
        match tokio::time::timeout(self.timeout, self.execute_whois_command(domain)).await {
            Ok(result) => result,
            Err(_) => Err(SweepError::timeout("WHOIS query", self.timeout)),
        }
    }

    async fn execute_whois_command(&self, domain: &str) -> Result<String, SweepError> {
        let mut command = Command::new("whois");
        if let Some(server) = &self.server {
            command.arg("-h").arg(server);
        }
        command.arg(domain).kill_on_drop(true);

        let output = command.output().await.map_err(|e| {
            SweepError::whois(
                domain,
                format!(
                    "Failed to execute whois command: {}. Make sure 'whois' is installed.",
                    e
                ),
            )
        })?;

        if !output.status.success() {
            tracing::debug!(
                domain,
                status = ?output.status.code(),
                "whois exited with non-zero status"
            );
        }

        Ok(normalize(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for WhoisClient {
    async fn fetch(&self, domain: &str) -> Result<String, SweepError> {
        self.lookup(domain).await
    }
}

/// Check if the system has a whois command.
///
/// Only the spawn matters: BSD builds reject `--version` with a non-zero exit.
pub async fn is_whois_available() -> bool {
    command_spawns("whois").await
}

async fn command_spawns(program: impl AsRef<std::ffi::OsStr>) -> bool {
    Command::new(program).arg("--version").output().await.is_ok()
}
