//! Core data types for availability sweeps.
//!
//! Verdicts, per-domain outcomes, sweep summaries and the runtime
//! configuration shared by the classifier, the retry loop and the sweeper.

use crate::classify::Phrases;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Classification outcome for a domain.
///
/// `RateLimited` and `Empty` describe a single attempt and never leave the
/// retry loop; `Available`, `Taken` and `Error` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// No registration found
    Available,

    /// Registered; expiry date if the response carried a recognizable one
    Taken {
        #[serde(skip_serializing_if = "Option::is_none")]
        expiry: Option<String>,
    },

    /// The registry asked us to slow down
    RateLimited,

    /// The response carried no usable text
    Empty,

    /// Retries exhausted without a usable answer
    Error { reason: ErrorReason },
}

impl Verdict {
    /// Whether this verdict ends a domain's resolution.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Verdict::Available | Verdict::Taken { .. } | Verdict::Error { .. }
        )
    }

    /// Short lowercase label, matching the result log status column for
    /// terminal verdicts.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Available => "avail",
            Verdict::Taken { .. } => "taken",
            Verdict::RateLimited => "rate-limited",
            Verdict::Empty => "empty",
            Verdict::Error { .. } => "error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Taken {
                expiry: Some(expiry),
            } => write!(f, "taken (expires {})", expiry),
            Verdict::Error { reason } => write!(f, "error ({})", reason),
            other => f.write_str(other.label()),
        }
    }
}

/// Why a domain ended in `Verdict::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorReason {
    /// Every attempt was rate-limited or empty
    RetriesExceeded,

    /// The last attempt failed inside the fetch collaborator itself
    FetchFailure,

    /// A tag this crate doesn't produce, read back from an existing log
    Other(String),
}

impl ErrorReason {
    /// Tag written to the detail column of the result log.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorReason::RetriesExceeded => "retries-exceeded",
            ErrorReason::FetchFailure => "fetch-failure",
            ErrorReason::Other(tag) => tag,
        }
    }

    /// Parse a detail-column tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "retries-exceeded" => ErrorReason::RetriesExceeded,
            "fetch-failure" => ErrorReason::FetchFailure,
            other => ErrorReason::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ErrorReason::from_tag(&tag))
    }
}

/// Final verdict for one domain plus the number of probes it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub verdict: Verdict,
    pub attempts: u32,
}

/// Result of resolving a single domain during a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainOutcome {
    /// The domain that was probed (e.g., "acme.io")
    pub domain: String,

    /// Terminal verdict
    #[serde(flatten)]
    pub verdict: Verdict,

    /// Number of probes issued, including the successful one
    pub attempts: u32,

    /// Wall time spent on this domain, backoff sleeps included
    pub elapsed_ms: u64,
}

impl DomainOutcome {
    pub fn new(domain: impl Into<String>, resolution: Resolution, elapsed: Duration) -> Self {
        Self {
            domain: domain.into(),
            verdict: resolution.verdict,
            attempts: resolution.attempts,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Aggregate counts for a finished sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub available: usize,
    pub taken: usize,
    pub errors: usize,
    /// Domains skipped because the result log already had them
    pub skipped: usize,
}

impl SweepSummary {
    /// Count a terminal verdict.
    pub fn record(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Available => self.available += 1,
            Verdict::Taken { .. } => self.taken += 1,
            Verdict::Error { .. } => self.errors += 1,
            Verdict::RateLimited | Verdict::Empty => {}
        }
    }

    /// Number of domains actually probed.
    pub fn probed(&self) -> usize {
        self.available + self.taken + self.errors
    }
}

/// Runtime configuration for a sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Probes per domain before giving up
    /// Default: 3, Range: 1-10
    pub max_attempts: u32,

    /// One backoff time unit; attempt `n` waits `2^n` units
    /// Default: 1 second
    pub backoff_unit: Duration,

    /// Pause between two probed domains
    /// Default: 2 seconds
    pub inter_probe_delay: Duration,

    /// Timeout for a single whois invocation
    /// Default: 10 seconds
    pub whois_timeout: Duration,

    /// Explicit whois server (`whois -h`), None lets the whois binary decide
    pub whois_server: Option<String>,

    /// Phrase lists driving classification
    pub phrases: Phrases,

    /// Custom user-defined TLD presets from config files
    pub custom_presets: HashMap<String, Vec<String>>,

    /// Skip domains the result log already holds
    /// Default: true
    pub resume: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(1),
            inter_probe_delay: Duration::from_secs(2),
            whois_timeout: Duration::from_secs(10),
            whois_server: None,
            phrases: Phrases::default(),
            custom_presets: HashMap::new(),
            resume: true,
        }
    }
}

impl SweepConfig {
    /// Set the attempt ceiling, clamped to 1-10.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.clamp(1, 10);
        self
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    pub fn with_inter_probe_delay(mut self, delay: Duration) -> Self {
        self.inter_probe_delay = delay;
        self
    }

    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    pub fn with_whois_server(mut self, server: impl Into<String>) -> Self {
        self.whois_server = Some(server.into());
        self
    }

    pub fn with_phrases(mut self, phrases: Phrases) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }
}
