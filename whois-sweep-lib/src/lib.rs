//! # Whois Sweep Library
//!
//! Classifies raw WHOIS responses and drives a serial, resumable sweep of
//! candidate domains with exponential backoff on throttled or empty answers.
//!
//! The core is deterministic: [`classify`] turns text into a [`Verdict`],
//! [`extract_expiry`] pulls the first expiry date, and [`RetryScheduler`]
//! decides when to try again. Fetching is delegated to a [`Probe`], which by
//! default is the system `whois` command.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whois_sweep_lib::{classify, Sweeper, Verdict};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     assert_eq!(classify("No match for \"ACME.COM\"."), Verdict::Available);
//!
//!     let sweeper = Sweeper::new();
//!     let outcome = sweeper.check_domain("example.com", |_| {}).await;
//!     println!("{} - {}", outcome.domain, outcome.verdict);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Phrase classification**: rate-limit, availability and expiry phrases, extendable from config
//! - **Exponential backoff**: `unit * 2^attempt` between attempts, bounded attempt count
//! - **Resumable sweeps**: append-only result log, already-logged domains are skipped
//! - **Configurable**: TOML files, `WS_*` environment variables and builder methods

// Re-export main public API types and functions
pub use checker::{SweepEvent, Sweeper};
pub use classify::{classify, normalize, Classifier, Phrases};
pub use config::{
    load_env_config, load_env_config_with, parse_duration_string, ConfigManager, DefaultsConfig,
    EnvConfig, FileConfig, PatternsConfig,
};
pub use error::SweepError;
pub use expiry::extract_expiry;
pub use protocols::{
    get_available_presets, get_preset_tlds, get_preset_tlds_with_custom, is_whois_available,
    Probe, WhoisClient,
};
pub use retry::{Backoff, RetryDecision, RetryPolicy, RetryScheduler, Transient};
pub use sink::{processed_domains, read_records, RecordStatus, ResultLog, ResultRecord};
pub use types::{DomainOutcome, ErrorReason, Resolution, SweepConfig, SweepSummary, Verdict};
pub use utils::{expand_keyword, normalize_tld, parse_tld_list, read_tld_file, validate_keyword};

// Internal modules - these are not part of the public API
mod checker;
mod classify;
mod config;
mod error;
mod expiry;
mod protocols;
mod retry;
mod sink;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SweepError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
