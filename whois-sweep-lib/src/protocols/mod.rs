//! Fetch collaborators and TLD sources.
//!
//! The classification core never talks to the network itself; it asks a
//! [`Probe`] for text and judges the answer.

use crate::error::SweepError;
use std::future::Future;

/// WHOIS command-line fetcher
pub mod whois;

/// Built-in TLD presets
pub mod registry;

pub use registry::{get_available_presets, get_preset_tlds, get_preset_tlds_with_custom};
pub use whois::{is_whois_available, WhoisClient};

/// Source of raw lookup text for a domain.
///
/// Implementations bound their own runtime. An `Err` means the fetch itself
/// failed; the retry loop treats it like an empty answer.
pub trait Probe {
    fn fetch(&self, domain: &str) -> impl Future<Output = Result<String, SweepError>>;
}
