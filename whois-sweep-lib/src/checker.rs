//! Serial sweep orchestration.
//!
//! This module provides the `Sweeper` that walks a list of candidate domains
//! one at a time: skip what the result log already has, resolve the rest
//! through the retry scheduler, append each terminal verdict and pause
//! between probes.

use crate::classify::Classifier;
use crate::error::SweepError;
use crate::protocols::{Probe, WhoisClient};
use crate::retry::{Backoff, RetryPolicy, RetryScheduler};
use crate::sink::{ResultLog, ResultRecord};
use crate::types::{DomainOutcome, SweepConfig, SweepSummary};
use std::collections::HashSet;
use std::time::Instant;

/// Progress events reported while sweeping.
#[derive(Debug, Clone)]
pub enum SweepEvent<'a> {
    /// The result log already has this domain
    Skipped { domain: &'a str },

    /// About to probe this domain
    Probing { domain: &'a str, index: usize, total: usize },

    /// A transient answer; the scheduler is about to sleep
    Backoff { domain: &'a str, backoff: Backoff },

    /// Terminal verdict reached and recorded
    Resolved(&'a DomainOutcome),
}

/// Resolves domains one by one through a [`Probe`].
///
/// # Example
///
/// ```rust,no_run
/// use whois_sweep_lib::{expand_keyword, ResultLog, Sweeper};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let sweeper = Sweeper::new();
///     let domains = expand_keyword("acme", &["com".to_string(), "io".to_string()]);
///     let log = ResultLog::open("acme.log")?;
///
///     let summary = sweeper.sweep(&domains, Some(&log), |_| {}).await?;
///     println!("{} available", summary.available);
///     Ok(())
/// }
/// ```
pub struct Sweeper<P = WhoisClient> {
    config: SweepConfig,
    scheduler: RetryScheduler,
    probe: P,
}

impl Sweeper<WhoisClient> {
    /// Create a sweeper with default configuration and the system whois.
    pub fn new() -> Self {
        Self::with_config(SweepConfig::default())
    }

    /// Create a sweeper whose whois client follows `config`.
    pub fn with_config(config: SweepConfig) -> Self {
        let mut client = WhoisClient::with_timeout(config.whois_timeout);
        if let Some(server) = &config.whois_server {
            client = client.with_server(server.clone());
        }
        Self::with_probe(config, client)
    }
}

impl Default for Sweeper<WhoisClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Probe> Sweeper<P> {
    /// Create a sweeper around any probe.
    pub fn with_probe(config: SweepConfig, probe: P) -> Self {
        let scheduler = RetryScheduler::new(
            Classifier::new(config.phrases.clone()),
            RetryPolicy::from_config(&config),
        );
        Self {
            config,
            scheduler,
            probe,
        }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Resolve a single domain, retries included.
    ///
    /// Never fails: exhausted retries come back as `Verdict::Error`.
    pub async fn check_domain<N>(&self, domain: &str, on_backoff: N) -> DomainOutcome
    where
        N: FnMut(&Backoff),
    {
        let started = Instant::now();
        let resolution = self
            .scheduler
            .resolve(domain, || self.probe.fetch(domain), on_backoff)
            .await;
        DomainOutcome::new(domain, resolution, started.elapsed())
    }

    /// Sweep `domains` in order.
    ///
    /// With a `log`, domains it already holds are skipped (unless resume is
    /// off) and every terminal verdict is appended to it. The processed set is read once, before the
    /// first probe. Per-domain errors are recorded, never returned; only
    /// result log I/O aborts the sweep.
    pub async fn sweep<F>(
        &self,
        domains: &[String],
        log: Option<&ResultLog>,
        mut observer: F,
    ) -> Result<SweepSummary, SweepError>
    where
        F: FnMut(SweepEvent<'_>),
    {
        let processed = match log {
            Some(log) if self.config.resume => log.processed_domains()?,
            _ => HashSet::new(),
        };

        let mut seen = HashSet::new();
        let mut summary = SweepSummary::default();
        let mut pending = Vec::new();

        for domain in domains {
            if !seen.insert(domain.as_str()) {
                continue;
            }
            if processed.contains(domain) {
                tracing::info!(domain = %domain, "Already in result log, skipping");
                summary.skipped += 1;
                observer(SweepEvent::Skipped { domain });
            } else {
                pending.push(domain.as_str());
            }
        }

        let total = pending.len();
        for (index, domain) in pending.into_iter().enumerate() {
            if index > 0 && !self.config.inter_probe_delay.is_zero() {
                tokio::time::sleep(self.config.inter_probe_delay).await;
            }

            observer(SweepEvent::Probing {
                domain,
                index: index + 1,
                total,
            });

            let outcome = self
                .check_domain(domain, |backoff| {
                    observer(SweepEvent::Backoff {
                        domain,
                        backoff: *backoff,
                    })
                })
                .await;

            if let Some(log) = log {
                if let Some(record) = ResultRecord::from_verdict(domain, &outcome.verdict) {
                    log.append(&record)?;
                }
            }

            summary.record(&outcome.verdict);
            observer(SweepEvent::Resolved(&outcome));
        }

        tracing::info!(
            available = summary.available,
            taken = summary.taken,
            errors = summary.errors,
            skipped = summary.skipped,
            "Sweep finished"
        );

        Ok(summary)
    }
}
