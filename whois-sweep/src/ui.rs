//! Terminal display logic for the whois-sweep CLI.
//!
//! Result lines go to stdout, progress chatter (backoff notices) to stderr.
//! Uses only the `console` crate, which drops colors when not on a TTY.

use console::style;
use std::path::Path;
use std::time::Duration;
use whois_sweep_lib::{Backoff, DomainOutcome, SweepSummary, Verdict};

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a sweep.
pub fn print_header(keyword: &str, domain_count: usize, tld_source: &str, output: &Path) {
    println!(
        "{} {} {}",
        style("whois-sweep").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- Sweeping '{}' across {} domain{}",
            keyword,
            domain_count,
            plural(domain_count)
        ))
        .dim(),
    );
    println!(
        "{}",
        style(format!("TLDs: {} | Log: {}", tld_source, output.display())).dim()
    );
    println!();
}

// ── Result lines ─────────────────────────────────────────────────────────────

/// Plain text for one resolved domain, or `None` when it should not be shown.
///
/// `[avail] d`, `[taken] d - Exp Date: X`, `[error] d (tag)`. With
/// `only_available`, everything but available domains is hidden.
pub fn format_outcome(outcome: &DomainOutcome, only_available: bool) -> Option<String> {
    match &outcome.verdict {
        Verdict::Available => Some(format!("[avail] {}", outcome.domain)),
        _ if only_available => None,
        Verdict::Taken { expiry: Some(date) } => {
            Some(format!("[taken] {} - Exp Date: {}", outcome.domain, date))
        }
        Verdict::Taken { expiry: None } => Some(format!("[taken] {}", outcome.domain)),
        Verdict::Error { reason } => Some(format!("[error] {} ({})", outcome.domain, reason)),
        // Transient verdicts never leave the scheduler
        Verdict::RateLimited | Verdict::Empty => None,
    }
}

/// Print one resolved domain with verdict coloring.
pub fn print_outcome(outcome: &DomainOutcome, only_available: bool) {
    let Some(line) = format_outcome(outcome, only_available) else {
        return;
    };

    match outcome.verdict {
        Verdict::Available => println!("{}", style(line).green().bold()),
        Verdict::Taken { .. } => println!("{}", style(line).red()),
        _ => println!("{}", style(line).yellow()),
    }
}

/// Note a domain that the result log already holds.
pub fn print_skipped(domain: &str) {
    println!("{}", style(format!("[skip] {} (already logged)", domain)).dim());
}

/// Announce a backoff sleep on stderr.
pub fn print_backoff(domain: &str, backoff: &Backoff) {
    eprintln!(
        "{}",
        style(format!(
            "  {}: {}, retry {}/{} in {}",
            domain,
            backoff.cause,
            backoff.attempt + 1,
            backoff.max_attempts,
            format_duration(backoff.delay)
        ))
        .dim()
    );
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(summary: &SweepSummary, duration: Duration, output: &Path) {
    let probed = summary.probed();
    println!();
    println!(
        "{}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "{} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}  {}  {}",
        style(probed).bold(),
        plural(probed),
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", summary.available)).green(),
        style("|").dim(),
        style(format!("{} taken", summary.taken)).red(),
        style("|").dim(),
        style(format!("{} errors", summary.errors)).yellow(),
        style("|").dim(),
        style(format!("{} skipped", summary.skipped)).dim(),
    );
    println!("{}", style(format!("Results appended to {}", output.display())).dim());
}

fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
