//! Whois Sweep CLI Application
//!
//! Pairs one keyword with a list of TLDs and classifies each domain through
//! the system `whois` command, appending results to a resumable log.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use whois_sweep_lib::{
    expand_keyword, get_available_presets, get_preset_tlds, get_preset_tlds_with_custom,
    is_whois_available, load_env_config, parse_duration_string, read_tld_file, validate_keyword,
    ConfigManager, DomainOutcome, EnvConfig, FileConfig, ResultLog, SweepConfig, SweepEvent,
    Sweeper, Verdict,
};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Preset used when no TLD source is configured anywhere
const FALLBACK_PRESET: &str = "popular";

/// CLI arguments for whois-sweep
#[derive(Parser, Debug)]
#[command(name = "whois-sweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sweep one keyword across many TLDs using WHOIS")]
#[command(
    long_about = "Sweep one keyword across many TLDs using the system whois command.\n\nResponses are classified as available, taken (with expiry date when shown) or error. Rate-limited and empty answers are retried with exponential backoff. Results are appended to a log so an interrupted sweep resumes where it stopped."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Keyword to pair with every TLD (e.g. "acme")
    #[arg(
        value_name = "KEYWORD",
        required_unless_present = "list_presets",
        help_heading = "Domain Selection"
    )]
    pub keyword: Option<String>,

    /// TLDs to sweep (comma-separated or multiple -t flags)
    #[arg(short = 't', long = "tld", value_name = "TLD", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Domain Selection")]
    pub tlds: Option<Vec<String>>,

    /// Use a predefined TLD preset (use --list-presets to see all)
    #[arg(long = "preset", value_name = "NAME", help_heading = "Domain Selection")]
    pub preset: Option<String>,

    /// Read TLDs from a file (one per line, # comments)
    #[arg(
        short = 'f',
        long = "tld-file",
        value_name = "FILE",
        help_heading = "Domain Selection"
    )]
    pub tld_file: Option<String>,

    /// List all available TLD presets and exit
    #[arg(long = "list-presets", help_heading = "Domain Selection")]
    pub list_presets: bool,

    /// Result log to append to (default: whois-sweep-<KEYWORD>.txt)
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output"
    )]
    pub output: Option<String>,

    /// Probe every domain even if the result log already has it
    #[arg(long = "no-resume", help_heading = "Output")]
    pub no_resume: bool,

    /// Only print available domains
    #[arg(short = 'a', long = "only-available", help_heading = "Output")]
    pub only_available: bool,

    /// Print results as JSON
    #[arg(short = 'j', long = "json", help_heading = "Output")]
    pub json: bool,

    /// Print the domains that would be probed and exit
    #[arg(long = "dry-run", help_heading = "Output")]
    pub dry_run: bool,

    /// Probes per domain before giving up (1-10, default: 3)
    #[arg(long = "attempts", value_name = "N", help_heading = "Retry")]
    pub attempts: Option<u32>,

    /// Backoff time unit; attempt n waits 2^n units (default: 1s)
    #[arg(long = "backoff-unit", value_name = "DURATION", help_heading = "Retry")]
    pub backoff_unit: Option<String>,

    /// Pause between probed domains (default: 2s)
    #[arg(long = "delay", value_name = "DURATION", help_heading = "Retry")]
    pub delay: Option<String>,

    /// Timeout for one whois invocation (default: 10s)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Retry")]
    pub timeout: Option<String>,

    /// Query this whois server instead of following referrals
    #[arg(long = "server", value_name = "HOST", help_heading = "Retry")]
    pub server: Option<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show debug logging
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Everything a run needs after merging CLI, environment and config files.
#[derive(Debug)]
struct Settings {
    config: SweepConfig,
    tlds: Vec<String>,
    tld_source: String,
    output: PathBuf,
    only_available: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if args.list_presets {
        print_presets(&args);
        return;
    }

    tracing::debug!("whois-sweep v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_sweep(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr tracing subscriber; `RUST_LOG` wins over the flags.
fn init_logging(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("whois_sweep={0},whois_sweep_lib={0}", level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(args.debug)
        .init();
}

fn validate_args(args: &Args) -> Result<(), String> {
    // --list-presets is self-contained, skip other validation
    if args.list_presets {
        return Ok(());
    }

    if args.keyword.is_none() {
        return Err("You must specify a keyword".to_string());
    }

    let tld_sources = [
        args.tlds.is_some(),
        args.preset.is_some(),
        args.tld_file.is_some(),
    ]
    .iter()
    .filter(|&&x| x)
    .count();

    if tld_sources > 1 {
        return Err(
            "Cannot specify multiple TLD sources. Use only one of: -t/--tld, --preset, or -f/--tld-file"
                .to_string(),
        );
    }

    if let Some(attempts) = args.attempts {
        if !(1..=10).contains(&attempts) {
            return Err("--attempts must be between 1 and 10".to_string());
        }
    }

    for (flag, value) in [
        ("--backoff-unit", &args.backoff_unit),
        ("--delay", &args.delay),
        ("--timeout", &args.timeout),
    ] {
        if let Some(value) = value {
            if parse_duration_string(value).is_none() {
                return Err(format!(
                    "Invalid {} '{}'. Use format like '500ms', '5s', '2m'",
                    flag, value
                ));
            }
        }
    }

    Ok(())
}

/// Print all available TLD presets with their TLDs, then exit.
fn print_presets(args: &Args) {
    use console::Style;

    let heading = Style::new().yellow().bold();
    let name_style = Style::new().green().bold();
    let count_style = Style::new().cyan();

    let print_row = |name: &str, tlds: &[String]| {
        println!(
            "  {} {}  {}",
            name_style.apply_to(format!("{:<12}", name)),
            count_style.apply_to(format!("({})", tlds.len())),
            tlds.join(", "),
        );
    };

    println!();
    println!("{}", heading.apply_to("Available TLD Presets:"));
    println!();

    for preset_name in get_available_presets() {
        if let Some(tlds) = get_preset_tlds(preset_name) {
            print_row(preset_name, &tlds);
        }
    }

    if let Ok(file_config) = load_file_config(args, &load_env_config(false)) {
        if let Some(custom) = file_config.custom_presets.filter(|c| !c.is_empty()) {
            println!();
            println!("{}", heading.apply_to("Custom Presets:"));
            println!();
            let mut names: Vec<_> = custom.keys().collect();
            names.sort();
            for name in names {
                print_row(name, &custom[name]);
            }
        }
    }

    println!();
    println!("Use: whois-sweep <keyword> --preset <preset>");
}

/// Main sweep logic
async fn run_sweep(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let keyword = validate_keyword(args.keyword.as_deref().unwrap_or_default())?;
    let settings = build_settings(&args, &keyword)?;

    let domains = expand_keyword(&keyword, &settings.tlds);
    if domains.is_empty() {
        return Err("No valid domains to sweep".into());
    }

    if args.dry_run {
        return display_dry_run(&domains, args.json);
    }

    let log = ResultLog::open(&settings.output)?;

    let pending = if settings.config.resume {
        let processed = log.processed_domains()?;
        domains.iter().filter(|d| !processed.contains(*d)).count()
    } else {
        domains.len()
    };
    if pending > 0 && !is_whois_available().await {
        return Err("The 'whois' command is not available. Install it and try again.".into());
    }

    if !args.json {
        ui::print_header(
            &keyword,
            domains.len(),
            &settings.tld_source,
            &settings.output,
        );
    }

    let sweeper = Sweeper::with_config(settings.config);
    let started = Instant::now();
    let mut outcomes: Vec<DomainOutcome> = Vec::new();

    let summary = sweeper
        .sweep(&domains, Some(&log), |event| match event {
            SweepEvent::Skipped { domain } => {
                if !args.json && !settings.only_available {
                    ui::print_skipped(domain);
                }
            }
            SweepEvent::Probing { .. } => {}
            SweepEvent::Backoff { domain, backoff } => {
                if !args.json {
                    ui::print_backoff(domain, &backoff);
                }
            }
            SweepEvent::Resolved(outcome) => {
                if args.json {
                    outcomes.push(outcome.clone());
                } else {
                    ui::print_outcome(outcome, settings.only_available);
                }
            }
        })
        .await?;

    if args.json {
        if settings.only_available {
            outcomes.retain(|o| o.verdict == Verdict::Available);
        }
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        ui::print_summary(&summary, started.elapsed(), &settings.output);
    }

    Ok(())
}

/// Print the candidate list without probing anything.
fn display_dry_run(domains: &[String], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(domains)?);
    } else {
        for domain in domains {
            println!("{}", domain);
        }
        eprintln!("{} domain(s) would be probed", domains.len());
    }
    Ok(())
}

/// Merge config file, environment and CLI flags, in increasing precedence.
fn build_settings(args: &Args, keyword: &str) -> Result<Settings, Box<dyn std::error::Error>> {
    let env_config = load_env_config(args.verbose);
    let file_config = load_file_config(args, &env_config)?;

    // Step 1: built-in defaults, then config file, then environment
    let config = file_config.apply_to(SweepConfig::default());
    let config = env_config.apply_to(config);

    // Step 2: CLI arguments (highest precedence)
    let config = apply_cli_args_to_config(config, args)?;

    let (tlds, tld_source) = resolve_tlds(args, &env_config, &file_config, &config)?;
    let file_defaults = file_config.defaults.unwrap_or_default();

    let output = args
        .output
        .clone()
        .or_else(|| env_config.output.clone())
        .or(file_defaults.output)
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(keyword));

    let only_available = args.only_available
        || env_config
            .only_available
            .or(file_defaults.only_available)
            .unwrap_or(false);

    Ok(Settings {
        config,
        tlds,
        tld_source,
        output,
        only_available,
    })
}

/// Load the config file chosen by `--config`, `WS_CONFIG`, or discovery.
fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);

    if let Some(explicit_config_path) = &args.config {
        tracing::info!("Using config file (--config): {}", explicit_config_path);
        let file_config = config_manager
            .load_file(explicit_config_path)
            .map_err(|e| {
                format!(
                    "Failed to load config file '{}': {}",
                    explicit_config_path, e
                )
            })?;
        return Ok(file_config);
    }

    if let Some(env_config_path) = &env_config.config {
        tracing::info!("Using config file (WS_CONFIG): {}", env_config_path);
        let file_config = config_manager
            .load_file(env_config_path)
            .map_err(|e| format!("Failed to load config file '{}': {}", env_config_path, e))?;
        return Ok(file_config);
    }

    Ok(config_manager.discover_and_load()?)
}

/// Apply CLI arguments to config (highest precedence).
fn apply_cli_args_to_config(
    mut config: SweepConfig,
    args: &Args,
) -> Result<SweepConfig, Box<dyn std::error::Error>> {
    if let Some(attempts) = args.attempts {
        config = config.with_max_attempts(attempts);
    }
    if let Some(unit) = &args.backoff_unit {
        config = config.with_backoff_unit(cli_duration("--backoff-unit", unit)?);
    }
    if let Some(delay) = &args.delay {
        config = config.with_inter_probe_delay(cli_duration("--delay", delay)?);
    }
    if let Some(timeout) = &args.timeout {
        config = config.with_whois_timeout(cli_duration("--timeout", timeout)?);
    }
    if let Some(server) = &args.server {
        config = config.with_whois_server(server.clone());
    }
    if args.no_resume {
        config = config.with_resume(false);
    }
    Ok(config)
}

fn cli_duration(flag: &str, value: &str) -> Result<std::time::Duration, String> {
    parse_duration_string(value).ok_or_else(|| format!("Invalid {} '{}'", flag, value))
}

/// Pick the TLD list: CLI > environment > config file > fallback preset.
///
/// Returns the list and a short description of where it came from.
fn resolve_tlds(
    args: &Args,
    env_config: &EnvConfig,
    file_config: &FileConfig,
    config: &SweepConfig,
) -> Result<(Vec<String>, String), Box<dyn std::error::Error>> {
    let custom = Some(&config.custom_presets);
    let preset = |name: &str| -> Result<(Vec<String>, String), Box<dyn std::error::Error>> {
        let tlds = get_preset_tlds_with_custom(name, custom).ok_or_else(|| {
            format!(
                "Unknown preset '{}'. Available presets: {}",
                name,
                get_available_presets().join(", ")
            )
        })?;
        Ok((tlds, format!("preset {}", name)))
    };

    if let Some(tlds) = &args.tlds {
        return Ok((tlds.clone(), "--tld".to_string()));
    }
    if let Some(name) = &args.preset {
        return preset(name);
    }
    if let Some(path) = &args.tld_file {
        return Ok((read_tld_file(path)?, format!("file {}", path)));
    }

    if let Some(tlds) = &env_config.tlds {
        return Ok((tlds.clone(), "WS_TLD".to_string()));
    }
    if let Some(name) = env_config.get_effective_preset() {
        return preset(&name);
    }

    if let Some(defaults) = &file_config.defaults {
        if let Some(tlds) = &defaults.tlds {
            return Ok((tlds.clone(), "config tlds".to_string()));
        }
        if let Some(name) = &defaults.preset {
            return preset(name);
        }
    }

    preset(FALLBACK_PRESET)
}

fn default_output_path(keyword: &str) -> PathBuf {
    PathBuf::from(format!("whois-sweep-{}.txt", keyword))
}
