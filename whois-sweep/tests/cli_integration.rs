// whois-sweep/tests/cli_integration.rs

//! CLI tests that never reach a whois server.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from the caller's config files and WS_* variables.
fn sweep_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("whois-sweep").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG");
    for var in [
        "WS_MAX_ATTEMPTS",
        "WS_BACKOFF_UNIT",
        "WS_DELAY",
        "WS_TIMEOUT",
        "WS_SERVER",
        "WS_PRESET",
        "WS_TLD",
        "WS_OUTPUT",
        "WS_ONLY_AVAILABLE",
        "WS_CONFIG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Put a BSD-style `whois` first on PATH: `--version` exits 64, every
/// lookup prints `reply`.
#[cfg(unix)]
fn with_fake_whois(cmd: &mut Command, home: &TempDir, reply: &str) {
    use std::os::unix::fs::PermissionsExt;

    let bin = home.path().join("bin");
    fs::create_dir_all(&bin).unwrap();
    let script = bin.join("whois");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\n[ \"$1\" = \"--version\" ] && exit 64\nprintf '%s\\n' '{}'\nexit 1\n",
            reply
        ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let path = std::env::var_os("PATH").unwrap_or_default();
    let mut dirs = vec![bin];
    dirs.extend(std::env::split_paths(&path));
    cmd.env("PATH", std::env::join_paths(dirs).unwrap());
}

#[test]
fn test_help_shows_flags() {
    let home = TempDir::new().unwrap();
    let mut cmd = sweep_cmd(&home);
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--tld"))
        .stdout(predicate::str::contains("--preset"))
        .stdout(predicate::str::contains("--no-resume"))
        .stdout(predicate::str::contains("--backoff-unit"));
}

#[test]
fn test_list_presets() {
    let home = TempDir::new().unwrap();
    let mut cmd = sweep_cmd(&home);
    cmd.arg("--list-presets");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("popular"))
        .stdout(predicate::str::contains("startup"))
        .stdout(predicate::str::contains("(8)"));
}

#[test]
fn test_list_presets_includes_custom_from_config() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("whois-sweep.toml"),
        "[custom_presets]\nmine = [\"com\", \"lol\"]\n",
    )
    .unwrap();

    let mut cmd = sweep_cmd(&home);
    cmd.arg("--list-presets");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Custom Presets"))
        .stdout(predicate::str::contains("com, lol"));
}

#[test]
fn test_missing_keyword_fails() {
    let home = TempDir::new().unwrap();
    let mut cmd = sweep_cmd(&home);

    cmd.assert().failure();
}

#[test]
fn test_conflicting_tld_sources() {
    let home = TempDir::new().unwrap();
    let mut cmd = sweep_cmd(&home);
    cmd.args(["acme", "-t", "com", "--preset", "startup", "--dry-run"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("multiple TLD sources"));
}

#[test]
fn test_invalid_keyword() {
    let home = TempDir::new().unwrap();
    let mut cmd = sweep_cmd(&home);
    cmd.args(["acme.com", "-t", "com", "--dry-run"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("TLDs are added separately"));
}

#[test]
fn test_attempts_out_of_range() {
    let home = TempDir::new().unwrap();
    let mut cmd = sweep_cmd(&home);
    cmd.args(["acme", "-t", "com", "--attempts", "11", "--dry-run"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--attempts"));
}

#[test]
fn test_unknown_preset() {
    let home = TempDir::new().unwrap();
    let mut cmd = sweep_cmd(&home);
    cmd.args(["acme", "--preset", "nope", "--dry-run"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown preset 'nope'"));
}

#[test]
fn test_dry_run_lists_domains() {
    let home = TempDir::new().unwrap();
    let mut cmd = sweep_cmd(&home);
    cmd.args(["Acme", "-t", "com,.io", "-t", "COM", "--dry-run"]);

    cmd.assert()
        .success()
        .stdout("acme.com\nacme.io\n");
}

#[test]
fn test_dry_run_json() {
    let home = TempDir::new().unwrap();
    let mut cmd = sweep_cmd(&home);
    cmd.args(["acme", "--preset", "classic", "--dry-run", "--json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"acme.com\""))
        .stdout(predicate::str::contains("\"acme.biz\""));
}

#[test]
fn test_dry_run_uses_tld_file() {
    let home = TempDir::new().unwrap();
    let tld_file = home.path().join("tlds.txt");
    fs::write(&tld_file, "# mine\nxyz\ndev\n").unwrap();

    let mut cmd = sweep_cmd(&home);
    cmd.args(["acme", "-f", tld_file.to_str().unwrap(), "--dry-run"]);

    cmd.assert().success().stdout("acme.xyz\nacme.dev\n");
}

#[test]
fn test_dry_run_uses_env_tlds() {
    let home = TempDir::new().unwrap();
    let mut cmd = sweep_cmd(&home);
    cmd.env("WS_TLD", "net,org").args(["acme", "--dry-run"]);

    cmd.assert().success().stdout("acme.net\nacme.org\n");
}

#[test]
fn test_dry_run_uses_config_default_tlds() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join(".whois-sweep.toml"),
        "[defaults]\ntlds = [\"me\", \"co\"]\n",
    )
    .unwrap();

    let mut cmd = sweep_cmd(&home);
    cmd.args(["acme", "--dry-run"]);

    cmd.assert().success().stdout("acme.me\nacme.co\n");
}

#[test]
fn test_invalid_explicit_config_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.toml");
    fs::write(&config, "[defaults]\nmax_attempts = 0\n").unwrap();

    let mut cmd = sweep_cmd(&home);
    cmd.args(["acme", "-t", "com", "--dry-run", "--config"])
        .arg(&config);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_resume_skips_logged_domains() {
    let home = TempDir::new().unwrap();
    let log = home.path().join("acme.txt");
    let content = "acme.com|taken|2026-03-15\nacme.io|avail|\n";
    fs::write(&log, content).unwrap();

    let mut cmd = sweep_cmd(&home);
    cmd.args(["acme", "-t", "com,io", "--delay", "0", "-o"])
        .arg(&log);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[skip] acme.com"))
        .stdout(predicate::str::contains("[skip] acme.io"))
        .stdout(predicate::str::contains("2 skipped"));

    // Nothing probed, nothing appended
    assert_eq!(fs::read_to_string(&log).unwrap(), content);
}

#[test]
fn test_resume_with_json_prints_empty_list() {
    let home = TempDir::new().unwrap();
    let log = home.path().join("acme.txt");
    fs::write(&log, "acme.dev|error|retries-exceeded\n").unwrap();

    let mut cmd = sweep_cmd(&home);
    cmd.env("WS_OUTPUT", &log)
        .args(["acme", "-t", "dev", "--json"]);

    cmd.assert().success().stdout("[]\n");
}

#[cfg(unix)]
#[test]
fn test_sweep_runs_with_whois_lacking_version_flag() {
    let home = TempDir::new().unwrap();
    let log = home.path().join("acme.txt");
    fs::write(&log, "acme.net|registered|\n").unwrap();

    let mut cmd = sweep_cmd(&home);
    with_fake_whois(&mut cmd, &home, "No match for domain");
    cmd.args(["acme", "-t", "com,net", "--delay", "0", "-o"])
        .arg(&log);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[avail] acme.com"))
        .stdout(predicate::str::contains("[skip] acme.net"))
        .stdout(predicate::str::contains("1 skipped"));

    assert_eq!(
        fs::read_to_string(&log).unwrap(),
        "acme.net|registered|\nacme.com|avail|\n"
    );
}

#[cfg(unix)]
#[test]
fn test_exhausted_retries_stay_out_of_default_logging() {
    let home = TempDir::new().unwrap();
    let log = home.path().join("acme.txt");

    let mut cmd = sweep_cmd(&home);
    with_fake_whois(&mut cmd, &home, "");
    cmd.args(["acme", "-t", "ai", "--attempts", "1", "--delay", "0", "-o"])
        .arg(&log);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[error] acme.ai (retries-exceeded)"))
        .stderr(predicate::str::contains("Giving up").not());

    assert_eq!(
        fs::read_to_string(&log).unwrap(),
        "acme.ai|error|retries-exceeded\n"
    );
}
