//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    message: String,
    hint: Option<String>,
}

#[derive(Debug, PartialEq)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Sporre Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    let tool_check = check_ytdlp();
    tool_check.print();
    checks.push(tool_check);

    println!();

    println!("{}", style("API Configuration").bold());
    let key_checks = vec![
        check_api_key("OPENAI_API_KEY", "embeddings and answer generation"),
        check_api_key("YOUTUBE_API_KEY", "video metadata enrichment"),
        check_api_key("COHERE_API_KEY", "context reranking"),
    ];
    for check in &key_checks {
        check.print();
    }
    checks.extend(key_checks);

    println!();

    println!("{}", style("Directories").bold());
    let dir_checks = check_directories(settings);
    for check in &dir_checks {
        check.print();
    }
    checks.extend(dir_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Sporre.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Sporre is ready to use.");
    }

    Ok(())
}

/// Check that yt-dlp is installed and runs.
fn check_ytdlp() -> CheckResult {
    let hint = if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    };

    match Command::new("yt-dlp").arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();
            CheckResult::ok("yt-dlp", &version)
        }
        Ok(_) => CheckResult::error("yt-dlp", "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error("yt-dlp", "not found", hint)
        }
        Err(e) => CheckResult::error("yt-dlp", &format!("error: {}", e), hint),
    }
}

/// Check that an API key environment variable is set and non-empty.
fn check_api_key(var: &str, used_for: &str) -> CheckResult {
    match std::env::var(var) {
        Ok(key) if !key.is_empty() => {
            let masked = if key.len() > 8 {
                format!("{}...{}", &key[..4], &key[key.len() - 4..])
            } else {
                "configured".to_string()
            };
            CheckResult::ok(var, &format!("configured ({})", masked))
        }
        _ => CheckResult::warning(
            var,
            "not set",
            &format!("Needed for {}. Set with: export {}='...'", used_for, var),
        ),
    }
}

/// Check data directories and databases.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok(
            "Data directory",
            &format!("{}", data_dir.display()),
        ));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    for (name, path) in [
        ("Embedding index", settings.index_path()),
        ("Ingestion records", settings.records_path()),
    ] {
        if path.exists() {
            results.push(CheckResult::ok(name, &format!("{}", path.display())));
        } else {
            results.push(CheckResult::warning(
                name,
                &format!("{} (not created yet)", path.display()),
                "Database will be created on first ingest",
            ));
        }
    }

    results
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: sporre config show > config.toml",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok_has_no_hint() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error_keeps_hint() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }
}
