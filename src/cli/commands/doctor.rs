//! Doctor command - verify credentials and configuration.

use crate::cli::{mask_secret, Output};
use crate::config::{Prompts, Settings, YOUTUBE_ACCESS_TOKEN_ENV, YOUTUBE_API_KEY_ENV};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
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
    Output::header("Jamak Doctor");
    println!();
    println!("Checking credentials and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Credentials").bold());
    let credential_checks = vec![
        check_openai_api_key(std::env::var("OPENAI_API_KEY").ok()),
        check_youtube_api_key(settings.youtube.resolved_api_key()),
        check_youtube_access_token(settings.youtube.resolved_access_token()),
    ];
    for check in &credential_checks {
        check.print();
    }
    checks.extend(credential_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![
        check_config_file(),
        check_prompts(settings),
        check_languages(settings),
    ];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Jamak.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Jamak is ready to use.");
    }

    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key(key: Option<String>) -> CheckResult {
    match key {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => CheckResult::ok(
            "OPENAI_API_KEY",
            &format!("configured ({})", mask_secret(&key)),
        ),
        Some(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Some(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

fn check_youtube_api_key(key: Option<String>) -> CheckResult {
    match key {
        Some(key) => CheckResult::ok(
            YOUTUBE_API_KEY_ENV,
            &format!("configured ({})", mask_secret(&key)),
        ),
        None => CheckResult::error(
            YOUTUBE_API_KEY_ENV,
            "not set",
            "Create a key in the Google Cloud console and export YOUTUBE_API_KEY",
        ),
    }
}

/// Caption download needs OAuth; listing and metadata work with a key alone.
fn check_youtube_access_token(token: Option<String>) -> CheckResult {
    match token {
        Some(token) => CheckResult::ok(
            YOUTUBE_ACCESS_TOKEN_ENV,
            &format!("configured ({})", mask_secret(&token)),
        ),
        None => CheckResult::warning(
            YOUTUBE_ACCESS_TOKEN_ENV,
            "not set",
            "Caption downloads require an OAuth token with the youtube.force-ssl scope",
        ),
    }
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
            "Create with: jamak config edit",
        )
    }
}

/// Check that custom prompt templates load and carry their variables.
fn check_prompts(settings: &Settings) -> CheckResult {
    let source = settings
        .prompts
        .custom_dir
        .clone()
        .unwrap_or_else(|| "built-in".to_string());

    match Prompts::load(settings.prompts.custom_dir.as_deref(), None) {
        Ok(prompts) => match prompts.validate() {
            Ok(()) => CheckResult::ok("Prompts", &source),
            Err(e) => CheckResult::error("Prompts", &e.to_string(), "Fix the template placeholders"),
        },
        Err(e) => CheckResult::error(
            "Prompts",
            &format!("failed to load: {}", e),
            "Check refine.toml and recipe.toml in the custom prompt directory",
        ),
    }
}

fn check_languages(settings: &Settings) -> CheckResult {
    let languages = &settings.youtube.preferred_languages;
    if languages.is_empty() {
        CheckResult::warning(
            "Caption languages",
            "empty (falling back to ko, en)",
            "Set youtube.preferred_languages in the config file",
        )
    } else {
        CheckResult::ok("Caption languages", &languages.join(", "))
    }
}
