use std::io;
use std::process::Command;

use tracing::debug;

use crate::applications::Application;
use crate::config::Settings;

const API_KEY_FLAG: &str = "--apikey";
const REDACTED: &str = "********";

/// A fully resolved external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    fn java(settings: &Settings) -> Self {
        let (program, launcher_args) = settings
            .java_command
            .split_first()
            .map(|(p, rest)| (p.clone(), rest.to_vec()))
            .unwrap_or_else(|| ("java".to_string(), Vec::new()));
        let mut args = launcher_args;
        args.push("-jar".to_string());
        args.push(settings.console_cli_path.to_string_lossy().into_owned());
        Self { program, args }
    }

    fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// `add` step: create the version and upload the application's source tree.
    pub fn add(settings: &Settings, app: &Application, sanitized_name: &str) -> Self {
        let source = settings.source_code_path.join(&app.name);
        Self::java(settings)
            .arg("add")
            .arg("-n")
            .arg(sanitized_name)
            .arg("--domain-name")
            .arg(app.domain.as_str())
            .arg("-f")
            .arg(source.to_string_lossy())
            .arg("-s")
            .arg(settings.console_url.as_str())
            .arg(API_KEY_FLAG)
            .arg(settings.console_api_key.as_str())
            .arg("--verbose")
            .arg("--auto-create")
            .arg("--upload-application=true")
            .arg(format!("--exclude-patterns={}", settings.exclude_patterns))
    }

    /// `Publish-Imaging` step, only run after a successful `add`.
    pub fn publish_imaging(settings: &Settings, sanitized_name: &str) -> Self {
        Self::java(settings)
            .arg("Publish-Imaging")
            .arg("-n")
            .arg(sanitized_name)
            .arg("-s")
            .arg(settings.console_url.as_str())
            .arg(API_KEY_FLAG)
            .arg(settings.console_api_key.as_str())
            .arg("--verbose")
    }

    /// Shell-quoted command line with the API key masked, for console and log output.
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(shell_quote(&self.program));
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                parts.push(REDACTED.to_string());
            } else {
                parts.push(shell_quote(arg));
            }
            mask_next = arg == API_KEY_FLAG;
        }
        parts.join(" ")
    }
}

/// Seam around process execution so the dispatcher can be driven without a JVM.
pub trait CommandRunner: Sync {
    /// Runs the invocation to completion and returns its exit code, if it had one.
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>>;
}

/// Spawns the real process and waits for it, capturing its output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!(stdout = %stdout.trim(), "cli output");
        }
        if !stderr.trim().is_empty() {
            debug!(stderr = %stderr.trim(), "cli error output");
        }

        Ok(output.status.code())
    }
}

fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    if s.bytes().all(|b| b.is_ascii_alphanumeric() || b"@%_+=:,./-".contains(&b)) {
        return s.to_string();
    }
    let escaped = s.replace('\'', "'\\''");
    format!("'{}'", escaped)
}
