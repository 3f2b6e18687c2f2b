//! Rule engine backed by an ESLint-compatible executable.

use super::{RuleConfig, RuleEngine, RuleViolation};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Deserialize)]
struct FileReport {
    #[serde(default)]
    messages: Vec<ReportMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportMessage {
    rule_id: Option<String>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    line: usize,
    /// 1-based in the report
    #[serde(default)]
    column: usize,
    #[serde(default)]
    fix: Option<serde_json::Value>,
}

/// Parse the engine's `--format json` output.
///
/// Messages without a rule id are the engine's own parse errors and are
/// dropped; the native front end reports those.
pub(crate) fn parse_report(stdout: &str) -> Result<Vec<RuleViolation>> {
    let reports: Vec<FileReport> = serde_json::from_str(stdout)?;
    Ok(reports
        .into_iter()
        .flat_map(|report| report.messages)
        .filter_map(|message| {
            Some(RuleViolation {
                rule_id: message.rule_id?,
                message: message.message,
                line: message.line.max(1),
                column: message.column.saturating_sub(1),
                fixable: message.fix.is_some(),
            })
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct ProcessRuleEngine {
    executable: PathBuf,
    config_dir: PathBuf,
}

impl ProcessRuleEngine {
    pub fn new(executable: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            config_dir: config_dir.into(),
        }
    }

    /// Resolve `command` on `PATH`.
    pub fn locate(command: &str, config_dir: &Path) -> Result<Self> {
        let executable = which::which(command)
            .map_err(|e| Error::rule_engine(format!("{} not found in PATH: {}", command, e)))?;
        tracing::debug!("Using rule engine at {}", executable.display());
        Ok(Self::new(executable, config_dir))
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn config_path(&self, config: RuleConfig) -> PathBuf {
        self.config_dir.join(config.config_file())
    }
}

impl RuleEngine for ProcessRuleEngine {
    fn lint(&self, code: &str, config: RuleConfig) -> Result<Vec<RuleViolation>> {
        let config_path = self.config_path(config);
        let mut child = Command::new(&self.executable)
            .arg("--stdin")
            .arg("--stdin-filename")
            .arg(config.stdin_filename())
            .args(["--format", "json", "--config"])
            .arg(&config_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::file_system("Failed to start rule engine", &self.executable, e))?;

        // stdin drops at the end of the match so the child sees EOF
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(code.as_bytes()),
            None => Ok(()),
        };
        // Reap the child even when it stopped reading early
        let output = child.wait_with_output()?;
        if let Err(e) = written {
            return Err(Error::rule_engine(format!(
                "{} stopped reading input ({}), exited with {}: {}",
                self.executable.display(),
                e,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // 1 means violations were found
        match output.status.code() {
            Some(0) | Some(1) => {}
            _ => {
                return Err(Error::rule_engine(format!(
                    "{} exited with {}: {}",
                    self.executable.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )))
            }
        }

        parse_report(&String::from_utf8_lossy(&output.stdout))
    }
}
