// ABOUTME: Output formatting for pipeline progress and run reports.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::diagnostics::Warning;
use crate::pipeline::{PipelineResult, StepOutcome};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only the final verdict)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                // Print only the essential result
                println!("{message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "success",
                    message,
                    duration_secs: self.start_time.map(|_| self.elapsed_secs()),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.start_time.map(|_| self.elapsed_secs()),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }
}

impl Output {
    /// Print a non-fatal warning.
    pub fn warning(&self, warning: &Warning) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {}", warning.message),
            OutputMode::Quiet => {}
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "warning",
                    message: &warning.message,
                    duration_secs: None,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Render a finished run: the step log, warnings and the verdict.
    pub fn report(&self, result: &PipelineResult) {
        if self.mode == OutputMode::Json {
            let event = JsonReport {
                event: "result",
                duration_secs: self.start_time.map(|_| self.elapsed_secs()),
                result,
            };
            if let Ok(json) = serde_json::to_string(&event) {
                println!("{json}");
            }
            return;
        }

        for entry in result.step_log.entries() {
            let marker = match entry.outcome {
                StepOutcome::Succeeded => "✓",
                StepOutcome::Skipped(_) => "-",
                StepOutcome::Degraded(_) => "!",
                StepOutcome::Failed(_) => "✗",
            };
            self.progress(&format!("  {marker} {}: {}", entry.step, entry.outcome));
        }

        for warning in &result.warnings {
            self.warning(warning);
        }

        if let Some(rollback) = &result.rollback {
            self.progress(&format!("  → Rolled back to {}", rollback.selected));
        }

        if result.success {
            self.success(&format!(
                "{} of {} to {} finished: {}",
                result.action, result.version, result.environment, result.final_state
            ));
        } else {
            let reason = result
                .failure
                .as_ref()
                .map(|f| f.to_string())
                .unwrap_or_else(|| "unknown failure".to_string());
            self.error(&format!(
                "{} of {} to {} ended {}: {}",
                result.action, result.version, result.environment, result.final_state, reason
            ));
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(flatten)]
    result: &'a PipelineResult,
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
