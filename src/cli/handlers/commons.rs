// src/cli/handlers/commons.rs

// This module contains shared functions used by the handlers.

use colored::Colorize;
use dialoguer::{Input, Select, theme::ColorfulTheme};

use crate::core::error::DeployError;
use crate::core::sequencer::Prompter;
use crate::models::DeployReport;

/// Terminal prompter backed by `dialoguer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize, DeployError> {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .map_err(|e| DeployError::Prompt(e.to_string()))
    }

    fn input(&mut self, prompt: &str) -> Result<String, DeployError> {
        // Empty values are legitimate for .env entries.
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| DeployError::Prompt(e.to_string()))
    }
}

/// Prints the final step table and, when present, the AI summary.
pub fn print_report(report: &DeployReport) {
    println!("\n{}", "--- Deployment report ---".bold());
    println!("Project: {}", report.project.cyan());
    if let Some(framework) = &report.framework {
        println!("Framework: {}", framework);
    }

    let width = report
        .steps
        .iter()
        .map(|step| step.label.chars().count())
        .max()
        .unwrap_or(0);
    for step in &report.steps {
        let status = if step.succeeded() {
            "ok".green()
        } else {
            format!("exit {}", step.exit_status).red()
        };
        println!("  {:<width$}  {}", step.label, status, width = width);
    }

    if let Some(summary) = &report.summary {
        println!("\n{}\n{}", "AI summary:".bold(), summary.trim());
    }
}
