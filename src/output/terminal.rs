//! Terminal output of a provisioning run.

use crate::processing::{ProvisionOutcome, ProvisionReport};
use colored::Colorize;

/// Format a value as a quoted, right-aligned field.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// One CSV-ish line per region: region, outcome, cidr, attempts.
pub fn report_rows(report: &ProvisionReport) -> Vec<String> {
    report
        .results
        .iter()
        .map(|(region, result)| {
            let (outcome, cidr, attempts) = match result {
                Ok(ProvisionOutcome::AlreadyExists) => {
                    ("exists".to_string(), String::new(), String::new())
                }
                Ok(ProvisionOutcome::Created { cidr, attempts }) => {
                    ("created".to_string(), cidr.to_string(), attempts.to_string())
                }
                Ok(ProvisionOutcome::Abandoned { attempts }) => {
                    ("abandoned".to_string(), String::new(), attempts.to_string())
                }
                Err(e) => (format!("error: {e}"), String::new(), String::new()),
            };
            format!(
                "{region},{outcome},{cidr},{attempts}",
                region = format_field(region, 26),
                outcome = format_field(outcome, 11),
                cidr = format_field(cidr, 16),
                attempts = format_field(attempts, 4),
            )
        })
        .collect()
}

/// Print the report to stdout.
pub fn print_report(report: &ProvisionReport) {
    println!(
        r#"                  "region",  "outcome",          "cidr","try""#
    );
    for row in report_rows(report) {
        println!("{row}");
    }
    let abandoned = report.abandoned();
    if !abandoned.is_empty() {
        println!(
            "#{}# no subnet in {} region(s): {}",
            "NOTE".on_red(),
            abandoned.len(),
            abandoned.join(", ")
        );
    }
}
