// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::assembly::BuildReport;
use crate::spec::BridgeSpec;
use colored::*;
use std::collections::BTreeMap;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a loaded, validated bridge description
    pub fn report_check(file: &str, spec: &BridgeSpec) {
        Self::rule();
        println!("{} {}", "Checked:".bold(), file.cyan());
        Self::rule();
        println!("  {} {}", "Bridge:".bright_black(), spec.name.cyan());
        let counts = [
            ("Alignment lines", spec.lines.len()),
            ("Main panels", spec.main_panels.len()),
            ("Decks", spec.decks.len()),
            ("Sub-panels", spec.sub_panels.len()),
            ("Cross-beams", spec.cross_beams.len()),
            ("Diagonal bracings", spec.diagonal_bracings.len()),
            ("Lateral bracings", spec.lateral_bracings.len()),
            ("Gussets", spec.gussets.len()),
        ];
        for (label, count) in counts {
            if count > 0 {
                println!("  {} {}", format!("{label}:").bright_black(), count.to_string().cyan());
            }
        }
        println!("{} {}", "✅".green(), "Description is valid".green().bold());
        Self::rule();
    }

    /// Report a finished build
    pub fn report_build(file: &str, report: &BuildReport, duration: Duration) {
        Self::rule();
        println!("{} {}", "Built:".bold(), file.cyan());
        Self::rule();

        let mut by_class: BTreeMap<String, usize> = BTreeMap::new();
        for element in &report.built {
            *by_class.entry(element.class.to_string()).or_default() += 1;
        }
        for (class, count) in &by_class {
            println!(
                "  {} {}",
                format!("{class}s:").bright_black(),
                count.to_string().cyan()
            );
        }
        println!(
            "  {} {}",
            "Steel volume:".bright_black(),
            format!("{:.4} m³", report.total_volume() * 1e-9).cyan()
        );
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );

        if report.is_complete() {
            println!(
                "\n{} {}",
                "✅".green(),
                format!("{} elements built", report.built.len()).green().bold()
            );
        } else {
            println!(
                "\n{} {}",
                "❌".red(),
                format!("{} members failed", report.failures.len()).red().bold()
            );
            for failure in &report.failures {
                println!(
                    "  {} {} {}",
                    failure.kind.to_string().bright_black(),
                    failure.member.yellow(),
                    failure.error
                );
            }
        }
        Self::rule();
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ".bright_blue(), message);
    }

    fn rule() {
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let millis = duration.as_millis();
        if millis < 1000 {
            format!("{millis}ms")
        } else {
            format!("{:.2}s", duration.as_secs_f64())
        }
    }
}
