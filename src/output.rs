//! CLI output formatting.
//!
//! Diagnostic output only — none of this is a machine-readable contract.
//! Each concern has a `format_*` function (returns strings, no I/O, unit
//! testable) and a thin `print_*` wrapper that writes to stdout.
//!
//! ```text
//! === ogstamp: starting processing ===
//! ⚠ No HTML file found for route: /missing-page
//! Error processing /flaky: image URL error: ...
//! === ogstamp: processing complete ===
//! Updated 41 pages (1 skipped, 1 unresolved, 1 failed)
//! ```
//!
//! Successful routes are silent unless debug mode is on; a clean run prints
//! only the banners and the summary.

use crate::batch::{BatchReport, RouteOutcome, RunContext};
use crate::resolve::Strategy;

fn strategy_label(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::Direct => "direct",
        Strategy::Index => "index",
    }
}

pub fn format_start_banner() -> String {
    "\n=== ogstamp: starting processing ===".to_string()
}

/// Completion marker plus a one-line summary of the batch.
pub fn format_end_banner(report: &BatchReport) -> Vec<String> {
    vec![
        "=== ogstamp: processing complete ===".to_string(),
        format!(
            "Updated {} pages ({} skipped, {} unresolved, {} failed)",
            report.updated(),
            report.skipped(),
            report.unresolved(),
            report.failed()
        ),
    ]
}

/// One route's diagnostic line, or `None` when the route should be silent.
pub fn format_route_line(path: &str, outcome: &RouteOutcome, debug: bool) -> Option<String> {
    match outcome {
        RouteOutcome::Updated {
            file, image_url, ..
        } => debug.then(|| format!("✓ {} → {}\n  OG image: {}", path, file.display(), image_url)),
        RouteOutcome::Resolved { .. } => None,
        RouteOutcome::SkippedNoPath => debug.then(|| "Skipping route without path".to_string()),
        RouteOutcome::Unresolved => Some(format!("⚠ No HTML file found for route: {path}")),
        RouteOutcome::Failed { detail } => Some(format!("Error processing {path}: {detail}")),
    }
}

/// Verbose dump of the resolved run context (debug mode only).
///
/// The context carries no credentials, so there is nothing to redact here.
pub fn format_context_dump(ctx: &RunContext) -> Vec<String> {
    let options = serde_json::to_string(&ctx.image_options)
        .unwrap_or_else(|_| "<unserializable>".to_string());
    vec![
        format!("Output dir:    {}", ctx.out_dir.display()),
        format!("Base URL:      {}", ctx.base_url),
        format!("Image options: {options}"),
        format!("Threads:       {}", ctx.threads),
    ]
}

/// Per-route lines for the `check` dry run.
pub fn format_check_report(report: &BatchReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.routes.len() + 1);
    for route in &report.routes {
        match &route.outcome {
            RouteOutcome::Resolved { file, strategy } => lines.push(format!(
                "✓ {} → {} ({})",
                route.path,
                file.display(),
                strategy_label(*strategy)
            )),
            RouteOutcome::SkippedNoPath => {
                lines.push(format!("- (no path) [{}]", route.plugin_name));
            }
            RouteOutcome::Unresolved => {
                lines.push(format!("⚠ No HTML file found for route: {}", route.path));
            }
            // resolve_only produces no other outcomes
            _ => {}
        }
    }
    lines.push(format!(
        "{} resolvable, {} unresolved, {} skipped",
        report.resolved(),
        report.unresolved(),
        report.skipped()
    ));
    lines
}

pub fn print_start_banner() {
    println!("{}", format_start_banner());
}

pub fn print_end_banner(report: &BatchReport) {
    for line in format_end_banner(report) {
        println!("{line}");
    }
}

pub fn print_route_line(path: &str, outcome: &RouteOutcome, debug: bool) {
    if let Some(line) = format_route_line(path, outcome, debug) {
        println!("{line}");
    }
}

pub fn print_context_dump(ctx: &RunContext) {
    for line in format_context_dump(ctx) {
        println!("{line}");
    }
}

pub fn print_check_report(report: &BatchReport) {
    for line in format_check_report(report) {
        println!("{line}");
    }
}
