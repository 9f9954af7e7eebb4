//! Batch orchestration over eligible routes.
//!
//! Drives the full pipeline per route — resolve the output file, read it,
//! request an image URL, rewrite the metadata tags, write the file back —
//! with strict per-route fault isolation: any failure is caught at that
//! route's boundary, recorded, and never stops the rest of the batch. The
//! orchestrator itself has no fatal conditions; a run over N routes always
//! produces a report over N routes.
//!
//! Failures are explicit data, not suppressed exceptions: every route ends
//! in a [`RouteOutcome`], and the whole run returns a [`BatchReport`].
//!
//! ## Ordering
//!
//! Sequential by default: one route fully completes (or fails) before the
//! next begins. With `threads > 1` routes run through the rayon pool; the
//! report still lists routes in input order, and no two routes ever target
//! the same file (distinct route paths resolve to distinct candidates), so
//! per-file writes stay atomic from the file's perspective.

use crate::output;
use crate::provider::{ImageUrlProvider, ProviderError};
use crate::resolve::{self, ResolvedFile, Strategy};
use crate::rewrite::{self, RewriteError};
use crate::routes::TaggedRoute;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Failure inside one route's pipeline. Never crosses the route boundary —
/// it is flattened into [`RouteOutcome::Failed`].
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image URL error: {0}")]
    Provider(#[from] ProviderError),
    #[error("rewrite error: {0}")]
    Rewrite(#[from] RewriteError),
}

/// Immutable per-invocation context. Built once, never mutated during a run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Root of the generator's emitted output.
    pub out_dir: PathBuf,
    /// Site base URL; the page URL is this concatenated with the route path.
    pub base_url: String,
    /// Opaque options forwarded to the image provider.
    pub image_options: serde_json::Map<String, serde_json::Value>,
    /// Verbose diagnostics.
    pub debug: bool,
    /// Routes processed in parallel. 1 = sequential.
    pub threads: usize,
}

/// How one route ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// File rewritten with fresh metadata tags.
    Updated {
        file: PathBuf,
        strategy: Strategy,
        image_url: String,
    },
    /// Dry run: file located, nothing written.
    Resolved { file: PathBuf, strategy: Strategy },
    /// Route had no path — not an error.
    SkippedNoPath,
    /// Neither output-file candidate exists — warned, not an error.
    Unresolved,
    /// Pipeline failure (read, provider, rewrite, or write).
    Failed { detail: String },
}

/// One route's result, tagged with its identity.
#[derive(Debug, Clone)]
pub struct RouteReport {
    pub path: String,
    pub plugin_name: String,
    pub outcome: RouteOutcome,
}

/// Results for the whole batch, in input route order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub routes: Vec<RouteReport>,
}

impl BatchReport {
    fn count(&self, matches: impl Fn(&RouteOutcome) -> bool) -> usize {
        self.routes.iter().filter(|r| matches(&r.outcome)).count()
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, RouteOutcome::Updated { .. }))
    }

    pub fn resolved(&self) -> usize {
        self.count(|o| matches!(o, RouteOutcome::Resolved { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RouteOutcome::SkippedNoPath))
    }

    pub fn unresolved(&self) -> usize {
        self.count(|o| matches!(o, RouteOutcome::Unresolved))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RouteOutcome::Failed { .. }))
    }
}

/// Read → fetch image URL → rewrite → write, for one resolved file.
///
/// The provider call happens before any write, so a provider failure leaves
/// the file untouched.
fn stamp_file(
    ctx: &RunContext,
    route: &TaggedRoute,
    resolved: &ResolvedFile,
    provider: &impl ImageUrlProvider,
) -> Result<String, RouteError> {
    let html = fs::read_to_string(&resolved.file)?;
    let page_url = format!("{}{}", ctx.base_url, route.path);
    let image_url = provider.image_url(&page_url, &ctx.image_options)?;
    let updated = rewrite::rewrite_meta_tags(&html, &image_url)?;
    fs::write(&resolved.file, updated)?;
    Ok(image_url)
}

/// Run one route end to end. All errors end up inside the outcome.
fn process_route(
    ctx: &RunContext,
    route: &TaggedRoute,
    provider: &impl ImageUrlProvider,
) -> RouteOutcome {
    if route.path.is_empty() {
        return RouteOutcome::SkippedNoPath;
    }
    let Some(resolved) = resolve::resolve(&ctx.out_dir, &route.path) else {
        return RouteOutcome::Unresolved;
    };
    match stamp_file(ctx, route, &resolved, provider) {
        Ok(image_url) => RouteOutcome::Updated {
            file: resolved.file,
            strategy: resolved.strategy,
            image_url,
        },
        Err(e) => RouteOutcome::Failed {
            detail: e.to_string(),
        },
    }
}

fn report_route(
    ctx: &RunContext,
    route: &TaggedRoute,
    provider: &impl ImageUrlProvider,
) -> RouteReport {
    let outcome = process_route(ctx, route, provider);
    output::print_route_line(&route.path, &outcome, ctx.debug);
    RouteReport {
        path: route.path.clone(),
        plugin_name: route.plugin_name.clone(),
        outcome,
    }
}

/// Drive the pipeline over all eligible routes.
///
/// Never returns an error: total failure of every route still ends with a
/// normal completion marker. Exit status is the host's concern.
pub fn run(
    ctx: &RunContext,
    routes: &[TaggedRoute],
    provider: &impl ImageUrlProvider,
) -> BatchReport {
    output::print_start_banner();
    if ctx.debug {
        output::print_context_dump(ctx);
    }

    let reports: Vec<RouteReport> = if ctx.threads > 1 {
        routes
            .par_iter()
            .map(|route| report_route(ctx, route, provider))
            .collect()
    } else {
        routes
            .iter()
            .map(|route| report_route(ctx, route, provider))
            .collect()
    };

    let report = BatchReport { routes: reports };
    output::print_end_banner(&report);
    report
}

/// Dry run: filter and resolve only. No reads, no provider calls, no writes.
pub fn resolve_only(out_dir: &std::path::Path, routes: &[TaggedRoute]) -> BatchReport {
    let reports = routes
        .iter()
        .map(|route| {
            let outcome = if route.path.is_empty() {
                RouteOutcome::SkippedNoPath
            } else {
                match resolve::resolve(out_dir, &route.path) {
                    Some(resolved) => RouteOutcome::Resolved {
                        file: resolved.file,
                        strategy: resolved.strategy,
                    },
                    None => RouteOutcome::Unresolved,
                }
            };
            RouteReport {
                path: route.path.clone(),
                plugin_name: route.plugin_name.clone(),
                outcome,
            }
        })
        .collect();
    BatchReport { routes: reports }
}
