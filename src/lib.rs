//! # ogstamp
//!
//! A post-build pass for static site generators: after the HTML pages are on
//! disk, point every page's Open Graph preview-image tags at a dynamically
//! generated image — idempotently, so repeated runs converge to the same
//! bytes.
//!
//! # Architecture: Per-Route Pipeline
//!
//! One pass over the generator's emitted routes, each route flowing through
//! four stages:
//!
//! ```text
//! filter    routes manifest  →  eligible routes    (recognized ∩ enabled)
//! resolve   route path       →  output HTML file   (direct file, else index)
//! fetch     page URL         →  signed image URL   (external provider)
//! rewrite   HTML + image URL →  HTML               (managed <meta> tags)
//! ```
//!
//! The batch orchestrator drives the stages with strict per-route fault
//! isolation: a bad page is reported and the batch keeps going. There are no
//! fatal conditions inside a run — N routes in, N outcomes out.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`routes`] | Routes-manifest loading and eligibility filtering |
//! | [`resolve`] | Route path → output file, direct-then-index candidates |
//! | [`provider`] | Image URL provider seam + signed-URL implementation |
//! | [`rewrite`] | Idempotent managed `<meta>` tag replacement |
//! | [`batch`] | Orchestration, per-route outcomes, batch report |
//! | [`config`] | `ogstamp.toml` loading and validation |
//! | [`output`] | CLI diagnostics — banners, warnings, summaries |
//!
//! # Design Decisions
//!
//! ## Splice Edits, Not DOM Round-Trips
//!
//! The rewriter parses HTML only to locate edits, then splices the original
//! text. Pages survive byte-for-byte outside the managed tags — no attribute
//! reordering, no entity or whitespace normalization — and idempotency falls
//! out for free: the second run removes exactly what the first run inserted.
//!
//! ## Failures Are Data
//!
//! Every route ends in an explicit [`batch::RouteOutcome`] (updated, skipped,
//! unresolved, failed) collected into a [`batch::BatchReport`]. Fault
//! isolation is a testable structure, not a side effect of swallowed errors.
//!
//! ## Locally Signed Image URLs
//!
//! The image service renders previews on demand from signed request URLs, so
//! no network traffic happens at build time: [`provider::SignedUrlProvider`]
//! canonicalizes the query and signs it with HMAC-SHA256. Anything smarter —
//! retries, caching, batching — belongs behind the [`provider::ImageUrlProvider`]
//! trait, not in the pipeline.

pub mod batch;
pub mod config;
pub mod output;
pub mod provider;
pub mod resolve;
pub mod rewrite;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_helpers;
