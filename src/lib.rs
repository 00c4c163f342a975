//! Site-level climate-hazard risk audits.
//!
//! The library gathers per-hazard risk signals from independent upstream
//! sources, normalizes them into a composite risk profile, and derives a
//! ranked, diversified list of mitigation actions for the audited site. The
//! binary in `main.rs` exposes the same pipeline over HTTP and the CLI.

pub mod config;
pub mod error;
pub mod risk;
pub mod telemetry;
