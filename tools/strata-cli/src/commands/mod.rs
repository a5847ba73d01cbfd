//! CLI command implementations.

pub mod build;
pub mod routes;

use std::path::PathBuf;

use clap::Args;
use strata_core::SiteConfig;

use crate::context::Context;
use crate::manifest::BUILD_PLAN_FILE;

/// Arguments for the build command.
#[derive(Args)]
pub struct BuildArgs {
    /// Build plan (default: <entry dir>/build-plan.json).
    #[arg(short, long)]
    pub plan: Option<String>,

    /// Output directory override.
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Maximum renders in flight per page.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Site URL override (origin plus base path).
    #[arg(long)]
    pub site: Option<String>,
}

/// Arguments for the routes command.
#[derive(Args)]
pub struct RoutesArgs {
    /// Build plan (default: <entry dir>/build-plan.json).
    #[arg(short, long)]
    pub plan: Option<String>,
}

/// Locate the build plan.
pub fn plan_path(plan: Option<&str>, ctx: &Context, config: &SiteConfig) -> PathBuf {
    match plan {
        Some(path) => ctx.resolve_path(path),
        None => config.entry_dir().join(BUILD_PLAN_FILE),
    }
}
