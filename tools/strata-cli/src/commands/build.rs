//! Generate every page of a build.

use std::time::Instant;

use anyhow::{bail, Context as _, Result};
use strata_build::{generate_pages, GenerationReport, RendererRegistry, StaticBuildOptions, DEFAULT_ORIGIN};
use url::Url;

use super::{plan_path, BuildArgs};
use crate::context::Context;
use crate::manifest::{BuildPlan, FileEntryLoader};
use crate::output::{format_bytes, format_elapsed};

/// Run the build command.
pub async fn run(args: BuildArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(ref out_dir) = args.out_dir {
        config.out_dir = ctx.resolve_path(out_dir);
    }
    if let Some(concurrency) = args.concurrency {
        config.build.max_concurrent_renders = concurrency;
    }
    if let Some(site) = args.site {
        config.site = Some(site);
    }

    ctx.output.header("Generating static pages");

    let plan_path = plan_path(args.plan.as_deref(), ctx, &config);
    ctx.output.step(1, 3, "Loading build plan");
    ctx.output.debug(&format!("Root: {}", ctx.root.display()));
    ctx.output.debug(&format!("Plan: {}", plan_path.display()));
    let plan = BuildPlan::load(&plan_path)?;
    ctx.output.kv("Pages", &plan.internals.pages.len().to_string());
    ctx.output.kv("Paths", &plan.path_count().to_string());

    let origin = site_origin(config.site.as_deref());
    let loader = FileEntryLoader::new(config.renderers.clone(), RendererRegistry::new());
    let opts = StaticBuildOptions::new(config)
        .with_origin(origin)
        .with_route_cache(plan.route_cache());

    ctx.output.step(2, 3, "Rendering pages");
    ctx.output.debug(&format!(
        "Concurrency: {}",
        opts.config.build.concurrency()
    ));
    let spinner = ctx
        .output
        .spinner(&format!("Rendering {} paths...", plan.path_count()));
    let started = Instant::now();
    let result = generate_pages(&opts, &plan.internals, &loader).await;
    spinner.finish_and_clear();
    let report = result.context("Failed to load the server entry")?;

    ctx.output.step(3, 3, "Summary");
    summarize(&report, ctx, started);

    if report.has_failures() {
        bail!("{} of {} paths failed", report.failed.len(), report.total());
    }

    ctx.output.success("Build complete!");
    ctx.output.kv("Output", &opts.config.out_dir.display().to_string());
    Ok(())
}

fn summarize(report: &GenerationReport, ctx: &Context, started: Instant) {
    if ctx.output.is_json() {
        ctx.output.json(report);
        return;
    }

    let bytes: u64 = report
        .written
        .iter()
        .filter_map(|file| std::fs::metadata(file).ok())
        .map(|meta| meta.len())
        .sum();

    ctx.output.kv("Written", &format!("{} ({})", report.written.len(), format_bytes(bytes)));
    ctx.output.kv("Skipped", &report.skipped.len().to_string());
    ctx.output.kv("Failed", &report.failed.len().to_string());
    ctx.output.kv("Time", &format_elapsed(started.elapsed()));

    for name in &report.page_names {
        ctx.output.debug(&format!("/{name}"));
    }
    for pathname in &report.skipped {
        ctx.output.skipped_path(pathname);
    }
    for failed in &report.failed {
        ctx.output.failed_path(failed);
    }
}

/// Origin of the configured site, or the default origin.
fn site_origin(site: Option<&str>) -> String {
    site.and_then(|site| Url::parse(site).ok())
        .map(|url| url.origin().ascii_serialization())
        .filter(|origin| origin != "null")
        .unwrap_or_else(|| DEFAULT_ORIGIN.to_string())
}
