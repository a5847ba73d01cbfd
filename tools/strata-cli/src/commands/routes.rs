//! List the pages and paths of a build.

use anyhow::Result;
use serde::Serialize;
use strata_build::{out_file, out_folder};
use strata_core::RouteKind;

use super::{plan_path, RoutesArgs};
use crate::context::Context;
use crate::manifest::BuildPlan;
use crate::output::kind_badge;

#[derive(Serialize)]
struct RouteListing {
    pattern: String,
    kind: RouteKind,
    component: String,
    paths: Vec<PathListing>,
}

#[derive(Serialize)]
struct PathListing {
    pathname: String,
    file: String,
}

/// Run the routes command.
pub async fn run(args: RoutesArgs, ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    let plan = BuildPlan::load(&plan_path(args.plan.as_deref(), ctx, config))?;
    let format = config.build.page_url_format;

    let listings: Vec<RouteListing> = plan
        .internals
        .each_page_data()
        .map(|page| RouteListing {
            pattern: page.route.pattern.clone(),
            kind: page.route.kind,
            component: page.component.clone(),
            paths: page
                .paths
                .iter()
                .map(|pathname| {
                    let folder = out_folder(&config.out_dir, pathname, page.route.kind, format);
                    let file = out_file(&folder, pathname, page.route.kind, format);
                    PathListing {
                        pathname: pathname.clone(),
                        file: file
                            .strip_prefix(&config.out_dir)
                            .unwrap_or(&file)
                            .display()
                            .to_string(),
                    }
                })
                .collect(),
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&listings);
        return Ok(());
    }

    ctx.output.header("Routes");
    if listings.is_empty() {
        ctx.output.info("No pages in the build plan");
        return Ok(());
    }

    let width = listings.iter().map(|l| l.pattern.len()).max().unwrap_or(0);
    for listing in &listings {
        println!();
        let badge = kind_badge(listing.kind);
        ctx.output.table_row(
            &[listing.pattern.as_str(), listing.component.as_str(), badge.as_str()],
            &[width, 0, 0],
        );
        for path in &listing.paths {
            ctx.output.list_item(&format!("{} -> {}", path.pathname, path.file));
        }
    }

    Ok(())
}
