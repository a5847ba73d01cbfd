//! Output file naming.

use std::path::{Path, PathBuf};

use strata_core::{PageUrlFormat, RouteKind};

fn trim_trailing_slash(pathname: &str) -> &str {
    let trimmed = pathname.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn dirname(pathname: &str) -> &str {
    let path = trim_trailing_slash(pathname);
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

fn basename(pathname: &str) -> &str {
    let path = trim_trailing_slash(pathname);
    path.rsplit('/').next().unwrap_or_default()
}

fn join_out(out_dir: &Path, pathname: &str) -> PathBuf {
    pathname
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .fold(out_dir.to_path_buf(), |dir, segment| dir.join(segment))
}

/// Folder the file for `pathname` is written into.
pub fn out_folder(out_dir: &Path, pathname: &str, kind: RouteKind, format: PageUrlFormat) -> PathBuf {
    match (kind, format) {
        (RouteKind::Page, PageUrlFormat::Directory) => join_out(out_dir, pathname),
        (RouteKind::Endpoint, _) | (RouteKind::Page, PageUrlFormat::File) => {
            join_out(out_dir, dirname(pathname))
        }
    }
}

/// File `pathname` is written to, inside `out_folder`.
pub fn out_file(out_folder: &Path, pathname: &str, kind: RouteKind, format: PageUrlFormat) -> PathBuf {
    match (kind, format) {
        (RouteKind::Endpoint, _) => out_folder.join(basename(pathname)),
        (RouteKind::Page, PageUrlFormat::Directory) => out_folder.join("index.html"),
        (RouteKind::Page, PageUrlFormat::File) => {
            let name = match basename(pathname) {
                "" => "index",
                name => name,
            };
            out_folder.join(format!("{name}.html"))
        }
    }
}
