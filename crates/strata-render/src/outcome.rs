//! Classifying a buffered render into page HTML or a non-HTML response.

use http::header::CONTENT_TYPE;
use http::Response;
use strata_core::{Props, RenderContext, RenderError};

use crate::body::Body;
use crate::page::{render_page, PageUnit};

/// Result of rendering a page for static output.
#[derive(Debug)]
pub enum RenderOutcome {
    /// Page HTML to persist.
    Html(String),
    /// Anything else (redirects, custom responses). Not persisted.
    Response(Response<Body>),
}

impl RenderOutcome {
    /// Check if this outcome carries page HTML.
    pub fn is_html(&self) -> bool {
        matches!(self, Self::Html(_))
    }
}

/// Render a page in buffered mode and classify the result.
pub async fn render(
    ctx: &mut RenderContext,
    unit: &PageUnit,
    props: Props,
) -> Result<RenderOutcome, RenderError> {
    let response = render_page(ctx, unit, props, None, false).await?;
    classify(response).await
}

/// Classify a response: a successful HTML response becomes page HTML.
pub async fn classify(response: Response<Body>) -> Result<RenderOutcome, RenderError> {
    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));

    if !response.status().is_success() || !is_html {
        return Ok(RenderOutcome::Response(response));
    }

    let bytes = response.into_body().collect().await?;
    let html = String::from_utf8(bytes).map_err(|e| {
        RenderError::ContractViolation(format!("page output is not valid UTF-8: {e}"))
    })?;
    Ok(RenderOutcome::Html(html))
}
