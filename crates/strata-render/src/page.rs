//! Page units and the page rendering contract.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use http::{Response, StatusCode};
use serde_json::Value;
use strata_core::{Props, RenderContext, RenderError};

use crate::body::{spawn_byte_stream, Body};
use crate::chunk::{assemble, ChunkStream};
use crate::doctype::decorate_first_chunk;
use crate::head::HeadElements;

/// Content type of every rendered page.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Prop marking the root component of a page.
pub const SERVER_ROOT_PROP: &str = "server:root";

/// What a component factory hands back.
pub enum FactoryOutput {
    /// A renderable composite, iterated into chunks.
    Component(ChunkStream),
    /// A complete response (e.g., a redirect).
    Response(Response<Body>),
    /// Any other value. Rendering it is a contract violation.
    Value(Value),
}

impl fmt::Debug for FactoryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(_) => f.write_str("Component(..)"),
            Self::Response(response) => f.debug_tuple("Response").field(&response.status()).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// A page compiled into a component factory.
#[async_trait]
pub trait ComponentFactory: Send + Sync {
    /// Invoke the factory for one render.
    async fn invoke(
        &self,
        ctx: &mut RenderContext,
        props: Props,
        children: Option<String>,
    ) -> Result<FactoryOutput, RenderError>;
}

/// Rendering half of a plain page module.
#[async_trait]
pub trait PlainRender: Send + Sync {
    /// Produce the module's flat chunk sequence.
    async fn render(&self, ctx: &RenderContext, props: Props) -> Result<ChunkStream, RenderError>;
}

/// A page module that is not a component factory.
#[derive(Clone)]
pub struct PlainModule {
    /// Module name.
    pub name: String,
    /// Inject the head after the doctype when this module does not render one.
    pub needs_head_injection: bool,
    render: Arc<dyn PlainRender>,
}

impl PlainModule {
    /// Create a plain module.
    pub fn new(name: impl Into<String>, render: Arc<dyn PlainRender>) -> Self {
        Self {
            name: name.into(),
            needs_head_injection: false,
            render,
        }
    }

    /// Request head injection.
    pub fn with_head_injection(mut self, needs: bool) -> Self {
        self.needs_head_injection = needs;
        self
    }
}

impl fmt::Debug for PlainModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainModule")
            .field("name", &self.name)
            .field("needs_head_injection", &self.needs_head_injection)
            .finish_non_exhaustive()
    }
}

/// The renderable unit of a page.
#[derive(Clone)]
pub enum PageUnit {
    Component(Arc<dyn ComponentFactory>),
    Plain(PlainModule),
}

impl PageUnit {
    /// Wrap a component factory.
    pub fn component(factory: impl ComponentFactory + 'static) -> Self {
        Self::Component(Arc::new(factory))
    }
}

impl fmt::Debug for PageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(_) => f.write_str("Component(..)"),
            Self::Plain(module) => f.debug_tuple("Plain").field(module).finish(),
        }
    }
}

/// Render a page unit into a response.
///
/// Plain modules are always buffered. Component output is buffered with a
/// `Content-Length` unless `streaming` is set, in which case the body is a
/// live byte stream fed by a background task.
pub async fn render_page(
    ctx: &mut RenderContext,
    unit: &PageUnit,
    props: Props,
    children: Option<String>,
    streaming: bool,
) -> Result<Response<Body>, RenderError> {
    match unit {
        PageUnit::Plain(module) => {
            let mut page_props = props;
            page_props.insert(SERVER_ROOT_PROP.to_string(), Value::Bool(true));

            let chunks = module.render.render(ctx, page_props).await?;
            let head = module
                .needs_head_injection
                .then(|| HeadElements::from_context(ctx).render_chunks());
            let bytes = assemble(decorate_first_chunk(chunks, head)).await?;

            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
            headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
            Ok(build_response(StatusCode::OK, headers, Body::Full(bytes)))
        }
        PageUnit::Component(factory) => match factory.invoke(ctx, props, children).await? {
            FactoryOutput::Component(chunks) => {
                let chunks = decorate_first_chunk(chunks, None);
                let mut headers = ctx.response.headers.clone();
                headers
                    .entry(CONTENT_TYPE)
                    .or_insert(HeaderValue::from_static(HTML_CONTENT_TYPE));

                let body = if streaming {
                    Body::Stream(spawn_byte_stream(chunks))
                } else {
                    let bytes = assemble(chunks).await?;
                    headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                    Body::Full(bytes)
                };
                Ok(build_response(ctx.response.status, headers, body))
            }
            FactoryOutput::Response(response) => Ok(response),
            FactoryOutput::Value(value) => Err(RenderError::ContractViolation(format!(
                "page factory for {} returned neither a component nor a response: {value}",
                ctx.route.component
            ))),
        },
    }
}

fn build_response(status: StatusCode, headers: HeaderMap, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use futures::{stream, StreamExt};
    use http::header::LOCATION;
    use serde_json::json;
    use strata_core::{ResolveSpecifier, RouteData, SsrElement};

    use super::*;
    use crate::chunk::{chunk_stream, Chunk};

    fn context() -> RenderContext {
        let resolver: Arc<dyn ResolveSpecifier> =
            Arc::new(|s: &str| -> Result<String, RenderError> { Ok(s.to_string()) });
        RenderContext::new(RouteData::page("/", "src/pages/index.astro"), "/", resolver)
    }

    struct Chunks(Vec<Chunk>);

    #[async_trait]
    impl ComponentFactory for Chunks {
        async fn invoke(
            &self,
            _ctx: &mut RenderContext,
            _props: Props,
            _children: Option<String>,
        ) -> Result<FactoryOutput, RenderError> {
            Ok(FactoryOutput::Component(chunk_stream(self.0.clone())))
        }
    }

    struct Redirect;

    #[async_trait]
    impl ComponentFactory for Redirect {
        async fn invoke(
            &self,
            _ctx: &mut RenderContext,
            _props: Props,
            _children: Option<String>,
        ) -> Result<FactoryOutput, RenderError> {
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::FOUND;
            response
                .headers_mut()
                .insert(LOCATION, HeaderValue::from_static("/login"));
            Ok(FactoryOutput::Response(response))
        }
    }

    struct Bogus;

    #[async_trait]
    impl ComponentFactory for Bogus {
        async fn invoke(
            &self,
            _ctx: &mut RenderContext,
            _props: Props,
            _children: Option<String>,
        ) -> Result<FactoryOutput, RenderError> {
            Ok(FactoryOutput::Value(json!({ "not": "a page" })))
        }
    }

    struct Failing;

    #[async_trait]
    impl ComponentFactory for Failing {
        async fn invoke(
            &self,
            _ctx: &mut RenderContext,
            _props: Props,
            _children: Option<String>,
        ) -> Result<FactoryOutput, RenderError> {
            let chunks = stream::iter(vec![
                Ok(Chunk::html("<html>")),
                Err(RenderError::Stream("component threw".into())),
            ])
            .boxed();
            Ok(FactoryOutput::Component(chunks))
        }
    }

    struct HeaderSetter;

    #[async_trait]
    impl ComponentFactory for HeaderSetter {
        async fn invoke(
            &self,
            ctx: &mut RenderContext,
            _props: Props,
            _children: Option<String>,
        ) -> Result<FactoryOutput, RenderError> {
            ctx.set_header(
                http::header::CACHE_CONTROL,
                HeaderValue::from_static("max-age=60"),
            );
            Ok(FactoryOutput::Component(chunk_stream(vec![Chunk::html("<p>hi</p>")])))
        }
    }

    struct Echo;

    #[async_trait]
    impl PlainRender for Echo {
        async fn render(&self, _ctx: &RenderContext, props: Props) -> Result<ChunkStream, RenderError> {
            Ok(chunk_stream(vec![
                Chunk::html("<body>"),
                Chunk::html(format!("root={}", props[SERVER_ROOT_PROP])),
                Chunk::html("</body>"),
            ]))
        }
    }

    async fn body_string(response: Response<Body>) -> String {
        String::from_utf8(response.into_body().collect().await.unwrap()).unwrap()
    }

    // === Component Factory Tests ===

    #[tokio::test]
    async fn test_buffered_component_sets_length() {
        let unit = PageUnit::component(Chunks(vec![Chunk::html("<html>"), Chunk::html("</html>")]));
        let response = render_page(&mut context(), &unit, Props::new(), None, false)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
        let expected = "<!DOCTYPE html>\n<html></html>";
        assert_eq!(response.headers()[CONTENT_LENGTH], expected.len().to_string().as_str());
        assert_eq!(body_string(response).await, expected);
    }

    #[tokio::test]
    async fn test_streaming_matches_buffered() {
        let chunks = vec![
            Chunk::html("<html><body>"),
            Chunk::bytes("ünïcode".as_bytes().to_vec()),
            Chunk::html("</body></html>"),
        ];
        let unit = PageUnit::component(Chunks(chunks));

        let buffered = render_page(&mut context(), &unit, Props::new(), None, false)
            .await
            .unwrap();
        let streamed = render_page(&mut context(), &unit, Props::new(), None, true)
            .await
            .unwrap();

        assert!(streamed.headers().get(CONTENT_LENGTH).is_none());
        assert_eq!(streamed.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
        assert!(streamed.body().is_stream());
        assert_eq!(body_string(streamed).await, body_string(buffered).await);
    }

    #[tokio::test]
    async fn test_streaming_keeps_existing_doctype() {
        let unit = PageUnit::component(Chunks(vec![Chunk::html("<!DOCTYPE html><html>")]));
        let response = render_page(&mut context(), &unit, Props::new(), None, true)
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "<!DOCTYPE html><html>");
    }

    #[tokio::test]
    async fn test_streaming_error_reaches_consumer() {
        let response = render_page(&mut context(), &PageUnit::component(Failing), Props::new(), None, true)
            .await
            .unwrap();
        let err = response.into_body().collect().await.unwrap_err();
        assert!(matches!(err, RenderError::Stream(_)));
    }

    #[tokio::test]
    async fn test_buffered_error_fails_render() {
        let err = render_page(&mut context(), &PageUnit::component(Failing), Props::new(), None, false)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Stream(_)));
    }

    #[tokio::test]
    async fn test_factory_response_passes_through() {
        let response = render_page(&mut context(), &PageUnit::component(Redirect), Props::new(), None, false)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_factory_value_is_contract_violation() {
        let err = render_page(&mut context(), &PageUnit::component(Bogus), Props::new(), None, false)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::ContractViolation(_)));
        assert!(err.to_string().contains("src/pages/index.astro"));
    }

    #[tokio::test]
    async fn test_headers_set_during_render_are_kept() {
        let response = render_page(&mut context(), &PageUnit::component(HeaderSetter), Props::new(), None, false)
            .await
            .unwrap();
        assert_eq!(response.headers()[http::header::CACHE_CONTROL], "max-age=60");
        assert_eq!(response.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
    }

    // === Plain Module Tests ===

    #[tokio::test]
    async fn test_plain_module_buffered_with_server_root() {
        let unit = PageUnit::Plain(PlainModule::new("Echo", Arc::new(Echo)));
        let response = render_page(&mut context(), &unit, Props::new(), None, true)
            .await
            .unwrap();

        // Plain modules are never streamed
        assert!(!response.body().is_stream());
        let expected = "<!DOCTYPE html>\n<body>root=true</body>";
        assert_eq!(response.headers()[CONTENT_LENGTH], expected.len().to_string().as_str());
        assert_eq!(body_string(response).await, expected);
    }

    #[tokio::test]
    async fn test_plain_module_head_injection() {
        let mut ctx = context().with_head(
            vec![SsrElement::with_props(vec![("rel", "stylesheet".into()), ("href", "/a.css".into())])],
            vec![SsrElement::inline("window.x=1")],
        );
        let unit = PageUnit::Plain(PlainModule::new("Echo", Arc::new(Echo)).with_head_injection(true));

        let response = render_page(&mut ctx, &unit, Props::new(), None, false).await.unwrap();
        assert_eq!(
            body_string(response).await,
            concat!(
                "<!DOCTYPE html>\n",
                r#"<link rel="stylesheet" href="/a.css">"#,
                "<script>window.x=1</script>",
                "<body>root=true</body>"
            )
        );
    }
}
