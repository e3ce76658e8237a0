//! Tower middleware that assigns a correlation ID to every HTTP request.
//!
//! [`CorrelationIdLayer`] wraps an inner service. For each request it
//! resolves an ID from the configured header, validating it and falling
//! back to the generator, runs the optional transformer, writes the final
//! value back onto the request, and publishes it through
//! [`crate::context`] for the whole inner call. Registered hooks are then
//! invoked in order. When the inner service produces its response the ID
//! is appended to the response headers and exposed to browsers through
//! `Access-Control-Expose-Headers`.
//!
//! WebSocket handshakes pass straight through.
//!
//! ```ignore
//! let layer = CorrelationIdLayer::builder()
//!     .header_name("X-Correlation-ID")
//!     .hook(|id| tracing::debug!(correlation_id = id, "tagged"))
//!     .build()?;
//! let app = Router::new().route("/", get(handler)).layer(layer);
//! ```

pub mod headers;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::{HeaderMap, HeaderName, Request, Response};
use tower::{Layer, Service};
use tracing::Instrument;

use crate::context;
use crate::error::CorrelatorError;
use crate::id;

pub const DEFAULT_HEADER_NAME: &str = "X-Request-ID";

pub type Generator = Arc<dyn Fn() -> String + Send + Sync>;
pub type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;
pub type Transformer = Arc<dyn Fn(String) -> String + Send + Sync>;
pub type Hook = Arc<dyn Fn(&str) + Send + Sync>;

/// Resolved, immutable interceptor settings shared by every service clone.
struct Settings {
    header: HeaderName,
    display_name: String,
    update_request_header: bool,
    generator: Generator,
    validator: Option<Validator>,
    transformer: Option<Transformer>,
    hooks: Vec<Hook>,
    log_id_length: Option<usize>,
}

impl Settings {
    /// Extraction, resolution, transformation and header reconciliation.
    fn resolve(&self, headers: &mut HeaderMap) -> String {
        let inbound = headers.get(&self.header).filter(|v| !v.is_empty());

        let (original, resolved) = match inbound.map(headers::decode_value) {
            None => (None, (self.generator)()),
            Some(text) if self.validator.as_ref().map_or(true, |v| v(&text)) => {
                (Some(text.clone()), text)
            }
            Some(text) => {
                warn_rejected(&text);
                (Some(text), (self.generator)())
            }
        };

        let id = match self.transformer {
            Some(ref transform) => transform(resolved),
            None => resolved,
        };

        if self.update_request_header
            && original.as_deref() != Some(id.as_str())
            && !headers::replace_request_header(headers, &self.header, &id)
        {
            tracing::error!(
                header = %self.display_name,
                "correlation ID is not a valid header value, request header left unchanged"
            );
        }

        id
    }

    fn decorate<B>(&self, response: &mut Response<B>) {
        let Some(id) = context::correlation_id() else {
            return;
        };
        let headers = response.headers_mut();
        if headers::append_correlation_id(headers, &self.header, &id) {
            headers::expose_header(headers, &self.display_name);
        } else {
            tracing::error!(
                header = %self.display_name,
                "correlation ID is not a valid header value, response header skipped"
            );
        }
    }
}

fn warn_rejected(header_value: &str) {
    tracing::warn!(
        "Generated new request ID ({header_value}), since request header value failed validation"
    );
}

/// Builder for [`CorrelationIdLayer`]. Every setting has a default.
#[must_use]
pub struct CorrelationIdBuilder {
    header_name: String,
    update_request_header: bool,
    generator: Generator,
    validator: Option<Validator>,
    transformer: Option<Transformer>,
    hooks: Vec<Hook>,
    log_id_length: Option<usize>,
}

impl Default for CorrelationIdBuilder {
    fn default() -> Self {
        Self {
            header_name: DEFAULT_HEADER_NAME.to_string(),
            update_request_header: true,
            generator: Arc::new(id::uuid_hex),
            validator: Some(Arc::new(id::is_valid_uuid)),
            transformer: None,
            hooks: Vec::new(),
            log_id_length: None,
        }
    }
}

impl CorrelationIdBuilder {
    /// Header carrying the ID in both directions. Default `X-Request-ID`.
    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Write a generated or transformed ID back onto the request. Default `true`.
    pub fn update_request_header(mut self, update: bool) -> Self {
        self.update_request_header = update;
        self
    }

    pub fn generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.generator = Arc::new(generator);
        self
    }

    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Accept every inbound value as-is.
    pub fn no_validator(mut self) -> Self {
        self.validator = None;
        self
    }

    pub fn transformer<F>(mut self, transformer: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.transformer = Some(Arc::new(transformer));
        self
    }

    /// Register a callback receiving the final ID of every request.
    /// Hooks run in registration order.
    pub fn hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn hooks(mut self, hooks: impl IntoIterator<Item = Hook>) -> Self {
        self.hooks.extend(hooks);
        self
    }

    /// Truncate the ID recorded on the request span to `len` characters.
    pub fn log_id_length(mut self, len: Option<usize>) -> Self {
        self.log_id_length = len;
        self
    }

    pub fn build(self) -> Result<CorrelationIdLayer, CorrelatorError> {
        let header = HeaderName::try_from(self.header_name.as_str()).map_err(|source| {
            CorrelatorError::InvalidHeaderName {
                name: self.header_name.clone(),
                source,
            }
        })?;

        Ok(CorrelationIdLayer {
            settings: Arc::new(Settings {
                header,
                display_name: self.header_name,
                update_request_header: self.update_request_header,
                generator: self.generator,
                validator: self.validator,
                transformer: self.transformer,
                hooks: self.hooks,
                log_id_length: self.log_id_length,
            }),
        })
    }
}

#[derive(Clone)]
pub struct CorrelationIdLayer {
    settings: Arc<Settings>,
}

impl CorrelationIdLayer {
    pub fn builder() -> CorrelationIdBuilder {
        CorrelationIdBuilder::default()
    }

    /// The header name exactly as configured.
    #[must_use]
    pub fn header_name(&self) -> &str {
        &self.settings.display_name
    }
}

impl fmt::Debug for CorrelationIdLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationIdLayer")
            .field("header_name", &self.settings.display_name)
            .field("update_request_header", &self.settings.update_request_header)
            .field("validator", &self.settings.validator.is_some())
            .field("transformer", &self.settings.transformer.is_some())
            .field("hooks", &self.settings.hooks.len())
            .finish_non_exhaustive()
    }
}

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdService {
            inner,
            settings: Arc::clone(&self.settings),
        }
    }
}

#[derive(Clone)]
pub struct CorrelationIdService<S> {
    inner: S,
    settings: Arc<Settings>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CorrelationIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // Take the service that was driven to readiness, leave a clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if headers::is_protocol_upgrade(req.headers()) {
            return Box::pin(inner.call(req));
        }

        let settings = Arc::clone(&self.settings);
        let id = settings.resolve(req.headers_mut());
        let span = tracing::info_span!(
            "request",
            correlation_id = %id::truncate(&id, settings.log_id_length)
        );

        // An empty ID counts as no ID, as with `context::set_correlation_id("")`.
        let id = Some(id).filter(|id| !id.is_empty());

        Box::pin(
            context::scope(id, async move {
                if let Some(id) = context::correlation_id() {
                    for hook in &settings.hooks {
                        hook(&id);
                    }
                }

                let mut response = inner.call(req).await?;
                settings.decorate(&mut response);
                Ok::<_, S::Error>(response)
            })
            .instrument(span),
        )
    }
}
