//! Local preview server.
//!
//! Serves the build output over HTTP with `tiny_http`:
//!
//! 1. Exact file match → serve file
//! 2. Directory with `index.html` → serve `index.html`
//! 3. Anything else → 404
//!
//! Requests under the newsletter path (`/newsletter` by default) are
//! forwarded to `NEWSLETTER_ENDPOINT` with the prefix stripped, so the
//! signup form works in preview the same way it does behind the production
//! proxy. The method, body and `Content-Type` are forwarded unchanged;
//! `TRACE` and `CONNECT` get 405. Without an endpoint the proxy answers 503.
//!
//! There is no file watching; rebuild and reload.

use std::fs;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, RequestBuilder};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid serve host: {0}")]
    Host(#[from] AddrParseError),
    #[error("Output directory {} does not exist; run `build` first", .0.display())]
    MissingOutput(PathBuf),
    #[error("Failed to bind after {attempts} attempts (ports {first}-{last}): {message}")]
    Bind {
        attempts: u16,
        first: u16,
        last: u16,
        message: String,
    },
}

/// Ports tried after the configured one is taken.
const MAX_PORT_RETRIES: u16 = 10;

const PROXY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    /// URL prefix forwarded to the newsletter endpoint.
    pub newsletter_path: String,
    pub newsletter_endpoint: Option<String>,
}

/// A bound server, ready to [`run`](PreviewServer::run).
pub struct PreviewServer {
    server: Server,
    addr: SocketAddr,
    handler: Handler,
}

struct Handler {
    root: PathBuf,
    newsletter_path: String,
    newsletter_endpoint: Option<String>,
    agent: Agent,
}

impl PreviewServer {
    pub fn bind(output_dir: &Path, options: &ServeOptions) -> Result<Self, ServeError> {
        if !output_dir.is_dir() {
            return Err(ServeError::MissingOutput(output_dir.to_path_buf()));
        }
        let interface: IpAddr = options.host.parse()?;
        let (server, addr) = try_bind_port(interface, options.port, MAX_PORT_RETRIES)?;

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(PROXY_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self {
            server,
            addr,
            handler: Handler {
                root: output_dir.to_path_buf(),
                newsletter_path: options.newsletter_path.clone(),
                newsletter_endpoint: options.newsletter_endpoint.clone(),
                agent,
            },
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Handle requests until the process is stopped.
    pub fn run(self) {
        for request in self.server.incoming_requests() {
            if let Err(e) = self.handler.handle(request) {
                tracing::warn!(error = %e, "request failed");
            }
        }
    }
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr), ServeError> {
    let mut last_error = String::new();
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    tracing::info!(requested = base_port, port, "port in use, using next free port");
                }
                let bound = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, bound));
            }
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(ServeError::Bind {
        attempts: max_retries,
        first: base_port,
        last: base_port.saturating_add(max_retries.saturating_sub(1)),
        message: last_error,
    })
}

// ============================================================================
// Request Handling
// ============================================================================

impl Handler {
    fn handle(&self, request: Request) -> Result<(), ServeError> {
        let url = request.url().to_string();
        tracing::debug!(method = %request.method(), url = %url, "request");

        if let Some(target) = newsletter_target(
            &url,
            &self.newsletter_path,
            self.newsletter_endpoint.as_deref(),
        ) {
            return match target {
                Some(target) => self.proxy(request, &target),
                None => respond_text(request, 503, "Newsletter endpoint not configured"),
            };
        }

        let path = url.split(['?', '#']).next().unwrap_or("");
        match resolve_path(&self.root, path) {
            Some(file) => serve_file(request, &file),
            None => respond_text(request, 404, "404 Not Found"),
        }
    }

    /// Forward a request to the newsletter endpoint and relay the answer.
    fn proxy(&self, mut request: Request, target: &str) -> Result<(), ServeError> {
        let content_type = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Content-Type"))
            .map(|h| h.value.as_str().to_string());
        let content_type = content_type.as_deref();

        let mut body = Vec::new();
        request.as_reader().read_to_end(&mut body)?;

        let method = request.method().clone();
        let agent = &self.agent;
        tracing::debug!(method = %method, url = target, bytes = body.len(), "forwarding newsletter request");
        let result = match method {
            Method::Get => send_bodyless(agent.get(target), content_type, &body),
            Method::Head => send_bodyless(agent.head(target), content_type, &body),
            Method::Delete => send_bodyless(agent.delete(target), content_type, &body),
            Method::Options => send_bodyless(agent.options(target), content_type, &body),
            Method::Post => send_body(agent.post(target), content_type, &body),
            Method::Put => send_body(agent.put(target), content_type, &body),
            Method::Patch => send_body(agent.patch(target), content_type, &body),
            _ => return respond_text(request, 405, "Method Not Allowed"),
        };

        match result {
            Ok(response) => {
                let status = response.status().as_u16();
                let upstream_type = response
                    .headers()
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let body = match response.into_body().read_to_vec() {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::warn!(url = target, error = %e, "failed to read newsletter response");
                        return respond_text(request, 502, "Bad Gateway");
                    }
                };
                tracing::debug!(url = target, status, "proxied newsletter request");
                let mut reply = Response::from_data(body).with_status_code(StatusCode(status));
                if let Some(header) = upstream_type.and_then(|t| content_type_header(&t)) {
                    reply.add_header(header);
                }
                request.respond(reply)?;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(url = target, error = %e, "newsletter proxy failed");
                respond_text(request, 502, "Bad Gateway")
            }
        }
    }
}

type ProxyResult = Result<ureq::http::Response<ureq::Body>, ureq::Error>;

/// Methods that normally carry no body still forward one when the client sent it.
fn send_bodyless(
    builder: RequestBuilder<WithoutBody>,
    content_type: Option<&str>,
    body: &[u8],
) -> ProxyResult {
    if body.is_empty() {
        with_content_type(builder, content_type).call()
    } else {
        send_body(builder.force_send_body(), content_type, body)
    }
}

fn send_body(builder: RequestBuilder<WithBody>, content_type: Option<&str>, body: &[u8]) -> ProxyResult {
    with_content_type(builder, content_type).send(body)
}

fn with_content_type<B>(builder: RequestBuilder<B>, content_type: Option<&str>) -> RequestBuilder<B> {
    match content_type {
        Some(ct) => builder.header("Content-Type", ct),
        None => builder,
    }
}

/// Where a newsletter request goes.
///
/// Returns `None` when `url` is outside `prefix`, `Some(None)` when it is
/// inside but no endpoint is configured, and `Some(Some(target))` otherwise.
/// The prefix is stripped; the rest of the path and the query are kept.
pub fn newsletter_target(url: &str, prefix: &str, endpoint: Option<&str>) -> Option<Option<String>> {
    let prefix = prefix.trim_end_matches('/');
    let rest = url.strip_prefix(prefix)?;
    if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')) {
        return None;
    }
    Some(endpoint.map(|e| format!("{}{}", e.trim_end_matches('/'), rest)))
}

/// Map a URL path to a file under `root`.
///
/// Directories resolve to their `index.html`. Paths that try to leave the
/// root resolve to nothing.
pub fn resolve_path(root: &Path, url_path: &str) -> Option<PathBuf> {
    let rel = Path::new(url_path.trim_start_matches('/'));
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    let local = root.join(rel);
    if local.is_file() {
        return Some(local);
    }
    let index = local.join("index.html");
    index.is_file().then_some(index)
}

// ============================================================================
// Response Helpers
// ============================================================================

fn serve_file(request: Request, path: &Path) -> Result<(), ServeError> {
    let content = fs::read(path)?;
    let mut response = Response::from_data(content);
    if let Some(header) = content_type_header(guess_content_type(path)) {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn respond_text(request: Request, status: u16, text: &str) -> Result<(), ServeError> {
    let mut response = Response::from_string(text).with_status_code(StatusCode(status));
    if let Some(header) = content_type_header("text/plain; charset=utf-8") {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

fn content_type_header(value: &str) -> Option<Header> {
    Header::from_bytes("Content-Type", value).ok()
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
pub fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("webmanifest") => "application/manifest+json",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
