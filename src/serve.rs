//! Local HTTP server: the rendered site plus the comment endpoint.
//!
//! Built on `tiny_http`, one request at a time on the main thread:
//!
//! - `GET`/`HEAD` serve files from `[build.output]`, resolving
//!   `index.html` for directories
//! - `POST [comments.endpoint]` validates a comment form and hands it to
//!   the management API, refreshes the site with a delta build, then
//!   redirects back to the post
//! - Ctrl+C unblocks the accept loop for a clean shutdown

use crate::{
    build::build_site,
    comments::CommentForm,
    config::SiteConfig,
    content::{ContentSource, DeliveryClient, FetchError, management::ManagementClient},
    log,
    state::StateStore,
};
use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    io::Read,
    net::{IpAddr, SocketAddr},
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Serve the site until Ctrl+C.
pub fn serve_site(config: &'static SiteConfig) -> Result<()> {
    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid [serve.interface] `{}`", config.serve.interface))?;
    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    let management = ManagementClient::from_config(config)?;
    if config.comments.enable && management.is_none() {
        log!("warn"; "no management token, comment submissions will be refused");
    }
    let source = DeliveryClient::new(&config.content)?;
    let store = StateStore::from_config(config);
    let refresh = || refresh_site(config, &source, &store);

    log!("serve"; "http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config, management.as_ref(), &refresh) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries.max(1) {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// What a request asks for.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    Comment,
    File(PathBuf),
    NotFound,
    MethodNotAllowed,
}

/// Map method and URL to a [`Route`].
///
/// Query strings are ignored; `..` never leaves `root`.
fn route(method: &Method, url: &str, root: &Path, config: &SiteConfig) -> Route {
    let url_path = urlencoding::decode(url)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    let path = url_path.split('?').next().unwrap_or_default();

    match method {
        Method::Post if config.comments.enable && path == config.comments.endpoint => Route::Comment,
        Method::Get | Method::Head => match resolve_file(root, path) {
            Some(file) => Route::File(file),
            None => Route::NotFound,
        },
        _ => Route::MethodNotAllowed,
    }
}

/// Exact file, or `index.html` inside a directory.
fn resolve_file(root: &Path, url_path: &str) -> Option<PathBuf> {
    let relative = Path::new(url_path.trim_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let local = root.join(relative);
    if local.is_file() {
        return Some(local);
    }
    let index = local.join("index.html");
    index.is_file().then_some(index)
}

/// Delta build after content changed underneath us. Failures are logged;
/// the previous output keeps being served.
fn refresh_site(config: &SiteConfig, source: &impl ContentSource, store: &StateStore) {
    if let Err(err) = build_site(config, source, store, false) {
        log!("error"; "rebuild failed: {:#}", err);
    }
}

fn handle_request(
    request: Request,
    config: &SiteConfig,
    management: Option<&ManagementClient>,
    refresh: &dyn Fn(),
) -> Result<()> {
    match route(request.method(), request.url(), &config.build.output, config) {
        Route::Comment => handle_comment(request, config, management, refresh),
        Route::File(path) => serve_file(request, &path),
        Route::NotFound => respond_text(request, 404, "404 Not Found"),
        Route::MethodNotAllowed => respond_text(request, 405, "405 Method Not Allowed"),
    }
}

/// Validate the form, forward it to the CMS, redirect back to the post.
fn handle_comment(
    mut request: Request,
    config: &SiteConfig,
    management: Option<&ManagementClient>,
    refresh: &dyn Fn(),
) -> Result<()> {
    let Some(management) = management else {
        return respond_text(request, 503, "comments are not available");
    };

    let limit = config.comments.max_body;
    let mut body = Vec::new();
    request
        .as_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .context("Failed to read request body")?;
    if body.len() > limit {
        return respond_text(request, 413, "comment too large");
    }

    let form = match CommentForm::parse(&body, config.comments.max_length) {
        Ok(form) => form,
        Err(err) => {
            log!("comment"; "rejected: {}", err);
            return respond_text(request, 400, &err.to_string());
        }
    };

    match submit_comment(management, &form, refresh) {
        Ok(_) => {
            let location = header("Location", &form.redirect_path())?;
            request.respond(Response::empty(StatusCode(303)).with_header(location))?;
            Ok(())
        }
        Err(err) if err.is_bad_target() => {
            log!("comment"; "rejected: {}", err);
            respond_text(request, 400, "no such post")
        }
        Err(err) => {
            log!("error"; "comment on {} failed: {}", form.post, err);
            respond_text(request, 502, "could not save the comment")
        }
    }
}

/// Save the comment, then refresh the site so it shows up on the post.
fn submit_comment(
    management: &ManagementClient,
    form: &CommentForm,
    refresh: &dyn Fn(),
) -> Result<String, FetchError> {
    let id = management.add_comment(&form.post, &form.comment)?;
    log!("comment"; "added {} to post {}", id, form.post);
    refresh();
    Ok(id)
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let response = Response::from_data(content)
        .with_header(header("Content-Type", guess_content_type(path))?);
    request.respond(response)?;
    Ok(())
}

fn respond_text(request: Request, status: u16, text: &str) -> Result<()> {
    let response = Response::from_string(text)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", "text/plain; charset=utf-8")?);
    request.respond(response)?;
    Ok(())
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header {name}: {value}"))
}

/// Guess MIME content type from file extension.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",

        _ => "application/octet-stream",
    }
}
