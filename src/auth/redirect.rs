//! Helpers for redirect URLs during authentication flows.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Only same-site paths are allowed, and never the log-in page itself.
fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN_VIEW
}

/// Reduce `raw_url` to a safe path and query, or `None` if it points off-site.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in page URL that sends the user back to where `request` was headed.
///
/// HTMX requests to `/api` routes use the page the request came from instead.
pub fn build_log_in_redirect_url(request: &Request) -> String {
    let redirect_target = if request.uri().path().starts_with("/api") {
        hx_current_url(request)
    } else {
        request
            .uri()
            .path_and_query()
            .and_then(|path_and_query| normalize_redirect_url(path_and_query.as_str()))
    };

    let redirect_target = redirect_target.unwrap_or_else(|| {
        tracing::warn!("Invalid redirect target. Falling back to dashboard.");
        endpoints::DASHBOARD_VIEW.to_owned()
    });

    match serde_urlencoded::to_string([("redirect_url", &redirect_target)]) {
        Ok(param) => format!("{}?{}", endpoints::LOG_IN_VIEW, param),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

fn hx_current_url(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let current_url = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())?;
    let path_and_query = current_url.parse::<Uri>().ok()?.path_and_query()?.as_str().to_owned();

    is_safe_redirect_url(&path_and_query).then_some(path_and_query)
}
