//! Redirect handling for authenticated resource requests.
//!
//! The HTTP client is built with redirects disabled, so a 3xx reaches this
//! module as an ordinary response. Each hop is re-issued with the original
//! headers. The `Authorization` header is kept when the hop stays on the
//! origin of the first request or moves to a trusted origin, and dropped
//! otherwise.

use crate::error::{ReckonError, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, AUTHORIZATION, LOCATION};
use reqwest::StatusCode;
use url::Url;

/// Rules applied while following a redirect chain
#[derive(Debug, Clone, Copy)]
pub struct RedirectPolicy<'a> {
    /// Maximum hops before giving up
    pub max_redirects: usize,
    /// Origins besides the first request's that may receive `Authorization`
    pub trusted_origins: &'a [Url],
}

impl RedirectPolicy<'_> {
    /// Whether a hop from a chain that started at `first` to `next` may carry credentials
    pub fn carries_authorization(&self, first: &Url, next: &Url) -> bool {
        let next_origin = next.origin();
        first.origin() == next_origin
            || self
                .trusted_origins
                .iter()
                .any(|trusted| trusted.origin() == next_origin)
    }
}

/// Status codes that carry a Location to follow
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Send a GET and follow redirects according to `policy`.
///
/// Returns the first non-redirect response, whatever its status.
pub fn get_following_redirects(
    client: &Client,
    url: Url,
    headers: &HeaderMap,
    policy: RedirectPolicy<'_>,
) -> Result<Response> {
    let first = url.clone();
    let mut current = url;
    let mut hop_headers = headers.clone();
    let mut hops = 0;

    loop {
        let response = client.get(current.clone()).headers(hop_headers.clone()).send()?;
        let status = response.status();

        if !is_redirect(status) {
            return Ok(response);
        }

        if hops >= policy.max_redirects {
            return Err(ReckonError::Redirect(format!(
                "stopped after {} redirects at {}",
                hops, current
            )));
        }
        hops += 1;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ReckonError::Redirect(format!("{} from {} without a Location header", status, current))
            })?;
        let next = current.join(location).map_err(|e| {
            ReckonError::Redirect(format!("invalid Location {:?} from {}: {}", location, current, e))
        })?;

        hop_headers = headers.clone();
        let carry = policy.carries_authorization(&first, &next);
        if !carry && hop_headers.remove(AUTHORIZATION).is_some() {
            tracing::warn!(
                from = %current,
                to = %next,
                "redirect leaves the trusted origins, sending it without Authorization"
            );
        }

        tracing::debug!(
            status = status.as_u16(),
            from = %current,
            to = %next,
            hop = hops,
            carry_authorization = carry,
            "following redirect"
        );

        current = next;
    }
}
