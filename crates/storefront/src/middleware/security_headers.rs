//! Response hardening headers.
//!
//! The header set is computed once from configuration and stamped onto every
//! response. Templates carry no inline script or style, so the policy only
//! has to open up image loading: product photos live on the commerce
//! backend or on whatever HTTPS host it points at.

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
            X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};
use url::Url;

use crate::config::StorefrontConfig;
use crate::state::AppState;

/// Headers that do not depend on configuration.
const FIXED_HEADERS: &[(&str, &str)] = &[
    ("x-dns-prefetch-control", "off"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    // Image hosts rarely send CORP, so `require-corp` would break photos.
    ("cross-origin-embedder-policy", "credentialless"),
    (
        "permissions-policy",
        "camera=(), geolocation=(), microphone=(), payment=(), usb=(), \
         browsing-topics=(), interest-cohort=()",
    ),
];

/// One year, the usual HSTS preload minimum.
const HSTS_MAX_AGE_SECS: u64 = 31_536_000;

/// Precomputed security headers for every response.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: HeaderMap,
}

impl SecurityHeaders {
    /// Build the header set for a storefront configuration.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        let mut headers = HeaderMap::new();

        headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        headers.insert(REFERRER_POLICY, HeaderValue::from_static("same-origin"));
        // Every page shows cart or account state.
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));

        let csp = content_security_policy(&config.backend.base_url, config.is_secure());
        if let Ok(value) = HeaderValue::from_str(&csp) {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }

        if config.is_secure()
            && let Ok(value) = HeaderValue::from_str(&format!(
                "max-age={HSTS_MAX_AGE_SECS}; includeSubDomains"
            ))
        {
            headers.insert(STRICT_TRANSPORT_SECURITY, value);
        }

        for (name, value) in FIXED_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        Self { headers }
    }

    /// Copy the headers onto a response, keeping any a handler already set.
    pub fn apply(&self, response: &mut Response) {
        let target = response.headers_mut();
        for (name, value) in &self.headers {
            if !target.contains_key(name) {
                target.insert(name.clone(), value.clone());
            }
        }
    }
}

/// Assemble the CSP, allowing images from the backend's origin.
fn content_security_policy(backend: &Url, secure: bool) -> String {
    let backend_origin = backend.origin().ascii_serialization();
    let mut img_src = vec!["'self'", "https:", "data:"];
    if backend.scheme() == "http" {
        img_src.push(&backend_origin);
    }

    let mut directives = vec![
        "default-src 'none'".to_string(),
        "script-src 'self'".to_string(),
        "style-src 'self'".to_string(),
        "font-src 'self'".to_string(),
        format!("img-src {}", img_src.join(" ")),
        "connect-src 'self'".to_string(),
        "object-src 'none'".to_string(),
        "base-uri 'self'".to_string(),
        "form-action 'self'".to_string(),
        "frame-ancestors 'none'".to_string(),
    ];
    if secure {
        directives.push("upgrade-insecure-requests".to_string());
    }
    directives.join("; ")
}

/// Stamp the configured security headers onto the response.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    state.security_headers().apply(&mut response);
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    #[test]
    fn test_csp_allows_plain_http_backend_images() {
        let backend = Url::parse("http://127.0.0.1:4000/api/").unwrap();
        let csp = content_security_policy(&backend, false);
        assert!(csp.contains("img-src 'self' https: data: http://127.0.0.1:4000"));
        assert!(!csp.contains("upgrade-insecure-requests"));
    }

    #[test]
    fn test_csp_for_https_deployment() {
        let backend = Url::parse("https://api.emporium.test/").unwrap();
        let csp = content_security_policy(&backend, true);
        assert!(csp.contains("img-src 'self' https: data:;"));
        assert!(!csp.contains("api.emporium.test"));
        assert!(csp.ends_with("upgrade-insecure-requests"));
    }

    #[test]
    fn test_apply_keeps_handler_headers() {
        let mut map = HeaderMap::new();
        map.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        map.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        let headers = SecurityHeaders { headers: map };

        let mut response = Response::new(Body::empty());
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=60"));
        headers.apply(&mut response);

        assert_eq!(response.headers()[CACHE_CONTROL], "public, max-age=60");
        assert_eq!(response.headers()[X_FRAME_OPTIONS], "DENY");
    }
}
