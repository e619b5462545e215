use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build a CORS layer that lets the given origins make credentialed requests.
///
/// Methods and headers are mirrored from the preflight request, which is the
/// credential-compatible way of allowing all of them. A `*` entry cannot be
/// combined with credentials, so it is skipped along with origins that fail
/// to parse as header values.
pub fn credentialed_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter(|o| {
            let wildcard = o.as_str() == "*";
            if wildcard {
                tracing::error!("Wildcard CORS origin is not allowed with credentials, skipping");
            }
            !wildcard
        })
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin = %o, error = %e, "Invalid CORS origin, skipping");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
