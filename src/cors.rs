//! CORS policy for the activation API.
//!
//! Extension clients call from `chrome-extension://` origins, so besides exact
//! origins the allow-list accepts prefix patterns. With `*` any origin is
//! allowed but credentials are not.

use std::time::Duration;

use axum::http::{HeaderName, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AllowedOrigins;

const MAX_AGE: Duration = Duration::from_secs(86400);

pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("x-csrf-token"),
        ])
        .max_age(MAX_AGE);

    match origins {
        AllowedOrigins::Any => base.allow_origin(Any),
        AllowedOrigins::List(_) => {
            let origins = origins.clone();
            base.allow_origin(AllowOrigin::predicate(move |origin, _parts| {
                origin.to_str().is_ok_and(|o| origins.allows(o))
            }))
            .allow_credentials(true)
        }
    }
}
