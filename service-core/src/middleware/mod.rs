pub mod cors;
pub mod security_headers;
pub mod tracing;

pub use cors::credentialed_cors_layer;
pub use security_headers::security_headers_middleware;
pub use self::tracing::{REQUEST_ID_HEADER, request_id_middleware};
