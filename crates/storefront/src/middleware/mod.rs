//! HTTP middleware and request extractors for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span and the Sentry scope)
//! 4. Security headers (CSP, framing, caching)
//!
//! [`ClientState`] is an extractor rather than a layer: handlers take it as
//! an argument and return it to write cookies.

pub mod client_state;
pub mod request_id;
pub mod security_headers;

pub use client_state::ClientState;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
