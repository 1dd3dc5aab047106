//! HTTP middleware and extractors for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span, echoed in the response)
//!
//! Identity is resolved per handler by the [`RequireUser`] and
//! [`OptionalUser`] extractors.

pub mod auth;
pub mod request_id;

pub use auth::{OptionalUser, RequireUser};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
