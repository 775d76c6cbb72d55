//! Shared response envelope types for API handlers.
//!
//! Internal API responses use a `{ "data": ... }` envelope. The public
//! token-resolution endpoint is the one exception: its shape is an external
//! contract consumed by the booking UI and is built ad hoc in its handler.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
