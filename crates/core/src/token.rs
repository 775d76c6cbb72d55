//! Self-service token generation.
//!
//! Each appointment carries exactly one opaque token, generated at creation
//! and immutable for the appointment's lifetime. Possession of the token is
//! the only credential for the public self-service flow, so the token must
//! be unguessable; it is stored as-is and looked up by equality.

use rand::Rng;

/// Length of the generated token string (alphanumeric characters).
pub const TOKEN_LENGTH: usize = 48;

/// Generate a new random self-service token.
pub fn gerar_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
