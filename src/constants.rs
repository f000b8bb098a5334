/// Request header carrying the raw session token.
pub const SESSION_TOKEN_HEADER: &str = "OPENTICKET-SESSION-TOKEN";

/// Cookie carrying the raw session token when the header is absent.
pub const SESSION_COOKIE_NAME: &str = "openticket_session";

pub mod limits {

    /// Random bytes per session token (hex-encoded to twice as many chars).
    pub const SESSION_TOKEN_BYTES: usize = 32;
}
