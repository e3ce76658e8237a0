//! Default correlation ID generators and validators.
//!
//! The defaults produce and accept random v4 UUIDs. [`uuid_hex`] renders
//! the simple 32-character lowercase hex form, which is what the
//! interceptor generates unless told otherwise.

use uuid::Uuid;

/// A fresh v4 UUID as 32 lowercase hex characters.
#[must_use]
pub fn uuid_hex() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A fresh v4 UUID in the hyphenated 36-character form.
#[must_use]
pub fn uuid_hyphenated() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Accepts anything that parses as a UUID: simple, hyphenated, braced or
/// URN form, any case.
#[must_use]
pub fn is_valid_uuid(value: &str) -> bool {
    Uuid::try_parse(value).is_ok()
}

/// Truncate an ID to at most `len` characters for display.
#[must_use]
pub fn truncate(id: &str, len: Option<usize>) -> &str {
    match len {
        Some(n) => id.char_indices().nth(n).map_or(id, |(idx, _)| &id[..idx]),
        None => id,
    }
}
