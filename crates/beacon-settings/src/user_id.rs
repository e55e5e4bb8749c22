//! Anonymous user ids.

use uuid::Uuid;

/// Generate a fresh random (version 4) user id in hyphenated lowercase form.
pub fn generate() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Whether `candidate` parses as a UUID. Stored ids that fail this check are replaced.
pub fn is_valid(candidate: &str) -> bool {
    Uuid::parse_str(candidate).is_ok()
}
