//! Activation code normalization.
//!
//! Codes are handed out in a grouped, human-friendly form (`AB-CD12`) but
//! stored in canonical form (`ABCD12`). Every lookup goes through
//! [`normalize_code`] so that case and grouping never matter.

/// Canonicalize a user-supplied activation code.
///
/// Strips every hyphen and uppercases the rest. Total and idempotent.
pub fn normalize_code(code: &str) -> String {
    code.chars()
        .filter(|c| *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}
