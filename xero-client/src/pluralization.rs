//! Entity and field name pluralization utilities
//!
//! Xero names resource collections and list-valued fields with grammatical
//! plurals ("Invoices", "Addresses") and wraps each entry in a singular-named
//! element. Singular forms are derived purely textually — strip a trailing
//! `s` — with an exceptions table for the handful of names where that rule
//! misfires (`"Addresse"` → `"Address"`).

use std::collections::HashMap;

/// Whether a name counts as grammatically plural for collection detection.
pub fn is_plural(word: &str) -> bool {
    word.chars()
        .last()
        .map(|c| c.to_ascii_lowercase() == 's')
        .unwrap_or(false)
}

/// Derive the singular form of `word`.
///
/// The exceptions table is consulted on the word itself first, then on the
/// stripped form. Words that already appear as exception *outputs* are
/// returned unchanged, which makes the derivation idempotent:
/// `singularize("Addresses")` → `"Address"` → `"Address"`.
pub fn singularize(word: &str, exceptions: &HashMap<String, String>) -> String {
    if exceptions.values().any(|v| v == word) {
        return word.to_string();
    }
    if let Some(mapped) = exceptions.get(word) {
        return mapped.clone();
    }
    if is_plural(word) {
        let stripped = &word[..word.len() - 1];
        return exceptions
            .get(stripped)
            .cloned()
            .unwrap_or_else(|| stripped.to_string());
    }
    word.to_string()
}
