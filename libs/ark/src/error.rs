//! Error types for ARK parsing.

use thiserror::Error;

/// Reasons a string failed to parse as an ARK.
///
/// Only the first violation found is reported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArkError {
    /// The input string is empty.
    #[error("ARK cannot be empty")]
    Empty,

    /// The `ark:/` label is absent.
    #[error("missing 'ark:/' label")]
    MissingLabel,

    /// Text before the label is not a valid resolver prefix.
    #[error("invalid name mapping authority '{authority}': {reason}")]
    InvalidAuthority {
        authority: String,
        reason: &'static str,
    },

    /// The authority number is empty or not all digits.
    #[error("invalid NAAN '{0}': expected one or more digits")]
    InvalidNaan(String),

    /// Nothing follows the NAAN.
    #[error("missing NOID after NAAN")]
    MissingNoid,

    /// The NOID contains a character outside the NOID alphabet.
    #[error("invalid NOID '{noid}': character '{character}' is not allowed")]
    InvalidNoid { noid: String, character: char },
}

impl ArkError {
    /// Returns true if the input did not look like an ARK at all.
    pub fn is_not_ark(&self) -> bool {
        matches!(self, ArkError::Empty | ArkError::MissingLabel)
    }
}
