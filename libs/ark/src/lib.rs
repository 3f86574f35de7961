//! # pidman-ark
//!
//! Parsing and validation for ARKs (Archival Resource Keys).
//!
//! ## ARK Format
//!
//! An ARK is written either in short form or in resolvable form, with an
//! optional qualifier:
//!
//! - `ark:/25593/1fx`
//! - `ark:/25593/1fx/qual/1.23/foo-bar`
//! - `http://pid.example.org/ark:/25593/1fx`
//!
//! The parts are:
//! - **NMA** (Name Mapping Authority): the optional resolver prefix, including
//!   scheme and trailing slash
//! - **NAAN** (Name Assigning Authority Number): numeric
//! - **NOID** (Nice Opaque Identifier): drawn from [`NOID_CHARACTERS`]
//! - **Qualifier**: everything after the slash that ends the NOID
//!
//! Matching is ASCII case-insensitive. Parsed values keep the input's casing
//! and format back to exactly the string that was parsed.

mod ark;
mod error;

pub use ark::{is_ark, is_noid, parse_ark, Ark, ARK_LABEL, NOID_CHARACTERS};
pub use error::ArkError;
