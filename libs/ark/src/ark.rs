//! ARK value type and lexer.

use std::ops::Range;

use crate::ArkError;

/// Characters allowed in the NOID portion of an ARK (NOID template `.zek`).
pub const NOID_CHARACTERS: &str = "0123456789bcdfghjkmnpqrstvwxz";

/// The label separating the resolver prefix from the NAAN.
pub const ARK_LABEL: &str = "ark:/";

const SCHEMES: [&str; 2] = ["https://", "http://"];

/// Check whether a string is an ARK, in short or resolvable form, with or
/// without a qualifier.
pub fn is_ark(s: &str) -> bool {
    Ark::parse(s).is_ok()
}

/// Parse an ARK, returning `None` when the string does not match.
pub fn parse_ark(s: &str) -> Option<Ark> {
    Ark::parse(s).ok()
}

/// Check whether every character of a non-empty string is in the NOID alphabet.
pub fn is_noid(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_noid_char)
}

fn is_noid_char(c: char) -> bool {
    c.is_ascii() && NOID_CHARACTERS.contains(c.to_ascii_lowercase())
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// A parsed ARK.
///
/// Holds the original string plus the span of each part, so formatting an
/// `Ark` reproduces its input byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ark {
    raw: String,
    nma_end: usize,
    naan: Range<usize>,
    noid: Range<usize>,
    qualifier_start: Option<usize>,
}

impl Ark {
    /// Parses an ARK from a string.
    ///
    /// Accepts `[nma]ark:/NAAN/NOID[/qualifier]`, where `nma` is an
    /// `http://` or `https://` prefix made of letters, dots, and slashes and
    /// ending in a slash.
    pub fn parse(s: &str) -> Result<Self, ArkError> {
        if s.is_empty() {
            return Err(ArkError::Empty);
        }

        let nma_end = authority_end(s)?;
        let naan_start = nma_end + ARK_LABEL.len();
        let rest = &s[naan_start..];

        let Some((naan, rest)) = rest.split_once('/') else {
            if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ArkError::InvalidNaan(rest.to_string()));
            }
            return Err(ArkError::MissingNoid);
        };

        if naan.is_empty() || !naan.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ArkError::InvalidNaan(naan.to_string()));
        }

        let noid_start = naan_start + naan.len() + 1;
        let noid = rest.split_once('/').map_or(rest, |(noid, _)| noid);
        if noid.is_empty() {
            return Err(ArkError::MissingNoid);
        }
        if let Some(character) = noid.chars().find(|c| !is_noid_char(*c)) {
            return Err(ArkError::InvalidNoid {
                noid: noid.to_string(),
                character,
            });
        }

        let noid_end = noid_start + noid.len();
        let qualifier_start = (noid_end < s.len()).then_some(noid_end + 1);

        Ok(Self {
            raw: s.to_string(),
            nma_end,
            naan: naan_start..naan_start + naan.len(),
            noid: noid_start..noid_end,
            qualifier_start,
        })
    }

    /// The Name Mapping Authority (resolver prefix), if present.
    ///
    /// Includes the scheme and trailing slash, e.g. `http://pid.example.org/`.
    #[must_use]
    pub fn nma(&self) -> Option<&str> {
        (self.nma_end > 0).then(|| &self.raw[..self.nma_end])
    }

    /// The Name Assigning Authority Number.
    #[must_use]
    pub fn naan(&self) -> &str {
        &self.raw[self.naan.clone()]
    }

    /// The Nice Opaque Identifier.
    #[must_use]
    pub fn noid(&self) -> &str {
        &self.raw[self.noid.clone()]
    }

    /// The qualifier, if present. May itself contain slashes.
    #[must_use]
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier_start.map(|start| &self.raw[start..])
    }

    /// Returns true if the ARK carries a resolver prefix.
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        self.nma_end > 0
    }

    /// The short-form ARK, `ark:/NAAN/NOID`, without resolver or qualifier.
    #[must_use]
    pub fn short_form(&self) -> String {
        format!("{}{}/{}", ARK_LABEL, self.naan(), self.noid())
    }

    /// The same ARK with any qualifier removed.
    #[must_use]
    pub fn unqualified(&self) -> Self {
        Self {
            raw: self.raw[..self.noid.end].to_string(),
            nma_end: self.nma_end,
            naan: self.naan.clone(),
            noid: self.noid.clone(),
            qualifier_start: None,
        }
    }

    /// The ARK as it was parsed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Locates the `ark:/` label and validates any prefix in front of it,
/// returning the byte offset at which the label starts.
fn authority_end(s: &str) -> Result<usize, ArkError> {
    if starts_with_ignore_case(s, ARK_LABEL) {
        return Ok(0);
    }

    // ASCII lowercasing keeps byte offsets aligned with `s`.
    let Some(pos) = s.to_ascii_lowercase().find(ARK_LABEL) else {
        return Err(ArkError::MissingLabel);
    };

    let authority = &s[..pos];
    let invalid = |reason| ArkError::InvalidAuthority {
        authority: authority.to_string(),
        reason,
    };

    let Some(scheme) = SCHEMES
        .iter()
        .find(|scheme| starts_with_ignore_case(authority, scheme))
    else {
        return Err(invalid("expected an http:// or https:// prefix"));
    };

    let host = &authority[scheme.len()..];
    if host.len() < 2 || !host.ends_with('/') {
        return Err(invalid("expected a host followed by '/'"));
    }
    if !host
        .bytes()
        .all(|b| b.is_ascii_alphabetic() || b == b'.' || b == b'/')
    {
        return Err(invalid("only letters, '.' and '/' are allowed"));
    }

    Ok(pos)
}

impl std::fmt::Display for Ark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for Ark {
    type Err = ArkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Ark {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl serde::Serialize for Ark {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> serde::Deserialize<'de> for Ark {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
