//! Base endpoint of the REST API and URL assembly.

use url::Url;

use crate::error::{ClientError, Result};

/// Normalized base URL of the pidman REST API.
///
/// Trailing slashes are stripped once at construction; every request URL is
/// built by appending path segments to this base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseEndpoint {
    url: Url,
}

impl BaseEndpoint {
    /// Parse and normalize a base URL such as `https://pid.example.org/pidman/`.
    pub fn parse(base_url: &str) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let url = Url::parse(trimmed)
            .map_err(|e| ClientError::invalid(format!("base URL '{base_url}': {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::invalid(format!(
                "base URL '{base_url}': scheme must be http or https"
            )));
        }
        if url.host_str().is_none() {
            return Err(ClientError::invalid(format!(
                "base URL '{base_url}': missing host"
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ClientError::invalid(format!(
                "base URL '{base_url}': query and fragment are not allowed"
            )));
        }

        Ok(Self { url })
    }

    /// URL scheme (`http` or `https`).
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Host name, without port.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Explicit port, if one was given.
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    /// Path prefix without trailing slash; empty when the API is at the root.
    pub fn path(&self) -> &str {
        self.url.path().trim_end_matches('/')
    }

    /// Build an absolute URL from path segments below the base.
    ///
    /// Segments are percent-encoded individually; an empty final segment
    /// yields a trailing slash.
    pub(crate) fn join<'a, I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::invalid(format!("base URL '{}' cannot be a base", self.url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl std::fmt::Display for BaseEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://", self.scheme())?;
        f.write_str(self.host())?;
        if let Some(port) = self.port() {
            write!(f, ":{port}")?;
        }
        f.write_str(self.path())
    }
}
