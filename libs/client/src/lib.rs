//! Client for the pidman persistent identifier service.
//!
//! pidman mints and manages two kinds of identifier:
//! - **ARKs**, which may have several targets distinguished by qualifier
//! - **PURLs**, which have exactly one unqualified target
//!
//! Identifiers are grouped into domains. Reads are anonymous; calls that
//! modify data send HTTP Basic credentials when the client has them.
//!
//! ```no_run
//! use pidman_client::{NewPid, PidmanClient, PID_TOKEN};
//!
//! # fn main() -> pidman_client::Result<()> {
//! let client = PidmanClient::new("https://pid.example.org", Some("user"), Some("secret"))?;
//! let domain = client.list_domains()?.remove(0);
//! let ark = client.create_ark(&NewPid::new(
//!     domain.uri.unwrap_or_default(),
//!     format!("https://repo.example.org/objects/{PID_TOKEN}"),
//! ))?;
//! println!("minted {ark}");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod endpoint;
pub mod error;
pub mod transport;
mod types;

pub use client::{ApiCall, Body, PidmanClient, DEFAULT_USER_AGENT, PID_TOKEN};
pub use config::{ClientConfig, Credentials};
pub use endpoint::BaseEndpoint;
pub use error::{ClientError, ConfigError, Result, TransportError};
pub use transport::{MockTransport, ReqwestTransport, Request, Response, Transport};
pub use types::{
    Domain, DomainUpdate, NewDomain, NewPid, Pid, PidType, PidUpdate, SearchQuery, SearchResults,
    Target, TargetChange, TargetUpdate,
};

pub use pidman_ark as ark;
