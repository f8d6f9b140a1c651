//! Mechanical Turk Requester Client
//!
//! This library provides:
//! - Canonical flattening of nested request parameters into the API's
//!   dotted/indexed query encoding
//! - HMAC-SHA1 request signing with per-call timestamps
//! - A blocking transport with exponential-backoff retry on connection failures
//! - XML response decoding into a [`Node`] tree and depth-first field lookup
//!
//! # Usage
//!
//! ```rust,ignore
//! use mturk_requester::{ClientSettings, Credentials, Node, Requester};
//!
//! let credentials = Credentials::resolve(None, None)?;
//! let requester = Requester::new(credentials, ClientSettings::default())?;
//!
//! let response = requester.request(
//!     "GetAssignment",
//!     [("AssignmentId", Node::from("3XYZ"))],
//! )?;
//! if response.valid {
//!     println!("{:?}", response.lookup_str("AssignmentStatus"));
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod flatten;
pub mod navigator;
pub mod node;
pub mod response;
pub mod retry;
pub mod signature;
pub mod transport;
pub mod xml;

pub use client::{Requester, API_VERSION};
pub use config::{ClientSettings, Credentials, Endpoint};
pub use error::{RequesterError, RequesterResult};
pub use flatten::flatten;
pub use navigator::{find, lookup};
pub use node::Node;
pub use response::Response;
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use transport::{HttpTransport, Transport, TransportError};
