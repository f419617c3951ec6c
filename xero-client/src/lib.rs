//! Client library for the Xero accounting API
//!
//! The API speaks a loosely-typed hierarchical wire format with no runtime
//! schema, so this crate's core is a marshalling engine: it recovers typed,
//! nested, collection-aware records from wire documents using field-name
//! heuristics (coercion tables, pluralization rules, the plural-collapse
//! algorithm), performs the inverse transform for saves, generates the
//! provider's filter-expression mini-language from keyword constraints, and
//! batches paginated reads.
//!
//! OAuth credential handling stays outside: operations consume an opaque
//! [`RequestSigner`] that attaches authentication headers to a built
//! [`RequestDescriptor`], and a [`Transport`] that executes it.
//!
//! ```no_run
//! use xero_client::{Client, FilterParams, StaticTokenSigner};
//!
//! # async fn run() -> xero_client::Result<()> {
//! let client = Client::new(StaticTokenSigner::new("access-token"));
//! let overdue = client
//!     .invoices()
//!     .filter(FilterParams::new().param("Status", "AUTHORISED"))
//!     .await?;
//! let everything = client.contacts().all().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod coerce;
pub mod constants;
pub mod credentials;
pub mod dates;
pub mod decode;
pub mod encode;
pub mod error;
pub mod manager;
pub mod pluralization;
pub mod query;
pub mod response;
pub mod tables;
pub mod transport;
pub mod value;

pub use client::{Client, ClientConfig, ClientConfigBuilder};
pub use coerce::CoercionRule;
pub use credentials::{RequestSigner, StaticTokenSigner};
pub use dates::{ParsedDate, parse_wire_date};
pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{Error, Result};
pub use manager::Manager;
pub use query::{FilterParams, FilterValue};
pub use response::{Classification, classify};
pub use tables::MarshalTables;
pub use transport::{
    HttpTransport, Method, RawResponse, RequestBody, RequestDescriptor, Transport,
};
pub use value::{Record, Value};
