//! Dispatch core for the Avisa App messaging API.
//!
//! # Overview
//! Given a `(resource, operation)` pair and one parameter object per input
//! item, the core builds the provider request, executes it through a
//! `Transport`, and normalizes the outcome into one `ResultRecord` per item.
//!
//! # Design
//! - `AvisaClient` is stateless: `build` produces an `HttpRequest`,
//!   `interpret` consumes the transport outcome. Neither touches the network,
//!   so hosts can drive I/O themselves (see the `ffi` crate).
//! - `BatchExecutor` runs items strictly sequentially and applies the
//!   continue-on-failure policy.
//! - `OperationKey` is a closed enum; the endpoint table is an exhaustive
//!   `match`.

pub mod batch;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod operation;
pub mod params;
pub mod record;
pub mod transport;
pub mod types;

pub use batch::{dispatch, BatchExecutor};
pub use client::AvisaClient;
pub use config::{BatchOptions, ClientConfig};
pub use credentials::{CredentialProvider, Credentials, EnvCredentials, StaticCredentials};
pub use error::{AvisaError, BatchError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use operation::{Endpoint, OperationKey, Resource};
pub use params::ItemParameters;
pub use record::ResultRecord;
pub use transport::{ReqwestTransport, Transport};
pub use types::{MediaType, OperationRequest};
