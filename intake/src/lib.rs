//! Authenticated API-gateway client layer for the MediMeow clinic intake app.
//!
//! SYSTEM CONTEXT
//! ==============
//! Patient and doctor surfaces talk to one remote backend through three
//! client instances. Each instance pairs a request interceptor (bearer token,
//! multipart repackaging) with a response interceptor (envelope policy, user
//! notifications). Navigation is gated by a pure route guard over the same
//! session token store.
//!
//! `session` owns token storage, `client` composes the interceptor pipeline
//! over a `transport`, `api` holds one function per backend operation, and
//! `routes` holds the route table and guard.

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod notify;
pub mod request;
pub mod response;
pub mod routes;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::{ApiClient, ClientConfig, Clients};
pub use config::{ConfigError, IntakeConfig};
pub use envelope::{Base, Envelope, ResponsePolicy, SuccessCodes};
pub use error::ClientError;
pub use notify::{Notice, Notifier, TracingNotifier};
pub use request::{AuthAttachment, FieldValue, FilePart, FormField, Method, MissingToken, OutgoingRequest, RequestBody};
pub use routes::{GuardDecision, Navigation, NavigationError, Navigator, RouteTable, View};
pub use session::{FileStore, KeyValueStore, MemoryStore, Role, Session, StoreError, TokenSnapshot};
pub use transport::{RawResponse, ReqwestTransport, Transport, TransportError};
