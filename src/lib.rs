//! # OICP roaming
//!
//! Open InterCharge Protocol layer between Charge Point Operators and
//! E-Mobility Providers, OICP 2.0 - 2.2 (SOAP/XML) and 2.3 (JSON/REST).
//!
//! ## Layout
//!
//! - **domain**: identifiers, enumerations, value types and records
//! - **messages**: one request/response pair per operation
//! - **codec**: JSON object model, XML bridge, SOAP envelope
//! - **client**: outbound calls with outcome classification and counters
//! - **server**: inbound dispatch, lifecycle events, axum binding
//! - **mapping**: conversion to and from the generic WWCP model in **wwcp**
//! - **support**: errors, custom data, retry, shutdown, tracing

pub mod client;
pub mod codec;
pub mod config;
pub mod domain;
pub mod mapping;
pub mod messages;
pub mod server;
pub mod support;
pub mod wwcp;

pub use client::{ClientResponse, OicpClient, Outcome};
pub use config::{default_config_path, AppConfig};
pub use domain::version::OicpVersion;
pub use server::{InboundRequest, OicpServer, OutboundResponse};
