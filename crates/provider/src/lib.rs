//! BCC Terraform Provider
//!
//! Resources and data sources for the basis-cloud BCC platform. The host
//! runtime drives the provider through [`BccProvider`]; everything remote
//! goes through the [`Manager`] trait.

pub mod client;
pub mod config;
pub mod data_sources;
pub mod flatten;
pub mod http;
pub mod lookup;
pub mod provider;
pub mod resources;
pub mod retry;
pub mod schema;
pub mod state;
pub mod subnets;

pub use client::{LockTarget, Manager};
pub use config::ProviderConfig;
pub use provider::{BccProvider, Diagnostic, Severity, StateResponse};
pub use state::{DynamicValue, ResourceData};
