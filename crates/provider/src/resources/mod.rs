//! Resource Implementations
//!
//! Implements the CRUD operations for each resource type.

pub mod disk;
pub mod firewall_template;
pub mod network;
pub mod s3_bucket;

use anyhow::{Context, Result};

use crate::client::Manager;
use crate::schema::ResourceSchema;
use crate::state::ResourceData;

/// Trait for resource operations.
///
/// Handlers read desired state from `d` and write observed state back into
/// it. Clearing the identity of `d` marks the entity as gone.
#[async_trait::async_trait]
pub trait Resource {
    /// Resource type name
    fn type_name() -> &'static str;

    fn schema() -> ResourceSchema;

    /// Create a new resource
    async fn create(api: &dyn Manager, d: &mut ResourceData) -> Result<()>;

    /// Read an existing resource
    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()>;

    /// Update an existing resource
    async fn update(api: &dyn Manager, d: &mut ResourceData) -> Result<()>;

    /// Delete a resource
    async fn delete(api: &dyn Manager, d: &mut ResourceData) -> Result<()>;

    /// Populate a record that only holds the imported id
    async fn import(api: &dyn Manager, d: &mut ResourceData) -> Result<()>;
}

/// Outcome of a point lookup during Read
pub(crate) enum Fetched<T> {
    Found(T),
    Gone,
}

/// Map a not-found error to [`Fetched::Gone`], wrap anything else with `context`
pub(crate) fn fetched<T>(result: bcc_common::Result<T>, context: &'static str) -> Result<Fetched<T>> {
    match result {
        Ok(entity) => Ok(Fetched::Found(entity)),
        Err(e) if e.is_not_found() => Ok(Fetched::Gone),
        Err(e) => Err(e).context(context),
    }
}
