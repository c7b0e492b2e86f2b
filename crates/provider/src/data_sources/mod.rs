//! Data Source Implementations
//!
//! Read-only handlers. Single-entity data sources resolve their target by
//! `id` or `name`; list data sources expose every entity under a parent.

pub mod account;
pub mod compute;
pub mod network;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::client::Manager;
use crate::schema::ResourceSchema;
use crate::state::{DynamicValue, ResourceData};

/// Trait for data source reads
#[async_trait::async_trait]
pub trait DataSource {
    /// Data source type name
    fn type_name() -> &'static str;

    fn schema() -> ResourceSchema;

    /// Resolve the target and write its fields into `d`
    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()>;
}

/// Identity of a list data source: `<attr>/<digest>`.
///
/// The digest is the first 8 bytes of the SHA-256 of the JSON-encoded
/// list, as a decimal integer. It only changes when the list does.
pub fn list_id(attr: &str, list: &DynamicValue) -> Result<String> {
    let encoded = serde_json::to_vec(list).with_context(|| format!("unable to set `{}` attribute", attr))?;
    let digest = Sha256::digest(&encoded);
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    Ok(format!("{}/{}", attr, u64::from_be_bytes(head)))
}

/// Set a list attribute and derive the record identity from it
pub(crate) fn set_list(d: &mut ResourceData, attr: &str, list: DynamicValue) -> Result<()> {
    let id = list_id(attr, &list)?;
    d.set(attr, list);
    d.set_id(id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::make_state;

    #[test]
    fn test_list_id_is_stable_and_content_addressed() {
        let a = DynamicValue::List(vec![make_state(vec![("id", "sp-1".into())])]);
        let b = DynamicValue::List(vec![make_state(vec![("id", "sp-2".into())])]);

        let id_a = list_id("storage_profiles", &a).unwrap();
        assert_eq!(id_a, list_id("storage_profiles", &a.clone()).unwrap());
        assert_ne!(id_a, list_id("storage_profiles", &b).unwrap());

        let (prefix, digest) = id_a.split_once('/').unwrap();
        assert_eq!(prefix, "storage_profiles");
        assert!(digest.parse::<u64>().is_ok());
    }

    #[test]
    fn test_empty_list_has_an_id() {
        let id = list_id("hypervisors", &DynamicValue::List(vec![])).unwrap();
        assert!(id.starts_with("hypervisors/"));
    }
}
