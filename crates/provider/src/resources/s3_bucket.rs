//! S3 Storage Bucket Resource handler

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

use super::{fetched, Fetched, Resource};
use crate::client::Manager;
use crate::schema::{account, context, ResourceSchema, Validation};
use crate::state::{string_value, ResourceData};

pub struct S3BucketResource;

/// Reject bucket names outside `[A-Za-z0-9-]+`
pub fn check_bucket_name(name: &str) -> Result<()> {
    if Validation::Pattern(account::BUCKET_NAME_PATTERN)
        .check(&string_value(name))
        .is_err()
    {
        bail!("name: Wrong name format should be A-z, 1-0 and `-`");
    }
    Ok(())
}

#[async_trait::async_trait]
impl Resource for S3BucketResource {
    fn type_name() -> &'static str {
        "bcc_s3_storage_bucket"
    }

    fn schema() -> ResourceSchema {
        let args = account::s3_bucket_create().merge(context::s3_storage_by_id());
        ResourceSchema::new(args)
            .importable()
            .with_timeouts(Duration::from_secs(600), Duration::from_secs(600))
    }

    async fn create(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let name = d.get_string("name");
        check_bucket_name(&name)?;

        let storage = api
            .get_s3_storage(&d.get_string("s3_storage_id"))
            .await
            .context("id: Error getting S3Storage")?;
        let bucket = api
            .create_bucket(&storage.id, &name)
            .await
            .context("Error creating S3StorageBucket")?;

        d.set_id(&bucket.id);
        info!("S3StorageBucket created, ID: {}", d.id());
        Self::read(api, d).await
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        if d.id().is_empty() {
            return Ok(());
        }
        let storage = match fetched(
            api.get_s3_storage(&d.get_string("s3_storage_id")).await,
            "id: Error getting S3Storage",
        )? {
            Fetched::Found(storage) => storage,
            Fetched::Gone => {
                d.set_id("");
                return Ok(());
            }
        };
        let bucket = match fetched(
            api.get_bucket(&storage.id, d.id()).await,
            "id: Error getting S3StorageBucket",
        )? {
            Fetched::Found(bucket) => bucket,
            Fetched::Gone => {
                d.set_id("");
                return Ok(());
            }
        };

        d.set_id(&bucket.id);
        d.set("name", bucket.name.as_str());
        d.set("external_name", bucket.external_name.as_str());
        Ok(())
    }

    async fn update(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let name = d.get_string("name");
        if d.has_change("name") {
            check_bucket_name(&name)?;
        }

        let storage = api
            .get_s3_storage(&d.get_string("s3_storage_id"))
            .await
            .context("id: Error getting S3Storage")?;
        let mut bucket = api
            .get_bucket(&storage.id, d.id())
            .await
            .context("id: Error getting S3StorageBucket")?;

        if d.has_change("name") {
            bucket.name = name;
            api.update_bucket(&storage.id, &bucket)
                .await
                .context("Error updating S3StorageBucket")?;
            info!("S3StorageBucket updated, ID: {}", d.id());
        }

        Self::read(api, d).await
    }

    async fn delete(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let storage = api
            .get_s3_storage(&d.get_string("s3_storage_id"))
            .await
            .context("id: Error getting S3Storage")?;
        let bucket = api
            .get_bucket(&storage.id, d.id())
            .await
            .context("id: Error getting S3StorageBucket")?;
        api.delete_bucket(&storage.id, &bucket.id)
            .await
            .context("Error deleting S3StorageBucket")?;

        d.set_id("");
        info!("S3StorageBucket deleted, ID: {}", bucket.id);
        Ok(())
    }

    /// Buckets live under a storage, so the import id is `<s3_storage_id>/<bucket_id>`
    async fn import(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let raw = d.id().to_string();
        let Some((storage_id, bucket_id)) = raw.split_once('/') else {
            bail!("import id must have the form <s3_storage_id>/<bucket_id>, got '{}'", raw);
        };
        d.set("s3_storage_id", storage_id);
        d.set_id(bucket_id);
        Self::read(api, d).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_names() {
        assert!(check_bucket_name("backups-2024").is_ok());
        assert!(check_bucket_name("Backups").is_ok());
        assert!(check_bucket_name("my_bucket").is_err());
        assert!(check_bucket_name("a.b").is_err());
        assert!(check_bucket_name("").is_err());
        // `[A-z]` would have let these through
        assert!(check_bucket_name("a^b").is_err());
        assert!(check_bucket_name("a[b]").is_err());
    }
}
