//! Disk Resource handler

use std::time::Duration;

use anyhow::{Context, Result};
use bcc_common::NewDisk;
use tracing::{debug, info};

use super::{fetched, Fetched, Resource};
use crate::client::{LockTarget, Manager};
use crate::flatten;
use crate::lookup;
use crate::schema::{compute, context, ResourceSchema};
use crate::state::ResourceData;

pub struct DiskResource;

#[async_trait::async_trait]
impl Resource for DiskResource {
    fn type_name() -> &'static str {
        "bcc_disk"
    }

    fn schema() -> ResourceSchema {
        let args = compute::disk_create()
            .merge(context::vdc_by_id())
            .merge(context::storage_profile_by_id());
        ResourceSchema::new(args)
            .importable()
            .with_timeouts(Duration::from_secs(600), Duration::from_secs(600))
    }

    async fn create(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let vdc = api
            .get_vdc(&d.get_string("vdc_id"))
            .await
            .context("vdc_id: Error getting VDC")?;
        let profile = lookup::storage_profile_by_id(api, &vdc.id, &d.get_string("storage_profile_id"))
            .await
            .context("storage_profile: Error getting storage profile")?;

        let new_disk = NewDisk {
            name: d.get_string("name"),
            size: d.get_int("size"),
            storage_profile: profile.id,
            tags: flatten::tags_from(d),
        };

        api.wait_lock(LockTarget::Vdc(&vdc.id))
            .await
            .context("vdc_id: Error waiting for VDC")?;
        let disk = api
            .create_disk(&vdc.id, &new_disk)
            .await
            .context("Error creating disk")?;
        api.wait_lock(LockTarget::Disk(&disk.id))
            .await
            .context("Error waiting for disk")?;

        d.set_id(&disk.id);
        info!("Disk created, ID: {}", d.id());

        Self::read(api, d).await
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        if d.id().is_empty() {
            return Ok(());
        }
        let disk = match fetched(api.get_disk(d.id()).await, "id: Error getting disk")? {
            Fetched::Found(disk) => disk,
            Fetched::Gone => {
                d.set_id("");
                return Ok(());
            }
        };

        d.set_id(&disk.id);
        d.set("name", disk.name.as_str());
        d.set("size", disk.size);
        d.set("storage_profile_id", disk.storage_profile.id.as_str());
        d.set("external_id", disk.external_id.clone().unwrap_or_default());
        d.set("tags", flatten::tag_names(&disk.tags));
        if !disk.vdc.id.is_empty() {
            d.set("vdc_id", disk.vdc.id.as_str());
        }
        Ok(())
    }

    async fn update(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let mut disk = api.get_disk(d.id()).await.context("id: Error getting disk")?;

        let mut should_update = false;
        if d.has_change("name") {
            disk.name = d.get_string("name");
            should_update = true;
        }
        if d.has_set_change("tags") {
            disk.tags = flatten::tags_from(d);
            should_update = true;
        }

        if d.has_change("size") {
            let size = d.get_int("size");
            api.wait_lock(LockTarget::Disk(&disk.id))
                .await
                .context("size: Error waiting for disk")?;
            debug!("resizing disk {} to {} GB", disk.id, size);
            api.resize_disk(&disk.id, size)
                .await
                .context("size: Error resizing disk")?;
            disk.size = size;
        }

        if d.has_change("storage_profile_id") {
            let vdc = api
                .get_vdc(&d.get_string("vdc_id"))
                .await
                .context("vdc_id: Error getting VDC")?;
            let profile = lookup::storage_profile_by_id(api, &vdc.id, &d.get_string("storage_profile_id"))
                .await
                .context("storage_profile: Error getting storage profile")?;
            api.wait_lock(LockTarget::Disk(&disk.id))
                .await
                .context("storage_profile: Error waiting for disk")?;
            debug!("moving disk {} to storage profile {}", disk.id, profile.id);
            api.update_disk_storage_profile(&disk.id, &profile.id)
                .await
                .context("storage_profile: Error updating storage")?;
        }

        if should_update {
            api.wait_lock(LockTarget::Disk(&disk.id))
                .await
                .context("name: Error waiting for disk")?;
            api.update_disk(&disk).await.context("name: Error updating disk")?;
        }

        Self::read(api, d).await
    }

    async fn delete(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let disk = api.get_disk(d.id()).await.context("id: Error getting disk")?;

        if let Some(vm) = &disk.vm {
            let vm = api.get_vm(&vm.id).await.context("Error getting VM of disk")?;
            debug!("detaching disk {} from vm {}", disk.id, vm.id);
            api.detach_disk(&vm.id, &disk.id)
                .await
                .context("Error detaching disk")?;
        }

        api.delete_disk(&disk.id).await.context("Error deleting disk")?;
        api.wait_lock(LockTarget::Disk(&disk.id))
            .await
            .context("Error waiting for disk")?;

        info!("Disk deleted, ID: {}", disk.id);
        d.set_id("");
        Ok(())
    }

    async fn import(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        Self::read(api, d).await
    }
}
