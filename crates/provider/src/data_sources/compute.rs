//! Disk, VM, template, storage profile and hypervisor data sources

use anyhow::{Context, Result};
use bcc_common::Vdc;

use super::{set_list, DataSource};
use crate::client::Manager;
use crate::flatten;
use crate::lookup;
use crate::schema::{compute, context, ResourceSchema};
use crate::state::ResourceData;

async fn target_vdc(api: &dyn Manager, d: &ResourceData) -> Result<Vdc> {
    api.get_vdc(&d.get_string("vdc_id"))
        .await
        .context("Error getting vdc")
}

pub struct DiskDataSource;

#[async_trait::async_trait]
impl DataSource for DiskDataSource {
    fn type_name() -> &'static str {
        "bcc_disk"
    }

    fn schema() -> ResourceSchema {
        let args = context::vdc_by_id_for_data()
            .merge(compute::disk_result())
            .merge(context::get_by_name_or_id("Disk"));
        ResourceSchema::new(args)
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting disk")?;
        let vdc = target_vdc(api, d).await?;
        let disk = lookup::disk(api, &vdc.id, target).await.context("Error getting disk")?;
        d.set_all(flatten::disk(&disk));
        Ok(())
    }
}

pub struct DisksDataSource;

#[async_trait::async_trait]
impl DataSource for DisksDataSource {
    fn type_name() -> &'static str {
        "bcc_disks"
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::new(context::vdc_by_id_for_data().merge(compute::disk_result_list()))
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let vdc = target_vdc(api, d).await?;
        let disks = api.list_disks(&vdc.id).await.context("Error getting disks")?;
        set_list(d, "disks", flatten::list(disks.iter().map(flatten::disk).collect()))
    }
}

pub struct VmDataSource;

#[async_trait::async_trait]
impl DataSource for VmDataSource {
    fn type_name() -> &'static str {
        "bcc_vm"
    }

    fn schema() -> ResourceSchema {
        let args = context::vdc_by_id_for_data()
            .merge(compute::vm_result())
            .merge(context::get_by_name_or_id("Vm"));
        ResourceSchema::new(args)
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting vm")?;
        let vdc = target_vdc(api, d).await?;
        let vm = lookup::vm(api, &vdc.id, target).await.context("Error getting vm")?;
        d.set_all(flatten::vm(&vm));
        Ok(())
    }
}

pub struct TemplateDataSource;

#[async_trait::async_trait]
impl DataSource for TemplateDataSource {
    fn type_name() -> &'static str {
        "bcc_template"
    }

    fn schema() -> ResourceSchema {
        let args = context::vdc_by_id_for_data()
            .merge(compute::template_result())
            .merge(context::get_by_name_or_id("Template"));
        ResourceSchema::new(args)
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting template")?;
        let vdc = target_vdc(api, d).await?;
        let template = lookup::template(api, &vdc.id, target)
            .await
            .context("Error getting template")?;
        d.set_all(flatten::template(&template));
        Ok(())
    }
}

pub struct TemplatesDataSource;

#[async_trait::async_trait]
impl DataSource for TemplatesDataSource {
    fn type_name() -> &'static str {
        "bcc_templates"
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::new(context::vdc_by_id_for_data().merge(compute::template_result_list()))
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let vdc = target_vdc(api, d).await?;
        let templates = api
            .list_templates(&vdc.id)
            .await
            .context("Error getting templates")?;
        set_list(
            d,
            "templates",
            flatten::list(templates.iter().map(flatten::template).collect()),
        )
    }
}

pub struct StorageProfilesDataSource;

#[async_trait::async_trait]
impl DataSource for StorageProfilesDataSource {
    fn type_name() -> &'static str {
        "bcc_storage_profiles"
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::new(context::vdc_by_id_for_data().merge(compute::storage_profile_result_list()))
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let vdc = target_vdc(api, d).await?;
        let profiles = api
            .list_storage_profiles(&vdc.id)
            .await
            .context("Error retrieving storage profiles")?;
        set_list(
            d,
            "storage_profiles",
            flatten::list(profiles.iter().map(flatten::named).collect()),
        )
    }
}

pub struct HypervisorsDataSource;

#[async_trait::async_trait]
impl DataSource for HypervisorsDataSource {
    fn type_name() -> &'static str {
        "bcc_hypervisors"
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::new(compute::hypervisor_result_list().merge(context::project_by_id()))
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let project = api
            .get_project(&d.get_string("project_id"))
            .await
            .context("Error getting project")?;
        let hypervisors = api
            .list_hypervisors(&project.id)
            .await
            .context("Error getting available hypervisors")?;
        set_list(
            d,
            "hypervisors",
            flatten::list(hypervisors.iter().map(flatten::hypervisor).collect()),
        )
    }
}
