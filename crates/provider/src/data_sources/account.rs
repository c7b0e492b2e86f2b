//! Project, VDC, public key, S3 storage and DNS data sources

use anyhow::{Context, Result};

use super::DataSource;
use crate::client::Manager;
use crate::flatten;
use crate::lookup;
use crate::schema::{account, context, network, ResourceSchema};
use crate::state::ResourceData;

pub struct ProjectDataSource;

#[async_trait::async_trait]
impl DataSource for ProjectDataSource {
    fn type_name() -> &'static str {
        "bcc_project"
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::new(account::project_result().merge(context::get_by_name_or_id("Project")))
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting project")?;
        let project = lookup::project(api, target).await.context("Error getting project")?;
        d.set_all(flatten::named(&project));
        Ok(())
    }
}

pub struct VdcDataSource;

#[async_trait::async_trait]
impl DataSource for VdcDataSource {
    fn type_name() -> &'static str {
        "bcc_vdc"
    }

    fn schema() -> ResourceSchema {
        let args = context::project_by_id_optional()
            .merge(account::vdc_result())
            .merge(context::get_by_name_or_id("VDC"));
        ResourceSchema::new(args)
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting vdc")?;
        let project_id = d.get_optional_string("project_id");
        let vdc = lookup::vdc(api, project_id.as_deref(), target)
            .await
            .context("Error getting vdc")?;
        d.set_all(flatten::vdc(&vdc));
        Ok(())
    }
}

pub struct PublicKeyDataSource;

#[async_trait::async_trait]
impl DataSource for PublicKeyDataSource {
    fn type_name() -> &'static str {
        "bcc_public_key"
    }

    fn schema() -> ResourceSchema {
        let args = context::account_by_id()
            .merge(account::public_key_result())
            .merge(context::get_by_name_or_id("Public Key"));
        ResourceSchema::new(args)
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting public key")?;
        let account_id = d.get_string("account_id");
        let key = lookup::public_key(api, &account_id, target)
            .await
            .context("Error getting public key")?;
        d.set_all(flatten::public_key(&key));
        Ok(())
    }
}

pub struct S3StorageDataSource;

#[async_trait::async_trait]
impl DataSource for S3StorageDataSource {
    fn type_name() -> &'static str {
        "bcc_s3_storage"
    }

    fn schema() -> ResourceSchema {
        let args = context::project_by_id()
            .merge(account::s3_storage_result())
            .merge(context::get_by_name_or_id("S3 storage"));
        ResourceSchema::new(args)
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting S3 storage")?;
        let project = api
            .get_project(&d.get_string("project_id"))
            .await
            .context("Error getting project")?;
        let storage = lookup::s3_storage(api, &project.id, target)
            .await
            .context("Error getting S3 storage")?;
        d.set_all(flatten::s3_storage(&storage));
        Ok(())
    }
}

pub struct DnsDataSource;

#[async_trait::async_trait]
impl DataSource for DnsDataSource {
    fn type_name() -> &'static str {
        "bcc_dns"
    }

    fn schema() -> ResourceSchema {
        let args = context::project_by_id()
            .merge(network::dns_result())
            .merge(context::get_by_name_or_id("Dns"));
        ResourceSchema::new(args)
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting dns")?;
        let project = api
            .get_project(&d.get_string("project_id"))
            .await
            .context("Error getting project")?;
        let dns = lookup::dns(api, &project.id, target).await.context("Error getting dns")?;
        d.set_all(flatten::named(&dns));
        Ok(())
    }
}
