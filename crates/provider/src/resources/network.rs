//! Network Resource handler

use anyhow::{Context, Result};
use bcc_common::NewNetwork;
use tracing::info;

use super::{fetched, Fetched, Resource};
use crate::client::{LockTarget, Manager};
use crate::flatten;
use crate::retry::{repeat_on_error, LockHandle, RetryPolicy};
use crate::schema::{context, network, ResourceSchema};
use crate::state::ResourceData;
use crate::subnets;

pub struct NetworkResource;

#[async_trait::async_trait]
impl Resource for NetworkResource {
    fn type_name() -> &'static str {
        "bcc_network"
    }

    fn schema() -> ResourceSchema {
        let args = context::vdc_by_id().merge(network::network_create());
        ResourceSchema::new(args).importable()
    }

    async fn create(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let vdc = api
            .get_vdc(&d.get_string("vdc_id"))
            .await
            .context("vdc_id: Error getting VDC")?;

        let new_network = NewNetwork {
            name: d.get_string("name"),
            mtu: d.get_optional_int("mtu"),
            tags: flatten::tags_from(d),
        };

        api.wait_lock(LockTarget::Vdc(&vdc.id))
            .await
            .context("vdc_id: Error waiting for VDC")?;
        let network = api
            .create_network(&vdc.id, &new_network)
            .await
            .context("Error creating network")?;
        d.set_id(&network.id);

        subnets::reconcile(api, &network.id, &subnets::desired_subnets(d)).await?;
        api.wait_lock(LockTarget::Network(&network.id))
            .await
            .context("Error waiting for network")?;

        info!("Network created, ID: {}", d.id());
        Self::read(api, d).await
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        if d.id().is_empty() {
            return Ok(());
        }
        let network = match fetched(api.get_network(d.id()).await, "id: Error getting network")? {
            Fetched::Found(network) => network,
            Fetched::Gone => {
                d.set_id("");
                return Ok(());
            }
        };

        d.set("name", network.name.as_str());
        d.set("tags", flatten::tag_names(&network.tags));
        d.set("mtu", network.mtu);
        if !network.vdc.id.is_empty() {
            d.set("vdc_id", network.vdc.id.as_str());
        }

        let subnets = api
            .list_subnets(&network.id)
            .await
            .context("subnets: Error getting subnets")?;
        d.set("subnets", flatten::subnets(&subnets));
        Ok(())
    }

    async fn update(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let mut network = api.get_network(d.id()).await.context("id: Error getting network")?;

        let mut should_update = false;
        if d.has_set_change("tags") {
            network.tags = flatten::tags_from(d);
            should_update = true;
        }
        if d.has_change("name") {
            network.name = d.get_string("name");
            should_update = true;
        }
        if d.has_change("mtu") {
            network.mtu = d.get_optional_int("mtu");
            should_update = true;
        }
        if should_update {
            api.update_network(&network)
                .await
                .context("name: Error update network")?;
        }

        if d.has_change("subnets") {
            subnets::reconcile(api, &network.id, &subnets::desired_subnets(d)).await?;
        }

        api.wait_lock(LockTarget::Network(&network.id))
            .await
            .context("Error waiting for network")?;
        Self::read(api, d).await
    }

    async fn delete(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let network = api.get_network(d.id()).await.context("id: Error getting network")?;
        let id = network.id.as_str();

        let lock = LockHandle::new(api, LockTarget::Network(id));
        repeat_on_error(&RetryPolicy::default(), &lock, move || async move {
            api.delete_network(id).await.map_err(anyhow::Error::from)
        })
        .await
        .context("Error deleting network")?;
        api.wait_lock(LockTarget::Network(id))
            .await
            .context("Error waiting for network")?;

        info!("Network deleted, ID: {}", id);
        d.set_id("");
        Ok(())
    }

    async fn import(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        Self::read(api, d).await
    }
}
