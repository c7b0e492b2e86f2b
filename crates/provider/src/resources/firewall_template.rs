//! Firewall Template Resource handler

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use super::{fetched, Fetched, Resource};
use crate::client::{LockTarget, Manager};
use crate::flatten;
use crate::schema::{context, network, ResourceSchema};
use crate::state::ResourceData;

pub struct FirewallTemplateResource;

#[async_trait::async_trait]
impl Resource for FirewallTemplateResource {
    fn type_name() -> &'static str {
        "bcc_firewall_template"
    }

    fn schema() -> ResourceSchema {
        let args = context::vdc_by_id().merge(network::firewall_template_create());
        ResourceSchema::new(args)
            .importable()
            .with_timeouts(Duration::from_secs(600), Duration::from_secs(600))
    }

    async fn create(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let vdc = api
            .get_vdc(&d.get_string("vdc_id"))
            .await
            .context("vdc_id: Error getting VDC")?;

        api.wait_lock(LockTarget::Vdc(&vdc.id))
            .await
            .context("vdc_id: Error waiting for VDC")?;
        let template = api
            .create_firewall_template(&vdc.id, &d.get_string("name"), &flatten::tags_from(d))
            .await
            .context("Error creating Firewall Template")?;

        d.set_id(&template.id);
        info!("FirewallTemplate created, ID: {}", d.id());
        Self::read(api, d).await
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        if d.id().is_empty() {
            return Ok(());
        }
        let template = match fetched(
            api.get_firewall_template(d.id()).await,
            "id: Error getting Firewall Template",
        )? {
            Fetched::Found(template) => template,
            Fetched::Gone => {
                d.set_id("");
                return Ok(());
            }
        };

        d.set_id(&template.id);
        d.set("name", template.name.as_str());
        d.set("tags", flatten::tag_names(&template.tags));
        if !template.vdc.id.is_empty() {
            d.set("vdc_id", template.vdc.id.as_str());
        }
        Ok(())
    }

    async fn update(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let mut template = api
            .get_firewall_template(d.id())
            .await
            .context("id: Error getting Firewall Template")?;

        let mut should_update = false;
        if d.has_change("name") {
            template.name = d.get_string("name");
            should_update = true;
        }
        if d.has_set_change("tags") {
            template.tags = flatten::tags_from(d);
            should_update = true;
        }
        if should_update {
            api.update_firewall_template(&template)
                .await
                .context("name: Error rename Firewall Template")?;
        }

        Self::read(api, d).await
    }

    async fn delete(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let template = api
            .get_firewall_template(d.id())
            .await
            .context("id: Error getting Firewall Template")?;
        api.delete_firewall_template(&template.id)
            .await
            .context("Error deleting Firewall Template")?;

        info!("FirewallTemplate deleted, ID: {}", template.id);
        d.set_id("");
        Ok(())
    }

    async fn import(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        Self::read(api, d).await
    }
}
