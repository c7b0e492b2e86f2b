//! Network, firewall, load balancer, port and router data sources

use anyhow::{Context, Result};
use bcc_common::Vdc;

use super::{set_list, DataSource};
use crate::client::Manager;
use crate::flatten;
use crate::lookup;
use crate::schema::{context, network, ResourceSchema};
use crate::state::ResourceData;

async fn target_vdc(api: &dyn Manager, d: &ResourceData) -> Result<Vdc> {
    api.get_vdc(&d.get_string("vdc_id"))
        .await
        .context("Error getting vdc")
}

pub struct NetworkDataSource;

#[async_trait::async_trait]
impl DataSource for NetworkDataSource {
    fn type_name() -> &'static str {
        "bcc_network"
    }

    fn schema() -> ResourceSchema {
        let args = context::vdc_by_id_for_data()
            .merge(network::network_result())
            .merge(context::get_by_name_or_id("Network"));
        ResourceSchema::new(args)
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting network")?;
        let vdc = target_vdc(api, d).await?;
        let net = lookup::network(api, &vdc.id, target)
            .await
            .context("Error getting network")?;
        let subnets = api
            .list_subnets(&net.id)
            .await
            .context("subnets: Error getting subnets")?;

        let mut attrs = flatten::named(&net);
        attrs.insert("mtu".to_string(), net.mtu.into());
        attrs.insert("subnets".to_string(), flatten::subnets(&subnets));
        d.set_all(attrs);
        Ok(())
    }
}

pub struct FirewallTemplateDataSource;

#[async_trait::async_trait]
impl DataSource for FirewallTemplateDataSource {
    fn type_name() -> &'static str {
        "bcc_firewall_template"
    }

    fn schema() -> ResourceSchema {
        let args = context::vdc_by_id_for_data()
            .merge(network::firewall_template_result())
            .merge(context::get_by_name_or_id("Firewall Template"));
        ResourceSchema::new(args)
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting firewall template")?;
        let vdc = target_vdc(api, d).await?;
        let template = lookup::firewall_template(api, &vdc.id, target)
            .await
            .context("Error getting firewall template")?;
        d.set_all(flatten::named(&template));
        Ok(())
    }
}

pub struct FirewallTemplatesDataSource;

#[async_trait::async_trait]
impl DataSource for FirewallTemplatesDataSource {
    fn type_name() -> &'static str {
        "bcc_firewall_templates"
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::new(context::vdc_by_id_for_data().merge(network::firewall_template_result_list()))
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let vdc = target_vdc(api, d).await?;
        let templates = api
            .list_firewall_templates(&vdc.id)
            .await
            .context("Error retrieving firewall templates")?;
        set_list(
            d,
            "firewall_templates",
            flatten::list(templates.iter().map(flatten::named).collect()),
        )
    }
}

pub struct LbaasDataSource;

#[async_trait::async_trait]
impl DataSource for LbaasDataSource {
    fn type_name() -> &'static str {
        "bcc_lbaas"
    }

    fn schema() -> ResourceSchema {
        let args = context::vdc_by_id_for_data()
            .merge(network::lbaas_result())
            .merge(context::get_by_name_or_id("Load Balancer"));
        ResourceSchema::new(args)
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting lbaas")?;
        let vdc = target_vdc(api, d).await?;
        let lb = lookup::load_balancer(api, &vdc.id, target)
            .await
            .context("Error getting lbaas")?;
        d.set_all(flatten::load_balancer(&lb));
        Ok(())
    }
}

pub struct PortDataSource;

#[async_trait::async_trait]
impl DataSource for PortDataSource {
    fn type_name() -> &'static str {
        "bcc_port"
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::new(context::vdc_by_id_for_data().merge(network::port_result()))
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let key = lookup::port_key(d).context("Error getting port")?;
        let vdc = target_vdc(api, d).await?;
        let port = lookup::port(api, &vdc.id, key).await.context("Error getting port")?;
        d.set_all(flatten::port(&port));
        Ok(())
    }
}

pub struct RouterDataSource;

#[async_trait::async_trait]
impl DataSource for RouterDataSource {
    fn type_name() -> &'static str {
        "bcc_router"
    }

    fn schema() -> ResourceSchema {
        let args = context::vdc_by_id_for_data()
            .merge(network::router_result())
            .merge(context::get_by_name_or_id("Router"));
        ResourceSchema::new(args)
    }

    async fn read(api: &dyn Manager, d: &mut ResourceData) -> Result<()> {
        let target = lookup::lookup_target(d).context("Error getting router")?;
        let vdc = target_vdc(api, d).await?;
        let router = lookup::router(api, &vdc.id, target)
            .await
            .context("Error getting router")?;
        d.set_all(flatten::named(&router));
        Ok(())
    }
}
