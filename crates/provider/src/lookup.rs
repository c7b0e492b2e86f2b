//! Entity lookup by id or by name
//!
//! Data sources identify their target with either an `id` or a `name`.
//! An id is a point lookup; a name lists the entities under the parent
//! context and takes the first case-insensitive match.

use anyhow::{anyhow, bail, Result};
use bcc_common::*;

use crate::client::Manager;
use crate::state::ResourceData;

/// How a record identifies its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTarget {
    Id(String),
    Name(String),
}

/// Read the lookup key of a record. `id` wins when both are set.
///
/// Fails without touching the API when neither is set.
pub fn lookup_target(d: &ResourceData) -> Result<LookupTarget> {
    if let Some(id) = d.get_optional_string("id") {
        return Ok(LookupTarget::Id(id));
    }
    if let Some(name) = d.get_optional_string("name") {
        return Ok(LookupTarget::Name(name));
    }
    bail!("Must be specified 'name' or 'id'")
}

/// First item matching `predicate`, in API order
pub fn find_by<T>(items: Vec<T>, predicate: impl Fn(&T) -> bool) -> Option<T> {
    items.into_iter().find(|item| predicate(item))
}

/// First item whose name equals `name` ignoring case
pub fn find_by_name<T: Named>(items: Vec<T>, kind: EntityKind, name: &str) -> Result<T> {
    let wanted = name.to_lowercase();
    find_by(items, |item| item.name().to_lowercase() == wanted)
        .ok_or_else(|| anyhow!("ERROR: {} with name '{}' not found", kind, name))
}

/// Storage profiles have no point lookup; scan the VDC's profiles for `id`
pub async fn storage_profile_by_id(api: &dyn Manager, vdc_id: &str, id: &str) -> Result<StorageProfile> {
    find_by(api.list_storage_profiles(vdc_id).await?, |profile| profile.id == id)
        .ok_or_else(|| anyhow!("ERROR: {} with id '{}' not found", EntityKind::StorageProfile, id))
}

pub async fn project(api: &dyn Manager, target: LookupTarget) -> Result<Project> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_project(&id).await?),
        LookupTarget::Name(name) => find_by_name(api.list_projects().await?, EntityKind::Project, &name),
    }
}

/// VDC by id or name. A name lookup is scoped to `project_id` when given.
pub async fn vdc(api: &dyn Manager, project_id: Option<&str>, target: LookupTarget) -> Result<Vdc> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_vdc(&id).await?),
        LookupTarget::Name(name) => {
            let mut vdcs = api.list_vdcs().await?;
            if let Some(project_id) = project_id {
                vdcs.retain(|vdc| vdc.project.id == project_id);
            }
            find_by_name(vdcs, EntityKind::Vdc, &name)
        }
    }
}

pub async fn disk(api: &dyn Manager, vdc_id: &str, target: LookupTarget) -> Result<Disk> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_disk(&id).await?),
        LookupTarget::Name(name) => find_by_name(api.list_disks(vdc_id).await?, EntityKind::Disk, &name),
    }
}

pub async fn network(api: &dyn Manager, vdc_id: &str, target: LookupTarget) -> Result<Network> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_network(&id).await?),
        LookupTarget::Name(name) => {
            find_by_name(api.list_networks(vdc_id).await?, EntityKind::Network, &name)
        }
    }
}

pub async fn firewall_template(api: &dyn Manager, vdc_id: &str, target: LookupTarget) -> Result<FirewallTemplate> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_firewall_template(&id).await?),
        LookupTarget::Name(name) => find_by_name(
            api.list_firewall_templates(vdc_id).await?,
            EntityKind::FirewallTemplate,
            &name,
        ),
    }
}

pub async fn load_balancer(api: &dyn Manager, vdc_id: &str, target: LookupTarget) -> Result<LoadBalancer> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_load_balancer(&id).await?),
        LookupTarget::Name(name) => find_by_name(
            api.list_load_balancers(vdc_id).await?,
            EntityKind::LoadBalancer,
            &name,
        ),
    }
}

pub async fn router(api: &dyn Manager, vdc_id: &str, target: LookupTarget) -> Result<Router> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_router(&id).await?),
        LookupTarget::Name(name) => find_by_name(api.list_routers(vdc_id).await?, EntityKind::Router, &name),
    }
}

pub async fn template(api: &dyn Manager, vdc_id: &str, target: LookupTarget) -> Result<Template> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_template(&id).await?),
        LookupTarget::Name(name) => {
            find_by_name(api.list_templates(vdc_id).await?, EntityKind::Template, &name)
        }
    }
}

pub async fn vm(api: &dyn Manager, vdc_id: &str, target: LookupTarget) -> Result<Vm> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_vm(&id).await?),
        LookupTarget::Name(name) => find_by_name(api.list_vms(vdc_id).await?, EntityKind::Vm, &name),
    }
}

pub async fn public_key(api: &dyn Manager, account_id: &str, target: LookupTarget) -> Result<PublicKey> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_public_key(&id).await?),
        LookupTarget::Name(name) => find_by_name(
            api.list_public_keys(account_id).await?,
            EntityKind::PublicKey,
            &name,
        ),
    }
}

pub async fn s3_storage(api: &dyn Manager, project_id: &str, target: LookupTarget) -> Result<S3Storage> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_s3_storage(&id).await?),
        LookupTarget::Name(name) => find_by_name(
            api.list_s3_storages(project_id).await?,
            EntityKind::S3Storage,
            &name,
        ),
    }
}

pub async fn dns(api: &dyn Manager, project_id: &str, target: LookupTarget) -> Result<Dns> {
    match target {
        LookupTarget::Id(id) => Ok(api.get_dns(&id).await?),
        LookupTarget::Name(name) => find_by_name(api.list_dns(project_id).await?, EntityKind::Dns, &name),
    }
}

/// How a port data source identifies its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortKey {
    Id(String),
    Ip(String),
}

/// Read the port key of a record. Exactly one of `id` and `ip_address` must be set.
pub fn port_key(d: &ResourceData) -> Result<PortKey> {
    match (d.get_optional_string("id"), d.get_optional_string("ip_address")) {
        (Some(id), None) => Ok(PortKey::Id(id)),
        (None, Some(ip)) => Ok(PortKey::Ip(ip)),
        _ => bail!("For getting the port must be specified id or ip"),
    }
}

pub async fn port(api: &dyn Manager, vdc_id: &str, key: PortKey) -> Result<Port> {
    match key {
        PortKey::Id(id) => Ok(api.get_port(&id).await?),
        PortKey::Ip(ip) => find_by(api.list_ports(vdc_id).await?, |port| {
            port.ip_address.as_deref() == Some(ip.as_str())
        })
        .ok_or_else(|| anyhow!("ERROR: Port with ip '{}' not found", ip)),
    }
}
