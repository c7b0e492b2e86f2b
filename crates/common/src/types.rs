//! Core types for the BCC management API
//!
//! These mirror the JSON entities returned by the remote API. They live only
//! for the duration of a single handler invocation and are never cached.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of remote entity, used in lookups and error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Vdc,
    Disk,
    Vm,
    StorageProfile,
    Network,
    Subnet,
    FirewallTemplate,
    LoadBalancer,
    Port,
    PublicKey,
    Router,
    Hypervisor,
    Template,
    S3Storage,
    S3StorageBucket,
    Dns,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Project => "Project",
            EntityKind::Vdc => "VDC",
            EntityKind::Disk => "Disk",
            EntityKind::Vm => "VM",
            EntityKind::StorageProfile => "Storage profile",
            EntityKind::Network => "Network",
            EntityKind::Subnet => "Subnet",
            EntityKind::FirewallTemplate => "Firewall template",
            EntityKind::LoadBalancer => "Load balancer",
            EntityKind::Port => "Port",
            EntityKind::PublicKey => "Public key",
            EntityKind::Router => "Router",
            EntityKind::Hypervisor => "Hypervisor",
            EntityKind::Template => "Template",
            EntityKind::S3Storage => "S3 storage",
            EntityKind::S3StorageBucket => "S3 storage bucket",
            EntityKind::Dns => "Dns",
        };
        f.write_str(name)
    }
}

/// Entities that can be found by id or by name
pub trait Named {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Named for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

/// Reference to another entity embedded in an API response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
        }
    }
}

/// Tag attached to an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Virtual datacenter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vdc {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project: EntityRef,
    #[serde(default)]
    pub hypervisor: Option<EntityRef>,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageProfile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Disk {
    pub id: String,
    pub name: String,
    /// Size in gigabytes
    pub size: i64,
    #[serde(default)]
    pub storage_profile: EntityRef,
    #[serde(default)]
    pub vdc: EntityRef,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// VM the disk is attached to, if any
    #[serde(default)]
    pub vm: Option<EntityRef>,
    #[serde(default)]
    pub locked: bool,
}

/// Payload for creating a disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDisk {
    pub name: String,
    pub size: i64,
    pub storage_profile: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Floating (public) IP
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingIp {
    #[serde(default)]
    pub id: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub network: EntityRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vm {
    pub id: String,
    pub name: String,
    pub cpu: i64,
    /// Memory in gigabytes
    pub ram: f64,
    #[serde(default)]
    pub power: bool,
    #[serde(default)]
    pub template: Option<EntityRef>,
    #[serde(default)]
    pub floating: Option<FloatingIp>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub disks: Vec<EntityRef>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mtu: Option<i64>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub vdc: EntityRef,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub locked: bool,
}

/// Payload for creating a network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNetwork {
    pub name: String,
    pub mtu: Option<i64>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub cidr: String,
    pub gateway: String,
    pub start_ip: String,
    pub end_ip: String,
    #[serde(default)]
    pub is_dhcp: bool,
    /// DNS servers in the order the API returns them
    #[serde(default)]
    pub dns_servers: Vec<String>,
}

/// Payload for creating a subnet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubnet {
    pub cidr: String,
    pub gateway: String,
    pub start_ip: String,
    pub end_ip: String,
    pub is_dhcp: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirewallTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub vdc: EntityRef,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub floating: Option<FloatingIp>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicKey {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub public_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Router {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub ports: Vec<Port>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hypervisor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// VM image template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub min_cpu: f64,
    #[serde(default)]
    pub min_ram: f64,
    #[serde(default)]
    pub min_disk: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Storage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub client_endpoint: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub project: EntityRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3StorageBucket {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dns {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project: EntityRef,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl_named!(
    Project,
    Vdc,
    StorageProfile,
    Disk,
    Vm,
    Network,
    FirewallTemplate,
    LoadBalancer,
    PublicKey,
    Router,
    Hypervisor,
    Template,
    S3Storage,
    S3StorageBucket,
    Dns,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_deserializes_with_defaults() {
        let disk: Disk = serde_json::from_str(
            r#"{"id": "d-1", "name": "data", "size": 20, "storage_profile": {"id": "sp-1", "name": "ssd"}}"#,
        )
        .unwrap();

        assert_eq!(disk.storage_profile.name, "ssd");
        assert!(disk.vm.is_none());
        assert!(!disk.locked);
        assert!(disk.tags.is_empty());
    }

    #[test]
    fn test_hypervisor_type_field() {
        let hv: Hypervisor =
            serde_json::from_str(r#"{"id": "h-1", "name": "kvm-1", "type": "kvm"}"#).unwrap();
        assert_eq!(hv.kind, "kvm");
    }
}
