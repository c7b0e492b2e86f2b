//! Client for communicating with the BCC management API
//!
//! [`Manager`] is the seam between handlers and the remote API. Handlers
//! only ever talk to a `&dyn Manager`; [`crate::http::HttpManager`] is the
//! production implementation.

use std::time::Duration;

use async_trait::async_trait;
use bcc_common::*;
use tracing::debug;

/// Entity whose remote lock flag can be polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTarget<'a> {
    Vdc(&'a str),
    Disk(&'a str),
    Network(&'a str),
}

impl LockTarget<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            LockTarget::Vdc(_) => EntityKind::Vdc,
            LockTarget::Disk(_) => EntityKind::Disk,
            LockTarget::Network(_) => EntityKind::Network,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            LockTarget::Vdc(id) | LockTarget::Disk(id) | LockTarget::Network(id) => id,
        }
    }
}

/// Remote management API
#[async_trait]
pub trait Manager: Send + Sync {
    /// Interval between lock polls
    fn lock_poll_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    /// Whether the entity reports an in-progress remote operation
    async fn is_locked(&self, target: LockTarget<'_>) -> Result<bool>;

    /// Block until the entity reports itself unlocked.
    ///
    /// An entity that disappears while waiting counts as unlocked.
    async fn wait_lock(&self, target: LockTarget<'_>) -> Result<()> {
        loop {
            match self.is_locked(target).await {
                Ok(false) => return Ok(()),
                Ok(true) => {
                    debug!("{} {} is locked, waiting", target.kind(), target.id());
                }
                Err(e) if e.is_not_found() => return Ok(()),
                Err(e) => return Err(e),
            }
            tokio::time::sleep(self.lock_poll_interval()).await;
        }
    }

    // Projects and VDCs

    async fn get_project(&self, id: &str) -> Result<Project>;
    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn get_vdc(&self, id: &str) -> Result<Vdc>;
    async fn list_vdcs(&self) -> Result<Vec<Vdc>>;
    async fn list_storage_profiles(&self, vdc_id: &str) -> Result<Vec<StorageProfile>>;
    async fn list_hypervisors(&self, project_id: &str) -> Result<Vec<Hypervisor>>;

    // Disks

    async fn get_disk(&self, id: &str) -> Result<Disk>;
    async fn list_disks(&self, vdc_id: &str) -> Result<Vec<Disk>>;
    async fn create_disk(&self, vdc_id: &str, disk: &NewDisk) -> Result<Disk>;
    /// Generic update of simple fields (name, tags)
    async fn update_disk(&self, disk: &Disk) -> Result<Disk>;
    async fn resize_disk(&self, id: &str, size: i64) -> Result<()>;
    async fn update_disk_storage_profile(&self, id: &str, storage_profile_id: &str) -> Result<()>;
    async fn delete_disk(&self, id: &str) -> Result<()>;

    // VMs

    async fn get_vm(&self, id: &str) -> Result<Vm>;
    async fn list_vms(&self, vdc_id: &str) -> Result<Vec<Vm>>;
    async fn detach_disk(&self, vm_id: &str, disk_id: &str) -> Result<()>;
    async fn list_templates(&self, vdc_id: &str) -> Result<Vec<Template>>;
    async fn get_template(&self, id: &str) -> Result<Template>;

    // Networks and subnets

    async fn get_network(&self, id: &str) -> Result<Network>;
    async fn list_networks(&self, vdc_id: &str) -> Result<Vec<Network>>;
    async fn create_network(&self, vdc_id: &str, network: &NewNetwork) -> Result<Network>;
    async fn update_network(&self, network: &Network) -> Result<Network>;
    async fn delete_network(&self, id: &str) -> Result<()>;
    async fn list_subnets(&self, network_id: &str) -> Result<Vec<Subnet>>;
    async fn create_subnet(&self, network_id: &str, subnet: &NewSubnet) -> Result<Subnet>;
    /// Update the address range and DHCP flag of a subnet
    async fn update_subnet(&self, network_id: &str, subnet: &Subnet) -> Result<()>;
    /// Replace the DNS server list of a subnet
    async fn update_subnet_dns(&self, network_id: &str, subnet_id: &str, dns: &[String]) -> Result<()>;
    async fn delete_subnet(&self, network_id: &str, subnet_id: &str) -> Result<()>;

    // Firewall templates

    async fn get_firewall_template(&self, id: &str) -> Result<FirewallTemplate>;
    async fn list_firewall_templates(&self, vdc_id: &str) -> Result<Vec<FirewallTemplate>>;
    async fn create_firewall_template(
        &self,
        vdc_id: &str,
        name: &str,
        tags: &[Tag],
    ) -> Result<FirewallTemplate>;
    async fn update_firewall_template(&self, template: &FirewallTemplate) -> Result<FirewallTemplate>;
    async fn delete_firewall_template(&self, id: &str) -> Result<()>;

    // Load balancers, ports, routers

    async fn get_load_balancer(&self, id: &str) -> Result<LoadBalancer>;
    async fn list_load_balancers(&self, vdc_id: &str) -> Result<Vec<LoadBalancer>>;
    async fn get_port(&self, id: &str) -> Result<Port>;
    async fn list_ports(&self, vdc_id: &str) -> Result<Vec<Port>>;
    async fn get_router(&self, id: &str) -> Result<Router>;
    async fn list_routers(&self, vdc_id: &str) -> Result<Vec<Router>>;

    // Accounts

    async fn get_public_key(&self, id: &str) -> Result<PublicKey>;
    async fn list_public_keys(&self, account_id: &str) -> Result<Vec<PublicKey>>;

    // S3

    async fn get_s3_storage(&self, id: &str) -> Result<S3Storage>;
    async fn list_s3_storages(&self, project_id: &str) -> Result<Vec<S3Storage>>;
    async fn get_bucket(&self, storage_id: &str, id: &str) -> Result<S3StorageBucket>;
    async fn create_bucket(&self, storage_id: &str, name: &str) -> Result<S3StorageBucket>;
    async fn update_bucket(&self, storage_id: &str, bucket: &S3StorageBucket) -> Result<S3StorageBucket>;
    async fn delete_bucket(&self, storage_id: &str, id: &str) -> Result<()>;

    // DNS

    async fn get_dns(&self, id: &str) -> Result<Dns>;
    async fn list_dns(&self, project_id: &str) -> Result<Vec<Dns>>;
}
