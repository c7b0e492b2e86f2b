//! In-memory management API shared by the integration tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bcc_common::*;
use bcc_provider::client::{LockTarget, Manager};
use uuid::Uuid;

#[derive(Default)]
pub struct World {
    pub projects: Vec<Project>,
    pub vdcs: Vec<Vdc>,
    pub storage_profiles: HashMap<String, Vec<StorageProfile>>,
    pub hypervisors: HashMap<String, Vec<Hypervisor>>,
    pub disks: Vec<Disk>,
    pub vms: Vec<(String, Vm)>,
    pub templates: Vec<(String, Template)>,
    pub networks: Vec<Network>,
    pub subnets: HashMap<String, Vec<Subnet>>,
    pub firewall_templates: Vec<FirewallTemplate>,
    pub load_balancers: Vec<(String, LoadBalancer)>,
    pub ports: Vec<(String, Port)>,
    pub routers: Vec<(String, Router)>,
    pub public_keys: Vec<(String, PublicKey)>,
    pub s3_storages: Vec<S3Storage>,
    pub buckets: HashMap<String, Vec<S3StorageBucket>>,
    pub dns: Vec<Dns>,
}

#[derive(Default)]
pub struct FakeManager {
    pub world: Mutex<World>,
    calls: Mutex<Vec<String>>,
    /// Remaining polls for which an entity reports itself locked
    locks: Mutex<HashMap<String, u32>>,
    /// Remaining forced failures per operation name
    failures: Mutex<HashMap<&'static str, u32>>,
}

#[allow(dead_code)]
impl FakeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A project `prj-1` holding VDC `vdc-1` with storage profiles `sp-ssd` and `sp-hdd`
    pub fn with_vdc() -> Self {
        let fake = Self::new();
        {
            let mut world = fake.world.lock().unwrap();
            world.projects.push(Project {
                id: "prj-1".into(),
                name: "Main".into(),
                tags: vec![],
            });
            world.vdcs.push(Vdc {
                id: "vdc-1".into(),
                name: "Moscow".into(),
                project: EntityRef::new("prj-1"),
                hypervisor: Some(EntityRef::new("hv-1")),
                locked: false,
            });
            world.storage_profiles.insert(
                "vdc-1".into(),
                vec![
                    StorageProfile {
                        id: "sp-ssd".into(),
                        name: "ssd".into(),
                    },
                    StorageProfile {
                        id: "sp-hdd".into(),
                        name: "hdd".into(),
                    },
                ],
            );
        }
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Logged calls whose operation name is `op`
    pub fn calls_to(&self, op: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.split(':').next() == Some(op))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn lock_for(&self, id: &str, polls: u32) {
        self.locks.lock().unwrap().insert(id.to_string(), polls);
    }

    pub fn remaining_lock(&self, id: &str) -> u32 {
        self.locks.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn fail_times(&self, op: &'static str, times: u32) {
        self.failures.lock().unwrap().insert(op, times);
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(&self, op: &'static str) -> Result<()> {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(op) {
            Some(n) if *n > 0 => {
                *n -= 1;
                Err(Error::Conflict(format!("{} is busy", op)))
            }
            _ => Ok(()),
        }
    }
}

pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

fn not_found(kind: EntityKind, id: &str) -> Error {
    Error::NotFound {
        kind: kind.to_string(),
        id: id.to_string(),
    }
}

fn find<T: Named + Clone>(items: &[T], kind: EntityKind, id: &str) -> Result<T> {
    items
        .iter()
        .find(|item| item.id() == id)
        .cloned()
        .ok_or_else(|| not_found(kind, id))
}

fn find_scoped<T: Named + Clone>(items: &[(String, T)], kind: EntityKind, id: &str) -> Result<T> {
    items
        .iter()
        .map(|(_, item)| item)
        .find(|item| item.id() == id)
        .cloned()
        .ok_or_else(|| not_found(kind, id))
}

fn scoped<T: Clone>(items: &[(String, T)], parent: &str) -> Vec<T> {
    items
        .iter()
        .filter(|(p, _)| p == parent)
        .map(|(_, item)| item.clone())
        .collect()
}

#[async_trait]
impl Manager for FakeManager {
    fn lock_poll_interval(&self) -> Duration {
        Duration::ZERO
    }

    async fn is_locked(&self, target: LockTarget<'_>) -> Result<bool> {
        self.record(format!("is_locked:{}", target.id()));
        let exists = {
            let world = self.world.lock().unwrap();
            match target {
                LockTarget::Vdc(id) => world.vdcs.iter().any(|v| v.id == id),
                LockTarget::Disk(id) => world.disks.iter().any(|d| d.id == id),
                LockTarget::Network(id) => world.networks.iter().any(|n| n.id == id),
            }
        };
        if !exists {
            return Err(not_found(target.kind(), target.id()));
        }
        let mut locks = self.locks.lock().unwrap();
        match locks.get_mut(target.id()) {
            Some(n) if *n > 0 => {
                *n -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_project(&self, id: &str) -> Result<Project> {
        self.record(format!("get_project:{}", id));
        find(&self.world.lock().unwrap().projects, EntityKind::Project, id)
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.record("list_projects".into());
        Ok(self.world.lock().unwrap().projects.clone())
    }

    async fn get_vdc(&self, id: &str) -> Result<Vdc> {
        self.record(format!("get_vdc:{}", id));
        find(&self.world.lock().unwrap().vdcs, EntityKind::Vdc, id)
    }

    async fn list_vdcs(&self) -> Result<Vec<Vdc>> {
        self.record("list_vdcs".into());
        Ok(self.world.lock().unwrap().vdcs.clone())
    }

    async fn list_storage_profiles(&self, vdc_id: &str) -> Result<Vec<StorageProfile>> {
        self.record(format!("list_storage_profiles:{}", vdc_id));
        let world = self.world.lock().unwrap();
        Ok(world.storage_profiles.get(vdc_id).cloned().unwrap_or_default())
    }

    async fn list_hypervisors(&self, project_id: &str) -> Result<Vec<Hypervisor>> {
        self.record(format!("list_hypervisors:{}", project_id));
        let world = self.world.lock().unwrap();
        Ok(world.hypervisors.get(project_id).cloned().unwrap_or_default())
    }

    async fn get_disk(&self, id: &str) -> Result<Disk> {
        self.record(format!("get_disk:{}", id));
        find(&self.world.lock().unwrap().disks, EntityKind::Disk, id)
    }

    async fn list_disks(&self, vdc_id: &str) -> Result<Vec<Disk>> {
        self.record(format!("list_disks:{}", vdc_id));
        let world = self.world.lock().unwrap();
        Ok(world.disks.iter().filter(|d| d.vdc.id == vdc_id).cloned().collect())
    }

    async fn create_disk(&self, vdc_id: &str, disk: &NewDisk) -> Result<Disk> {
        self.record(format!("create_disk:{}", disk.name));
        self.injected("create_disk")?;
        let created = Disk {
            id: new_id("disk"),
            name: disk.name.clone(),
            size: disk.size,
            storage_profile: EntityRef::new(&disk.storage_profile),
            vdc: EntityRef::new(vdc_id),
            external_id: Some(new_id("ext")),
            tags: disk.tags.clone(),
            vm: None,
            locked: false,
        };
        self.world.lock().unwrap().disks.push(created.clone());
        Ok(created)
    }

    async fn update_disk(&self, disk: &Disk) -> Result<Disk> {
        self.record(format!("update_disk:{}", disk.id));
        let mut world = self.world.lock().unwrap();
        let stored = world
            .disks
            .iter_mut()
            .find(|d| d.id == disk.id)
            .ok_or_else(|| not_found(EntityKind::Disk, &disk.id))?;
        stored.name = disk.name.clone();
        stored.tags = disk.tags.clone();
        Ok(stored.clone())
    }

    async fn resize_disk(&self, id: &str, size: i64) -> Result<()> {
        self.record(format!("resize_disk:{}:{}", id, size));
        let mut world = self.world.lock().unwrap();
        let stored = world
            .disks
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(EntityKind::Disk, id))?;
        stored.size = size;
        Ok(())
    }

    async fn update_disk_storage_profile(&self, id: &str, storage_profile_id: &str) -> Result<()> {
        self.record(format!("update_disk_storage_profile:{}:{}", id, storage_profile_id));
        let mut world = self.world.lock().unwrap();
        let stored = world
            .disks
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(EntityKind::Disk, id))?;
        stored.storage_profile = EntityRef::new(storage_profile_id);
        Ok(())
    }

    async fn delete_disk(&self, id: &str) -> Result<()> {
        self.record(format!("delete_disk:{}", id));
        let mut world = self.world.lock().unwrap();
        let before = world.disks.len();
        world.disks.retain(|d| d.id != id);
        if world.disks.len() == before {
            return Err(not_found(EntityKind::Disk, id));
        }
        Ok(())
    }

    async fn get_vm(&self, id: &str) -> Result<Vm> {
        self.record(format!("get_vm:{}", id));
        find_scoped(&self.world.lock().unwrap().vms, EntityKind::Vm, id)
    }

    async fn list_vms(&self, vdc_id: &str) -> Result<Vec<Vm>> {
        self.record(format!("list_vms:{}", vdc_id));
        Ok(scoped(&self.world.lock().unwrap().vms, vdc_id))
    }

    async fn detach_disk(&self, vm_id: &str, disk_id: &str) -> Result<()> {
        self.record(format!("detach_disk:{}:{}", vm_id, disk_id));
        let mut world = self.world.lock().unwrap();
        if let Some(disk) = world.disks.iter_mut().find(|d| d.id == disk_id) {
            disk.vm = None;
        }
        for (_, vm) in world.vms.iter_mut().filter(|(_, vm)| vm.id == vm_id) {
            vm.disks.retain(|d| d.id != disk_id);
        }
        Ok(())
    }

    async fn list_templates(&self, vdc_id: &str) -> Result<Vec<Template>> {
        self.record(format!("list_templates:{}", vdc_id));
        Ok(scoped(&self.world.lock().unwrap().templates, vdc_id))
    }

    async fn get_template(&self, id: &str) -> Result<Template> {
        self.record(format!("get_template:{}", id));
        find_scoped(&self.world.lock().unwrap().templates, EntityKind::Template, id)
    }

    async fn get_network(&self, id: &str) -> Result<Network> {
        self.record(format!("get_network:{}", id));
        find(&self.world.lock().unwrap().networks, EntityKind::Network, id)
    }

    async fn list_networks(&self, vdc_id: &str) -> Result<Vec<Network>> {
        self.record(format!("list_networks:{}", vdc_id));
        let world = self.world.lock().unwrap();
        Ok(world.networks.iter().filter(|n| n.vdc.id == vdc_id).cloned().collect())
    }

    async fn create_network(&self, vdc_id: &str, network: &NewNetwork) -> Result<Network> {
        self.record(format!("create_network:{}", network.name));
        let created = Network {
            id: new_id("net"),
            name: network.name.clone(),
            mtu: network.mtu.or(Some(1500)),
            tags: network.tags.clone(),
            vdc: EntityRef::new(vdc_id),
            is_default: false,
            locked: false,
        };
        let mut world = self.world.lock().unwrap();
        world.networks.push(created.clone());
        world.subnets.insert(created.id.clone(), vec![]);
        Ok(created)
    }

    async fn update_network(&self, network: &Network) -> Result<Network> {
        self.record(format!("update_network:{}", network.id));
        let mut world = self.world.lock().unwrap();
        let stored = world
            .networks
            .iter_mut()
            .find(|n| n.id == network.id)
            .ok_or_else(|| not_found(EntityKind::Network, &network.id))?;
        stored.name = network.name.clone();
        stored.mtu = network.mtu;
        stored.tags = network.tags.clone();
        Ok(stored.clone())
    }

    async fn delete_network(&self, id: &str) -> Result<()> {
        self.record(format!("delete_network:{}", id));
        self.injected("delete_network")?;
        let mut world = self.world.lock().unwrap();
        world.networks.retain(|n| n.id != id);
        world.subnets.remove(id);
        Ok(())
    }

    async fn list_subnets(&self, network_id: &str) -> Result<Vec<Subnet>> {
        self.record(format!("list_subnets:{}", network_id));
        let world = self.world.lock().unwrap();
        Ok(world.subnets.get(network_id).cloned().unwrap_or_default())
    }

    async fn create_subnet(&self, network_id: &str, subnet: &NewSubnet) -> Result<Subnet> {
        self.record(format!("create_subnet:{}", subnet.cidr));
        let created = Subnet {
            id: new_id("subnet"),
            cidr: subnet.cidr.clone(),
            gateway: subnet.gateway.clone(),
            start_ip: subnet.start_ip.clone(),
            end_ip: subnet.end_ip.clone(),
            is_dhcp: subnet.is_dhcp,
            dns_servers: vec![],
        };
        self.world
            .lock()
            .unwrap()
            .subnets
            .entry(network_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_subnet(&self, network_id: &str, subnet: &Subnet) -> Result<()> {
        self.record(format!("update_subnet:{}", subnet.id));
        let mut world = self.world.lock().unwrap();
        let stored = world
            .subnets
            .get_mut(network_id)
            .and_then(|list| list.iter_mut().find(|s| s.id == subnet.id))
            .ok_or_else(|| not_found(EntityKind::Subnet, &subnet.id))?;
        stored.start_ip = subnet.start_ip.clone();
        stored.end_ip = subnet.end_ip.clone();
        stored.is_dhcp = subnet.is_dhcp;
        Ok(())
    }

    async fn update_subnet_dns(&self, network_id: &str, subnet_id: &str, dns: &[String]) -> Result<()> {
        self.record(format!("update_subnet_dns:{}:{}", subnet_id, dns.join(",")));
        let mut world = self.world.lock().unwrap();
        let stored = world
            .subnets
            .get_mut(network_id)
            .and_then(|list| list.iter_mut().find(|s| s.id == subnet_id))
            .ok_or_else(|| not_found(EntityKind::Subnet, subnet_id))?;
        stored.dns_servers = dns.to_vec();
        Ok(())
    }

    async fn delete_subnet(&self, network_id: &str, subnet_id: &str) -> Result<()> {
        self.record(format!("delete_subnet:{}", subnet_id));
        let mut world = self.world.lock().unwrap();
        if let Some(list) = world.subnets.get_mut(network_id) {
            list.retain(|s| s.id != subnet_id);
        }
        Ok(())
    }

    async fn get_firewall_template(&self, id: &str) -> Result<FirewallTemplate> {
        self.record(format!("get_firewall_template:{}", id));
        find(
            &self.world.lock().unwrap().firewall_templates,
            EntityKind::FirewallTemplate,
            id,
        )
    }

    async fn list_firewall_templates(&self, vdc_id: &str) -> Result<Vec<FirewallTemplate>> {
        self.record(format!("list_firewall_templates:{}", vdc_id));
        let world = self.world.lock().unwrap();
        Ok(world
            .firewall_templates
            .iter()
            .filter(|t| t.vdc.id == vdc_id)
            .cloned()
            .collect())
    }

    async fn create_firewall_template(&self, vdc_id: &str, name: &str, tags: &[Tag]) -> Result<FirewallTemplate> {
        self.record(format!("create_firewall_template:{}", name));
        let created = FirewallTemplate {
            id: new_id("fw"),
            name: name.to_string(),
            vdc: EntityRef::new(vdc_id),
            tags: tags.to_vec(),
        };
        self.world.lock().unwrap().firewall_templates.push(created.clone());
        Ok(created)
    }

    async fn update_firewall_template(&self, template: &FirewallTemplate) -> Result<FirewallTemplate> {
        self.record(format!("update_firewall_template:{}", template.id));
        let mut world = self.world.lock().unwrap();
        let stored = world
            .firewall_templates
            .iter_mut()
            .find(|t| t.id == template.id)
            .ok_or_else(|| not_found(EntityKind::FirewallTemplate, &template.id))?;
        stored.name = template.name.clone();
        stored.tags = template.tags.clone();
        Ok(stored.clone())
    }

    async fn delete_firewall_template(&self, id: &str) -> Result<()> {
        self.record(format!("delete_firewall_template:{}", id));
        self.world.lock().unwrap().firewall_templates.retain(|t| t.id != id);
        Ok(())
    }

    async fn get_load_balancer(&self, id: &str) -> Result<LoadBalancer> {
        self.record(format!("get_load_balancer:{}", id));
        find_scoped(&self.world.lock().unwrap().load_balancers, EntityKind::LoadBalancer, id)
    }

    async fn list_load_balancers(&self, vdc_id: &str) -> Result<Vec<LoadBalancer>> {
        self.record(format!("list_load_balancers:{}", vdc_id));
        Ok(scoped(&self.world.lock().unwrap().load_balancers, vdc_id))
    }

    async fn get_port(&self, id: &str) -> Result<Port> {
        self.record(format!("get_port:{}", id));
        self.world
            .lock()
            .unwrap()
            .ports
            .iter()
            .map(|(_, port)| port)
            .find(|port| port.id == id)
            .cloned()
            .ok_or_else(|| not_found(EntityKind::Port, id))
    }

    async fn list_ports(&self, vdc_id: &str) -> Result<Vec<Port>> {
        self.record(format!("list_ports:{}", vdc_id));
        Ok(scoped(&self.world.lock().unwrap().ports, vdc_id))
    }

    async fn get_router(&self, id: &str) -> Result<Router> {
        self.record(format!("get_router:{}", id));
        find_scoped(&self.world.lock().unwrap().routers, EntityKind::Router, id)
    }

    async fn list_routers(&self, vdc_id: &str) -> Result<Vec<Router>> {
        self.record(format!("list_routers:{}", vdc_id));
        Ok(scoped(&self.world.lock().unwrap().routers, vdc_id))
    }

    async fn get_public_key(&self, id: &str) -> Result<PublicKey> {
        self.record(format!("get_public_key:{}", id));
        find_scoped(&self.world.lock().unwrap().public_keys, EntityKind::PublicKey, id)
    }

    async fn list_public_keys(&self, account_id: &str) -> Result<Vec<PublicKey>> {
        self.record(format!("list_public_keys:{}", account_id));
        Ok(scoped(&self.world.lock().unwrap().public_keys, account_id))
    }

    async fn get_s3_storage(&self, id: &str) -> Result<S3Storage> {
        self.record(format!("get_s3_storage:{}", id));
        find(&self.world.lock().unwrap().s3_storages, EntityKind::S3Storage, id)
    }

    async fn list_s3_storages(&self, project_id: &str) -> Result<Vec<S3Storage>> {
        self.record(format!("list_s3_storages:{}", project_id));
        let world = self.world.lock().unwrap();
        Ok(world
            .s3_storages
            .iter()
            .filter(|s| s.project.id == project_id)
            .cloned()
            .collect())
    }

    async fn get_bucket(&self, storage_id: &str, id: &str) -> Result<S3StorageBucket> {
        self.record(format!("get_bucket:{}:{}", storage_id, id));
        let world = self.world.lock().unwrap();
        find(
            world.buckets.get(storage_id).map(Vec::as_slice).unwrap_or(&[]),
            EntityKind::S3StorageBucket,
            id,
        )
    }

    async fn create_bucket(&self, storage_id: &str, name: &str) -> Result<S3StorageBucket> {
        self.record(format!("create_bucket:{}:{}", storage_id, name));
        let created = S3StorageBucket {
            id: new_id("bucket"),
            name: name.to_string(),
            external_name: format!("{}-{}", storage_id, name),
        };
        self.world
            .lock()
            .unwrap()
            .buckets
            .entry(storage_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_bucket(&self, storage_id: &str, bucket: &S3StorageBucket) -> Result<S3StorageBucket> {
        self.record(format!("update_bucket:{}:{}", storage_id, bucket.id));
        let mut world = self.world.lock().unwrap();
        let stored = world
            .buckets
            .get_mut(storage_id)
            .and_then(|list| list.iter_mut().find(|b| b.id == bucket.id))
            .ok_or_else(|| not_found(EntityKind::S3StorageBucket, &bucket.id))?;
        stored.name = bucket.name.clone();
        Ok(stored.clone())
    }

    async fn delete_bucket(&self, storage_id: &str, id: &str) -> Result<()> {
        self.record(format!("delete_bucket:{}:{}", storage_id, id));
        if let Some(list) = self.world.lock().unwrap().buckets.get_mut(storage_id) {
            list.retain(|b| b.id != id);
        }
        Ok(())
    }

    async fn get_dns(&self, id: &str) -> Result<Dns> {
        self.record(format!("get_dns:{}", id));
        find(&self.world.lock().unwrap().dns, EntityKind::Dns, id)
    }

    async fn list_dns(&self, project_id: &str) -> Result<Vec<Dns>> {
        self.record(format!("list_dns:{}", project_id));
        let world = self.world.lock().unwrap();
        Ok(world.dns.iter().filter(|d| d.project.id == project_id).cloned().collect())
    }
}
