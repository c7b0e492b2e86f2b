//! Subnet reconciliation for networks
//!
//! Declared subnets are matched to remote subnets by CIDR. Entries are
//! applied one at a time in declaration order and nothing is rolled back:
//! a failure leaves the mutations that already succeeded in place.

use anyhow::{bail, Context, Result};
use bcc_common::{NewSubnet, Subnet};
use tracing::debug;

use crate::client::Manager;
use crate::state::{DynamicValue, ResourceData};

/// One entry of the `subnets` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredSubnet {
    pub cidr: String,
    pub gateway: String,
    pub start_ip: String,
    pub end_ip: String,
    pub dhcp: bool,
    /// Order is significant
    pub dns: Vec<String>,
}

impl DesiredSubnet {
    pub fn from_value(value: &DynamicValue) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_string())
                .unwrap_or_default()
                .to_string()
        };
        let dns = value
            .get("dns")
            .and_then(|v| v.as_list())
            .unwrap_or(&[])
            .iter()
            .filter_map(|v| v.as_string())
            .map(str::to_string)
            .collect();
        Self {
            cidr: text("cidr"),
            gateway: text("gateway"),
            start_ip: text("start_ip"),
            end_ip: text("end_ip"),
            dhcp: value.get("dhcp").and_then(|v| v.as_bool()).unwrap_or(true),
            dns,
        }
    }

    fn to_new(&self) -> NewSubnet {
        NewSubnet {
            cidr: self.cidr.clone(),
            gateway: self.gateway.clone(),
            start_ip: self.start_ip.clone(),
            end_ip: self.end_ip.clone(),
            is_dhcp: self.dhcp,
        }
    }
}

pub fn desired_subnets(d: &ResourceData) -> Vec<DesiredSubnet> {
    d.get_list("subnets").iter().map(DesiredSubnet::from_value).collect()
}

/// What to do for one declared subnet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubnetChange<'a> {
    Create(&'a DesiredSubnet),
    Update {
        current: &'a Subnet,
        desired: &'a DesiredSubnet,
        /// Address range or DHCP flag differ
        range: bool,
        /// DNS list differs by length or position
        dns: bool,
    },
    Unchanged(&'a Subnet),
}

/// Compare one declared subnet with its CIDR match, if any
pub fn plan_subnet<'a>(desired: &'a DesiredSubnet, current: &'a [Subnet]) -> Result<SubnetChange<'a>> {
    let Some(existing) = current.iter().find(|s| s.cidr == desired.cidr) else {
        return Ok(SubnetChange::Create(desired));
    };
    if existing.gateway != desired.gateway {
        bail!(
            "You cannot change gateway of subnet {} ({} -> {})",
            desired.cidr,
            existing.gateway,
            desired.gateway
        );
    }
    let range = existing.start_ip != desired.start_ip
        || existing.end_ip != desired.end_ip
        || existing.is_dhcp != desired.dhcp;
    let dns = existing.dns_servers != desired.dns;
    if !range && !dns {
        return Ok(SubnetChange::Unchanged(existing));
    }
    Ok(SubnetChange::Update {
        current: existing,
        desired,
        range,
        dns,
    })
}

/// Current subnets whose CIDR is not declared
pub fn obsolete<'a>(desired: &[DesiredSubnet], current: &'a [Subnet]) -> Vec<&'a Subnet> {
    current
        .iter()
        .filter(|s| !desired.iter().any(|d| d.cidr == s.cidr))
        .collect()
}

/// Bring the remote subnets of `network_id` in line with `desired`
pub async fn reconcile(api: &dyn Manager, network_id: &str, desired: &[DesiredSubnet]) -> Result<()> {
    let current = api
        .list_subnets(network_id)
        .await
        .context("subnets: Unable to get subnets")?;

    for entry in desired {
        match plan_subnet(entry, &current)? {
            SubnetChange::Create(want) => {
                debug!("creating subnet {} in network {}", want.cidr, network_id);
                let created = api
                    .create_subnet(network_id, &want.to_new())
                    .await
                    .context("subnets: Error creating subnet")?;
                api.update_subnet_dns(network_id, &created.id, &want.dns)
                    .await
                    .context("dns: Error Update DNS Servers")?;
            }
            SubnetChange::Update {
                current,
                desired: want,
                range,
                dns,
            } => {
                if range {
                    debug!("updating range of subnet {}", current.id);
                    let updated = Subnet {
                        start_ip: want.start_ip.clone(),
                        end_ip: want.end_ip.clone(),
                        is_dhcp: want.dhcp,
                        ..current.clone()
                    };
                    api.update_subnet(network_id, &updated)
                        .await
                        .context("subnets: error update subnet")?;
                }
                if dns {
                    debug!("replacing dns servers of subnet {}", current.id);
                    api.update_subnet_dns(network_id, &current.id, &want.dns)
                        .await
                        .context("dns: Error Update DNS Servers")?;
                }
            }
            SubnetChange::Unchanged(subnet) => {
                debug!("subnet {} unchanged", subnet.cidr);
            }
        }
    }

    for subnet in obsolete(desired, &current) {
        debug!("deleting obsolete subnet {} ({})", subnet.id, subnet.cidr);
        api.delete_subnet(network_id, &subnet.id)
            .await
            .context("subnets: error deleting subnet")?;
    }
    Ok(())
}
