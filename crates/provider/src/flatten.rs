//! Remote entity to record value conversion

use std::collections::BTreeMap;

use bcc_common::*;

use crate::state::{DynamicValue, ResourceData};

pub type Attrs = BTreeMap<String, DynamicValue>;

fn attrs<const N: usize>(pairs: [(&str, DynamicValue); N]) -> Attrs {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Tag names of a record's `tags` attribute as API tags
pub fn tags_from(d: &ResourceData) -> Vec<Tag> {
    d.get_string_list("tags").into_iter().map(Tag::new).collect()
}

pub fn tag_names(tags: &[Tag]) -> DynamicValue {
    DynamicValue::List(tags.iter().map(|t| DynamicValue::from(&t.name)).collect())
}

fn floating_ip(floating: &Option<FloatingIp>) -> DynamicValue {
    floating.as_ref().map(|f| f.ip_address.clone()).into()
}

pub fn subnet(subnet: &Subnet) -> DynamicValue {
    DynamicValue::Map(attrs([
        ("id", subnet.id.as_str().into()),
        ("cidr", subnet.cidr.as_str().into()),
        ("gateway", subnet.gateway.as_str().into()),
        ("start_ip", subnet.start_ip.as_str().into()),
        ("end_ip", subnet.end_ip.as_str().into()),
        ("dhcp", subnet.is_dhcp.into()),
        ("dns", subnet.dns_servers.clone().into()),
    ]))
}

pub fn subnets(subnets: &[Subnet]) -> DynamicValue {
    DynamicValue::List(subnets.iter().map(subnet).collect())
}

pub fn ports(ports: &[Port]) -> DynamicValue {
    DynamicValue::List(
        ports
            .iter()
            .map(|p| {
                DynamicValue::Map(attrs([
                    ("id", p.id.as_str().into()),
                    ("ip_address", p.ip_address.clone().into()),
                ]))
            })
            .collect(),
    )
}

pub fn disk(disk: &Disk) -> Attrs {
    attrs([
        ("id", disk.id.as_str().into()),
        ("name", disk.name.as_str().into()),
        ("size", disk.size.into()),
        ("storage_profile_id", disk.storage_profile.id.as_str().into()),
        ("storage_profile_name", disk.storage_profile.name.as_str().into()),
        ("external_id", disk.external_id.clone().unwrap_or_default().into()),
    ])
}

pub fn vm(vm: &Vm) -> Attrs {
    let template = vm.template.clone().unwrap_or_default();
    attrs([
        ("id", vm.id.as_str().into()),
        ("name", vm.name.as_str().into()),
        ("cpu", vm.cpu.into()),
        ("ram", vm.ram.into()),
        ("template_id", template.id.into()),
        ("template_name", template.name.into()),
        ("floating", vm.floating.is_some().into()),
        ("floating_ip", floating_ip(&vm.floating)),
        ("power", vm.power.into()),
        ("ports", ports(&vm.ports)),
    ])
}

pub fn template(template: &Template) -> Attrs {
    attrs([
        ("id", template.id.as_str().into()),
        ("name", template.name.as_str().into()),
        ("min_cpu", template.min_cpu.into()),
        ("min_ram", template.min_ram.into()),
        ("min_disk", template.min_disk.into()),
    ])
}

pub fn load_balancer(lb: &LoadBalancer) -> Attrs {
    attrs([
        ("id", lb.id.as_str().into()),
        ("name", lb.name.as_str().into()),
        ("floating", lb.floating.is_some().into()),
        ("floating_ip", floating_ip(&lb.floating)),
    ])
}

pub fn port(port: &Port) -> Attrs {
    attrs([
        ("id", port.id.as_str().into()),
        ("ip_address", port.ip_address.clone().into()),
        ("network", port.network.id.as_str().into()),
    ])
}

pub fn public_key(key: &PublicKey) -> Attrs {
    attrs([
        ("id", key.id.as_str().into()),
        ("name", key.name.as_str().into()),
        ("fingerprint", key.fingerprint.as_str().into()),
        ("public_key", key.public_key.as_str().into()),
    ])
}

pub fn hypervisor(hv: &Hypervisor) -> Attrs {
    attrs([
        ("id", hv.id.as_str().into()),
        ("name", hv.name.as_str().into()),
        ("type", hv.kind.as_str().into()),
    ])
}

pub fn vdc(vdc: &Vdc) -> Attrs {
    attrs([
        ("id", vdc.id.as_str().into()),
        ("name", vdc.name.as_str().into()),
        ("hypervisor_id", vdc.hypervisor.as_ref().map(|h| h.id.clone()).into()),
    ])
}

pub fn s3_storage(storage: &S3Storage) -> Attrs {
    attrs([
        ("id", storage.id.as_str().into()),
        ("name", storage.name.as_str().into()),
        ("client_endpoint", storage.client_endpoint.as_str().into()),
        ("access_key", storage.access_key.as_str().into()),
        ("secret_key", storage.secret_key.as_str().into()),
    ])
}

/// `id` and `name` only
pub fn named<T: Named>(entity: &T) -> Attrs {
    attrs([("id", entity.id().into()), ("name", entity.name().into())])
}

/// Wrap flattened entities for a list attribute
pub fn list(items: Vec<Attrs>) -> DynamicValue {
    DynamicValue::List(items.into_iter().map(DynamicValue::Map).collect())
}
