//! Network, subnet, firewall, load balancer, port, router and DNS fields

use super::{entity_name, result_list, tag_names, Arguments, FieldSchema, FieldType};

/// One declared subnet. Subnets are matched by `cidr` during reconciliation.
fn subnet_block() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the Subnet"))
        .with(
            "cidr",
            FieldSchema::string().required().description("cidr of the Subnet"),
        )
        .with(
            "gateway",
            FieldSchema::string()
                .required()
                .description("gateway of the Subnet. Cannot be changed after creation"),
        )
        .with(
            "start_ip",
            FieldSchema::string()
                .required()
                .description("first address of the allocation range"),
        )
        .with(
            "end_ip",
            FieldSchema::string()
                .required()
                .description("last address of the allocation range"),
        )
        .with(
            "dhcp",
            FieldSchema::bool()
                .optional()
                .default_value(true)
                .description("enable DHCP in the Subnet"),
        )
        .with(
            "dns",
            FieldSchema::list_of(FieldType::String)
                .optional()
                .description("ordered list of DNS servers"),
        )
}

fn subnet_result_block() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed())
        .with("cidr", FieldSchema::string().computed())
        .with("gateway", FieldSchema::string().computed())
        .with("start_ip", FieldSchema::string().computed())
        .with("end_ip", FieldSchema::string().computed())
        .with("dhcp", FieldSchema::bool().computed())
        .with("dns", FieldSchema::list_of(FieldType::String).computed())
}

pub fn network_create() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the Network"))
        .with("name", entity_name("name of the Network"))
        .with(
            "mtu",
            FieldSchema::int().optional().description("MTU of the Network"),
        )
        .with("tags", tag_names("tags of the Network"))
        .with(
            "subnets",
            FieldSchema::list_of_blocks(subnet_block())
                .required()
                .description("subnets of the Network"),
        )
}

pub fn network_result() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the Network"))
        .with(
            "name",
            FieldSchema::string().computed().description("name of the Network"),
        )
        .with(
            "mtu",
            FieldSchema::int().computed().description("MTU of the Network"),
        )
        .with(
            "subnets",
            FieldSchema::list_of_blocks(subnet_result_block())
                .computed()
                .description("subnets of the Network"),
        )
}

pub fn firewall_template_create() -> Arguments {
    Arguments::new()
        .with(
            "id",
            FieldSchema::string()
                .computed()
                .description("id of the Firewall Template"),
        )
        .with("name", entity_name("name of the Firewall Template"))
        .with("tags", tag_names("tags of the Firewall Template"))
}

pub fn firewall_template_result() -> Arguments {
    Arguments::new()
        .with(
            "id",
            FieldSchema::string()
                .computed()
                .description("id of the Firewall Template"),
        )
        .with(
            "name",
            FieldSchema::string()
                .computed()
                .description("name of the Firewall Template"),
        )
}

pub fn firewall_template_result_list() -> Arguments {
    result_list("firewall_templates", firewall_template_result())
}

pub fn lbaas_result() -> Arguments {
    Arguments::new()
        .with(
            "id",
            FieldSchema::string()
                .computed()
                .description("id of the Load Balancer"),
        )
        .with(
            "name",
            FieldSchema::string()
                .computed()
                .description("name of the Load Balancer"),
        )
        .with(
            "floating",
            FieldSchema::bool()
                .computed()
                .description("whether the Load Balancer has a floating ip"),
        )
        .with(
            "floating_ip",
            FieldSchema::string()
                .computed()
                .description("floating ip of the Load Balancer. May be omitted"),
        )
}

/// Port lookup keys are `id` or `ip_address`, never both
pub fn port_result() -> Arguments {
    Arguments::new()
        .with(
            "id",
            FieldSchema::string()
                .optional_computed()
                .description("id of the Port"),
        )
        .with(
            "ip_address",
            FieldSchema::string()
                .optional_computed()
                .description("IP of the Port"),
        )
        .with(
            "network",
            FieldSchema::string()
                .computed()
                .description("id of the Network of the Port"),
        )
}

pub fn router_result() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the Router"))
        .with(
            "name",
            FieldSchema::string().computed().description("name of the Router"),
        )
}

pub fn dns_result() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the Dns"))
        .with(
            "name",
            FieldSchema::string().computed().description("name of the Dns"),
        )
}
