//! Disk, VM, template, hypervisor and storage profile fields

use super::{entity_name, result_list, tag_names, Arguments, FieldSchema, FieldType, Validation};

pub fn disk_create() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the Disk"))
        .with("name", entity_name("name of the Disk"))
        .with(
            "size",
            FieldSchema::int()
                .required()
                .validate(Validation::IntBetween(1, 10000))
                .description("the size of the Disk in gigabytes"),
        )
        .with(
            "storage_profile_id",
            FieldSchema::string()
                .required()
                .description("the id of the StorageProfile"),
        )
        .with(
            "external_id",
            FieldSchema::string()
                .computed()
                .description("external id of the volume. It can be empty"),
        )
        .with("tags", tag_names("tags of the Disk"))
}

pub fn disk_result() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the Disk"))
        .with("name", FieldSchema::string().computed().description("name of the Disk"))
        .with(
            "size",
            FieldSchema::int()
                .computed()
                .description("the size of the Disk in gigabytes"),
        )
        .with(
            "storage_profile_id",
            FieldSchema::string()
                .computed()
                .description("the id of the StorageProfile"),
        )
        .with(
            "storage_profile_name",
            FieldSchema::string()
                .computed()
                .description("the name of the StorageProfile"),
        )
        .with(
            "external_id",
            FieldSchema::string()
                .computed()
                .description("external id of the volume. It can be empty"),
        )
}

pub fn disk_result_list() -> Arguments {
    result_list("disks", disk_result())
}

fn port_block() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("Id of the Port"))
        .with(
            "ip_address",
            FieldSchema::string().computed().description("IP of the Port"),
        )
}

pub fn vm_result() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the Vm"))
        .with("name", FieldSchema::string().computed().description("name of the Vm"))
        .with(
            "cpu",
            FieldSchema::int().computed().description("the number of virtual cpus"),
        )
        .with(
            "ram",
            FieldSchema::float()
                .computed()
                .description("memory of the Vm in gigabytes"),
        )
        .with(
            "template_id",
            FieldSchema::string().computed().description("id of the Template"),
        )
        .with(
            "template_name",
            FieldSchema::string().computed().description("name of the Template"),
        )
        .with(
            "floating",
            FieldSchema::bool()
                .computed()
                .description("enable floating ip for the Vm"),
        )
        .with(
            "floating_ip",
            FieldSchema::string()
                .computed()
                .description("floating_ip of the Vm. May be omitted"),
        )
        .with(
            "power",
            FieldSchema::bool()
                .optional()
                .default_value(true)
                .description("power of vm on/off"),
        )
        .with(
            "ports",
            FieldSchema::list_of_blocks(port_block())
                .computed()
                .description("List of Ports connected to the Vm"),
        )
}

pub fn template_result() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the Template"))
        .with(
            "name",
            FieldSchema::string().computed().description("name of the Template"),
        )
        .with(
            "min_cpu",
            FieldSchema::float()
                .computed()
                .description("minimum cpu required by the Template"),
        )
        .with(
            "min_ram",
            FieldSchema::float()
                .computed()
                .description("minimum ram in GB required by the Template"),
        )
        .with(
            "min_disk",
            FieldSchema::int()
                .computed()
                .description("minimum disk size in GB required by the Template"),
        )
}

pub fn template_result_list() -> Arguments {
    result_list("templates", template_result())
}

pub fn hypervisor_result() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the Hypervisor"))
        .with(
            "name",
            FieldSchema::string().computed().description("name of the Hypervisor"),
        )
        .with(
            "type",
            FieldSchema::string().computed().description("type of the Hypervisor"),
        )
}

pub fn hypervisor_result_list() -> Arguments {
    result_list("hypervisors", hypervisor_result())
}

pub fn storage_profile_result() -> Arguments {
    Arguments::new()
        .with(
            "id",
            FieldSchema::string()
                .computed()
                .description("id of the Storage Profile"),
        )
        .with(
            "name",
            FieldSchema::string()
                .computed()
                .description("name of the Storage Profile"),
        )
}

pub fn storage_profile_result_list() -> Arguments {
    result_list("storage_profiles", storage_profile_result())
}
