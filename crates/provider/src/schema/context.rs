//! Parent-reference and lookup-key blocks shared across entities

use super::{Arguments, FieldSchema};

pub fn vdc_by_id() -> Arguments {
    Arguments::new().with(
        "vdc_id",
        FieldSchema::string()
            .required()
            .force_new()
            .description("id of the VDC"),
    )
}

/// `vdc_id` for data sources, where a different VDC is a new lookup rather than a replacement
pub fn vdc_by_id_for_data() -> Arguments {
    Arguments::new().with(
        "vdc_id",
        FieldSchema::string().required().description("id of the VDC"),
    )
}

pub fn project_by_id() -> Arguments {
    Arguments::new().with(
        "project_id",
        FieldSchema::string()
            .required()
            .force_new()
            .description("id of the Project"),
    )
}

pub fn project_by_id_optional() -> Arguments {
    Arguments::new().with(
        "project_id",
        FieldSchema::string().optional().description("id of the Project"),
    )
}

pub fn account_by_id() -> Arguments {
    Arguments::new().with(
        "account_id",
        FieldSchema::string().required().description("id of the Account"),
    )
}

/// Overrides the storage profile field of a disk so it can change in place
pub fn storage_profile_by_id() -> Arguments {
    Arguments::new().with(
        "storage_profile_id",
        FieldSchema::string()
            .required()
            .description("id of the StorageProfile"),
    )
}

pub fn s3_storage_by_id() -> Arguments {
    Arguments::new().with(
        "s3_storage_id",
        FieldSchema::string()
            .required()
            .force_new()
            .description("id of the S3 storage"),
    )
}

/// `name` and `id` as optional lookup keys for a data source.
///
/// Merged last so it overrides the computed `name`/`id` of a result block.
pub fn get_by_name_or_id(entity: &str) -> Arguments {
    Arguments::new()
        .with(
            "name",
            FieldSchema::string()
                .optional_computed()
                .description(format!("name of the {}", entity)),
        )
        .with(
            "id",
            FieldSchema::string()
                .optional_computed()
                .description(format!("id of the {}", entity)),
        )
}
