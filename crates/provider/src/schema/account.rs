//! Project, VDC, public key and S3 storage fields

use super::{Arguments, FieldSchema, Validation};

/// Allowed characters of an S3 bucket name
pub const BUCKET_NAME_PATTERN: &str = "[A-Za-z0-9-]+";

pub fn project_result() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the Project"))
        .with(
            "name",
            FieldSchema::string().computed().description("name of the Project"),
        )
}

pub fn vdc_result() -> Arguments {
    Arguments::new()
        .with("id", FieldSchema::string().computed().description("id of the VDC"))
        .with("name", FieldSchema::string().computed().description("name of the VDC"))
        .with(
            "hypervisor_id",
            FieldSchema::string()
                .computed()
                .description("id of the Hypervisor of the VDC"),
        )
}

pub fn public_key_result() -> Arguments {
    Arguments::new()
        .with(
            "id",
            FieldSchema::string().computed().description("id of the Public Key"),
        )
        .with(
            "name",
            FieldSchema::string()
                .computed()
                .description("name of the Public Key"),
        )
        .with(
            "fingerprint",
            FieldSchema::string()
                .computed()
                .description("fingerprint of the Public Key"),
        )
        .with(
            "public_key",
            FieldSchema::string()
                .computed()
                .description("public key material"),
        )
}

pub fn s3_storage_result() -> Arguments {
    Arguments::new()
        .with(
            "id",
            FieldSchema::string().computed().description("id of the S3 storage"),
        )
        .with(
            "name",
            FieldSchema::string()
                .computed()
                .description("name of the S3 storage"),
        )
        .with(
            "client_endpoint",
            FieldSchema::string()
                .computed()
                .description("endpoint for S3 clients"),
        )
        .with(
            "access_key",
            FieldSchema::string()
                .computed()
                .sensitive()
                .description("access key of the S3 storage"),
        )
        .with(
            "secret_key",
            FieldSchema::string()
                .computed()
                .sensitive()
                .description("secret key of the S3 storage"),
        )
}

pub fn s3_bucket_create() -> Arguments {
    Arguments::new()
        .with(
            "id",
            FieldSchema::string().computed().description("id of the S3 bucket"),
        )
        .with(
            "name",
            FieldSchema::string()
                .required()
                .validate(Validation::Pattern(BUCKET_NAME_PATTERN))
                .description("name of the S3 bucket. Letters, digits and `-` only"),
        )
        .with(
            "external_name",
            FieldSchema::string()
                .computed()
                .description("name of the bucket as seen by S3 clients"),
        )
}
