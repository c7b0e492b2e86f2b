//! BCC Provider Implementation
//!
//! Dispatches host requests by type name to the resource and data source
//! handlers and converts failures into diagnostics.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::client::Manager;
use crate::config::{self, ProviderConfig};
use crate::data_sources::account::{
    DnsDataSource, ProjectDataSource, PublicKeyDataSource, S3StorageDataSource, VdcDataSource,
};
use crate::data_sources::compute::{
    DiskDataSource, DisksDataSource, HypervisorsDataSource, StorageProfilesDataSource,
    TemplateDataSource, TemplatesDataSource, VmDataSource,
};
use crate::data_sources::network::{
    FirewallTemplateDataSource, FirewallTemplatesDataSource, LbaasDataSource, NetworkDataSource,
    PortDataSource, RouterDataSource,
};
use crate::data_sources::DataSource;
use crate::http::HttpManager;
use crate::resources::disk::DiskResource;
use crate::resources::firewall_template::FirewallTemplateResource;
use crate::resources::network::NetworkResource;
use crate::resources::s3_bucket::S3BucketResource;
use crate::resources::Resource;
use crate::schema::{Arguments, ResourceSchema, ValidationIssue};
use crate::state::{DynamicValue, ResourceData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Structured failure report returned to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    fn from_issue(issue: ValidationIssue) -> Self {
        Self {
            severity: Severity::Error,
            summary: "Invalid configuration".to_string(),
            detail: issue.message,
            attribute: Some(issue.attribute),
        }
    }
}

/// New state plus any diagnostics. `state` is null when the entity does not exist.
#[derive(Debug, Clone, Serialize)]
pub struct StateResponse {
    pub state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

impl StateResponse {
    fn ok(state: DynamicValue) -> Self {
        Self {
            state,
            diagnostics: vec![],
        }
    }

    fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            state: DynamicValue::Null,
            diagnostics: vec![diagnostic],
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Everything the host needs to know about field shapes
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSchema {
    pub provider: Arguments,
    pub resource_schemas: BTreeMap<String, ResourceSchema>,
    pub data_source_schemas: BTreeMap<String, ResourceSchema>,
}

#[derive(Debug, Clone, Copy)]
enum ResourceOp {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

async fn run<R: Resource>(op: ResourceOp, api: &dyn Manager, d: &mut ResourceData) -> anyhow::Result<()> {
    match op {
        ResourceOp::Create => R::create(api, d).await,
        ResourceOp::Read => R::read(api, d).await,
        ResourceOp::Update => R::update(api, d).await,
        ResourceOp::Delete => R::delete(api, d).await,
        ResourceOp::Import => R::import(api, d).await,
    }
}

pub fn resource_schemas() -> BTreeMap<String, ResourceSchema> {
    fn of<R: Resource>() -> (String, ResourceSchema) {
        (R::type_name().to_string(), R::schema())
    }
    [
        of::<DiskResource>(),
        of::<NetworkResource>(),
        of::<FirewallTemplateResource>(),
        of::<S3BucketResource>(),
    ]
    .into_iter()
    .collect()
}

pub fn data_source_schemas() -> BTreeMap<String, ResourceSchema> {
    fn of<D: DataSource>() -> (String, ResourceSchema) {
        (D::type_name().to_string(), D::schema())
    }
    [
        of::<DiskDataSource>(),
        of::<DisksDataSource>(),
        of::<NetworkDataSource>(),
        of::<FirewallTemplateDataSource>(),
        of::<FirewallTemplatesDataSource>(),
        of::<LbaasDataSource>(),
        of::<PortDataSource>(),
        of::<PublicKeyDataSource>(),
        of::<RouterDataSource>(),
        of::<HypervisorsDataSource>(),
        of::<StorageProfilesDataSource>(),
        of::<TemplateDataSource>(),
        of::<TemplatesDataSource>(),
        of::<VmDataSource>(),
        of::<ProjectDataSource>(),
        of::<VdcDataSource>(),
        of::<S3StorageDataSource>(),
        of::<DnsDataSource>(),
    ]
    .into_iter()
    .collect()
}

/// BCC Terraform Provider
pub struct BccProvider {
    /// Client for the management API
    api: Arc<dyn Manager>,
}

impl BccProvider {
    pub fn new(api: Arc<dyn Manager>) -> Self {
        Self { api }
    }

    /// Provider backed by the HTTP API described by `config`
    pub fn from_config(config: &ProviderConfig) -> bcc_common::Result<Self> {
        let api = HttpManager::new(config)?;
        info!("Configured BCC provider for {}", config.api_endpoint);
        Ok(Self::new(Arc::new(api)))
    }

    /// Configure from a provider block, reporting problems as diagnostics
    pub fn configure(block: &DynamicValue) -> Result<Self, Diagnostic> {
        ProviderConfig::from_value(block)
            .and_then(|config| Self::from_config(&config))
            .map_err(|e| {
                error!("Failed to configure provider: {}", e);
                Diagnostic::error("Failed to configure BCC provider", e.to_string())
            })
    }

    pub fn schema() -> ProviderSchema {
        ProviderSchema {
            provider: config::provider_schema(),
            resource_schemas: resource_schemas(),
            data_source_schemas: data_source_schemas(),
        }
    }

    pub fn validate_resource_config(&self, type_name: &str, config: &DynamicValue) -> Vec<Diagnostic> {
        debug!("ValidateResourceConfig called for {}", type_name);
        match resource_schemas().get(type_name) {
            Some(schema) => schema.block.validate(config).into_iter().map(Diagnostic::from_issue).collect(),
            None => vec![unknown_resource(type_name)],
        }
    }

    pub fn validate_data_source_config(&self, type_name: &str, config: &DynamicValue) -> Vec<Diagnostic> {
        debug!("ValidateDataResourceConfig called for {}", type_name);
        match data_source_schemas().get(type_name) {
            Some(schema) => schema.block.validate(config).into_iter().map(Diagnostic::from_issue).collect(),
            None => vec![unknown_data_source(type_name)],
        }
    }

    pub async fn read_resource(&self, type_name: &str, current: DynamicValue) -> StateResponse {
        info!("ReadResource called for {}", type_name);
        let mut d = ResourceData::new(current);
        self.run_resource(ResourceOp::Read, type_name, &mut d, "Failed to read resource")
            .await
    }

    /// Create when `prior` is null, delete when `planned` is null, update otherwise
    pub async fn apply_resource_change(
        &self,
        type_name: &str,
        prior: DynamicValue,
        planned: DynamicValue,
    ) -> StateResponse {
        info!("ApplyResourceChange called for {}", type_name);
        match (prior.is_null(), planned.is_null()) {
            (true, true) => StateResponse::ok(DynamicValue::Null),
            (true, false) => {
                let mut d = ResourceData::new(planned);
                self.run_resource(ResourceOp::Create, type_name, &mut d, "Failed to create resource")
                    .await
            }
            (false, true) => {
                let mut d = ResourceData::new(prior);
                self.run_resource(ResourceOp::Delete, type_name, &mut d, "Failed to delete resource")
                    .await
            }
            (false, false) => {
                let mut d = ResourceData::with_prior(prior, planned);
                self.run_resource(ResourceOp::Update, type_name, &mut d, "Failed to update resource")
                    .await
            }
        }
    }

    pub async fn import_resource_state(&self, type_name: &str, id: &str) -> StateResponse {
        info!("ImportResourceState called for {} with ID {}", type_name, id);
        let mut d = ResourceData::from_id(id);
        let response = self
            .run_resource(ResourceOp::Import, type_name, &mut d, "Failed to import resource")
            .await;
        if !response.has_errors() && response.state.is_null() {
            return StateResponse::failed(Diagnostic::error(
                "Failed to import resource",
                format!("{} with id '{}' does not exist", type_name, id),
            ));
        }
        response
    }

    pub async fn read_data_source(&self, type_name: &str, config: DynamicValue) -> StateResponse {
        info!("ReadDataSource called for {}", type_name);
        let issues = self.validate_data_source_config(type_name, &config);
        if !issues.is_empty() {
            return StateResponse {
                state: DynamicValue::Null,
                diagnostics: issues,
            };
        }

        let api = self.api.as_ref();
        let mut d = ResourceData::new(config);
        let result = match type_name {
            "bcc_disk" => DiskDataSource::read(api, &mut d).await,
            "bcc_disks" => DisksDataSource::read(api, &mut d).await,
            "bcc_network" => NetworkDataSource::read(api, &mut d).await,
            "bcc_firewall_template" => FirewallTemplateDataSource::read(api, &mut d).await,
            "bcc_firewall_templates" => FirewallTemplatesDataSource::read(api, &mut d).await,
            "bcc_lbaas" => LbaasDataSource::read(api, &mut d).await,
            "bcc_port" => PortDataSource::read(api, &mut d).await,
            "bcc_public_key" => PublicKeyDataSource::read(api, &mut d).await,
            "bcc_router" => RouterDataSource::read(api, &mut d).await,
            "bcc_hypervisors" => HypervisorsDataSource::read(api, &mut d).await,
            "bcc_storage_profiles" => StorageProfilesDataSource::read(api, &mut d).await,
            "bcc_template" => TemplateDataSource::read(api, &mut d).await,
            "bcc_templates" => TemplatesDataSource::read(api, &mut d).await,
            "bcc_vm" => VmDataSource::read(api, &mut d).await,
            "bcc_project" => ProjectDataSource::read(api, &mut d).await,
            "bcc_vdc" => VdcDataSource::read(api, &mut d).await,
            "bcc_s3_storage" => S3StorageDataSource::read(api, &mut d).await,
            "bcc_dns" => DnsDataSource::read(api, &mut d).await,
            _ => return StateResponse::failed(unknown_data_source(type_name)),
        };

        match result {
            Ok(()) => StateResponse::ok(d.into_state()),
            Err(e) => {
                error!("ReadDataSource {} failed: {:#}", type_name, e);
                StateResponse::failed(Diagnostic::error("Failed to read data source", format!("{:#}", e)))
            }
        }
    }

    /// Run one resource operation. On failure the partially updated record is
    /// still returned, so an entity created before the error is not lost.
    async fn run_resource(
        &self,
        op: ResourceOp,
        type_name: &str,
        d: &mut ResourceData,
        summary: &str,
    ) -> StateResponse {
        let api = self.api.as_ref();
        let result = match type_name {
            "bcc_disk" => run::<DiskResource>(op, api, d).await,
            "bcc_network" => run::<NetworkResource>(op, api, d).await,
            "bcc_firewall_template" => run::<FirewallTemplateResource>(op, api, d).await,
            "bcc_s3_storage_bucket" => run::<S3BucketResource>(op, api, d).await,
            _ => return StateResponse::failed(unknown_resource(type_name)),
        };
        debug!("{:?} {} finished, id '{}'", op, type_name, d.id());

        let state = std::mem::take(d).into_state();
        match result {
            Ok(()) => StateResponse::ok(state),
            Err(e) => {
                error!("{:?} {} failed: {:#}", op, type_name, e);
                StateResponse {
                    state,
                    diagnostics: vec![Diagnostic::error(summary, format!("{:#}", e))],
                }
            }
        }
    }
}

fn unknown_resource(type_name: &str) -> Diagnostic {
    Diagnostic::error("Unknown resource type", format!("Unknown resource type: {}", type_name))
}

fn unknown_data_source(type_name: &str) -> Diagnostic {
    Diagnostic::error(
        "Unknown data source type",
        format!("Unknown data source type: {}", type_name),
    )
}
