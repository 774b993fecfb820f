//! Fixtures
//!
//! YAML tenant seed files. A fixture reads like a remote payload: whatever
//! it leaves out resolves to the same defaults a sparse remote record would.

use std::{
    fs,
    path::{Path, PathBuf},
};

use jiff::Timestamp;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    clients::{
        Branding, ClientConfiguration, ClientId, CustomField, LeadSource, RemoteClientConfig,
        SystemClient, TenantSettings, Workflow, resolve_client,
    },
    features::{FeatureCatalog, RawFeatureMap},
    ids::IdGenerator,
    statuses::Status,
    templates::{MessageTemplate, NewTemplate, TemplateKind},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Template entry in a fixture; ids and ownership are assigned on load.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateFixture {
    /// Display name.
    pub name: String,

    /// Delivery channel.
    #[serde(rename = "type")]
    pub kind: TemplateKind,

    /// Email subject.
    #[serde(default)]
    pub subject: Option<String>,

    /// Body.
    pub content: String,

    /// Declared variables.
    #[serde(default)]
    pub variables: Vec<String>,
}

impl From<TemplateFixture> for NewTemplate {
    fn from(fixture: TemplateFixture) -> Self {
        Self {
            name: fixture.name,
            kind: fixture.kind,
            subject: fixture.subject,
            content: fixture.content,
            variables: fixture.variables,
        }
    }
}

/// A tenant seed.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFixture {
    /// Fixed id; generated when omitted.
    #[serde(default)]
    pub id: Option<ClientId>,

    /// Display name.
    pub name: String,

    /// Legal company name.
    #[serde(default)]
    pub company_name: Option<String>,

    /// Lead statuses.
    #[serde(default)]
    pub lead_statuses: Option<Vec<Status>>,

    /// Task statuses.
    #[serde(default)]
    pub task_statuses: Option<Vec<Status>>,

    /// Customer statuses.
    #[serde(default)]
    pub customer_statuses: Option<Vec<Status>>,

    /// Payment statuses.
    #[serde(default)]
    pub payment_statuses: Option<Vec<Status>>,

    /// Features, legacy or structured.
    #[serde(default)]
    pub features: Option<RawFeatureMap>,

    /// Templates.
    #[serde(default)]
    pub templates: Vec<TemplateFixture>,

    /// Lead sources.
    #[serde(default)]
    pub lead_sources: Option<Vec<LeadSource>>,

    /// Custom fields.
    #[serde(default)]
    pub custom_fields: Option<Vec<CustomField>>,

    /// Branding.
    #[serde(default)]
    pub branding: Option<Branding>,

    /// Settings.
    #[serde(default)]
    pub settings: Option<TenantSettings>,

    /// Auto and notification rules.
    #[serde(default)]
    pub workflow: Option<Workflow>,
}

impl ClientFixture {
    /// Build the remote record this fixture stands for.
    #[must_use]
    pub fn into_system_client(self, ids: &dyn IdGenerator, now: Timestamp) -> SystemClient {
        let id = self.id.unwrap_or_else(|| ClientId::generate(ids));

        let message_templates = (!self.templates.is_empty()).then(|| {
            self.templates
                .into_iter()
                .map(|template| MessageTemplate::new(id.clone(), template.into(), ids, now))
                .collect()
        });

        SystemClient {
            id,
            name: self.name,
            company_name: self.company_name,
            is_active: true,
            config: Some(RemoteClientConfig {
                lead_statuses: self.lead_statuses,
                task_statuses: self.task_statuses,
                customer_statuses: self.customer_statuses,
                payment_statuses: self.payment_statuses,
                features: self.features,
                message_templates,
                lead_sources: self.lead_sources,
                custom_fields: self.custom_fields,
                branding: self.branding,
                settings: self.settings,
                workflow: self.workflow,
            }),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Resolve the fixture into a full configuration.
    #[must_use]
    pub fn resolve(
        self,
        ids: &dyn IdGenerator,
        now: Timestamp,
        catalog: &FeatureCatalog,
    ) -> ClientConfiguration {
        resolve_client(self.into_system_client(ids, now), catalog)
    }
}

/// Parse a client fixture from YAML.
///
/// # Errors
///
/// Returns an error if the YAML does not describe a client.
pub fn parse(contents: &str) -> Result<ClientFixture, FixtureError> {
    Ok(serde_norway::from_str(contents)?)
}

/// Read and parse a client fixture file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(path: impl AsRef<Path>) -> Result<ClientFixture, FixtureError> {
    parse(&fs::read_to_string(path)?)
}

/// Fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Fixture set rooted at `./fixtures`
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Fixture set rooted at a custom base path
    #[must_use]
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load `clients/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_client(&self, name: &str) -> Result<ClientFixture, FixtureError> {
        load(self.base_path.join("clients").join(format!("{name}.yml")))
    }
}
