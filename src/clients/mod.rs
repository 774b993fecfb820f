//! Clients
//!
//! A client is one tenant organization. Two shapes exist: the coarse
//! [`SystemClient`] record the remote authority lists, optionally carrying a
//! raw [`RemoteClientConfig`], and the fully resolved [`ClientConfiguration`]
//! that consumers read.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    features::{FeatureSet, RawFeatureMap},
    ids::TypedId,
    statuses::{Status, StatusCollection, StatusId, StatusKind},
    templates::MessageTemplate,
    timestamps,
    workflow::{AutoRule, NotificationRule},
};

pub mod payloads;
pub mod resolve;

pub use payloads::{ClientUpdate, ConfigUpdate, NewClient};
pub use resolve::resolve_client;

/// Client identifier.
pub type ClientId = TypedId<ClientConfiguration>;

/// Lead source identifier.
pub type LeadSourceId = TypedId<LeadSource>;

/// Custom field identifier.
pub type CustomFieldId = TypedId<CustomField>;

const fn active_by_default() -> bool {
    true
}

/// Visual identity of a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    /// Primary brand color.
    pub primary_color: String,

    /// Secondary brand color.
    pub secondary_color: String,

    /// Logo reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            primary_color: "#2563eb".to_string(),
            secondary_color: "#64748b".to_string(),
            logo_url: None,
        }
    }
}

/// The status each collection's new records start in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultStatuses {
    /// Lead default.
    pub lead: Option<StatusId>,

    /// Task default.
    pub task: Option<StatusId>,

    /// Customer default.
    pub customer: Option<StatusId>,

    /// Payment default.
    pub payment: Option<StatusId>,
}

impl DefaultStatuses {
    /// The pointer for one kind.
    #[must_use]
    pub fn get(&self, kind: StatusKind) -> Option<&StatusId> {
        match kind {
            StatusKind::Lead => self.lead.as_ref(),
            StatusKind::Task => self.task.as_ref(),
            StatusKind::Customer => self.customer.as_ref(),
            StatusKind::Payment => self.payment.as_ref(),
        }
    }

    fn slot(&mut self, kind: StatusKind) -> &mut Option<StatusId> {
        match kind {
            StatusKind::Lead => &mut self.lead,
            StatusKind::Task => &mut self.task,
            StatusKind::Customer => &mut self.customer,
            StatusKind::Payment => &mut self.payment,
        }
    }
}

/// Locale and default-status settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantSettings {
    /// Date display format.
    pub date_format: String,

    /// Time display format.
    pub time_format: String,

    /// ISO currency code.
    pub currency: String,

    /// IANA timezone name.
    pub timezone: String,

    /// Default status per collection.
    pub default_statuses: DefaultStatuses,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            date_format: "DD/MM/YYYY".to_string(),
            time_format: "HH:mm".to_string(),
            currency: "USD".to_string(),
            timezone: "UTC".to_string(),
            default_statuses: DefaultStatuses::default(),
        }
    }
}

/// Where leads come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadSource {
    /// Identifier.
    pub id: LeadSourceId,

    /// Display name.
    pub name: String,

    /// Inactive sources are kept for history.
    #[serde(default = "active_by_default", alias = "isActive")]
    pub is_active: bool,
}

/// Input type of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text.
    Text,
    /// Number.
    Number,
    /// Date.
    Date,
    /// One of `options`.
    Select,
    /// Boolean.
    Checkbox,
}

/// A client-defined extra field on leads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    /// Identifier.
    pub id: CustomFieldId,

    /// Display label.
    pub label: String,

    /// Input type.
    #[serde(rename = "type", alias = "field_type")]
    pub field_type: FieldType,

    /// Whether a value is mandatory.
    #[serde(default)]
    pub required: bool,

    /// Choices for select fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// A client's workflow bundle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Workflow {
    /// Status-to-status auto-rules.
    pub auto_rules: Vec<AutoRule>,

    /// Notification rules.
    pub notification_rules: Vec<NotificationRule>,

    /// Message templates.
    pub message_templates: Vec<MessageTemplate>,
}

/// The raw nested configuration payload. Every field may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteClientConfig {
    /// Lead statuses.
    #[serde(alias = "leadStatuses")]
    pub lead_statuses: Option<Vec<Status>>,

    /// Task statuses.
    #[serde(alias = "taskStatuses")]
    pub task_statuses: Option<Vec<Status>>,

    /// Customer statuses.
    #[serde(alias = "customerStatuses")]
    pub customer_statuses: Option<Vec<Status>>,

    /// Payment statuses.
    #[serde(alias = "paymentStatuses")]
    pub payment_statuses: Option<Vec<Status>>,

    /// Features, legacy or structured.
    pub features: Option<RawFeatureMap>,

    /// Message templates.
    #[serde(alias = "messageTemplates")]
    pub message_templates: Option<Vec<MessageTemplate>>,

    /// Lead sources.
    #[serde(alias = "leadSources")]
    pub lead_sources: Option<Vec<LeadSource>>,

    /// Custom field definitions.
    #[serde(alias = "customFields")]
    pub custom_fields: Option<Vec<CustomField>>,

    /// Branding.
    pub branding: Option<Branding>,

    /// Settings.
    pub settings: Option<TenantSettings>,

    /// Workflow bundle. Templates sent at the top level take precedence
    /// over the ones nested here.
    pub workflow: Option<Workflow>,
}

/// The coarse tenant record listed by the remote authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemClient {
    /// Identifier.
    pub id: ClientId,

    /// Display name.
    pub name: String,

    /// Legal company name.
    #[serde(default, alias = "companyName")]
    pub company_name: Option<String>,

    /// Whether the client is active.
    #[serde(default = "active_by_default", alias = "isActive")]
    pub is_active: bool,

    /// Nested configuration, when the remote has one.
    #[serde(default)]
    pub config: Option<RemoteClientConfig>,

    /// Creation time.
    #[serde(default, with = "timestamps::lenient")]
    pub created_at: Option<Timestamp>,

    /// Last update time.
    #[serde(default, with = "timestamps::lenient")]
    pub updated_at: Option<Timestamp>,
}

/// A fully resolved client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfiguration {
    /// Identifier.
    pub id: ClientId,

    /// Display name.
    pub name: String,

    /// Legal company name.
    #[serde(default)]
    pub company_name: String,

    /// Visual identity.
    #[serde(default)]
    pub branding: Branding,

    /// Lead statuses.
    pub lead_statuses: StatusCollection,

    /// Task statuses.
    pub task_statuses: StatusCollection,

    /// Customer statuses.
    pub customer_statuses: StatusCollection,

    /// Payment statuses.
    pub payment_statuses: StatusCollection,

    /// Lead sources.
    #[serde(default)]
    pub lead_sources: Vec<LeadSource>,

    /// Custom field definitions.
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,

    /// Features in catalog order.
    #[serde(default)]
    pub features: FeatureSet,

    /// Locale and default statuses.
    #[serde(default)]
    pub settings: TenantSettings,

    /// Rules and templates.
    #[serde(default)]
    pub workflow: Workflow,

    /// Whether the client is active.
    #[serde(default = "active_by_default")]
    pub is_active: bool,

    /// Creation time.
    #[serde(default, with = "timestamps::lenient")]
    pub created_at: Option<Timestamp>,

    /// Last update time.
    #[serde(default, with = "timestamps::lenient")]
    pub updated_at: Option<Timestamp>,
}

impl ClientConfiguration {
    /// The collection of one kind.
    #[must_use]
    pub fn statuses(&self, kind: StatusKind) -> &StatusCollection {
        match kind {
            StatusKind::Lead => &self.lead_statuses,
            StatusKind::Task => &self.task_statuses,
            StatusKind::Customer => &self.customer_statuses,
            StatusKind::Payment => &self.payment_statuses,
        }
    }

    /// Mutable access to the collection of one kind.
    pub fn statuses_mut(&mut self, kind: StatusKind) -> &mut StatusCollection {
        match kind {
            StatusKind::Lead => &mut self.lead_statuses,
            StatusKind::Task => &mut self.task_statuses,
            StatusKind::Customer => &mut self.customer_statuses,
            StatusKind::Payment => &mut self.payment_statuses,
        }
    }

    /// The status new records of this kind start in: the configured pointer
    /// when it still exists, otherwise the collection's own default.
    #[must_use]
    pub fn default_status(&self, kind: StatusKind) -> Option<&Status> {
        let collection = self.statuses(kind);

        self.settings
            .default_statuses
            .get(kind)
            .and_then(|id| collection.get(id.as_str()))
            .or_else(|| collection.default_status())
    }

    /// Message templates.
    #[must_use]
    pub fn templates(&self) -> &[MessageTemplate] {
        &self.workflow.message_templates
    }

    /// Fill missing default-status pointers from each collection.
    pub(crate) fn derive_default_pointers(&mut self) {
        for kind in StatusKind::ALL {
            let derived = self
                .statuses(kind)
                .default_status()
                .map(|status| status.id.clone());

            let slot = self.settings.default_statuses.slot(kind);

            if slot.is_none() {
                *slot = derived;
            }
        }
    }
}
