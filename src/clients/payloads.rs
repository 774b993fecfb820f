//! Write payloads for the remote authority.

use serde::{Deserialize, Serialize};

use crate::{
    clients::{Branding, ClientConfiguration, TenantSettings},
    features::FeatureSet,
    statuses::Status,
    templates::MessageTemplate,
};

/// Payload creating a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
    /// Display name.
    pub name: String,

    /// Legal company name; the display name when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    /// Initial branding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branding: Option<Branding>,

    /// Initial settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<TenantSettings>,
}

/// Partial update of a client's own record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientUpdate {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// New company name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    /// New branding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branding: Option<Branding>,

    /// New settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<TenantSettings>,

    /// New active flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ClientUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.company_name.is_none()
            && self.branding.is_none()
            && self.settings.is_none()
            && self.is_active.is_none()
    }
}

/// Payload for a client's nested config sub-resource.
///
/// Features are always written in the structured shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigUpdate {
    /// Lead statuses.
    pub lead_statuses: Vec<Status>,

    /// Task statuses.
    pub task_statuses: Vec<Status>,

    /// Customer statuses.
    pub customer_statuses: Vec<Status>,

    /// Payment statuses.
    pub payment_statuses: Vec<Status>,

    /// Features.
    pub features: FeatureSet,

    /// Message templates.
    pub message_templates: Vec<MessageTemplate>,
}

impl From<&ClientConfiguration> for ConfigUpdate {
    fn from(client: &ClientConfiguration) -> Self {
        Self {
            lead_statuses: client.lead_statuses.list().to_vec(),
            task_statuses: client.task_statuses.list().to_vec(),
            customer_statuses: client.customer_statuses.list().to_vec(),
            payment_statuses: client.payment_statuses.list().to_vec(),
            features: client.features.clone(),
            message_templates: client.workflow.message_templates.clone(),
        }
    }
}
