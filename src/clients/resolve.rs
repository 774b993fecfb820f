//! Remote payload ⊕ defaults

use crate::{
    clients::{ClientConfiguration, SystemClient, Workflow},
    features::{self, FeatureCatalog},
    statuses::{Status, StatusCollection, StatusKind, canonical_defaults},
};

fn collection_or_default(kind: StatusKind, remote: Option<Vec<Status>>) -> StatusCollection {
    remote.map_or_else(|| canonical_defaults(kind), StatusCollection::from)
}

/// Resolve a remote tenant record into a full configuration.
///
/// Missing status collections fall back to the canonical defaults of their
/// kind, features go through the resolver, and missing branding or settings
/// take their defaults. Present data is kept as sent.
#[must_use]
pub fn resolve_client(system: SystemClient, catalog: &FeatureCatalog) -> ClientConfiguration {
    let config = system.config.unwrap_or_default();
    let workflow = config.workflow.unwrap_or_default();

    let mut client = ClientConfiguration {
        company_name: system.company_name.unwrap_or_else(|| system.name.clone()),
        id: system.id,
        name: system.name,
        branding: config.branding.unwrap_or_default(),
        lead_statuses: collection_or_default(StatusKind::Lead, config.lead_statuses),
        task_statuses: collection_or_default(StatusKind::Task, config.task_statuses),
        customer_statuses: collection_or_default(StatusKind::Customer, config.customer_statuses),
        payment_statuses: collection_or_default(StatusKind::Payment, config.payment_statuses),
        lead_sources: config.lead_sources.unwrap_or_default(),
        custom_fields: config.custom_fields.unwrap_or_default(),
        features: features::resolve(&config.features.unwrap_or_default(), catalog),
        settings: config.settings.unwrap_or_default(),
        workflow: Workflow {
            message_templates: config
                .message_templates
                .unwrap_or(workflow.message_templates),
            ..workflow
        },
        is_active: system.is_active,
        created_at: system.created_at,
        updated_at: system.updated_at,
    };

    client.derive_default_pointers();

    client
}
