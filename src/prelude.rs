//! Atrium prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    clients::{
        Branding, ClientConfiguration, ClientId, ClientUpdate, ConfigUpdate, NewClient,
        RemoteClientConfig, SystemClient, TenantSettings, resolve_client,
    },
    features::{Feature, FeatureCatalog, FeatureSet, RawFeature, RawFeatureMap, keys},
    fixtures::{ClientFixture, Fixture, FixtureError},
    ids::{IdGenerator, SequentialIdGenerator, TypedId, UuidIdGenerator},
    migrations::{
        CURRENT_VERSION, CacheState, MigrationError, PersistedCacheEnvelope, migrate,
        migrate_or_reset,
    },
    statuses::{
        NewStatus, Status, StatusCatalogError, StatusCollection, StatusId, StatusKind,
        StatusPatch, canonical_defaults,
    },
    templates::{MessageTemplate, NewTemplate, TemplateId, TemplateKind},
    workflow::{
        AutoRule, DanglingReference, FinalStateIssue, NotificationRule, TransitionError,
        WorkflowReport,
    },
};
