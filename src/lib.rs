//! Atrium
//!
//! Atrium is the tenant configuration and workflow engine of a multi-tenant CRM: status
//! vocabularies, feature toggles, message templates and the versioned local cache that holds them.

pub mod clients;
pub mod features;
pub mod fixtures;
pub mod ids;
pub mod migrations;
pub mod prelude;
pub mod statuses;
pub mod templates;
pub mod timestamps;
pub mod workflow;
