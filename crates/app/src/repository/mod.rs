//! Config repository
//!
//! The aggregate root owning the tenant collection and the active tenant
//! pointer. Every write goes to the remote authority first and is followed by
//! a full refetch; the refetched list is the only source of truth.

pub mod errors;
mod service;
pub mod state;

pub use errors::RepositoryError;
pub use service::ConfigRepository;
pub use state::{RepositorySnapshot, RepositoryState};
