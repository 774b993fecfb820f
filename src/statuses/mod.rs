//! Status Catalog
//!
//! Ordered, typed status collections. The catalog guarantees id and order
//! integrity only: default/final markers are whatever callers set, and
//! conflicting markers stay queryable instead of being repaired.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ids::{IdGenerator, TypedId};

pub mod defaults;
pub mod errors;

pub use defaults::canonical_defaults;
pub use errors::StatusCatalogError;

/// Status identifier, unique within its collection.
pub type StatusId = TypedId<Status>;

/// Color given to statuses that arrive without one.
pub const DEFAULT_STATUS_COLOR: &str = "#6b7280";

/// The four status vocabularies every client owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Lead pipeline statuses.
    Lead,

    /// Task statuses.
    Task,

    /// Customer lifecycle statuses.
    Customer,

    /// Payment statuses.
    Payment,
}

impl StatusKind {
    /// All kinds in canonical order.
    pub const ALL: [StatusKind; 4] = [Self::Lead, Self::Task, Self::Customer, Self::Payment];

    /// Wire field holding this kind's collection.
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Lead => "lead_statuses",
            Self::Task => "task_statuses",
            Self::Customer => "customer_statuses",
            Self::Payment => "payment_statuses",
        }
    }
}

/// A single named state within a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// Identifier, unique within the collection.
    pub id: StatusId,

    /// Display name.
    pub name: String,

    /// Display color.
    #[serde(default = "default_color")]
    pub color: String,

    /// Display and priority sequence.
    #[serde(default)]
    pub order: u32,

    /// Whether new records start in this status.
    #[serde(default, alias = "isDefault")]
    pub is_default: bool,

    /// Terminal status: nothing transitions out of it.
    #[serde(default, alias = "isFinal")]
    pub is_final: bool,

    /// Statuses this one may move to. `None` means unrestricted.
    #[serde(
        default,
        alias = "allowedTransitions",
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed_transitions: Option<BTreeSet<StatusId>>,
}

fn default_color() -> String {
    DEFAULT_STATUS_COLOR.to_string()
}

/// Data for a status that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewStatus {
    /// Display name.
    pub name: String,

    /// Display color; the neutral default when omitted.
    pub color: Option<String>,

    /// Default marker.
    pub is_default: bool,

    /// Terminal marker.
    pub is_final: bool,

    /// Declared outgoing transitions.
    pub allowed_transitions: Option<BTreeSet<StatusId>>,
}

/// Partial update of a status. The id can never be patched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusPatch {
    /// New display name.
    pub name: Option<String>,

    /// New color.
    pub color: Option<String>,

    /// New order position.
    pub order: Option<u32>,

    /// New default marker.
    pub is_default: Option<bool>,

    /// New terminal marker.
    pub is_final: Option<bool>,

    /// Replacement transition set; `Some(None)` makes the status unrestricted.
    pub allowed_transitions: Option<Option<BTreeSet<StatusId>>>,
}

/// An ordered collection of statuses of one kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Status>", into = "Vec<Status>")]
pub struct StatusCollection {
    statuses: Vec<Status>,
}

impl From<Vec<Status>> for StatusCollection {
    fn from(statuses: Vec<Status>) -> Self {
        let mut collection = Self { statuses };

        collection.sort();

        collection
    }
}

impl From<StatusCollection> for Vec<Status> {
    fn from(collection: StatusCollection) -> Self {
        collection.statuses
    }
}

impl StatusCollection {
    /// Statuses in display order.
    #[must_use]
    pub fn list(&self) -> &[Status] {
        &self.statuses
    }

    /// Look up a status by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Status> {
        self.statuses.iter().find(|status| status.id.as_str() == id)
    }

    /// Whether a status with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of statuses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Whether the collection has no statuses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Append a status after the current maximum order and return its fresh id.
    ///
    /// Markers on other statuses are left untouched, so adding a second default
    /// produces two defaults.
    pub fn add(&mut self, status: NewStatus, ids: &dyn IdGenerator) -> StatusId {
        let id = self.fresh_id(ids);

        let order = self
            .statuses
            .iter()
            .map(|status| status.order)
            .max()
            .map_or(1, |max| max.saturating_add(1));

        self.statuses.push(Status {
            id: id.clone(),
            name: status.name,
            color: status.color.unwrap_or_else(default_color),
            order,
            is_default: status.is_default,
            is_final: status.is_final,
            allowed_transitions: status.allowed_transitions,
        });

        id
    }

    /// Apply a patch to an existing status.
    ///
    /// # Errors
    ///
    /// Returns [`StatusCatalogError::UnknownStatus`] when no status has this id.
    pub fn update(&mut self, id: &str, patch: StatusPatch) -> Result<&Status, StatusCatalogError> {
        let status = self
            .statuses
            .iter_mut()
            .find(|status| status.id.as_str() == id)
            .ok_or_else(|| StatusCatalogError::UnknownStatus(StatusId::new(id)))?;

        let reorder = patch.order.is_some_and(|order| order != status.order);

        if let Some(name) = patch.name {
            status.name = name;
        }

        if let Some(color) = patch.color {
            status.color = color;
        }

        if let Some(order) = patch.order {
            status.order = order;
        }

        if let Some(is_default) = patch.is_default {
            status.is_default = is_default;
        }

        if let Some(is_final) = patch.is_final {
            status.is_final = is_final;
        }

        if let Some(allowed_transitions) = patch.allowed_transitions {
            status.allowed_transitions = allowed_transitions;
        }

        if reorder {
            self.sort();
        }

        self.get(id)
            .ok_or_else(|| StatusCatalogError::UnknownStatus(StatusId::new(id)))
    }

    /// Remove a status, returning it.
    ///
    /// References to it from other statuses' transition sets are left dangling.
    ///
    /// # Errors
    ///
    /// Returns [`StatusCatalogError::UnknownStatus`] when no status has this id.
    pub fn remove(&mut self, id: &str) -> Result<Status, StatusCatalogError> {
        let position = self
            .statuses
            .iter()
            .position(|status| status.id.as_str() == id)
            .ok_or_else(|| StatusCatalogError::UnknownStatus(StatusId::new(id)))?;

        Ok(self.statuses.remove(position))
    }

    /// Rewrite orders so the listed ids come first, in the given sequence.
    ///
    /// Statuses not listed keep their relative order after the listed ones.
    ///
    /// # Errors
    ///
    /// Returns [`StatusCatalogError::UnknownStatus`] for the first unknown id, or
    /// [`StatusCatalogError::DuplicateStatus`] when an id is listed twice. The
    /// collection is unchanged on error.
    pub fn reorder(&mut self, ids: &[StatusId]) -> Result<(), StatusCatalogError> {
        let mut seen = BTreeSet::new();

        for id in ids {
            if !self.contains(id.as_str()) {
                return Err(StatusCatalogError::UnknownStatus(id.clone()));
            }

            if !seen.insert(id) {
                return Err(StatusCatalogError::DuplicateStatus(id.clone()));
            }
        }

        let (mut listed, rest): (Vec<Status>, Vec<Status>) = self
            .statuses
            .drain(..)
            .partition(|status| seen.contains(&status.id));

        listed.sort_by_key(|status| ids.iter().position(|id| *id == status.id));

        self.statuses = listed.into_iter().chain(rest).collect();

        for (position, status) in self.statuses.iter_mut().enumerate() {
            status.order = u32::try_from(position).map_or(u32::MAX, |p| p.saturating_add(1));
        }

        Ok(())
    }

    /// All statuses marked as default, in order.
    #[must_use]
    pub fn defaults(&self) -> SmallVec<[&Status; 2]> {
        self.statuses
            .iter()
            .filter(|status| status.is_default)
            .collect()
    }

    /// Whether more than one status claims to be the default.
    #[must_use]
    pub fn has_conflicting_defaults(&self) -> bool {
        self.defaults().len() > 1
    }

    /// The status new records start in: the first default by order, otherwise
    /// the first status.
    #[must_use]
    pub fn default_status(&self) -> Option<&Status> {
        self.statuses
            .iter()
            .find(|status| status.is_default)
            .or_else(|| self.statuses.first())
    }

    /// All terminal statuses, in order.
    #[must_use]
    pub fn final_statuses(&self) -> SmallVec<[&Status; 4]> {
        self.statuses
            .iter()
            .filter(|status| status.is_final)
            .collect()
    }

    fn fresh_id(&self, ids: &dyn IdGenerator) -> StatusId {
        let base = ids.next_id();

        if !self.contains(&base) {
            return StatusId::new(base);
        }

        let mut suffix = 1_u32;

        loop {
            let candidate = format!("{base}-{suffix}");

            if !self.contains(&candidate) {
                return StatusId::new(candidate);
            }

            suffix = suffix.saturating_add(1);
        }
    }

    fn sort(&mut self) {
        self.statuses.sort_by_key(|status| status.order);
    }
}
