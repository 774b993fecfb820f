//! Feature catalog.

use smallvec::SmallVec;

use crate::features::{Feature, FeatureSettings};

/// Canonical feature keys.
pub mod keys {
    /// Lead management.
    pub const LEADS: &str = "leads";
    /// Task management.
    pub const TASKS: &str = "tasks";
    /// Shared calendar.
    pub const CALENDAR: &str = "calendar";
    /// Reminders.
    pub const REMINDERS: &str = "reminders";
    /// Customer records.
    pub const CUSTOMERS: &str = "customers";
    /// Staff attendance.
    pub const ATTENDANCE: &str = "attendance";
    /// Reporting.
    pub const REPORTS: &str = "reports";
    /// Built-in phone dialer.
    pub const DIALER: &str = "dialer";
    /// User administration.
    pub const USER_MANAGEMENT: &str = "userManagement";
}

/// One togglable capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureDefinition {
    /// Wire key.
    pub key: &'static str,

    /// Default display name.
    pub name: &'static str,

    /// Default enabled flag.
    pub enabled: bool,
}

impl FeatureDefinition {
    /// The value a client gets when it says nothing about this feature.
    #[must_use]
    pub fn default_feature(&self) -> Feature {
        Feature {
            name: self.name.to_string(),
            enabled: self.enabled,
            settings: FeatureSettings::new(),
        }
    }
}

const STANDARD: [FeatureDefinition; 9] = [
    definition(keys::LEADS, "Leads"),
    definition(keys::TASKS, "Tasks"),
    definition(keys::CALENDAR, "Calendar"),
    definition(keys::REMINDERS, "Reminders"),
    definition(keys::CUSTOMERS, "Customers"),
    definition(keys::ATTENDANCE, "Attendance"),
    definition(keys::REPORTS, "Reports"),
    definition(keys::DIALER, "Dialer"),
    definition(keys::USER_MANAGEMENT, "User Management"),
];

const fn definition(key: &'static str, name: &'static str) -> FeatureDefinition {
    FeatureDefinition {
        key,
        name,
        enabled: true,
    }
}

/// The fixed, ordered list of features a client may toggle.
///
/// Catalog order is the order features are presented in, whatever order the
/// remote payload used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCatalog {
    definitions: SmallVec<[FeatureDefinition; 9]>,
}

impl FeatureCatalog {
    /// The built-in catalog.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            definitions: SmallVec::from(STANDARD),
        }
    }

    /// A custom catalog. Later duplicates of a key are dropped.
    pub fn new(definitions: impl IntoIterator<Item = FeatureDefinition>) -> Self {
        let mut unique: SmallVec<[FeatureDefinition; 9]> = SmallVec::new();

        for definition in definitions {
            if !unique.iter().any(|existing| existing.key == definition.key) {
                unique.push(definition);
            }
        }

        Self {
            definitions: unique,
        }
    }

    /// Definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureDefinition> {
        self.definitions.iter()
    }

    /// Look up a definition by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FeatureDefinition> {
        self.definitions.iter().find(|definition| definition.key == key)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for FeatureCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_catalog_drops_duplicate_keys() {
        let catalog = FeatureCatalog::new([
            definition("a", "A"),
            definition("b", "B"),
            definition("a", "Again"),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("a").map(|d| d.name), Some("A"));
    }

    #[test]
    fn standard_features_default_to_enabled() {
        assert!(FeatureCatalog::standard().iter().all(|definition| definition.enabled));
    }
}
