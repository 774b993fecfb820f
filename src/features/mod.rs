//! Feature Flags
//!
//! Clients send features either as legacy `key -> bool` toggles or as
//! structured `key -> {name, enabled, settings}` entries. [`resolve`] is the
//! single normalization boundary: everything downstream sees a [`FeatureSet`]
//! in catalog order.

use std::collections::BTreeMap;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    ser::SerializeMap,
};
use serde_json::{Map, Value};

pub mod catalog;

pub use catalog::{FeatureCatalog, FeatureDefinition, keys};

/// Free-form per-feature settings.
pub type FeatureSettings = Map<String, Value>;

/// A normalized feature entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Display name.
    pub name: String,

    /// Whether the feature is on.
    pub enabled: bool,

    /// Feature specific settings.
    #[serde(default)]
    pub settings: FeatureSettings,
}

/// A structured wire entry. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuredFeature {
    /// Display name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Enabled flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Settings replacing the catalog default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<FeatureSettings>,
}

/// A feature entry as it arrives over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFeature {
    /// Legacy boolean toggle.
    Toggle(bool),

    /// Current structured entry.
    Structured(StructuredFeature),

    /// Anything else; resolves to the catalog default.
    Malformed(Value),
}

/// Raw feature map keyed by feature key.
pub type RawFeatureMap = BTreeMap<String, RawFeature>;

/// A resolved feature keyed by its catalog key.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEntry {
    /// Catalog key.
    pub key: String,

    /// Resolved value.
    pub feature: Feature,
}

/// Every catalog feature, resolved, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    entries: Vec<FeatureEntry>,
}

impl FeatureSet {
    /// Look up a feature by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Feature> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.feature)
    }

    /// Whether the feature exists and is enabled.
    #[must_use]
    pub fn is_enabled(&self, key: &str) -> bool {
        self.get(key).is_some_and(|feature| feature.enabled)
    }

    /// Entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureEntry> {
        self.entries.iter()
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Toggle a feature. Returns `false` when the key is not in the set.
    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> bool {
        let Some(feature) = self.get_mut(key) else {
            return false;
        };

        feature.enabled = enabled;

        true
    }

    /// Replace a feature's settings. Returns `false` when the key is not in the set.
    pub fn set_settings(&mut self, key: &str, settings: FeatureSettings) -> bool {
        let Some(feature) = self.get_mut(key) else {
            return false;
        };

        feature.settings = settings;

        true
    }

    /// The structured wire form of this set.
    #[must_use]
    pub fn to_raw(&self) -> RawFeatureMap {
        self.entries
            .iter()
            .map(|entry| {
                (
                    entry.key.clone(),
                    RawFeature::Structured(StructuredFeature {
                        name: Some(entry.feature.name.clone()),
                        enabled: Some(entry.feature.enabled),
                        settings: Some(entry.feature.settings.clone()),
                    }),
                )
            })
            .collect()
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Feature> {
        self.entries
            .iter_mut()
            .find(|entry| entry.key == key)
            .map(|entry| &mut entry.feature)
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        resolve(&RawFeatureMap::new(), &FeatureCatalog::standard())
    }
}

impl Serialize for FeatureSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;

        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.feature)?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawFeatureMap>::deserialize(deserializer)?.unwrap_or_default();

        Ok(resolve(&raw, &FeatureCatalog::standard()))
    }
}

/// Normalize a raw feature map against the catalog.
///
/// Booleans are wrapped with the catalog name and empty settings. Structured
/// entries override `enabled` and `settings`, keeping the catalog name when
/// they omit one. Missing or malformed entries take the catalog default. Keys
/// outside the catalog are ignored.
#[must_use]
pub fn resolve(remote: &RawFeatureMap, catalog: &FeatureCatalog) -> FeatureSet {
    let entries = catalog
        .iter()
        .map(|definition| {
            let default = definition.default_feature();

            let feature = match remote.get(definition.key) {
                Some(RawFeature::Toggle(enabled)) => Feature {
                    name: definition.name.to_string(),
                    enabled: *enabled,
                    settings: FeatureSettings::new(),
                },
                Some(RawFeature::Structured(structured)) => Feature {
                    name: structured.name.clone().unwrap_or(default.name),
                    enabled: structured.enabled.unwrap_or(default.enabled),
                    settings: structured.settings.clone().unwrap_or(default.settings),
                },
                Some(RawFeature::Malformed(_)) | None => default,
            };

            FeatureEntry {
                key: definition.key.to_string(),
                feature,
            }
        })
        .collect();

    FeatureSet { entries }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn raw(value: Value) -> Result<RawFeatureMap, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn legacy_boolean_is_wrapped_with_catalog_name() -> TestResult {
        let features = resolve(&raw(json!({"leads": true}))?, &FeatureCatalog::standard());

        assert_eq!(
            features.get(keys::LEADS),
            Some(&Feature {
                name: "Leads".to_string(),
                enabled: true,
                settings: FeatureSettings::new(),
            })
        );

        Ok(())
    }

    #[test]
    fn legacy_and_structured_maps_resolve_identically() -> TestResult {
        let catalog = FeatureCatalog::standard();

        let legacy = resolve(
            &raw(json!({"leads": true, "dialer": false, "reports": true}))?,
            &catalog,
        );

        let structured = resolve(
            &raw(json!({
                "leads": {"enabled": true},
                "dialer": {"name": "Dialer", "enabled": false, "settings": {}},
                "reports": {"enabled": true, "settings": {}}
            }))?,
            &catalog,
        );

        assert_eq!(legacy, structured);

        Ok(())
    }

    #[test]
    fn output_follows_catalog_order() -> TestResult {
        let features = resolve(
            &raw(json!({"userManagement": false, "attendance": true, "leads": false}))?,
            &FeatureCatalog::standard(),
        );

        let keys: Vec<&str> = features.iter().map(|entry| entry.key.as_str()).collect();

        assert_eq!(
            keys,
            [
                "leads",
                "tasks",
                "calendar",
                "reminders",
                "customers",
                "attendance",
                "reports",
                "dialer",
                "userManagement"
            ]
        );

        Ok(())
    }

    #[test]
    fn missing_and_malformed_entries_take_catalog_default() -> TestResult {
        let features = resolve(
            &raw(json!({"calendar": "yes", "tasks": null, "reports": 7, "dialer": {"enabled": "no"}}))?,
            &FeatureCatalog::standard(),
        );

        for key in [keys::CALENDAR, keys::TASKS, keys::REPORTS, keys::DIALER, keys::REMINDERS] {
            assert!(features.is_enabled(key), "{key} should fall back to enabled");
        }

        Ok(())
    }

    #[test]
    fn structured_entry_keeps_remote_settings_and_name() -> TestResult {
        let features = resolve(
            &raw(json!({"dialer": {"name": "Phone", "enabled": false, "settings": {"provider": "twilio"}}}))?,
            &FeatureCatalog::standard(),
        );

        let dialer = features.get(keys::DIALER);

        assert_eq!(dialer.map(|f| f.name.as_str()), Some("Phone"));
        assert_eq!(dialer.map(|f| f.enabled), Some(false));
        assert_eq!(
            dialer.and_then(|f| f.settings.get("provider")),
            Some(&json!("twilio"))
        );

        Ok(())
    }

    #[test]
    fn unknown_keys_are_ignored() -> TestResult {
        let features = resolve(&raw(json!({"teleport": true}))?, &FeatureCatalog::standard());

        assert!(features.get("teleport").is_none());
        assert_eq!(features.len(), FeatureCatalog::standard().len());

        Ok(())
    }

    #[test]
    fn feature_set_round_trips_through_structured_json() -> TestResult {
        let mut features = FeatureSet::default();
        features.set_enabled(keys::ATTENDANCE, false);

        let json = serde_json::to_value(&features)?;
        let back: FeatureSet = serde_json::from_value(json)?;

        assert_eq!(back, features);
        assert!(!back.is_enabled(keys::ATTENDANCE));

        Ok(())
    }

    #[test]
    fn setters_report_unknown_keys() {
        let mut features = FeatureSet::default();

        assert!(!features.set_enabled("teleport", true));
        assert!(features.set_settings(keys::REMINDERS, FeatureSettings::new()));
    }
}
