//! Version-specific transforms.
//!
//! Each transform takes the raw state of one version and returns the raw
//! state of the next. Applying a transform to its own output changes nothing.

use serde_json::{Map, Value};

use crate::{
    features::{self, FeatureCatalog, RawFeatureMap},
    migrations::MigrationError,
    statuses::{StatusKind, canonical_defaults},
};

const CLIENTS: &str = "clients";
const CURRENT_CLIENT_ID: &str = "current_client_id";
const SELECTED_CLIENT_ID: &str = "selected_client_id";
const LEGACY_STATUSES: &str = "statuses";

fn state_object(state: &mut Value) -> Result<&mut Map<String, Value>, MigrationError> {
    if state.is_null() {
        *state = Value::Object(Map::new());
    }

    state
        .as_object_mut()
        .ok_or_else(|| MigrationError::MalformedState("state is not an object".to_string()))
}

fn for_each_client(
    state: &mut Value,
    mut apply: impl FnMut(&mut Map<String, Value>) -> Result<(), MigrationError>,
) -> Result<(), MigrationError> {
    let object = state_object(state)?;

    let clients = object
        .entry(CLIENTS)
        .or_insert_with(|| Value::Array(Vec::new()));

    if clients.is_null() {
        *clients = Value::Array(Vec::new());
    }

    let clients = clients
        .as_array_mut()
        .ok_or_else(|| MigrationError::MalformedState("clients is not a list".to_string()))?;

    for (index, client) in clients.iter_mut().enumerate() {
        let client = client
            .as_object_mut()
            .ok_or_else(|| MigrationError::MalformedState(format!("client {index} is not an object")))?;

        apply(client)?;
    }

    Ok(())
}

fn is_missing(object: &Map<String, Value>, key: &str) -> bool {
    object.get(key).is_none_or(Value::is_null)
}

/// Move the legacy selected-client key into the active pointer.
pub(super) fn current_client_pointer(mut state: Value) -> Result<Value, MigrationError> {
    let object = state_object(&mut state)?;

    let legacy = object.remove(SELECTED_CLIENT_ID);

    if let Some(legacy) = legacy.filter(|value| !value.is_null())
        && is_missing(object, CURRENT_CLIENT_ID)
    {
        object.insert(CURRENT_CLIENT_ID.to_string(), legacy);
    }

    Ok(state)
}

/// Rename the single legacy status list to the lead collection.
pub(super) fn lead_statuses_rename(mut state: Value) -> Result<Value, MigrationError> {
    for_each_client(&mut state, |client| {
        if is_missing(client, StatusKind::Lead.field_name())
            && let Some(legacy) = client.remove(LEGACY_STATUSES)
        {
            client.insert(StatusKind::Lead.field_name().to_string(), legacy);
        }

        Ok(())
    })?;

    Ok(state)
}

/// Backfill missing status collections and normalize features.
pub(super) fn backfill_collections(mut state: Value) -> Result<Value, MigrationError> {
    let catalog = FeatureCatalog::standard();

    for_each_client(&mut state, |client| {
        for kind in StatusKind::ALL {
            if is_missing(client, kind.field_name()) {
                client.insert(
                    kind.field_name().to_string(),
                    serde_json::to_value(canonical_defaults(kind))?,
                );
            }
        }

        let raw: RawFeatureMap = client
            .remove("features")
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();

        client.insert(
            "features".to_string(),
            serde_json::to_value(features::resolve(&raw, &catalog))?,
        );

        Ok(())
    })?;

    Ok(state)
}
