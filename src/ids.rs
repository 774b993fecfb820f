//! Typed Identifiers
//!
//! Remote records carry opaque string ids (`"1"`, `"lead-won"`, UUIDs), so ids are
//! strings tagged with the entity they name rather than raw UUIDs.

use std::{
    borrow::Borrow,
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// An opaque string identifier tagged with the entity type it names.
pub struct TypedId<T>(String, PhantomData<fn() -> T>);

impl<T> TypedId<T> {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into(), PhantomData)
    }

    /// Mint a fresh identifier from the given generator.
    pub fn generate(ids: &dyn IdGenerator) -> Self {
        Self::new(ids.next_id())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the raw identifier.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl<T> Clone for TypedId<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone(), PhantomData)
    }
}

impl<T> Debug for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<T> Display for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for TypedId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypedId<T> {}

impl<T> Hash for TypedId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> PartialOrd for TypedId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TypedId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Borrow<str> for TypedId<T> {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<T> AsRef<str> for TypedId<T> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<T> From<&str> for TypedId<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T> From<String> for TypedId<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T> From<TypedId<T>> for String {
    fn from(value: TypedId<T>) -> Self {
        value.into_string()
    }
}

impl<T> Serialize for TypedId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Older API responses send numeric ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl<'de, T> Deserialize<'de> for TypedId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => Self::new(id),
            RawId::Unsigned(id) => Self::new(id.to_string()),
            RawId::Signed(id) => Self::new(id.to_string()),
        })
    }
}

/// Source of fresh identifiers for locally created entities.
pub trait IdGenerator: Send + Sync {
    /// Return an identifier that has not been returned before.
    fn next_id(&self) -> String;
}

/// Mints time-ordered UUID v7 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::now_v7().to_string()
    }
}

/// Mints `prefix-1`, `prefix-2`, ... for deterministic fixtures and tests.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Create a generator whose ids start at `prefix-1`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, AtomicOrdering::Relaxed);

        format!("{}-{n}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    struct Marker;

    type MarkerId = TypedId<Marker>;

    #[test]
    fn numeric_ids_deserialize_as_strings() -> TestResult {
        let ids: Vec<MarkerId> = serde_json::from_str(r#"[1, "2", -3]"#)?;

        assert_eq!(ids, vec![MarkerId::new("1"), MarkerId::new("2"), MarkerId::new("-3")]);

        Ok(())
    }

    #[test]
    fn ids_serialize_as_bare_strings() -> TestResult {
        let json = serde_json::to_string(&MarkerId::new("abc"))?;

        assert_eq!(json, r#""abc""#);

        Ok(())
    }

    #[test]
    fn sequential_generator_counts_up() {
        let ids = SequentialIdGenerator::new("status");

        assert_eq!(ids.next_id(), "status-1");
        assert_eq!(ids.next_id(), "status-2");
    }

    #[test]
    fn uuid_generator_does_not_repeat() {
        let ids = UuidIdGenerator;

        assert_ne!(ids.next_id(), ids.next_id());
    }
}
