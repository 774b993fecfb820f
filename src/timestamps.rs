//! Timestamp serialization helpers.

/// Optional timestamps that tolerate missing or unparseable values.
///
/// Remote records are not consistent about timestamp formats; an unreadable
/// value is treated as unknown rather than failing the whole record.
pub mod lenient {
    use jiff::Timestamp;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    /// Serialize as an RFC 3339 string or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        timestamp: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        timestamp.serialize(serializer)
    }

    /// Deserialize any value, keeping only parseable timestamps.
    ///
    /// # Errors
    ///
    /// Propagates deserializer errors; unparseable strings become `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => text.parse().ok(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use serde::{Deserialize, Serialize};
    use testresult::TestResult;

    #[derive(Debug, Serialize, Deserialize)]
    struct Stamped {
        #[serde(default, with = "super::lenient")]
        at: Option<Timestamp>,
    }

    #[test]
    fn parses_rfc3339() -> TestResult {
        let stamped: Stamped = serde_json::from_str(r#"{"at": "2024-05-01T10:00:00Z"}"#)?;

        assert_eq!(stamped.at, Some("2024-05-01T10:00:00Z".parse()?));

        Ok(())
    }

    #[test]
    fn garbage_and_missing_become_none() -> TestResult {
        let garbage: Stamped = serde_json::from_str(r#"{"at": "yesterday"}"#)?;
        let missing: Stamped = serde_json::from_str("{}")?;
        let number: Stamped = serde_json::from_str(r#"{"at": 12}"#)?;

        assert!(garbage.at.is_none());
        assert!(missing.at.is_none());
        assert!(number.at.is_none());

        Ok(())
    }
}
