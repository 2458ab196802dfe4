use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Primary key of a stored row.
///
/// Tables may use `int8` or `uuid` keys, so both JSON numbers and strings
/// are accepted and kept as their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(id) => Ok(id.into()),
            Raw::Str(id) if id.is_empty() => {
                Err(serde::de::Error::custom("empty record id"))
            }
            Raw::Str(id) => Ok(id.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::RecordId;

    #[test]
    fn test_accepts_numbers_and_strings() {
        let int: RecordId = serde_json::from_str("42").unwrap();
        let uuid: RecordId =
            serde_json::from_str("\"5f0c7d1e-4a7b-4c1a-9d55-2b8f3e6a1c00\"")
                .unwrap();

        assert_eq!(int.as_str(), "42");
        assert_eq!(uuid.as_str(), "5f0c7d1e-4a7b-4c1a-9d55-2b8f3e6a1c00");
    }

    #[test]
    fn test_rejects_empty_and_other_shapes() {
        assert!(serde_json::from_str::<RecordId>("\"\"").is_err());
        assert!(serde_json::from_str::<RecordId>("null").is_err());
        assert!(serde_json::from_str::<RecordId>("[1]").is_err());
    }
}
