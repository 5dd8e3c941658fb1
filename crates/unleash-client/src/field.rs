//! Tri-state wire fields.
//!
//! The admin API distinguishes a field that is missing from a payload, a
//! field explicitly set to `null`, and a field with a value. [`Field`] keeps
//! the three apart on the wire. Tracked records collapse the first two into
//! `None`, never into an empty string or zero.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A payload field that may be absent, null, or present.
///
/// Use with `#[serde(default, skip_serializing_if = "Field::is_absent")]` so
/// an absent field is neither sent nor required when decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field<T> {
    /// Not part of the payload.
    #[default]
    Absent,
    /// Explicitly `null`.
    Null,
    /// Has a value.
    Present(T),
}

impl<T> Field<T> {
    /// Whether the field is missing from the payload.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Whether the field is explicitly `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The value, if present.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    /// Collapse absent and null into the unset marker `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    /// Send `null` rather than omitting the field when unset.
    pub fn nullable(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Present)
    }

    /// Map the present value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Self::Present(value) => Field::Present(f(value)),
            Self::Null => Field::Null,
            Self::Absent => Field::Absent,
        }
    }
}

/// `None` is omitted from the payload.
impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => value.serialize(serializer),
            Self::Absent | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Self::Null, Self::Present))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        #[serde(default, skip_serializing_if = "Field::is_absent")]
        description: Field<String>,
    }

    #[test]
    fn test_deserialize_three_states() {
        let absent: Payload = serde_json::from_value(json!({})).unwrap();
        let null: Payload = serde_json::from_value(json!({"description": null})).unwrap();
        let present: Payload = serde_json::from_value(json!({"description": "x"})).unwrap();

        assert!(absent.description.is_absent());
        assert!(null.description.is_null());
        assert_eq!(present.description, Field::Present("x".to_string()));
    }

    #[test]
    fn test_serialize_skips_absent_only() {
        let absent = Payload { description: Field::Absent };
        let null = Payload { description: Field::Null };
        assert_eq!(serde_json::to_value(absent).unwrap(), json!({}));
        assert_eq!(serde_json::to_value(null).unwrap(), json!({"description": null}));
    }

    #[test]
    fn test_unset_never_becomes_empty_string() {
        let field: Field<String> = Field::Null;
        assert_eq!(field.into_option(), None);
        let field: Field<String> = Field::Absent;
        assert_eq!(field.into_option(), None);
    }

    #[test]
    fn test_from_option() {
        assert!(Field::<i64>::from(None).is_absent());
        assert!(Field::<i64>::nullable(None).is_null());
        assert_eq!(Field::from(Some(3)).map(|v| v * 2), Field::Present(6));
    }
}
