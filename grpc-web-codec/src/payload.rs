//! Application payloads handed to a codec.

use serde::Serialize;

/// A message value, distinguishing "no value" from JSON `null`.
///
/// [`Payload::Missing`] has no wire representation: every codec rejects it
/// with [`CodecError::InvalidPayload`](crate::CodecError::InvalidPayload)
/// instead of coercing it to `null`.
///
/// `null` on the wire always decodes to [`Payload::Null`]. A `Value` whose
/// JSON form is `null` (`serde_json::Value::Null`, `None` inside an
/// `Option`) encodes to those same bytes, so equality treats it as `Null`
/// and a codec round trip compares equal to its input.
///
/// # Example
///
/// ```
/// use grpc_web_codec::Payload;
///
/// let payload: Payload<u32> = Some(7).into();
/// assert_eq!(payload, Payload::Value(7));
///
/// let payload: Payload<u32> = None.into();
/// assert_eq!(payload, Payload::Null);
///
/// assert!(Payload::<u32>::default().is_missing());
///
/// assert_eq!(Payload::Value(serde_json::Value::Null), Payload::Null);
/// ```
#[derive(Debug, Clone, Default)]
pub enum Payload<T> {
    /// No value was provided.
    #[default]
    Missing,
    /// An explicit JSON `null`.
    Null,
    /// A value.
    Value(T),
}

impl<T> Payload<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Payload::Missing)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Payload::Null)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Payload::Value(value) => Some(value),
            _ => None,
        }
    }

    /// `Null` and `Missing` both become `None`.
    pub fn into_value(self) -> Option<T> {
        match self {
            Payload::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Payload<U> {
        match self {
            Payload::Missing => Payload::Missing,
            Payload::Null => Payload::Null,
            Payload::Value(value) => Payload::Value(f(value)),
        }
    }
}

impl<T: PartialEq + Serialize> PartialEq for Payload<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::Missing, Payload::Missing) | (Payload::Null, Payload::Null) => true,
            (Payload::Value(a), Payload::Value(b)) => a == b,
            (Payload::Null, Payload::Value(value)) | (Payload::Value(value), Payload::Null) => {
                serializes_to_null(value)
            }
            _ => false,
        }
    }
}

impl<T: Eq + Serialize> Eq for Payload<T> {}

fn serializes_to_null<T: Serialize>(value: &T) -> bool {
    matches!(
        value.serialize(serde_json::value::Serializer),
        Ok(serde_json::Value::Null)
    )
}

impl<T> From<T> for Payload<T> {
    fn from(value: T) -> Self {
        Payload::Value(value)
    }
}

impl<T> From<Option<T>> for Payload<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Payload::Value(value),
            None => Payload::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_is_distinct_from_null() {
        let missing: Payload<String> = Payload::Missing;
        let null: Payload<String> = Payload::Null;

        assert_ne!(missing, null);
        assert!(missing.is_missing());
        assert!(!null.is_missing());
        assert!(null.is_null());
    }

    #[test]
    fn test_value_serializing_to_null_equals_null() {
        assert_eq!(Payload::Value(serde_json::Value::Null), Payload::Null);
        assert_eq!(Payload::<Option<u8>>::Null, Payload::Value(None));
        assert_ne!(Payload::Value(Some(0u8)), Payload::Null);
        assert_ne!(Payload::Value(serde_json::Value::Null), Payload::Missing);
        assert_ne!(Payload::Value(0), Payload::Value(1));
    }

    #[test]
    fn test_into_value() {
        assert_eq!(Payload::Value(3).into_value(), Some(3));
        assert_eq!(Payload::<i32>::Null.into_value(), None);
        assert_eq!(Payload::<i32>::Missing.into_value(), None);
    }

    #[test]
    fn test_map_keeps_variant() {
        assert_eq!(Payload::Value(2).map(|v| v * 10), Payload::Value(20));
        assert_eq!(Payload::<i32>::Null.map(|v| v * 10), Payload::Null);
        assert_eq!(Payload::<i32>::Missing.map(|v| v * 10), Payload::Missing);
    }
}
