use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::ValidationError;

/// Represents optional field semantics in PATCH/UPDATE requests.
///
/// - `Unchanged` → field absent from the payload
/// - `SetToNull` → explicitly `null`
/// - `SetToValue` → set to provided value
///
/// Pair with `#[serde(default, skip_serializing_if = "OptionField::is_unchanged")]`
/// so that an absent key stays `Unchanged` on both sides of the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionField<T> {
    #[default]
    Unchanged,
    SetToNull,
    SetToValue(T),
}

impl<T: Serialize> Serialize for OptionField<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionField::SetToValue(value) => value.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OptionField<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => OptionField::SetToValue(value),
            None => OptionField::SetToNull,
        })
    }
}

impl<T> OptionField<T> {
    pub fn as_ref_option(&self) -> Option<Option<&T>> {
        match self {
            Self::Unchanged => None,
            Self::SetToNull => Some(None),
            Self::SetToValue(value) => Some(Some(value)),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn value_ref(&self) -> Option<&T> {
        if let Self::SetToValue(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

impl OptionField<String> {
    /// Applies a nullable string patch onto `target`.
    /// A blank value clears the field like `null` does.
    pub fn apply_to(&self, target: &mut Option<String>) {
        match self.as_ref_option() {
            None => {}
            Some(None) => *target = None,
            Some(Some(value)) if value.trim().is_empty() => *target = None,
            Some(Some(value)) => *target = Some(value.trim().to_string()),
        }
    }
}

/// Validates a URL patch; `Unchanged`, `null` and blank values pass.
pub fn validate_patch_url(field: &OptionField<String>) -> Result<(), ValidationError> {
    match field.value_ref() {
        Some(value) if !value.trim().is_empty() => validate_url(value),
        _ => Ok(()),
    }
}

pub fn validate_url(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    match url::Url::parse(value.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => {
            let mut error = ValidationError::new("url");
            error.message = Some("Must be a valid http(s) URL".into());
            Err(error)
        }
    }
}

pub type PatchString = OptionField<String>;
