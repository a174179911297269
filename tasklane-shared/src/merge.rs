/// Allow-listed field merge
///
/// Applies a JSON payload onto a typed entity. The effective field set is
///
/// ```text
/// (payload keys − exclude) ∩ fields (when non-empty) − {"id"}
/// ```
///
/// and every remaining value goes through the entity's own setter, which only
/// knows the fields in [`MergeFields::FIELDS`]. Anything else is rejected with
/// [`MergeError::UnknownField`] instead of being written.
///
/// # Example
///
/// ```
/// use serde_json::{json, Value};
/// use tasklane_shared::merge::{merge_fields, MergeError, MergeFields};
///
/// #[derive(Default)]
/// struct Label {
///     text: String,
/// }
///
/// impl MergeFields for Label {
///     const FIELDS: &'static [&'static str] = &["text"];
///
///     fn assign(&mut self, field: &str, value: Value) -> Result<(), MergeError> {
///         match field {
///             "text" => self.text = tasklane_shared::merge::parse(field, value)?,
///             _ => return Err(MergeError::UnknownField(field.to_string())),
///         }
///         Ok(())
///     }
/// }
///
/// let mut label = Label::default();
/// let payload = json!({"text": "urgent", "id": 3});
/// merge_fields(&mut label, payload.as_object().unwrap(), &[], &[]).unwrap();
/// assert_eq!(label.text, "urgent");
/// ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Field that is never written by a merge
pub const IDENTITY_FIELD: &str = "id";

/// Error type for merge operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// Field is not on the entity's allow-list
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Value has the wrong shape for the field
    #[error("Invalid value for field {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Entity that accepts field writes from a JSON payload
pub trait MergeFields {
    /// Fields that may be written
    const FIELDS: &'static [&'static str];

    /// Writes one allow-listed field
    fn assign(&mut self, field: &str, value: Value) -> Result<(), MergeError>;
}

/// Decodes a JSON value for a named field
pub fn parse<T: DeserializeOwned>(field: &str, value: Value) -> Result<T, MergeError> {
    serde_json::from_value(value).map_err(|e| MergeError::InvalidValue {
        field: field.to_string(),
        message: e.to_string(),
    })
}

/// Computes the fields a merge would write
///
/// An empty `fields` slice means "no whitelist".
pub fn effective_fields(
    payload: &Map<String, Value>,
    fields: &[&str],
    exclude: &[&str],
) -> BTreeSet<String> {
    payload
        .keys()
        .filter(|key| !exclude.contains(&key.as_str()))
        .filter(|key| fields.is_empty() || fields.contains(&key.as_str()))
        .filter(|key| key.as_str() != IDENTITY_FIELD)
        .cloned()
        .collect()
}

/// Applies `payload` onto `target`
///
/// All effective fields are checked against the allow-list before any write
/// happens. Returns the names of the fields written, in sorted order.
///
/// # Errors
///
/// - `MergeError::UnknownField` if an effective field is not allow-listed
/// - `MergeError::InvalidValue` if a value cannot be decoded; earlier fields
///   may already have been written, so merge into a copy when that matters
pub fn merge_fields<T: MergeFields>(
    target: &mut T,
    payload: &Map<String, Value>,
    fields: &[&str],
    exclude: &[&str],
) -> Result<Vec<String>, MergeError> {
    let effective = effective_fields(payload, fields, exclude);

    if let Some(unknown) = effective.iter().find(|f| !T::FIELDS.contains(&f.as_str())) {
        return Err(MergeError::UnknownField(unknown.clone()));
    }

    for field in &effective {
        if let Some(value) = payload.get(field) {
            target.assign(field, value.clone())?;
        }
    }

    Ok(effective.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq)]
    struct Sample {
        id: i64,
        a: i64,
        b: i64,
        label: Option<String>,
    }

    impl MergeFields for Sample {
        const FIELDS: &'static [&'static str] = &["id", "a", "b", "label"];

        fn assign(&mut self, field: &str, value: Value) -> Result<(), MergeError> {
            match field {
                "id" => self.id = parse(field, value)?,
                "a" => self.a = parse(field, value)?,
                "b" => self.b = parse(field, value)?,
                "label" => self.label = parse(field, value)?,
                _ => return Err(MergeError::UnknownField(field.to_string())),
            }
            Ok(())
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_exclude_and_identity_are_skipped() {
        let mut sample = Sample::default();
        let payload = object(json!({"a": 1, "b": 2, "id": 99}));

        let written = merge_fields(&mut sample, &payload, &[], &["b"]).unwrap();

        assert_eq!(written, vec!["a".to_string()]);
        assert_eq!(sample.a, 1);
        assert_eq!(sample.b, 0);
        assert_eq!(sample.id, 0);
    }

    #[test]
    fn test_whitelist_intersects_payload() {
        let mut sample = Sample::default();
        let payload = object(json!({"a": 1, "b": 2}));

        merge_fields(&mut sample, &payload, &["b", "label"], &[]).unwrap();

        assert_eq!(sample.a, 0);
        assert_eq!(sample.b, 2);
        assert_eq!(sample.label, None);
    }

    #[test]
    fn test_id_skipped_even_when_whitelisted() {
        let fields = effective_fields(&object(json!({"id": 5, "a": 1})), &["id", "a"], &[]);
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["a".to_string()]);
    }

    #[test]
    fn test_unknown_field_rejected_before_any_write() {
        let mut sample = Sample::default();
        let payload = object(json!({"a": 1, "owner": 2}));

        let err = merge_fields(&mut sample, &payload, &[], &[]).unwrap_err();

        assert_eq!(err, MergeError::UnknownField("owner".to_string()));
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_invalid_value() {
        let mut sample = Sample::default();
        let payload = object(json!({"a": "one"}));

        let err = merge_fields(&mut sample, &payload, &[], &[]).unwrap_err();
        assert!(matches!(err, MergeError::InvalidValue { ref field, .. } if field == "a"));
    }

    #[test]
    fn test_null_clears_optional_field() {
        let mut sample = Sample {
            label: Some("old".to_string()),
            ..Default::default()
        };

        merge_fields(&mut sample, &object(json!({"label": null})), &[], &[]).unwrap();
        assert_eq!(sample.label, None);
    }
}
