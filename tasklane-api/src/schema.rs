/// Request payload schemas
///
/// A payload is loaded in three steps:
///
/// 1. Keys outside the schema's field table, or in `exclude`, are dropped.
/// 2. Each remaining field is type-checked against its [`FieldKind`];
///    missing required fields and disallowed nulls are reported.
/// 3. The cleaned map is deserialized into the typed input and its
///    `validator` rules (lengths, email format) run.
///
/// Any failure becomes `ApiError::ValidationError` with one detail per field.
/// The cleaned map is returned alongside the typed input so update handlers
/// can merge exactly the fields the client sent.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{ApiError, ValidationErrorDetail};

pub const MISSING: &str = "Missing data for required field.";
pub const NULL: &str = "Field may not be null.";

/// Field reported when the payload as a whole is unusable
pub const SCHEMA_FIELD: &str = "_schema";

/// JSON type a field must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    IntegerList,

    /// RFC 3339 timestamp string
    DateTime,
}

impl FieldKind {
    fn check(self, value: &Value) -> Result<(), &'static str> {
        let ok = match self {
            FieldKind::String => value.is_string(),
            FieldKind::Integer => value.is_i64(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::IntegerList => {
                let Some(items) = value.as_array() else {
                    return Err("Not a valid list.");
                };
                items.iter().all(Value::is_i64)
            }
            FieldKind::DateTime => value
                .as_str()
                .map(|s| DateTime::parse_from_rfc3339(s).is_ok())
                .unwrap_or(false),
        };

        if ok {
            Ok(())
        } else {
            Err(self.invalid_message())
        }
    }

    fn invalid_message(self) -> &'static str {
        match self {
            FieldKind::String => "Not a valid string.",
            FieldKind::Integer => "Not a valid integer.",
            FieldKind::Boolean => "Not a valid boolean.",
            FieldKind::IntegerList => "Not a valid integer.",
            FieldKind::DateTime => "Not a valid datetime.",
        }
    }
}

/// One schema field
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
}

impl Field {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            nullable: false,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: false,
        }
    }

    pub const fn nullable(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: true,
        }
    }
}

/// A typed request body with a field table
pub trait Schema: DeserializeOwned + Validate {
    const FIELDS: &'static [Field];
}

/// Result of a successful load
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    /// Schema fields present in the payload, minus exclusions
    pub data: Map<String, Value>,

    pub input: T,
}

/// Loads `payload` through schema `T`
///
/// With `partial`, required fields may be absent (update semantics).
pub fn load<T: Schema>(
    payload: &Map<String, Value>,
    exclude: &[&str],
    partial: bool,
) -> Result<Loaded<T>, ApiError> {
    let mut data = Map::new();
    let mut errors = Vec::new();

    for field in T::FIELDS.iter().filter(|f| !exclude.contains(&f.name)) {
        match payload.get(field.name) {
            None if field.required && !partial => {
                errors.push(ValidationErrorDetail::new(field.name, MISSING));
            }
            None => {}
            Some(Value::Null) if !field.nullable => {
                errors.push(ValidationErrorDetail::new(field.name, NULL));
            }
            Some(Value::Null) => {
                data.insert(field.name.to_string(), Value::Null);
            }
            Some(value) => match field.kind.check(value) {
                Ok(()) => {
                    data.insert(field.name.to_string(), value.clone());
                }
                Err(message) => errors.push(ValidationErrorDetail::new(field.name, message)),
            },
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::ValidationError(errors));
    }

    let input: T = serde_json::from_value(Value::Object(data.clone()))
        .map_err(|e| ApiError::invalid_field(SCHEMA_FIELD, e.to_string()))?;
    input.validate()?;

    Ok(Loaded { data, input })
}

/// JSON object body
///
/// Like `axum::Json<Map<..>>`, but a missing or malformed body is reported as
/// a schema validation error instead of axum's plain-text rejection.
#[derive(Debug, Clone)]
pub struct JsonObject(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid_field(SCHEMA_FIELD, rejection.body_text()))?;

        match value {
            Value::Object(map) => Ok(JsonObject(map)),
            _ => Err(ApiError::invalid_field(SCHEMA_FIELD, "Invalid input type.")),
        }
    }
}
