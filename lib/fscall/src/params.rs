//! Closed-schema parameter extraction.
//!
//! Every call that takes JSON parameters declares the complete set of fields
//! it understands. A payload field outside that set fails the call, values are
//! coerced to the declared kind, and required string fields must be non-empty.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::FsCallError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Int32,
}

impl FieldKind {
    fn expected(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
            FieldKind::Int32 => "int32",
        }
    }
}

/// Descriptor of a single accepted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::String,
            required: false,
        }
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Boolean,
            required: false,
        }
    }

    pub const fn int32(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Int32,
            required: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    String(String),
    Boolean(bool),
    Int32(i32),
}

/// Parameters that passed validation against a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<&'static str, ParamValue>,
}

impl Params {
    /// Parses `payload` as a JSON object and checks it against `schema`.
    pub fn parse(payload: &[u8], schema: &[Field]) -> Result<Self, FsCallError> {
        let object: Map<String, Value> =
            serde_json::from_slice(payload).map_err(FsCallError::MalformedPayload)?;
        Self::from_object(object, schema)
    }

    pub fn from_object(object: Map<String, Value>, schema: &[Field]) -> Result<Self, FsCallError> {
        // Every key is checked against the schema before any value is coerced.
        if let Some(name) = object
            .keys()
            .find(|name| !schema.iter().any(|f| f.name == name.as_str()))
        {
            return Err(FsCallError::UnknownField(name.clone()));
        }

        let mut values = BTreeMap::new();
        for (name, value) in object {
            let Some(field) = schema.iter().find(|f| f.name == name) else {
                return Err(FsCallError::UnknownField(name));
            };
            values.insert(field.name, coerce(field, value)?);
        }

        for field in schema.iter().filter(|f| f.required) {
            match values.get(field.name) {
                None => return Err(FsCallError::MissingRequiredParameter(field.name)),
                Some(ParamValue::String(s)) if s.is_empty() => {
                    return Err(FsCallError::MissingRequiredParameter(field.name));
                }
                Some(_) => {}
            }
        }

        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParamValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// A required string; validation already guaranteed it is present and non-empty.
    pub fn required_str(&self, name: &'static str) -> Result<&str, FsCallError> {
        match self.str(name) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(FsCallError::MissingRequiredParameter(name)),
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        match self.values.get(name) {
            Some(ParamValue::Boolean(b)) => *b,
            _ => default,
        }
    }

    pub fn i32_or(&self, name: &str, default: i32) -> i32 {
        match self.values.get(name) {
            Some(ParamValue::Int32(i)) => *i,
            _ => default,
        }
    }

    /// An int32 field that must not be negative, widened for use as a file offset or length.
    pub fn u64_or(&self, name: &'static str, default: u64) -> Result<u64, FsCallError> {
        match self.values.get(name) {
            Some(ParamValue::Int32(i)) => u64::try_from(*i).map_err(|_| {
                FsCallError::TypeMismatch {
                    name,
                    expected: "non-negative int32",
                }
            }),
            _ => Ok(default),
        }
    }
}

fn coerce(field: &Field, value: Value) -> Result<ParamValue, FsCallError> {
    let mismatch = || FsCallError::TypeMismatch {
        name: field.name,
        expected: field.kind.expected(),
    };
    match (field.kind, value) {
        (FieldKind::String, Value::String(s)) => Ok(ParamValue::String(s)),
        (FieldKind::Boolean, Value::Bool(b)) => Ok(ParamValue::Boolean(b)),
        (FieldKind::Int32, Value::Number(n)) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(ParamValue::Int32)
            .ok_or_else(mismatch),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCHEMA: &[Field] = &[
        Field::string("path").required(),
        Field::boolean("hex"),
        Field::int32("offset"),
    ];

    #[test]
    fn accepts_declared_fields() {
        let params = Params::parse(br#"{"path": "/tmp/a", "hex": true, "offset": 12}"#, SCHEMA)
            .unwrap();
        assert_eq!(params.required_str("path").unwrap(), "/tmp/a");
        assert!(params.bool_or("hex", false));
        assert_eq!(params.i32_or("offset", 0), 12);
    }

    #[test]
    fn optional_fields_fall_back_to_defaults() {
        let params = Params::parse(br#"{"path": "/tmp/a"}"#, SCHEMA).unwrap();
        assert!(!params.bool_or("hex", false));
        assert_eq!(params.u64_or("offset", 0).unwrap(), 0);
    }

    #[test]
    fn rejects_unknown_field() {
        let err = Params::parse(br#"{"path": "/tmp/a", "mode": "rw"}"#, SCHEMA).unwrap_err();
        assert!(matches!(err, FsCallError::UnknownField(name) if name == "mode"));
    }

    #[test]
    fn unknown_field_wins_over_a_wrongly_typed_field() {
        // "hex" sorts before "zzz", so a single pass would coerce it first.
        let err = Params::parse(br#"{"hex": "yes", "zzz": 1, "path": "/tmp"}"#, SCHEMA).unwrap_err();
        assert!(matches!(err, FsCallError::UnknownField(name) if name == "zzz"));

        let err = Params::parse(br#"{"aaa": 1, "path": 7}"#, SCHEMA).unwrap_err();
        assert!(matches!(err, FsCallError::UnknownField(name) if name == "aaa"));
    }

    #[test]
    fn rejects_missing_or_empty_required_string() {
        let err = Params::parse(br#"{"hex": false}"#, SCHEMA).unwrap_err();
        assert!(matches!(err, FsCallError::MissingRequiredParameter("path")));

        let err = Params::parse(br#"{"path": ""}"#, SCHEMA).unwrap_err();
        assert!(matches!(err, FsCallError::MissingRequiredParameter("path")));
    }

    #[test]
    fn rejects_values_of_the_wrong_kind() {
        for payload in [
            br#"{"path": 1}"#.as_slice(),
            br#"{"path": "/a", "hex": "yes"}"#,
            br#"{"path": "/a", "hex": null}"#,
            br#"{"path": "/a", "offset": 1.5}"#,
            br#"{"path": "/a", "offset": 4294967296}"#,
        ] {
            let err = Params::parse(payload, SCHEMA).unwrap_err();
            assert!(
                matches!(err, FsCallError::TypeMismatch { .. }),
                "unexpected error {err:?}"
            );
        }
    }

    #[test]
    fn negative_offsets_are_rejected_on_widening() {
        let params = Params::parse(br#"{"path": "/a", "offset": -1}"#, SCHEMA).unwrap();
        assert!(matches!(
            params.u64_or("offset", 0),
            Err(FsCallError::TypeMismatch { name: "offset", .. })
        ));
    }

    #[test]
    fn required_non_string_must_be_present() {
        const SIZED: &[Field] = &[Field::string("path").required(), Field::int32("size").required()];
        let err = Params::parse(br#"{"path": "/a"}"#, SIZED).unwrap_err();
        assert!(matches!(err, FsCallError::MissingRequiredParameter("size")));
    }

    #[test]
    fn non_object_payloads_are_malformed() {
        for payload in [b"[]".as_slice(), b"\"path\"", b"", b"{"] {
            let err = Params::parse(payload, SCHEMA).unwrap_err();
            assert!(matches!(err, FsCallError::MalformedPayload(_)));
        }
    }
}
