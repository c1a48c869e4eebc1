//! Standalone record validation.
//!
//! This is the strict check. It is deliberately separate from the loader's
//! admission rules, which only require an `id`; a record can be admitted
//! into the collection and still fail here.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::trail::{coordinates_of, is_truthy};

pub const MISSING_ID: &str = "missing required field: id";
pub const MISSING_NAME: &str = "missing required field: name";
pub const INVALID_COORDINATES: &str = "invalid or missing coordinates";
pub const LOCATION_NOT_OBJECT: &str = "'location' must be an object";
pub const DETAILS_NOT_OBJECT: &str = "'trail_details' must be an object";
pub const SEASONS_NOT_LIST: &str = "'best_season' must be a list";

/// Outcome of validating one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// True iff `errors` is empty
    pub valid: bool,
    /// Human-readable problems, in rule order
    pub errors: Vec<String>,
}

impl Validation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate a raw record. Rules accumulate; a non-object record fails the
/// id, name and coordinate rules.
pub fn validate(record: &Value) -> Validation {
    match record.as_object() {
        Some(fields) => validate_fields(fields),
        None => validate_fields(&Map::new()),
    }
}

pub(crate) fn validate_fields(fields: &Map<String, Value>) -> Validation {
    let mut errors = Vec::new();

    if !fields.get("id").is_some_and(is_truthy) {
        errors.push(MISSING_ID.to_string());
    }
    if !fields.get("name").is_some_and(is_truthy) {
        errors.push(MISSING_NAME.to_string());
    }
    if coordinates_of(fields.get("location")).is_none() {
        errors.push(INVALID_COORDINATES.to_string());
    }

    // Present-but-null counts as the wrong type
    if fields.get("location").is_some_and(|v| !v.is_object()) {
        errors.push(LOCATION_NOT_OBJECT.to_string());
    }
    if fields.get("trail_details").is_some_and(|v| !v.is_object()) {
        errors.push(DETAILS_NOT_OBJECT.to_string());
    }
    if fields.get("best_season").is_some_and(|v| !v.is_array()) {
        errors.push(SEASONS_NOT_LIST.to_string());
    }

    Validation::from_errors(errors)
}
