//! # Trail Records
//!
//! A [`Trail`] wraps the raw JSON object read from the data file. All source
//! fields are kept verbatim (and in source order) so that exports round-trip;
//! typed accessors read the handful of fields the query engine needs.
//!
//! Accessors are lenient: a field with the wrong JSON type reads as absent,
//! so a malformed record simply fails to match instead of erroring.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::GpsPoint;

/// Key of the load-timestamp metadata field.
pub const LOADED_AT_KEY: &str = "_loaded_at";

/// Key of the source-position metadata field.
pub const INDEX_KEY: &str = "_index";

/// One eco-trail record as held in the cached collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trail {
    #[serde(flatten)]
    fields: Map<String, Value>,
    #[serde(rename = "_loaded_at")]
    loaded_at: DateTime<Local>,
    #[serde(rename = "_index")]
    index: usize,
}

impl Trail {
    /// Build a trail from a raw source object.
    ///
    /// Any `_loaded_at` / `_index` keys already present in the source (e.g. in
    /// a previously exported file) are dropped and replaced by the new stamp.
    pub fn from_raw(mut fields: Map<String, Value>, index: usize, loaded_at: DateTime<Local>) -> Self {
        fields.shift_remove(LOADED_AT_KEY);
        fields.shift_remove(INDEX_KEY);
        Self {
            fields,
            loaded_at,
            index,
        }
    }

    /// The domain fields of the record, without load metadata.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Raw access to a single top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// When this record was loaded.
    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }

    /// Position of the record in the unfiltered source list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// String identifier. Non-string ids are admitted at load time but read as `None`.
    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    /// The `location` sub-object, if it is an object.
    pub fn location(&self) -> Option<&Map<String, Value>> {
        self.fields.get("location").and_then(Value::as_object)
    }

    pub fn region(&self) -> Option<&str> {
        self.location()?.get("region")?.as_str()
    }

    /// String entries of `location.keywords`, in order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.location()
            .and_then(|loc| loc.get("keywords"))
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// The `trail_details` sub-object, if it is an object.
    pub fn trail_details(&self) -> Option<&Map<String, Value>> {
        self.fields.get("trail_details").and_then(Value::as_object)
    }

    pub fn difficulty(&self) -> Option<&str> {
        self.trail_details()?.get("difficulty")?.as_str()
    }

    /// `best_season` when it is a list; `None` if absent or of another type.
    pub fn seasons(&self) -> Option<&[Value]> {
        self.fields
            .get("best_season")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Valid coordinates, or `None` if missing, non-numeric or out of range.
    pub fn coordinates(&self) -> Option<GpsPoint> {
        coordinates_of(self.fields.get("location"))
    }

    pub fn has_valid_coordinates(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Run the full validator over this record's domain fields.
    pub fn validate(&self) -> crate::Validation {
        crate::validation::validate_fields(&self.fields)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Read `coordinates.lat` / `coordinates.lng` from a `location` value.
pub(crate) fn coordinates_of(location: Option<&Value>) -> Option<GpsPoint> {
    let coords = location?.as_object()?.get("coordinates")?.as_object()?;
    let lat = number(coords.get("lat")?)?;
    let lng = number(coords.get("lng")?)?;
    let point = GpsPoint::new(lat, lng);
    point.is_valid().then_some(point)
}

fn number(value: &Value) -> Option<f64> {
    if value.is_number() {
        value.as_f64()
    } else {
        None
    }
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
