//! Field Extractor: raw API records to [`NormalizedJobRecord`]s.
//!
//! The subset of the API shape we consume is declared in [`JobShape`]. Every field
//! is optional and deserialised leniently: a value of the wrong JSON type is
//! treated as absent and ends up as an empty string, never as an error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::contract::{NormalizedJobRecord, RawJobRecord};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Keep only the leading `YYYY-MM-DD` of `publication_date`.
    pub date_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub records: Vec<NormalizedJobRecord>,
    /// Records dropped because they were not JSON objects.
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct JobShape {
    #[serde(default, deserialize_with = "lenient")]
    publication_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    job_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    locations: Option<Vec<serde_json::Value>>,
    #[serde(default, deserialize_with = "lenient_object")]
    company: Option<CompanyShape>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocationShape {
    Named {
        #[serde(default, deserialize_with = "lenient")]
        name: Option<String>,
    },
    Plain(String),
}

#[derive(Debug, Deserialize)]
struct CompanyShape {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`], but only a JSON object may become a struct. serde would
/// otherwise fill struct fields positionally from an array.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(struct_from_value(value))
}

fn struct_from_value<T: DeserializeOwned>(value: serde_json::Value) -> Option<T> {
    if value.is_array() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Name of a single `locations` entry. Only the first entry is ever decoded.
fn location_name(entry: serde_json::Value) -> Option<String> {
    match struct_from_value::<LocationShape>(entry)? {
        LocationShape::Named { name } => name,
        LocationShape::Plain(name) => Some(name),
    }
}

impl JobShape {
    fn normalize(self, options: &ExtractOptions) -> NormalizedJobRecord {
        let publication_date = self.publication_date.unwrap_or_default();
        let publication_date = if options.date_only {
            publication_date
                .get(..10)
                .map(str::to_string)
                .unwrap_or(publication_date)
        } else {
            publication_date
        };

        let location = self
            .locations
            .and_then(|locations| locations.into_iter().next())
            .and_then(location_name)
            .unwrap_or_default();

        NormalizedJobRecord {
            publication_date,
            name: self.name.unwrap_or_default(),
            job_type: self.job_type.unwrap_or_default(),
            location,
            company: self.company.and_then(|c| c.name).unwrap_or_default(),
        }
    }
}

/// Projects each raw record onto the five output fields, preserving input order.
///
/// Records that are not JSON objects are skipped and counted; nothing else fails.
pub fn extract(raw_records: Vec<RawJobRecord>, options: &ExtractOptions) -> Extraction {
    let mut extraction = Extraction {
        records: Vec::with_capacity(raw_records.len()),
        skipped: 0,
    };

    for (index, raw) in raw_records.into_iter().enumerate() {
        if !raw.is_object() {
            warn!(index, kind = json_kind(&raw), "Skipping job record that is not an object");
            extraction.skipped += 1;
            continue;
        }
        match serde_json::from_value::<JobShape>(raw) {
            Ok(shape) => extraction.records.push(shape.normalize(options)),
            Err(e) => {
                warn!(index, error = %e, "Skipping unparseable job record");
                extraction.skipped += 1;
            }
        }
    }

    debug!(
        extracted = extraction.records.len(),
        skipped = extraction.skipped,
        "Field extraction finished"
    );
    extraction
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
