// src/types/evaluation.rs
//! Result shapes owned by the evaluation service, consumed read-only here.
//!
//! The relay endpoints pass upstream payloads through verbatim as an
//! [`EvaluationResultMap`]; the typed model below is the contract the
//! presentation layer codes against when it interprets that payload.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw per-file, per-job result map exactly as the evaluation service
/// returned it: filename -> job code -> evaluation record.
pub type EvaluationResultMap = serde_json::Map<String, Value>;

/// One resume-to-job evaluation. Every field is optional because the
/// service emits degraded records for failed evaluations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_score: Option<f64>,
    /// Accepted as a JSON array, a JSON-encoded string of an array, or a
    /// comma-separated string; always exposed as a list.
    #[serde(default, deserialize_with = "string_list")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub weaknesses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    /// Present on history reads, absent on fresh submissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_details: Option<JobDetails>,
}

/// Job posting details joined onto historical results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub skills: Vec<String>,
}

/// Interpret a verbatim result map into the typed model.
///
/// Leaves that are not evaluation records (the service marks per-file
/// failures with an `error` key) are skipped rather than failing the
/// whole map.
pub fn parse_result_map(map: &EvaluationResultMap) -> BTreeMap<String, BTreeMap<String, Evaluation>> {
    let mut parsed = BTreeMap::new();

    for (file_name, jobs) in map {
        let Some(jobs) = jobs.as_object() else {
            continue;
        };

        let entry: &mut BTreeMap<String, Evaluation> =
            parsed.entry(file_name.clone()).or_default();

        for (job_code, leaf) in jobs {
            if !leaf.is_object() || leaf.get("error").is_some() {
                continue;
            }
            if let Ok(evaluation) = serde_json::from_value::<Evaluation>(leaf.clone()) {
                entry.insert(job_code.clone(), evaluation);
            }
        }
    }

    parsed
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<String>),
        Text(String),
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Repr::List(items)) => items,
        Some(Repr::Text(text)) => parse_text_list(&text),
    })
}

fn parse_text_list(text: &str) -> Vec<String> {
    let trimmed = text.trim();

    if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
        return items;
    }

    trimmed
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// The service emits `isoformat()` timestamps without an offset; other
/// producers append one. Accept both.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}
