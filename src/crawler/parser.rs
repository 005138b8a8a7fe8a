//! Listing and detail payload decoding
//!
//! This module turns raw API bodies into crate types:
//! - Listing pages become a [`ListingResult`], skipping entries without an id
//! - Detail bodies become a flattened [`PostingDetail`]

use crate::crawler::types::{ListingResult, PostingDetail, Salary};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// A listing entry that cannot be followed up because it has no id
#[derive(Debug, Error)]
#[error("Missing vacancy ID in listing entry: {entry}")]
pub struct MissingPostingId {
    pub entry: String,
}

#[derive(Debug, Deserialize)]
struct RawListingPage {
    items: Option<Vec<Value>>,
    found: Option<u64>,
}

/// Nested `{ "name": ... }` objects the API uses for dictionaries
#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVacancy {
    name: Option<String>,
    salary: Option<Salary>,
    published_at: Option<String>,
    description: Option<String>,
    experience: Option<Named>,
    employment: Option<Named>,
    schedule: Option<Named>,
    key_skills: Option<Vec<Named>>,
    area: Option<Named>,
    employer: Option<Named>,
}

/// Parses a listing page body
///
/// Entries without an id are logged and counted in
/// [`ListingResult::skipped_entries`]; the rest of the page is kept. A missing
/// `found` counts as zero and a missing `items` as an empty page.
///
/// # Example
///
/// ```
/// use hh_harvest::crawler::parse_listing;
///
/// let page = parse_listing(r#"{"found": 2, "items": [{"id": "1"}, {"name": "x"}]}"#).unwrap();
/// assert_eq!(page.total_found, 2);
/// assert_eq!(page.posting_ids, vec!["1".to_string()]);
/// assert_eq!(page.skipped_entries, 1);
/// ```
pub fn parse_listing(body: &str) -> Result<ListingResult, serde_json::Error> {
    let raw: RawListingPage = serde_json::from_str(body)?;

    let mut result = ListingResult {
        total_found: raw.found.unwrap_or(0),
        ..ListingResult::default()
    };

    for item in raw.items.unwrap_or_default() {
        match extract_posting_id(&item) {
            Ok(id) => result.posting_ids.push(id),
            Err(e) => {
                tracing::error!("{}", e);
                result.skipped_entries += 1;
            }
        }
    }

    Ok(result)
}

/// Reads the id of a listing entry
///
/// The API sends ids as strings; numeric ids are accepted too. Missing, null
/// and empty ids are integrity errors.
pub fn extract_posting_id(item: &Value) -> Result<String, MissingPostingId> {
    let id = match item.get("id") {
        Some(Value::String(id)) => id.trim().to_string(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    };

    if id.is_empty() {
        return Err(MissingPostingId {
            entry: item.to_string(),
        });
    }

    Ok(id)
}

/// Parses and normalizes a posting detail body
///
/// Dictionary fields collapse to their `name`; absent or null objects become
/// `None`. Key skills without a name are dropped.
pub fn parse_detail(posting_id: &str, body: &str) -> Result<PostingDetail, serde_json::Error> {
    let raw: RawVacancy = serde_json::from_str(body)?;

    Ok(PostingDetail {
        id: posting_id.to_string(),
        name: raw.name,
        salary: raw.salary,
        published_at: raw.published_at,
        description: raw.description,
        experience: name_of(raw.experience),
        employment: name_of(raw.employment),
        schedule: name_of(raw.schedule),
        key_skills: raw
            .key_skills
            .unwrap_or_default()
            .into_iter()
            .filter_map(|skill| skill.name)
            .collect(),
        city: name_of(raw.area),
        employer: name_of(raw.employer),
    })
}

fn name_of(field: Option<Named>) -> Option<String> {
    field.and_then(|named| named.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_listing() {
        let body = json!({
            "found": 2500,
            "page": 0,
            "items": [
                {"id": "93000001", "name": "Rust developer"},
                {"id": "93000002", "name": "Welder"}
            ]
        })
        .to_string();

        let result = parse_listing(&body).unwrap();
        assert_eq!(result.total_found, 2500);
        assert_eq!(result.posting_ids, vec!["93000001", "93000002"]);
        assert_eq!(result.skipped_entries, 0);
    }

    #[test]
    fn test_parse_listing_skips_entries_without_id() {
        let body = json!({
            "found": 4,
            "items": [
                {"id": "1"},
                {"name": "no id at all"},
                {"id": null},
                {"id": ""},
                {"id": 42}
            ]
        })
        .to_string();

        let result = parse_listing(&body).unwrap();
        assert_eq!(result.posting_ids, vec!["1", "42"]);
        assert_eq!(result.skipped_entries, 3);
    }

    #[test]
    fn test_parse_listing_defaults() {
        let result = parse_listing("{}").unwrap();
        assert_eq!(result.total_found, 0);
        assert!(result.posting_ids.is_empty());

        let result = parse_listing(r#"{"found": 0, "items": null}"#).unwrap();
        assert!(result.posting_ids.is_empty());
    }

    #[test]
    fn test_parse_listing_invalid_json() {
        assert!(parse_listing("<html>502 Bad Gateway</html>").is_err());
        assert!(parse_listing(r#"{"found": "many"}"#).is_err());
    }

    #[test]
    fn test_parse_detail_flattens_nested_fields() {
        let body = json!({
            "id": "93000001",
            "name": "Rust developer",
            "salary": {"from": 150000, "to": null, "currency": "RUR", "gross": false},
            "published_at": "2024-01-05T10:15:00+0800",
            "description": "<p>Write Rust</p>",
            "experience": {"id": "between1And3", "name": "От 1 года до 3 лет"},
            "employment": {"id": "full", "name": "Полная занятость"},
            "schedule": {"id": "remote", "name": "Удаленная работа"},
            "key_skills": [{"name": "Rust"}, {"name": "Tokio"}, {}],
            "area": {"id": "35", "name": "Иркутск"},
            "employer": {"id": "1", "name": "Acme"}
        })
        .to_string();

        let detail = parse_detail("93000001", &body).unwrap();
        assert_eq!(detail.id, "93000001");
        assert_eq!(detail.name.as_deref(), Some("Rust developer"));
        assert_eq!(detail.experience.as_deref(), Some("От 1 года до 3 лет"));
        assert_eq!(detail.employment.as_deref(), Some("Полная занятость"));
        assert_eq!(detail.schedule.as_deref(), Some("Удаленная работа"));
        assert_eq!(detail.key_skills, vec!["Rust", "Tokio"]);
        assert_eq!(detail.city.as_deref(), Some("Иркутск"));
        assert_eq!(detail.employer.as_deref(), Some("Acme"));

        let salary = detail.salary.unwrap();
        assert_eq!(salary.from.map(|n| n.to_string()).as_deref(), Some("150000"));
        assert!(salary.to.is_none());
        assert_eq!(salary.currency.as_deref(), Some("RUR"));
        assert_eq!(salary.gross, Some(false));
    }

    #[test]
    fn test_parse_detail_missing_salary_is_none() {
        let body = json!({"name": "Driver", "area": {"name": "Братск"}}).to_string();

        let detail = parse_detail("7", &body).unwrap();
        assert!(detail.salary.is_none());
        assert_eq!(detail.city.as_deref(), Some("Братск"));
    }

    #[test]
    fn test_parse_detail_tolerates_absent_and_null_objects() {
        let body = json!({
            "name": "Cook",
            "salary": null,
            "experience": null,
            "employer": {"id": "5"},
            "key_skills": null
        })
        .to_string();

        let detail = parse_detail("8", &body).unwrap();
        assert!(detail.salary.is_none());
        assert!(detail.experience.is_none());
        assert!(detail.employment.is_none());
        assert!(detail.schedule.is_none());
        assert!(detail.employer.is_none());
        assert!(detail.city.is_none());
        assert!(detail.key_skills.is_empty());
    }

    #[test]
    fn test_parse_detail_invalid_json() {
        assert!(parse_detail("9", "not json").is_err());
        assert!(parse_detail("9", "[1, 2, 3]").is_err());
    }
}
