//! Request and response shapes. JSON field names are camelCase throughout.

pub mod analytics;
pub mod auth;
pub mod inventory;
pub mod stock_history;
pub mod supplier;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Standard pagination response metadata. `page` is zero-based.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u64,
    pub size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u64, size: u64, total: u64) -> Self {
        let total_pages = if total == 0 || size == 0 {
            0
        } else {
            (total + size - 1) / size
        };
        Self {
            page,
            size,
            total,
            total_pages,
        }
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u64, size: u64, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page, size, total),
        }
    }
}

/// Parses an instant given as RFC 3339, a zone-less ISO date-time (read as UTC), or a bare
/// date (start of that day, UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn de_opt_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_instant(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date-time: {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("2024-05-01T10:15:00Z")]
    #[case("2024-05-01T12:15:00+02:00")]
    #[case("2024-05-01T10:15:00")]
    #[case("2024-05-01T10:15")]
    fn parses_supported_instant_formats(#[case] raw: &str) {
        assert_eq!(
            parse_instant(raw),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap())
        );
    }

    #[test]
    fn pagination_meta_rounds_pages_up() {
        let meta = PaginationMeta::new(0, 50, 101);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(PaginationMeta::new(0, 50, 0).total_pages, 0);
    }

    #[test]
    fn bare_date_is_start_of_day() {
        assert_eq!(
            parse_instant("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_instant("yesterday"), None);
    }

    #[test]
    fn filter_body_accepts_blank_and_null_dates() {
        let filter: analytics::StockUpdateFilter =
            serde_json::from_str(r#"{"startDate": "", "endDate": null, "minChange": 2}"#).unwrap();
        assert!(filter.start_date.is_none());
        assert!(filter.end_date.is_none());
        assert_eq!(filter.min_change, Some(2));
    }
}
