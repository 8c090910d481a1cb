use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// A monitored website as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Site {
    pub id: i64,
    pub url: String,
}

/// Status code reported when no HTTP response was received.
pub const NO_RESPONSE: u16 = 0;

/// Outcome of probing a single site, in the shape the backend expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    #[serde(rename = "websiteId")]
    pub site_id: i64,
    pub status_code: u16,
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
    #[serde(rename = "pageLoad")]
    pub page_load_ms: u64,
    #[serde(rename = "pageSize")]
    pub page_size_kb: u64,
    pub is_up: bool,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub checked_at: DateTime<Utc>,
}

/// Load time and document size reported by a [`PageMeasurer`](super::measure::PageMeasurer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeasurement {
    pub load_time_ms: u64,
    pub size_bytes: u64,
}

impl StatusRecord {
    /// Builds the record for a site. `status_code` is `None` when the reachability request
    /// failed before a response arrived; a missing measurement zeroes both page fields.
    pub fn new(
        site_id: i64,
        status_code: Option<u16>,
        response_time_ms: u64,
        page: Option<PageMeasurement>,
    ) -> Self {
        let (page_load_ms, page_size_kb) = match (status_code, page) {
            (Some(_), Some(page)) => (page.load_time_ms, page.size_bytes / 1024),
            _ => (0, 0),
        };

        Self {
            site_id,
            status_code: status_code.unwrap_or(NO_RESPONSE),
            response_time_ms,
            page_load_ms,
            page_size_kb,
            is_up: status_code == Some(200),
            checked_at: Utc::now(),
        }
    }

    pub fn unreachable(site_id: i64, response_time_ms: u64) -> Self {
        Self::new(site_id, None, response_time_ms, None)
    }
}

fn serialize_rfc3339<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
}
