//! Wallet application announcements: new releases and marketing campaigns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Deployment of the application events API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Production,
    Staging,
}

impl AppEnv {
    #[must_use]
    pub const fn api_url(&self) -> &'static str {
        match self {
            Self::Production => "https://api.casperwallet.io",
            Self::Staging => "https://cspr-wallet-api.stg.make.services",
        }
    }
}

/// A client release newer than the running one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppReleaseEvent {
    pub version: String,
    pub breaking: bool,
    pub released: bool,
    pub release_notes: Vec<String>,
}

impl AppReleaseEvent {
    #[must_use]
    pub fn from_json(json: &Value) -> Self {
        Self {
            version: json["version"].as_str().unwrap_or("").to_string(),
            breaking: json["breaking"].as_bool().unwrap_or(false),
            released: json["released"].as_bool().unwrap_or(false),
            release_notes: json["release_notes"]
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|note| note.as_str().map(String::from))
                .collect(),
        }
    }
}

/// A time-boxed marketing campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMarketingEvent {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub start_at: String,
    pub end_at: String,
}

impl AppMarketingEvent {
    #[must_use]
    pub fn from_json(json: &Value) -> Self {
        let text = |field: &str| json[field].as_str().unwrap_or("").to_string();
        Self {
            id: json["id"].as_u64().unwrap_or(0),
            name: text("name"),
            description: text("description"),
            start_at: text("start_at"),
            end_at: text("end_at"),
        }
    }

    /// Running at `now`: started and not yet ended. Events with unparseable
    /// bounds never run.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        let parse = |text: &str| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|at| at.with_timezone(&Utc))
        };
        match (parse(&self.start_at), parse(&self.end_at)) {
            (Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }
}

/// First campaign running at `now` that the user has not dismissed.
#[must_use]
pub fn active_marketing_event(
    events: Vec<AppMarketingEvent>,
    now: DateTime<Utc>,
    ignored_ids: &[u64],
) -> Option<AppMarketingEvent> {
    events
        .into_iter()
        .find(|event| event.is_active_at(now) && !ignored_ids.contains(&event.id))
}
