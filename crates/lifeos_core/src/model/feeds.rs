//! Boundary contracts for the dashboard's external feeds.
//!
//! # Responsibility
//! - Type the JSON payloads exchanged with weather, markets, calendar,
//!   portfolio and assistant endpoints.
//! - Provide the assistant placeholder reply used until a model is wired in.
//!
//! # Invariants
//! - Field names match the wire payloads (camelCase).
//! - Failures are structured payloads, never panics.
//! - The task store has no dependency on anything in this module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of forecast days included in a weather report.
pub const FORECAST_DAYS: usize = 3;

/// Current conditions plus a short forecast for one fixed location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub location: String,
    pub current_temp: f64,
    pub current_wind_speed: f64,
    pub current_description: String,
    pub daily: Vec<DailyForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub label: String,
    pub max: f64,
    pub min: f64,
}

/// Fixed watchlist of symbol + percent change pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketWatchlist {
    pub items: Vec<MarketQuote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub symbol: String,
    pub change_pct: f64,
}

impl MarketWatchlist {
    /// Quotes with a negative change, in listing order.
    pub fn decliners(&self) -> impl Iterator<Item = &MarketQuote> {
        self.items.iter().filter(|quote| quote.change_pct < 0.0)
    }
}

/// Today's events and the "next up" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub today: Vec<CalendarEvent>,
    pub next_up: Vec<NextUpItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub time: String,
    pub title: String,
    /// Free-form load label such as `Hard` or `Med`.
    pub weight: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextUpItem {
    pub title: String,
}

/// Result of locating and parsing the latest broker CSV exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortfolioIngestion {
    Loaded(PortfolioSnapshot),
    Failed(ProviderFailure),
}

impl PortfolioIngestion {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub ok: bool,
    /// Parsed row count per source file name.
    pub row_counts: BTreeMap<String, usize>,
    pub preview: Vec<HoldingPreview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPreview {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Structured failure payload returned by a provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFailure {
    pub ok: bool,
    pub error: String,
    /// Files actually present in the remote store, for diagnosis.
    #[serde(default)]
    pub files_found: Vec<String>,
}

impl ProviderFailure {
    pub fn new(error: impl Into<String>, files_found: Vec<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            files_found,
        }
    }
}

/// Assistant request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantPrompt {
    #[serde(default)]
    pub prompt: String,
}

/// Assistant response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantError {
    EmptyPrompt,
}

impl Display for AssistantError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPrompt => write!(f, "Type a prompt and hit Ask."),
        }
    }
}

impl Error for AssistantError {}

/// Placeholder assistant: echoes any non-empty prompt.
///
/// # Errors
/// - `EmptyPrompt` when the prompt is blank after trimming.
pub fn assistant_reply(prompt: &str) -> Result<AssistantReply, AssistantError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AssistantError::EmptyPrompt);
    }
    Ok(AssistantReply {
        text: format!("(stub) Received: \"{prompt}\". No model is connected yet."),
    })
}
