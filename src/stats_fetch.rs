use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::cards::{Card, CardKind};

pub const STATS_PATH: &str = "/api/stats";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error! status: {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    #[serde(deserialize_with = "lenient_counter")]
    pub total_players: u64,
    #[serde(deserialize_with = "lenient_counter")]
    pub total_tournaments: u64,
    #[serde(deserialize_with = "lenient_counter")]
    pub total_matches: u64,
    #[serde(deserialize_with = "lenient_counter")]
    pub active_tournaments: u64,
    #[serde(deserialize_with = "lenient_counter")]
    pub completed_matches: u64,
    #[serde(deserialize_with = "lenient_counter")]
    pub pending_matches: u64,
}

fn lenient_counter<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(counter_value(&value))
}

impl StatsSnapshot {
    pub fn get(&self, key: StatKey) -> u64 {
        match key {
            StatKey::TotalPlayers => self.total_players,
            StatKey::TotalTournaments => self.total_tournaments,
            StatKey::TotalMatches => self.total_matches,
            StatKey::ActiveTournaments => self.active_tournaments,
            StatKey::CompletedMatches => self.completed_matches,
            StatKey::PendingMatches => self.pending_matches,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    TotalPlayers,
    TotalTournaments,
    TotalMatches,
    ActiveTournaments,
    CompletedMatches,
    PendingMatches,
}

impl StatKey {
    pub const ALL: [StatKey; 6] = [
        StatKey::TotalPlayers,
        StatKey::TotalTournaments,
        StatKey::TotalMatches,
        StatKey::ActiveTournaments,
        StatKey::CompletedMatches,
        StatKey::PendingMatches,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatKey::TotalPlayers => "Players",
            StatKey::TotalTournaments => "Tournaments",
            StatKey::TotalMatches => "Matches",
            StatKey::ActiveTournaments => "Active Tournaments",
            StatKey::CompletedMatches => "Completed Matches",
            StatKey::PendingMatches => "Pending Matches",
        }
    }
}

pub fn fetch_stats(client: &Client, base_url: &str) -> Result<StatsSnapshot, FetchError> {
    let body = get_json_body(client, &endpoint_url(base_url, STATS_PATH))?;
    parse_stats_json(&body)
}

pub fn fetch_cards(client: &Client, base_url: &str, kind: CardKind) -> Result<Vec<Card>, FetchError> {
    let body = get_json_body(client, &endpoint_url(base_url, kind.endpoint()))?;
    parse_cards_json(kind, &body)
}

fn get_json_body(client: &Client, url: &str) -> Result<String, FetchError> {
    let resp = client
        .get(url)
        .header(USER_AGENT, concat!("tourney_terminal/", env!("CARGO_PKG_VERSION")))
        .header(ACCEPT, "application/json")
        .send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(resp.text()?)
}

pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Decodes a `/api/stats` body. Absent, null, negative or non-numeric
/// counters read as 0.
pub fn parse_stats_json(raw: &str) -> Result<StatsSnapshot, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(StatsSnapshot::default());
    }
    let root: Value = serde_json::from_str(trimmed)?;
    if !root.is_object() {
        return Ok(StatsSnapshot::default());
    }
    Ok(serde_json::from_value(root)?)
}

fn counter_value(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
        _ => 0,
    }
}

/// Accepts either an array of objects or an object keyed by id.
pub fn parse_cards_json(kind: CardKind, raw: &str) -> Result<Vec<Card>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed)?;
    let items: Vec<(Option<&str>, &Value)> = match &root {
        Value::Array(items) => items.iter().map(|v| (None, v)).collect(),
        Value::Object(map) => map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect(),
        _ => Vec::new(),
    };

    let cards = items
        .into_iter()
        .filter(|(_, v)| v.is_object())
        .enumerate()
        .map(|(idx, (key, item))| {
            let fallback_id = key.map(str::to_string).unwrap_or_else(|| idx.to_string());
            match kind {
                CardKind::Tournament => tournament_card(item, fallback_id),
                CardKind::Match => match_card(item, fallback_id),
                CardKind::Player => player_card(item, fallback_id),
            }
        })
        .collect();
    Ok(cards)
}

fn tournament_card(item: &Value, fallback_id: String) -> Card {
    let id = pick_string(item, &["id"]).unwrap_or(fallback_id);
    let name = pick_string(item, &["name"]).unwrap_or_else(|| format!("Tournament {id}"));
    let status = pick_string(item, &["status"]).unwrap_or_default();
    let joined = item
        .get("participants")
        .and_then(Value::as_array)
        .map(|p| p.len())
        .unwrap_or(0);
    let capacity = item.get("max_players").and_then(Value::as_u64);

    let mut card = Card::new(id, name, status).with_metric("participants", joined as f64);
    card.subtitle = match capacity {
        Some(max) => format!("{joined}/{max} players"),
        None => format!("{joined} players"),
    };
    if let Some(desc) = pick_string(item, &["description"]) {
        card.subtitle = format!("{} · {desc}", card.subtitle);
    }
    card
}

fn match_card(item: &Value, fallback_id: String) -> Card {
    let id = pick_string(item, &["id"]).unwrap_or(fallback_id);
    let title = pick_string(item, &["description"]).unwrap_or_else(|| format!("Match {id}"));
    let status = pick_string(item, &["status"]).unwrap_or_default();
    let p1 = pick_string(item, &["player1_name", "player1_id"]).unwrap_or_else(|| "?".to_string());
    let p2 = pick_string(item, &["player2_name", "player2_id"]).unwrap_or_else(|| "?".to_string());

    let mut card = Card::new(id, title, status);
    card.subtitle = match pick_string(item, &["scheduled_time"]) {
        Some(when) => format!("{p1} vs {p2} @ {when}"),
        None => format!("{p1} vs {p2}"),
    };
    card
}

fn player_card(item: &Value, fallback_id: String) -> Card {
    let id = pick_string(item, &["user_id", "id"]).unwrap_or(fallback_id);
    let name = pick_string(item, &["name"]).unwrap_or_else(|| id.clone());

    let mut card = Card::new(id, name, "");
    if let Some(obj) = item.as_object() {
        for (field, value) in obj {
            if let Some(n) = value.as_f64() {
                card.metrics.insert(field.clone(), n);
            }
        }
    }

    let wins = card.metric("wins");
    let losses = card.metric("losses");
    let draws = card.metric("draws");
    let kills = card.metric("kills");
    let deaths = card.metric("deaths");
    let games = wins + losses + draws;
    card.metrics.insert("kd".to_string(), kills / deaths.max(1.0));
    card.metrics.insert(
        "win_rate".to_string(),
        if games > 0.0 { wins / games * 100.0 } else { 0.0 },
    );
    card.subtitle = format!("W{wins:.0} L{losses:.0} D{draws:.0} · K/D {:.2}", kills / deaths.max(1.0));
    card
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}
