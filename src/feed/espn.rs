use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;

use crate::dao::models::Possession;
use crate::feed::{FeedError, FeedGameState, RawGameSnapshot, ScoreFeed};

/// ESPN NFL scoreboard endpoint polled by default.
pub const DEFAULT_SCOREBOARD_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/football/nfl/scoreboard";

/// Score feed backed by ESPN's public scoreboard API.
///
/// Owns the game-selection heuristics: the tracked game is the Super Bowl,
/// found by postseason week, by notes headline, by name, or failing all of
/// those, the first event on the board.
#[derive(Clone)]
pub struct EspnScoreFeed {
    client: Client,
    url: Arc<str>,
}

impl EspnScoreFeed {
    /// Build a feed client against the given scoreboard URL.
    pub fn new(url: &str) -> Result<Self, FeedError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            url: Arc::from(url),
        })
    }
}

impl ScoreFeed for EspnScoreFeed {
    fn fetch(&self) -> BoxFuture<'static, Result<Option<RawGameSnapshot>, FeedError>> {
        let feed = self.clone();
        Box::pin(async move {
            let response = feed.client.get(feed.url.as_ref()).send().await?;
            if !response.status().is_success() {
                return Err(FeedError::Status {
                    status: response.status(),
                });
            }
            let scoreboard: Scoreboard = response.json().await?;
            Ok(tracked_game(scoreboard))
        })
    }
}

// ESPN response shapes, limited to the fields the snapshot needs.

#[derive(Debug, Deserialize)]
struct Scoreboard {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    id: String,
    #[serde(default)]
    name: String,
    season: Option<Season>,
    week: Option<Week>,
    #[serde(default)]
    competitions: Vec<Competition>,
    status: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct Season {
    #[serde(rename = "type")]
    kind: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Week {
    number: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Competition {
    #[serde(default)]
    competitors: Vec<Competitor>,
    #[serde(default)]
    notes: Vec<Note>,
    situation: Option<Situation>,
}

#[derive(Debug, Deserialize)]
struct Note {
    headline: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Competitor {
    id: Option<String>,
    #[serde(default)]
    home_away: String,
    #[serde(default)]
    score: String,
    team: Option<Team>,
    #[serde(default)]
    linescores: Vec<Linescore>,
}

#[derive(Debug, Deserialize)]
struct Team {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Linescore {
    // ESPN serializes period points as floats.
    #[serde(default)]
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Situation {
    possession: Option<String>,
    down_distance_text: Option<String>,
    possession_text: Option<String>,
    #[serde(default)]
    is_red_zone: bool,
}

#[derive(Debug, Deserialize)]
struct Status {
    period: Option<u32>,
    #[serde(rename = "type")]
    kind: Option<StatusType>,
}

#[derive(Debug, Deserialize)]
struct StatusType {
    #[serde(default)]
    state: String,
    #[serde(default)]
    completed: bool,
}

/// Postseason season type on ESPN.
const POSTSEASON: u32 = 3;
/// Super Bowl week number within the postseason.
const SUPER_BOWL_WEEK: u32 = 5;

fn tracked_game(scoreboard: Scoreboard) -> Option<RawGameSnapshot> {
    let event = pick_event(&scoreboard.events)?;
    raw_snapshot(event)
}

/// Pick the Super Bowl out of the scoreboard, in order of confidence:
/// postseason week 5, a notes headline naming it, the event name naming it,
/// then the first event as a last resort.
fn pick_event(events: &[Event]) -> Option<&Event> {
    let by_week = events.iter().find(|event| {
        event.season.as_ref().and_then(|s| s.kind) == Some(POSTSEASON)
            && event.week.as_ref().and_then(|w| w.number) == Some(SUPER_BOWL_WEEK)
    });
    if by_week.is_some() {
        return by_week;
    }

    let by_notes = events.iter().find(|event| {
        event.competitions.iter().any(|competition| {
            competition.notes.iter().any(|note| {
                note.headline
                    .as_deref()
                    .is_some_and(|headline| headline.to_lowercase().contains("super bowl"))
            })
        })
    });
    if by_notes.is_some() {
        return by_notes;
    }

    let by_name = events
        .iter()
        .find(|event| event.name.to_lowercase().contains("super bowl"));
    if by_name.is_some() {
        return by_name;
    }

    events.first()
}

fn raw_snapshot(event: &Event) -> Option<RawGameSnapshot> {
    let competition = event.competitions.first()?;
    let home = competition
        .competitors
        .iter()
        .find(|c| c.home_away == "home")?;
    let away = competition
        .competitors
        .iter()
        .find(|c| c.home_away == "away")?;

    let state = match event.status.as_ref().and_then(|s| s.kind.as_ref()) {
        Some(kind) if kind.state == "pre" => FeedGameState::NotStarted,
        Some(kind) if kind.state == "post" => FeedGameState::Finished,
        Some(_) => FeedGameState::InProgress,
        None => FeedGameState::NotStarted,
    };
    let completed = event
        .status
        .as_ref()
        .and_then(|s| s.kind.as_ref())
        .is_some_and(|kind| kind.completed);
    let period = event.status.as_ref().and_then(|s| s.period).unwrap_or(0);

    let situation = competition.situation.as_ref();
    let possession = situation
        .and_then(|s| s.possession.as_deref())
        .map_or(Possession::None, |ball| {
            if Some(ball) == competitor_id(home) {
                Possession::Row
            } else if Some(ball) == competitor_id(away) {
                Possession::Col
            } else {
                Possession::None
            }
        });
    let situation_text = situation.and_then(|s| {
        s.possession_text
            .clone()
            .or_else(|| s.down_distance_text.clone())
    });
    let high_leverage = situation.is_some_and(|s| s.is_red_zone);

    let name = if event.name.is_empty() {
        "NFL Game".to_owned()
    } else {
        matchup_name(&event.name)
    };

    Some(RawGameSnapshot {
        external_id: event.id.clone(),
        name,
        state,
        completed,
        period,
        row_total: total_score(home),
        col_total: total_score(away),
        row_period_points: period_points(home),
        col_period_points: period_points(away),
        possession,
        situation: situation_text,
        high_leverage,
    })
}

fn competitor_id(competitor: &Competitor) -> Option<&str> {
    competitor
        .id
        .as_deref()
        .or_else(|| competitor.team.as_ref().and_then(|t| t.id.as_deref()))
}

fn total_score(competitor: &Competitor) -> u32 {
    competitor.score.parse().unwrap_or(0)
}

fn period_points(competitor: &Competitor) -> Vec<u32> {
    competitor
        .linescores
        .iter()
        .map(|linescore| linescore.value as u32)
        .collect()
}

/// Rewrite "Visitors at Hosts" into "Visitors vs Hosts" for display.
fn matchup_name(raw: &str) -> String {
    const NEEDLE: &[u8] = b" at ";
    let found = raw
        .as_bytes()
        .windows(NEEDLE.len())
        .position(|window| window.eq_ignore_ascii_case(NEEDLE));
    match found {
        Some(pos) => format!("{} vs {}", &raw[..pos], &raw[pos + NEEDLE.len()..]),
        None => raw.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_value, json};

    fn scoreboard(value: serde_json::Value) -> Scoreboard {
        from_value(value).unwrap()
    }

    fn live_event() -> serde_json::Value {
        json!({
            "id": "401",
            "name": "Seattle at New England",
            "season": { "type": 3 },
            "week": { "number": 5 },
            "status": { "period": 2, "type": { "state": "in", "completed": false } },
            "competitions": [{
                "competitors": [
                    {
                        "id": "25",
                        "homeAway": "home",
                        "score": "7",
                        "linescores": [{ "value": 7.0 }]
                    },
                    {
                        "id": "12",
                        "homeAway": "away",
                        "score": "10",
                        "linescores": [{ "value": 3.0 }]
                    }
                ],
                "situation": {
                    "possession": "12",
                    "downDistanceText": "3rd & 7",
                    "possessionText": "SEA 3rd & 7 at NE 42",
                    "isRedZone": true
                }
            }]
        })
    }

    #[test]
    fn parses_a_live_event_into_a_raw_snapshot() {
        let raw = tracked_game(scoreboard(json!({ "events": [live_event()] }))).unwrap();

        assert_eq!(raw.external_id, "401");
        assert_eq!(raw.name, "Seattle vs New England");
        assert_eq!(raw.state, FeedGameState::InProgress);
        assert!(!raw.completed);
        assert_eq!(raw.period, 2);
        assert_eq!(raw.row_total, 7);
        assert_eq!(raw.col_total, 10);
        assert_eq!(raw.row_period_points, vec![7]);
        assert_eq!(raw.col_period_points, vec![3]);
        assert_eq!(raw.possession, Possession::Col);
        assert_eq!(raw.situation.as_deref(), Some("SEA 3rd & 7 at NE 42"));
        assert!(raw.high_leverage);
    }

    #[test]
    fn prefers_postseason_week_over_other_events() {
        let board = scoreboard(json!({
            "events": [
                { "id": "100", "name": "Other Game", "competitions": [] },
                live_event()
            ]
        }));

        let raw = tracked_game(board).unwrap();
        assert_eq!(raw.external_id, "401");
    }

    #[test]
    fn falls_back_to_notes_headline_then_name_then_first() {
        let mut noted = live_event();
        noted["season"] = json!(null);
        noted["week"] = json!(null);
        noted["competitions"][0]["notes"] = json!([{ "headline": "Super Bowl LX" }]);

        let board = scoreboard(json!({
            "events": [
                { "id": "100", "name": "Other Game", "competitions": [] },
                noted
            ]
        }));
        assert_eq!(tracked_game(board).unwrap().external_id, "401");

        let mut named = live_event();
        named["season"] = json!(null);
        named["week"] = json!(null);
        named["name"] = json!("Super Bowl LX: Seattle at New England");
        let board = scoreboard(json!({
            "events": [
                { "id": "100", "name": "Other Game", "competitions": [] },
                named
            ]
        }));
        assert_eq!(tracked_game(board).unwrap().external_id, "401");

        let mut plain = live_event();
        plain["id"] = json!("100");
        plain["season"] = json!(null);
        plain["week"] = json!(null);
        let board = scoreboard(json!({ "events": [plain] }));
        assert_eq!(tracked_game(board).unwrap().external_id, "100");
    }

    #[test]
    fn missing_sides_or_empty_board_yield_nothing() {
        assert!(tracked_game(scoreboard(json!({ "events": [] }))).is_none());

        let mut event = live_event();
        event["competitions"][0]["competitors"] = json!([
            { "id": "25", "homeAway": "home", "score": "7" }
        ]);
        assert!(tracked_game(scoreboard(json!({ "events": [event] }))).is_none());
    }

    #[test]
    fn unknown_possession_id_maps_to_none() {
        let mut event = live_event();
        event["competitions"][0]["situation"]["possession"] = json!("99");

        let raw = tracked_game(scoreboard(json!({ "events": [event] }))).unwrap();
        assert_eq!(raw.possession, Possession::None);
    }

    #[test]
    fn matchup_name_rewrites_only_the_separator() {
        assert_eq!(matchup_name("Seattle at New England"), "Seattle vs New England");
        assert_eq!(matchup_name("Seattle AT New England"), "Seattle vs New England");
        assert_eq!(matchup_name("Seattle vs New England"), "Seattle vs New England");
        assert_eq!(matchup_name("Attack of the Atoms"), "Attack of the Atoms");
    }

    #[test]
    fn pregame_status_and_missing_fields_still_parse() {
        let board = scoreboard(json!({
            "events": [{
                "id": "77",
                "name": "Seattle at New England",
                "status": { "type": { "state": "pre", "completed": false } },
                "competitions": [{
                    "competitors": [
                        { "homeAway": "home", "score": "", "team": { "id": "25" } },
                        { "homeAway": "away", "score": "0", "team": { "id": "12" } }
                    ]
                }]
            }]
        }));

        let raw = tracked_game(board).unwrap();
        assert_eq!(raw.state, FeedGameState::NotStarted);
        assert_eq!(raw.period, 0);
        assert_eq!(raw.row_total, 0);
        assert!(raw.row_period_points.is_empty());
        assert_eq!(raw.possession, Possession::None);
        assert!(raw.situation.is_none());
    }
}
