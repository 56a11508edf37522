//! Live game-event client for the NHL play-by-play feed.
//!
//! Tracks which event ids have already been handed out so repeated polls
//! only yield plays that are new since the previous poll.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{error, info};

use super::{build_http, ClientError, REQUEST_TIMEOUT};

pub const GAMECENTER_BASE_URL: &str = "https://api-web.nhle.com/v1/gamecenter";

/// Insert-only set of event ids. It never shrinks.
#[derive(Debug, Default, Clone)]
pub struct SeenIdSet {
    ids: HashSet<i64>,
}

impl SeenIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`; returns `true` if it was not seen before.
    pub fn insert(&mut self, id: i64) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug)]
pub struct GameClient {
    game_id: String,
    url: String,
    seen: SeenIdSet,
    http: reqwest::Client,
}

impl GameClient {
    /// Client for one game, e.g. `2023020003` (regular season) or
    /// `2023030112` (playoffs).
    pub fn new(game_id: &str) -> Result<Self, ClientError> {
        Self::with_base_url(GAMECENTER_BASE_URL, game_id)
    }

    pub fn with_base_url(base_url: &str, game_id: &str) -> Result<Self, ClientError> {
        let url = format!("{}/{}/play-by-play", base_url.trim_end_matches('/'), game_id);
        info!(game_id, "game client established");
        Ok(Self {
            game_id: game_id.to_string(),
            url,
            seen: SeenIdSet::new(),
            http: build_http(REQUEST_TIMEOUT)?,
        })
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn seen(&self) -> &SeenIdSet {
        &self.seen
    }

    /// Fetch the raw play-by-play document. Any failure yields `None`.
    pub async fn obtain_game(&self) -> Option<Value> {
        match self.fetch().await {
            Ok(doc) => Some(doc),
            Err(e) => {
                error!(game_id = %self.game_id, error = %e, "failed to obtain game data");
                None
            }
        }
    }

    async fn fetch(&self) -> Result<Value, ClientError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status: status.as_u16(), body });
        }
        Ok(response.json().await?)
    }

    /// Plays in `doc` whose `eventId` has not been returned before, in feed
    /// order. Every returned id is recorded as seen.
    ///
    /// A document without a `plays` array yields nothing, as do plays
    /// without an integer `eventId`.
    pub fn extract_new_events(&mut self, doc: &Value) -> Vec<Value> {
        let Some(plays) = doc.get("plays").and_then(Value::as_array) else {
            return Vec::new();
        };

        let fresh: Vec<Value> = plays
            .iter()
            .filter(|play| event_id(play).is_some_and(|id| self.seen.insert(id)))
            .cloned()
            .collect();

        info!(game_id = %self.game_id, new_events = fresh.len(), "extracted new events");
        fresh
    }

    /// Fetch the game and return only the unseen plays.
    pub async fn extract(&mut self) -> Vec<Value> {
        match self.obtain_game().await {
            Some(doc) => self.extract_new_events(&doc),
            None => Vec::new(),
        }
    }
}

/// Integer event id of a play. Integral floats and numeric strings are
/// accepted since feeds are not consistent about the encoding.
fn event_id(play: &Value) -> Option<i64> {
    match play.get("eventId")? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> GameClient {
        GameClient::new("2023020003").unwrap()
    }

    #[test]
    fn test_url_layout() {
        let c = client();
        assert_eq!(
            c.url(),
            "https://api-web.nhle.com/v1/gamecenter/2023020003/play-by-play"
        );
        assert_eq!(c.game_id(), "2023020003");
    }

    #[test]
    fn test_second_extraction_yields_nothing() {
        let mut c = client();
        let doc = json!({"plays": [
            {"eventId": 1, "typeDescKey": "faceoff"},
            {"eventId": 2, "typeDescKey": "shot-on-goal"},
        ]});

        assert_eq!(c.extract_new_events(&doc).len(), 2);
        assert!(c.extract_new_events(&doc).is_empty());
        assert_eq!(c.seen().len(), 2);
    }

    #[test]
    fn test_only_new_plays_returned() {
        let mut c = client();
        c.extract_new_events(&json!({"plays": [{"eventId": 1}, {"eventId": 2}]}));

        let fresh = c.extract_new_events(&json!({"plays": [
            {"eventId": 2}, {"eventId": 3, "typeDescKey": "goal"},
        ]}));
        assert_eq!(fresh, vec![json!({"eventId": 3, "typeDescKey": "goal"})]);
        assert!(c.seen().contains(1));
        assert!(c.seen().contains(3));
    }

    #[test]
    fn test_missing_plays_yields_nothing() {
        let mut c = client();
        assert!(c.extract_new_events(&json!({"gameState": "LIVE"})).is_empty());
        assert!(c.extract_new_events(&json!({"plays": "not a list"})).is_empty());
        assert!(c.extract_new_events(&Value::Null).is_empty());
        assert!(c.seen().is_empty());
    }

    #[test]
    fn test_plays_without_event_id_skipped() {
        let mut c = client();
        let fresh = c.extract_new_events(&json!({"plays": [
            {"typeDescKey": "period-start"},
            {"eventId": "7"},
            {"eventId": 8.0},
        ]}));
        assert_eq!(fresh.len(), 2);
        assert!(c.seen().contains(7));
        assert!(c.seen().contains(8));
    }

    #[test]
    fn test_seen_set_is_monotonic() {
        let mut seen = SeenIdSet::new();
        assert!(seen.insert(5));
        assert!(!seen.insert(5));
        assert_eq!(seen.len(), 1);
    }

    #[tokio::test]
    async fn test_obtain_game_unreachable_returns_none() {
        // Port 9 (discard) on localhost is not expected to speak HTTP.
        let mut c = GameClient::with_base_url("http://127.0.0.1:9", "1").unwrap();
        assert!(c.obtain_game().await.is_none());
        assert!(c.extract().await.is_empty());
    }
}
