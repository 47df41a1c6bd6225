//=========================================================================
// Remote Score Client
//=========================================================================
//
// Best-effort HTTP client for the portal's scoring service.
//
//   POST {base}/api/scores               {gameId, score, metadata}
//        → {success, scoreId?, message?}
//   GET  {base}/api/scores?gameId=&limit=
//        → {success, scores?, message?}
//
// Every failure (transport, status, malformed body) is folded into a
// response with `success: false` and a message. Nothing here returns an
// error or panics.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

//=== Internal Dependencies ===============================================

use crate::core::types::ScoreRecord;

//=== Wire Types ==========================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveScoreRequest<'a> {
    game_id: &'a str,
    score: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveScoreResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoresResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<ScoreRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

//=== ScoreApi ============================================================

#[derive(Clone)]
pub struct ScoreApi {
    base_url: String,
    agent: ureq::Agent,
}

impl ScoreApi {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Client for the service rooted at `base_url` (no trailing `/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { base_url, agent }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn scores_url(&self) -> String {
        format!("{}/api/scores", self.base_url)
    }

    //--- Operations -------------------------------------------------------

    /// Submits a score for `game_id`.
    pub fn save_score(&self, game_id: &str, score: u64, metadata: Option<&Value>) -> SaveScoreResponse {
        let body = SaveScoreRequest {
            game_id,
            score,
            metadata,
        };

        match self.agent.post(&self.scores_url()).send_json(&body) {
            Ok(response) => response.into_json().unwrap_or_else(|err| {
                error!(target: "storage", "Malformed save-score response: {}", err);
                SaveScoreResponse {
                    success: false,
                    message: Some(err.to_string()),
                    ..Default::default()
                }
            }),
            Err(err) => {
                let message = failure_message(err, "Failed to save score");
                error!(target: "storage", "Error saving score: {}", message);
                SaveScoreResponse {
                    success: false,
                    message: Some(message),
                    ..Default::default()
                }
            }
        }
    }

    /// Fetches up to `limit` ranked scores for `game_id`.
    pub fn high_scores(&self, game_id: &str, limit: u32) -> HighScoresResponse {
        let request = self
            .agent
            .get(&self.scores_url())
            .query("gameId", game_id)
            .query("limit", &limit.to_string());

        match request.call() {
            Ok(response) => response.into_json().unwrap_or_else(|err| {
                error!(target: "storage", "Malformed high-scores response: {}", err);
                HighScoresResponse {
                    success: false,
                    message: Some(err.to_string()),
                    ..Default::default()
                }
            }),
            Err(err) => {
                let message = failure_message(err, "Failed to fetch high scores");
                error!(target: "storage", "Error fetching high scores: {}", message);
                HighScoresResponse {
                    success: false,
                    message: Some(message),
                    ..Default::default()
                }
            }
        }
    }
}

/// Message from the service's error body if it sent one, otherwise
/// `fallback` for status errors and the transport error text otherwise.
fn failure_message(err: ureq::Error, fallback: &str) -> String {
    match err {
        ureq::Error::Status(_, response) => response
            .into_json::<ErrorBody>()
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| fallback.to_string()),
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}

//=========================================================================
// Tests
//=========================================================================


#[cfg(test)]
mod tests {
    use super::testing::serve_once;
    use super::*;
    use serde_json::json;

    #[test]
    fn save_score_posts_camel_case_body() {
        let (base, captured) = serve_once(200, r#"{"success":true,"scoreId":"abc"}"#);
        let api = ScoreApi::new(format!("{base}/"));

        let metadata = json!({ "level": 3 });
        let response = api.save_score("snake", 420, Some(&metadata));

        assert_eq!(
            response,
            SaveScoreResponse {
                success: true,
                score_id: Some("abc".into()),
                message: None
            }
        );

        let request = captured.recv().unwrap();
        assert_eq!(request.request_line, "POST /api/scores HTTP/1.1");
        let sent: Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(sent, json!({ "gameId": "snake", "score": 420, "metadata": { "level": 3 } }));
    }

    #[test]
    fn status_error_uses_service_message() {
        let (base, _captured) = serve_once(401, r#"{"message":"Unauthorized"}"#);
        let response = ScoreApi::new(base).save_score("snake", 1, None);

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn status_error_without_message_uses_fallback() {
        let (base, _captured) = serve_once(500, "oops");
        let response = ScoreApi::new(base).high_scores("snake", 5);

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Failed to fetch high scores"));
    }

    #[test]
    fn high_scores_sends_query_and_parses_records() {
        let (base, captured) = serve_once(
            200,
            r#"{"success":true,"scores":[{"id":"1","gameId":"snake","userId":"u","score":99,
                "createdAt":"2024-01-01T00:00:00Z","user":{"id":"u","username":"ada"}}]}"#,
        );
        let response = ScoreApi::new(base).high_scores("snake", 5);

        assert!(response.success);
        let scores = response.scores.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, 99);

        let request = captured.recv().unwrap();
        assert_eq!(request.request_line, "GET /api/scores?gameId=snake&limit=5 HTTP/1.1");
    }

    #[test]
    fn unreachable_service_is_reported_not_raised() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let api = ScoreApi::with_timeout(base, Duration::from_millis(500));
        let response = api.save_score("snake", 1, None);
        assert!(!response.success);
        assert!(response.message.is_some());
    }
}
