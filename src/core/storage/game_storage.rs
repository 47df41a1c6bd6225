//=========================================================================
// Game Storage
//=========================================================================
//
// Per-game namespace over a shared `KeyValueStore`.
//
// Every key is stored as `game_<gameId>_<key>` with a JSON payload.
// Reads never fail: an absent key, a store error or a payload that does
// not decode into the requested type all degrade to `None` (or the
// caller's default) with a log line.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

//=== Internal Dependencies ===============================================

use super::remote::ScoreApi;
use super::store::{SharedStore, StoreError};
use crate::core::types::ScoreRecord;

//=== Fixed Keys ==========================================================

const HIGH_SCORE_KEY: &str = "highScore";
const GAME_STATE_KEY: &str = "gameState";
const SETTINGS_KEY: &str = "settings";
const LEVEL_PROGRESS_KEY: &str = "levelProgress";

//=== GameStorage =========================================================

pub struct GameStorage {
    game_id: String,
    prefix: String,
    store: SharedStore,
    remote: Option<ScoreApi>,
}

impl GameStorage {
    pub fn new(game_id: impl Into<String>, store: SharedStore) -> Self {
        let game_id = game_id.into();
        let prefix = format!("game_{game_id}_");
        Self {
            game_id,
            prefix,
            store,
            remote: None,
        }
    }

    /// Routes score submission/retrieval to a real scoring service.
    pub fn with_remote(mut self, api: ScoreApi) -> Self {
        self.remote = Some(api);
        self
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    //--- Generic Operations -----------------------------------------------

    /// Serializes `data` as JSON under `key`, overwriting any previous value.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<(), StoreError> {
        let payload = serde_json::to_string(data)?;
        self.store.set(&self.full_key(key), &payload).map_err(|err| {
            error!(target: "storage", "Failed to save '{}' for {}: {}", key, self.game_id, err);
            err
        })
    }

    /// Reads `key` back. `None` when absent or undecodable.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(&self.full_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                error!(target: "storage", "Failed to read '{}' for {}: {}", key, self.game_id, err);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(target: "storage", "Discarding undecodable '{}' for {}: {}", key, self.game_id, err);
                None
            }
        }
    }

    pub fn load_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.load(key).unwrap_or(default)
    }

    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.store.remove(&self.full_key(key)).map_err(|err| {
            error!(target: "storage", "Failed to delete '{}' for {}: {}", key, self.game_id, err);
            err
        })
    }

    pub fn has(&self, key: &str) -> bool {
        matches!(self.store.get(&self.full_key(key)), Ok(Some(_)))
    }

    /// Removes every key in this game's namespace. Returns how many.
    pub fn clear_all(&self) -> Result<usize, StoreError> {
        let owned: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(&self.prefix))
            .collect();

        for key in &owned {
            self.store.remove(key)?;
        }
        info!(target: "storage", "Cleared {} key(s) for {}", owned.len(), self.game_id);
        Ok(owned.len())
    }

    //--- Fixed-Key Helpers ------------------------------------------------

    pub fn save_high_score(&self, score: u64) -> Result<(), StoreError> {
        self.save(HIGH_SCORE_KEY, &score)
    }

    /// Stored high score, 0 when absent.
    pub fn load_high_score(&self) -> u64 {
        self.load_or(HIGH_SCORE_KEY, 0)
    }

    pub fn save_game_state<T: Serialize + ?Sized>(&self, state: &T) -> Result<(), StoreError> {
        self.save(GAME_STATE_KEY, state)
    }

    pub fn load_game_state<T: DeserializeOwned>(&self) -> Option<T> {
        self.load(GAME_STATE_KEY)
    }

    pub fn save_settings<T: Serialize + ?Sized>(&self, settings: &T) -> Result<(), StoreError> {
        self.save(SETTINGS_KEY, settings)
    }

    pub fn load_settings<T: DeserializeOwned>(&self) -> Option<T> {
        self.load(SETTINGS_KEY)
    }

    pub fn save_level_progress<T: Serialize + ?Sized>(&self, progress: &T) -> Result<(), StoreError> {
        self.save(LEVEL_PROGRESS_KEY, progress)
    }

    pub fn load_level_progress<T: DeserializeOwned>(&self) -> Option<T> {
        self.load(LEVEL_PROGRESS_KEY)
    }

    //--- Remote Scores ----------------------------------------------------

    /// Submits `score` to the scoring service. Without a configured
    /// service this only logs and reports success.
    pub fn save_score_to_server(&self, score: u64, metadata: Option<&Value>) -> bool {
        match &self.remote {
            Some(api) => api.save_score(&self.game_id, score, metadata).success,
            None => {
                info!(target: "storage", "No score service; would save {} for {}", score, self.game_id);
                true
            }
        }
    }

    /// Ranked scores from the scoring service, empty on any failure or
    /// without a configured service.
    pub fn load_high_scores_from_server(&self, limit: u32) -> Vec<ScoreRecord> {
        match &self.remote {
            Some(api) => {
                let response = api.high_scores(&self.game_id, limit);
                if !response.success {
                    warn!(
                        target: "storage",
                        "High scores for {} unavailable: {}",
                        self.game_id,
                        response.message.as_deref().unwrap_or("unknown error")
                    );
                }
                response.scores.unwrap_or_default()
            }
            None => {
                info!(target: "storage", "No score service; would load high scores for {}", self.game_id);
                Vec::new()
            }
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::remote::testing::serve_once;
    use crate::core::storage::store::testing::BrokenStore;
    use crate::core::storage::store::{KeyValueStore, MemoryStore};
    use crate::core::types::GameSettings;
    use serde::Deserialize;
    use serde_json::json;
    use std::rc::Rc;

    fn storage(game: &str) -> (Rc<MemoryStore>, GameStorage) {
        let store = Rc::new(MemoryStore::new());
        let shared: SharedStore = store.clone();
        (store, GameStorage::new(game, shared))
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Progress {
        level: u32,
        unlocked: Vec<String>,
    }

    #[test]
    fn keys_are_namespaced_per_game() {
        let (store, snake) = storage("snake");
        snake.save("best", &7).unwrap();
        assert_eq!(store.get("game_snake_best").unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn structured_values_round_trip() {
        let (_, snake) = storage("snake");
        let progress = Progress {
            level: 4,
            unlocked: vec!["desert".into(), "ice".into()],
        };
        snake.save_level_progress(&progress).unwrap();
        assert_eq!(snake.load_level_progress::<Progress>(), Some(progress));
    }

    #[test]
    fn missing_or_mistyped_values_degrade_to_default() {
        let (store, snake) = storage("snake");
        assert_eq!(snake.load::<u32>("nothing"), None);
        assert_eq!(snake.load_or("nothing", 5u32), 5);

        store.set("game_snake_best", "\"not a number\"").unwrap();
        assert_eq!(snake.load_or("best", 9u32), 9);

        store.set("game_snake_state", "{broken").unwrap();
        assert!(snake.load::<Value>("state").is_none());
    }

    #[test]
    fn high_score_defaults_to_zero() {
        let (_, snake) = storage("snake");
        assert_eq!(snake.load_high_score(), 0);
        snake.save_high_score(300).unwrap();
        assert_eq!(snake.load_high_score(), 300);
    }

    #[test]
    fn settings_and_game_state_helpers() {
        let (_, tetris) = storage("tetris");
        let mut settings = GameSettings::default();
        settings.extra.insert("ghostPiece".into(), json!(true));
        tetris.save_settings(&settings).unwrap();
        tetris.save_game_state(&json!({ "board": [[0, 1], [1, 0]] })).unwrap();

        assert_eq!(tetris.load_settings::<GameSettings>(), Some(settings));
        assert_eq!(
            tetris.load_game_state::<Value>(),
            Some(json!({ "board": [[0, 1], [1, 0]] }))
        );
    }

    #[test]
    fn delete_and_has() {
        let (_, snake) = storage("snake");
        snake.save("k", "v").unwrap();
        assert!(snake.has("k"));
        snake.delete("k").unwrap();
        assert!(!snake.has("k"));
        snake.delete("k").unwrap();
    }

    #[test]
    fn clear_all_leaves_other_games_alone() {
        let store: SharedStore = Rc::new(MemoryStore::new());
        let snake = GameStorage::new("snake", store.clone());
        let tetris = GameStorage::new("tetris", store.clone());
        store.set("audioPreferences", "{}").unwrap();

        snake.save_high_score(1).unwrap();
        snake.save("extra", &true).unwrap();
        tetris.save_high_score(2).unwrap();

        assert_eq!(snake.clear_all().unwrap(), 2);
        assert!(!snake.has(HIGH_SCORE_KEY));
        assert_eq!(tetris.load_high_score(), 2);
        assert!(store.get("audioPreferences").unwrap().is_some());
    }

    #[test]
    fn broken_store_never_panics_on_reads() {
        let broken = GameStorage::new("snake", Rc::new(BrokenStore));
        assert_eq!(broken.load_high_score(), 0);
        assert!(!broken.has("k"));
        assert!(broken.save("k", &1).is_err());
        assert!(broken.clear_all().is_err());
    }

    #[test]
    fn remote_calls_are_stubs_without_service() {
        let (_, snake) = storage("snake");
        assert!(snake.save_score_to_server(10, None));
        assert!(snake.load_high_scores_from_server(10).is_empty());
    }

    #[test]
    fn remote_failure_yields_empty_scores() {
        let (base, _captured) = serve_once(503, r#"{"message":"down"}"#);
        let (_, snake) = storage("snake");
        let snake = snake.with_remote(ScoreApi::new(base));
        assert!(snake.load_high_scores_from_server(10).is_empty());
    }

    #[test]
    fn remote_submission_reports_service_result() {
        let (base, captured) = serve_once(200, r#"{"success":true,"scoreId":"s9"}"#);
        let (_, snake) = storage("snake");
        let snake = snake.with_remote(ScoreApi::new(base));

        assert!(snake.save_score_to_server(77, Some(&json!({ "length": 12 }))));
        let body: Value = serde_json::from_str(&captured.recv().unwrap().body).unwrap();
        assert_eq!(body["gameId"], "snake");
        assert_eq!(body["score"], 77);
    }
}
