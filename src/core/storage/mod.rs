//=========================================================================
// Storage
//=========================================================================
//
// Local persistence and the remote score boundary.
//
//   store          KeyValueStore trait, MemoryStore, FileStore
//   game_storage   per-game JSON namespace + score helpers
//   remote         scoring service client
//
//=========================================================================

//=== Module Declarations =================================================

mod game_storage;
mod remote;
mod store;

//=== Public API ==========================================================

pub use game_storage::GameStorage;
pub use remote::{HighScoresResponse, SaveScoreResponse, ScoreApi};
pub use store::{FileStore, KeyValueStore, MemoryStore, SharedStore, StoreError};

#[cfg(test)]
pub(crate) use store::testing;
