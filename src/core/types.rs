//=========================================================================
// Common Types
//=========================================================================
//
// Plain geometry and game-facing value types shared by every subsystem.
//
// Geometry is expressed in logical pixels (f32). Everything here is Copy
// or cheaply cloneable and carries no behavior beyond small helpers.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

//=== Vec2 ================================================================

/// 2D point or offset in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

//=== Size ================================================================

/// Width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

//=== Rect ================================================================

/// Axis-aligned rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size centered on `(cx, cy)`.
    pub fn centered(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Inclusive containment: points on the border count as inside.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Inclusive overlap: touching edges count as overlapping.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }
}

//=== Direction ===========================================================

/// Player input direction for grid/arcade movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// Unit step for this direction (screen space, y grows downward).
    pub fn vector(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::None => Vec2::ZERO,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }
}

//=== Difficulty ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Expert,
    Master,
}

//=== GameSettings ========================================================

/// Settings every game understands, plus free-form game-specific extras.
///
/// Extras are flattened into the same JSON object, so a snake game can
/// persist `{"difficulty":"easy", ..., "snakeColor":"limegreen"}` and read
/// its own fields back out of [`GameSettings::extra`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub sound_enabled: bool,
    pub music_enabled: bool,
    pub volume: f32,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            sound_enabled: true,
            music_enabled: true,
            volume: 0.7,
            extra: BTreeMap::new(),
        }
    }
}

//=== Score Records =======================================================

/// Identity of the user who submitted a remote score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreUser {
    pub id: String,
    pub username: String,
}

/// A score as returned by the remote scoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: String,
    pub game_id: String,
    pub user_id: String,
    pub score: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ScoreUser>,
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_is_inclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(r.contains(Vec2::new(10.0, 10.0)));
        assert!(!r.contains(Vec2::new(10.1, 5.0)));
    }

    #[test]
    fn rect_touching_edges_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 5.0, 5.0);
        let c = Rect::new(10.5, 0.0, 5.0, 5.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn centered_rect_straddles_center() {
        let r = Rect::centered(50.0, 50.0, 20.0, 10.0);
        assert_eq!(r, Rect::new(40.0, 45.0, 20.0, 10.0));
    }

    #[test]
    fn direction_vectors_and_opposites() {
        assert_eq!(Direction::Up.vector(), Vec2::new(0.0, -1.0));
        assert_eq!(Direction::Right.vector(), Vec2::new(1.0, 0.0));
        assert_eq!(Direction::None.vector(), Vec2::ZERO);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::None.opposite(), Direction::None);
    }

    #[test]
    fn settings_keep_game_specific_extras() {
        let json = r#"{
            "difficulty": "hard",
            "soundEnabled": false,
            "musicEnabled": true,
            "volume": 0.5,
            "snakeColor": "limegreen",
            "speed": 10
        }"#;

        let settings: GameSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert!(!settings.sound_enabled);
        assert_eq!(settings.extra["snakeColor"], "limegreen");
        assert_eq!(settings.extra["speed"], 10);
    }

    #[test]
    fn score_record_parses_joined_user() {
        let json = r#"{
            "id": "s1", "gameId": "snake", "userId": "u1", "score": 120,
            "createdAt": "2024-01-01T00:00:00Z",
            "user": { "id": "u1", "username": "ada" }
        }"#;

        let record: ScoreRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.score, 120);
        assert_eq!(record.user.unwrap().username, "ada");
        assert!(record.metadata.is_none());
    }
}
