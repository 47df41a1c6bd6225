//=========================================================================
// Sprite Loader
//=========================================================================
//
// Creates sprites by id and loads their spritesheets in bulk.
//
// Two modes:
//   load_all()                    blocks until every sheet has resolved
//   begin_load_all() + poll()     fetches on worker threads, images are
//                                 attached as they arrive
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use log::{error, info};

//=== Internal Dependencies ===============================================

use super::sprite::{fetch_image, Sprite};
use super::SpriteError;
use crate::core::assets::{AssetLoader, Loaded};
use crate::core::render::Image;

//=== LoadSummary =========================================================

/// Outcome of one `poll` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: Vec<String>,
}

//=== SpriteLoader ========================================================

#[derive(Default)]
pub struct SpriteLoader {
    sprites: HashMap<String, Sprite>,
    loader: AssetLoader<Image>,
    in_flight: HashSet<String>,
}

impl SpriteLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sprite for `src` under `id`, replacing any previous one.
    pub fn add_sprite(&mut self, id: impl Into<String>, src: impl Into<String>) -> &mut Sprite {
        let id = id.into();
        let sprite = Sprite::new(src);
        self.in_flight.remove(&id);
        match self.sprites.entry(id) {
            Entry::Occupied(mut slot) => {
                slot.insert(sprite);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(sprite),
        }
    }

    //--- Blocking Load ----------------------------------------------------

    /// Loads every sprite that has no image yet. Every sheet is attempted;
    /// the call fails if any of them failed.
    pub fn load_all(&mut self) -> Result<(), SpriteError> {
        self.begin_load_all();
        let results = self.loader.wait_all();
        let summary = self.apply(results);

        if summary.failed.is_empty() {
            info!(target: "sprite", "Loaded {} sprite sheet(s)", summary.loaded);
            Ok(())
        } else {
            Err(SpriteError::Batch {
                failed: summary.failed,
            })
        }
    }

    //--- Non-Blocking Load ------------------------------------------------

    /// Starts fetching every sprite that has no image and is not already
    /// being fetched.
    pub fn begin_load_all(&mut self) {
        for (id, sprite) in &self.sprites {
            if sprite.is_loaded() || self.in_flight.contains(id) {
                continue;
            }
            let src = sprite.src().to_string();
            self.in_flight.insert(id.clone());
            self.loader.spawn(id.clone(), move || fetch_image(&src));
        }
    }

    /// Attaches every image that has arrived since the last poll.
    pub fn poll(&mut self) -> LoadSummary {
        let results = self.loader.drain();
        self.apply(results)
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    //--- Access -----------------------------------------------------------

    pub fn get(&self, id: &str) -> Option<&Sprite> {
        self.sprites.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Sprite> {
        self.sprites.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    fn apply(&mut self, results: Vec<Loaded<Image>>) -> LoadSummary {
        let mut summary = LoadSummary::default();

        for Loaded { id, result } in results {
            // Sprite replaced by add_sprite while its old sheet was loading.
            if !self.in_flight.remove(&id) {
                continue;
            }
            match (result, self.sprites.get_mut(&id)) {
                (Ok(image), Some(sprite)) => {
                    sprite.set_image(image);
                    summary.loaded += 1;
                }
                (Ok(_), None) => {}
                (Err(err), _) => {
                    error!(target: "sprite", "Failed to load sprite '{}': {}", id, err);
                    summary.failed.push(id);
                }
            }
        }

        summary.failed.sort();
        summary
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
