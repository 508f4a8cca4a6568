//! Scoped ownership of the game's five textures.
//!
//! `TextureSet` holds one optional slot per `TextureId`. Textures are acquired
//! together at level load and released together on shutdown or reload.
//! Releasing is idempotent: an empty slot is skipped, so a texture is released
//! exactly once no matter how many exit paths call `release_all`. `Drop` runs
//! the same release as a backstop for early exits.

use glam::Vec2;

use crate::config::{GameConfig, TextureConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureId {
    Player,
    Obstacle,
    Background,
    Midground,
    Foreground,
}

impl TextureId {
    pub const COUNT: usize = 5;

    /// Every texture, in load order.
    pub const ALL: [TextureId; TextureId::COUNT] = [
        TextureId::Player,
        TextureId::Obstacle,
        TextureId::Background,
        TextureId::Midground,
        TextureId::Foreground,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::Player => 0,
            Self::Obstacle => 1,
            Self::Background => 2,
            Self::Midground => 3,
            Self::Foreground => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Obstacle => "obstacle",
            Self::Background => "background",
            Self::Midground => "midground",
            Self::Foreground => "foreground",
        }
    }

    pub fn config(self, config: &GameConfig) -> &TextureConfig {
        match self {
            Self::Player => &config.player.texture,
            Self::Obstacle => &config.obstacles.sheet.texture,
            Self::Background => &config.parallax.background.texture,
            Self::Midground => &config.parallax.midground.texture,
            Self::Foreground => &config.parallax.foreground.texture,
        }
    }
}

/// A texture whose backing allocation must be freed explicitly.
pub trait ManagedTexture {
    fn size(&self) -> (u32, u32);
    fn release(self);
}

/// Pixel size of every texture, the only thing the simulation needs from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetSizes([Vec2; TextureId::COUNT]);

impl SheetSizes {
    /// Sizes of the placeholders the config would fall back to.
    pub fn fallback(config: &GameConfig) -> Self {
        Self(TextureId::ALL.map(|id| {
            let [w, h] = id.config(config).fallback_size;
            Vec2::new(w as f32, h as f32)
        }))
    }

    pub fn get(&self, id: TextureId) -> Vec2 {
        self.0[id.index()]
    }
}

pub struct TextureSet<T: ManagedTexture> {
    slots: [Option<T>; TextureId::COUNT],
}

impl<T: ManagedTexture> TextureSet<T> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Acquire every texture through `load`, in `TextureId::ALL` order.
    pub fn acquire_all(mut load: impl FnMut(TextureId) -> T) -> Self {
        let mut set = Self::new();
        for id in TextureId::ALL {
            set.insert(id, load(id));
        }
        set
    }

    /// Store `texture`, releasing whatever occupied the slot before.
    pub fn insert(&mut self, id: TextureId, texture: T) {
        if let Some(previous) = self.slots[id.index()].replace(texture) {
            log::debug!("Replacing {} texture", id.label());
            previous.release();
        }
    }

    pub fn get(&self, id: TextureId) -> Option<&T> {
        self.slots[id.index()].as_ref()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sizes of the loaded textures. Empty slots report `fallback`.
    pub fn sheet_sizes(&self, fallback: &SheetSizes) -> SheetSizes {
        SheetSizes(TextureId::ALL.map(|id| match self.get(id) {
            Some(texture) => {
                let (w, h) = texture.size();
                Vec2::new(w as f32, h as f32)
            }
            None => fallback.get(id),
        }))
    }

    /// Release one texture. Returns false if the slot was already empty.
    pub fn release(&mut self, id: TextureId) -> bool {
        match self.slots[id.index()].take() {
            Some(texture) => {
                texture.release();
                log::debug!("Released {} texture", id.label());
                true
            }
            None => false,
        }
    }

    /// Release every held texture. Returns how many were released.
    pub fn release_all(&mut self) -> usize {
        TextureId::ALL
            .into_iter()
            .filter(|&id| self.release(id))
            .count()
    }
}

impl<T: ManagedTexture> Default for TextureSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ManagedTexture> Drop for TextureSet<T> {
    fn drop(&mut self) {
        let released = self.release_all();
        if released > 0 {
            log::debug!("Texture set dropped, released {released} texture(s)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(TextureId, u32)>>>;

    struct FakeTexture {
        id: TextureId,
        generation: u32,
        log: Log,
    }

    impl ManagedTexture for FakeTexture {
        fn size(&self) -> (u32, u32) {
            (10 * (self.id.index() as u32 + 1), 20)
        }

        fn release(self) {
            self.log.borrow_mut().push((self.id, self.generation));
        }
    }

    fn full_set(log: &Log) -> TextureSet<FakeTexture> {
        TextureSet::acquire_all(|id| FakeTexture {
            id,
            generation: 0,
            log: log.clone(),
        })
    }

    #[test]
    fn acquire_all_fills_every_slot() {
        let log = Log::default();
        let set = full_set(&log);
        assert_eq!(set.len(), TextureId::COUNT);
        for id in TextureId::ALL {
            assert_eq!(set.get(id).map(|t| t.id), Some(id));
        }
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn release_all_releases_each_texture_once() {
        let log = Log::default();
        let mut set = full_set(&log);
        assert_eq!(set.release_all(), TextureId::COUNT);
        assert_eq!(set.release_all(), 0);
        drop(set);
        assert_eq!(log.borrow().len(), TextureId::COUNT);
    }

    #[test]
    fn release_is_idempotent_and_order_independent() {
        let log = Log::default();
        let mut set = full_set(&log);
        assert!(set.release(TextureId::Foreground));
        assert!(!set.release(TextureId::Foreground));
        assert!(set.release(TextureId::Player));
        assert_eq!(set.release_all(), TextureId::COUNT - 2);
        let released: Vec<TextureId> = log.borrow().iter().map(|(id, _)| *id).collect();
        assert_eq!(released.len(), TextureId::COUNT);
        for id in TextureId::ALL {
            assert_eq!(released.iter().filter(|&&r| r == id).count(), 1);
        }
    }

    #[test]
    fn releasing_never_acquired_slot_is_no_op() {
        let log = Log::default();
        let mut set: TextureSet<FakeTexture> = TextureSet::new();
        assert!(!set.release(TextureId::Midground));
        assert_eq!(set.release_all(), 0);
        assert!(set.is_empty());
        drop(set);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn drop_releases_remaining_textures() {
        let log = Log::default();
        {
            let mut set = full_set(&log);
            set.release(TextureId::Obstacle);
        }
        assert_eq!(log.borrow().len(), TextureId::COUNT);
    }

    #[test]
    fn insert_releases_replaced_texture() {
        let log = Log::default();
        let mut set = full_set(&log);
        set.insert(
            TextureId::Player,
            FakeTexture {
                id: TextureId::Player,
                generation: 1,
                log: log.clone(),
            },
        );
        assert_eq!(*log.borrow(), vec![(TextureId::Player, 0)]);
        assert_eq!(set.get(TextureId::Player).map(|t| t.generation), Some(1));
    }

    #[test]
    fn sheet_sizes_use_fallback_for_empty_slots() {
        let log = Log::default();
        let mut set = full_set(&log);
        set.release(TextureId::Background);
        let fallback = SheetSizes::fallback(&GameConfig::default());
        let sizes = set.sheet_sizes(&fallback);
        assert_eq!(sizes.get(TextureId::Player), Vec2::new(10.0, 20.0));
        assert_eq!(sizes.get(TextureId::Background), Vec2::new(256.0, 192.0));
    }
}
