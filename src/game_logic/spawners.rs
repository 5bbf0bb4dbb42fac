use crate::game_logic::{SPAWNER_COOLDOWN_MS, SPAWNER_HEIGHT, SPAWNER_RING_SCALE};
use bevy::prelude::*;
use std::collections::BTreeMap;
use std::f32::consts::TAU;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpawnerId(pub String);

impl From<&str> for SpawnerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for SpawnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Spawner {
    id: SpawnerId,
    position: Vec3,
    pub last_spawn_time: u64,
    pub cooldown_ms: u64,
    pub active: bool,
    /// Mirrors what the renderer was last told
    pub visible: bool,
}

impl Spawner {
    pub fn new(id: SpawnerId, position: Vec3, cooldown_ms: u64) -> Self {
        Self {
            id,
            position,
            last_spawn_time: 0,
            cooldown_ms,
            active: true,
            visible: true,
        }
    }

    pub fn id(&self) -> &SpawnerId {
        &self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Strictly more than the cooldown has passed since the last spawn.
    pub fn cooldown_elapsed(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_spawn_time) > self.cooldown_ms
    }
}

/// Placement parameters for `init_spawners`.
#[derive(Clone, Copy, Debug)]
pub struct RingPlacement {
    pub scale: f32,
    pub height: f32,
}

impl Default for RingPlacement {
    fn default() -> Self {
        Self {
            scale: SPAWNER_RING_SCALE,
            height: SPAWNER_HEIGHT,
        }
    }
}

/// Fixed spawn points for the track, keyed by id.
#[derive(Debug)]
pub struct SpawnerRegistry {
    spawners: BTreeMap<SpawnerId, Spawner>,
    default_cooldown_ms: u64,
    placement: RingPlacement,
    initialized: bool,
}

impl Default for SpawnerRegistry {
    fn default() -> Self {
        Self::new(SPAWNER_COOLDOWN_MS, RingPlacement::default())
    }
}

impl SpawnerRegistry {
    pub fn new(default_cooldown_ms: u64, placement: RingPlacement) -> Self {
        Self {
            spawners: BTreeMap::new(),
            default_cooldown_ms,
            placement,
            initialized: false,
        }
    }

    /// Returns false (and changes nothing) if the id is taken.
    pub fn create_spawner(&mut self, position: Vec3, id: SpawnerId) -> bool {
        if self.spawners.contains_key(&id) {
            return false;
        }
        let spawner = Spawner::new(id.clone(), position, self.default_cooldown_ms);
        self.spawners.insert(id, spawner);
        true
    }

    /// Lay `count` spawners evenly around the track, starting on the +X axis
    /// and going counter-clockwise in the XZ plane. Only the first call does
    /// anything until `clear`.
    pub fn init_spawners(&mut self, track_radius: f32, count: usize) -> usize {
        if self.initialized {
            return 0;
        }

        let radius = track_radius * self.placement.scale;
        let mut created = 0;
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32;
            let position = Vec3::new(
                radius * angle.cos(),
                self.placement.height,
                radius * angle.sin(),
            );
            if self.create_spawner(position, SpawnerId(format!("spawner_{i}"))) {
                created += 1;
            }
        }

        self.initialized = true;
        debug!("placed {} power-up spawners on a ring of radius {:.1}", created, radius);
        created
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn get(&self, id: &SpawnerId) -> Option<&Spawner> {
        self.spawners.get(id)
    }

    pub fn set_active(&mut self, id: &SpawnerId, active: bool) -> bool {
        match self.spawners.get_mut(id) {
            Some(spawner) => {
                spawner.active = active;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spawner> {
        self.spawners.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Spawner> {
        self.spawners.values_mut()
    }

    pub fn len(&self) -> usize {
        self.spawners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawners.is_empty()
    }

    /// Remove every spawner and allow `init_spawners` to run again.
    pub fn clear(&mut self) -> Vec<SpawnerId> {
        self.initialized = false;
        std::mem::take(&mut self.spawners).into_keys().collect()
    }
}
