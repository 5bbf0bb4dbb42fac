use crate::game_logic::{
    ActiveItem, ActiveItemRegistry, ItemEffect, ItemId, OCCUPANCY_RADIUS, PICKUP_BOOST_MULTIPLIER,
    RingPlacement, SPAWN_CHANCE_PER_TICK, SPAWNER_COOLDOWN_MS, SpawnerId, SpawnerRegistry,
};
use bevy::prelude::*;
use rand::Rng;
use rand::rngs::{StdRng, ThreadRng};

/// Source of the uniform draw in `[0, 1)` used for each spawn attempt.
pub trait RollSource {
    fn next_roll(&mut self) -> f32;
}

impl RollSource for ThreadRng {
    fn next_roll(&mut self) -> f32 {
        self.random::<f32>()
    }
}

impl RollSource for StdRng {
    fn next_roll(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Always returns the same draw. Handy for replays and tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedRoll(pub f32);

impl RollSource for FixedRoll {
    fn next_roll(&mut self) -> f32 {
        self.0
    }
}

/// Rendering side of the lifecycle. Return values are never inspected.
pub trait ItemPresenter {
    fn item_spawned(&mut self, _item: &ActiveItem) {}
    /// Called for every live item once its animation state has advanced.
    fn item_updated(&mut self, _item: &ActiveItem) {}
    fn item_removed(&mut self, _id: &ItemId) {}
    fn spawner_visibility(&mut self, _id: &SpawnerId, _visible: bool) {}
    fn spawner_removed(&mut self, _id: &SpawnerId) {}
}

/// Presenter for headless runs.
pub struct NoPresenter;

impl ItemPresenter for NoPresenter {}

#[derive(Clone, Debug)]
pub struct LifecycleConfig {
    pub cooldown_ms: u64,
    pub spawn_chance: f32,
    pub occupancy_radius: f32,
    pub item_lifetime_ms: Option<u64>,
    pub item_effect: ItemEffect,
    pub placement: RingPlacement,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: SPAWNER_COOLDOWN_MS,
            spawn_chance: SPAWN_CHANCE_PER_TICK,
            occupancy_radius: OCCUPANCY_RADIUS,
            item_lifetime_ms: None,
            item_effect: ItemEffect::SpeedBoost {
                multiplier: PICKUP_BOOST_MULTIPLIER,
            },
            placement: RingPlacement::default(),
        }
    }
}

/// What a single `tick` changed.
#[derive(Debug, Default)]
pub struct TickReport {
    pub spawned: Vec<ItemId>,
    pub expired: Vec<ItemId>,
}

/// Owns the spawners and live items for one track session.
#[derive(Resource, Debug)]
pub struct LifecycleScheduler {
    spawners: SpawnerRegistry,
    items: ActiveItemRegistry,
    config: LifecycleConfig,
    next_item: u64,
}

impl Default for LifecycleScheduler {
    fn default() -> Self {
        Self::new(LifecycleConfig::default())
    }
}

impl LifecycleScheduler {
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            spawners: SpawnerRegistry::new(config.cooldown_ms, config.placement),
            items: ActiveItemRegistry::new(),
            config,
            next_item: 0,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn spawners(&self) -> &SpawnerRegistry {
        &self.spawners
    }

    pub fn spawners_mut(&mut self) -> &mut SpawnerRegistry {
        &mut self.spawners
    }

    pub fn items(&self) -> &ActiveItemRegistry {
        &self.items
    }

    pub fn create_spawner(&mut self, position: Vec3, id: SpawnerId) -> bool {
        self.spawners.create_spawner(position, id)
    }

    pub fn init_spawners(&mut self, track_radius: f32, count: usize) -> usize {
        self.spawners.init_spawners(track_radius, count)
    }

    /// Place an item directly, bypassing the spawners. The occupancy rule
    /// still applies.
    pub fn place_item(
        &mut self,
        position: Vec3,
        now_ms: u64,
        presenter: &mut impl ItemPresenter,
    ) -> Option<ItemId> {
        if self.items.is_occupied(position, self.config.occupancy_radius) {
            return None;
        }
        let item = self.new_item(position, now_ms);
        let id = item.id.clone();
        self.insert_item(item, presenter);
        Some(id)
    }

    /// Add an item built elsewhere, keeping its id. Returns false if the id
    /// is already live.
    pub fn insert_item(&mut self, item: ActiveItem, presenter: &mut impl ItemPresenter) -> bool {
        if self.items.contains(&item.id) {
            return false;
        }
        presenter.item_spawned(&item);
        self.items.insert(item)
    }

    fn new_item(&mut self, position: Vec3, now_ms: u64) -> ActiveItem {
        let id = ItemId(format!("item_{}", self.next_item));
        self.next_item += 1;
        ActiveItem::new(id, position, now_ms, self.config.item_effect)
            .with_lifetime(self.config.item_lifetime_ms)
    }

    /// One simulation step: animate items, try the spawners, then expire.
    ///
    /// Expiry runs after the spawn pass, so an item can never be created and
    /// expired in the same tick.
    pub fn tick(
        &mut self,
        now_ms: u64,
        rolls: &mut impl RollSource,
        presenter: &mut impl ItemPresenter,
    ) -> TickReport {
        let mut report = TickReport::default();

        self.items.update_all(now_ms);
        for item in self.items.iter() {
            presenter.item_updated(item);
        }

        let mut pending: Vec<(SpawnerId, Vec3)> = Vec::new();
        for spawner in self.spawners.iter_mut() {
            if !spawner.active {
                continue;
            }

            if spawner.cooldown_elapsed(now_ms) {
                if !spawner.visible {
                    spawner.visible = true;
                    presenter.spawner_visibility(spawner.id(), true);
                }

                let position = spawner.position();
                if self.items.is_occupied(position, self.config.occupancy_radius) {
                    continue;
                }
                // Already queued a spawn here this tick
                if pending.iter().any(|(_, p)| p.distance(position) < self.config.occupancy_radius) {
                    continue;
                }

                if rolls.next_roll() < self.config.spawn_chance {
                    spawner.last_spawn_time = now_ms;
                    pending.push((spawner.id().clone(), position));
                }
            } else if spawner.visible {
                spawner.visible = false;
                presenter.spawner_visibility(spawner.id(), false);
            }
        }

        for (spawner_id, position) in pending {
            let item = self.new_item(position, now_ms).with_source(spawner_id.clone());
            debug!("spawner {} produced {}", spawner_id, item.id);
            presenter.item_spawned(&item);
            report.spawned.push(item.id.clone());
            self.items.insert(item);
        }

        for item in self.items.expire(now_ms) {
            debug!("{} expired", item.id);
            presenter.item_removed(&item.id);
            report.expired.push(item.id);
        }

        report
    }

    /// Take the item out of the world and hand back its effect. Unknown or
    /// already collected ids return `None`.
    pub fn collect_item(
        &mut self,
        id: &ItemId,
        presenter: &mut impl ItemPresenter,
    ) -> Option<ItemEffect> {
        let item = self.items.remove(id)?;
        presenter.item_removed(&item.id);
        debug!("{} collected", item.id);
        Some(item.effect)
    }

    /// Collect everything within `radius` of a car.
    pub fn collect_near(
        &mut self,
        position: Vec3,
        radius: f32,
        presenter: &mut impl ItemPresenter,
    ) -> Vec<(ItemId, ItemEffect)> {
        self.items
            .within(position, radius)
            .into_iter()
            .filter_map(|id| {
                let effect = self.collect_item(&id, presenter)?;
                Some((id, effect))
            })
            .collect()
    }

    /// Drop every item and spawner. `init_spawners` works again afterwards.
    pub fn cleanup(&mut self, presenter: &mut impl ItemPresenter) {
        let items = self.items.clear();
        for item in &items {
            presenter.item_removed(&item.id);
        }
        let spawners = self.spawners.clear();
        for id in &spawners {
            presenter.spawner_removed(id);
        }
        debug!("cleared {} items and {} spawners", items.len(), spawners.len());
    }
}
