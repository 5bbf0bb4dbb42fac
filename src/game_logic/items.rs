use crate::game_logic::SpawnerId;
use bevy::prelude::*;
use std::collections::BTreeMap;

const SPIN_RATE: f32 = 2.0; // radians per second
const BOB_HEIGHT: f32 = 0.25;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What collecting an item does to the car that picked it up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemEffect {
    SpeedBoost { multiplier: f32 },
}

#[derive(Clone, Debug)]
pub struct ActiveItem {
    pub id: ItemId,
    pub position: Vec3,
    pub created_time: u64,
    pub lifetime_ms: Option<u64>,
    pub effect: ItemEffect,
    /// Spawner that produced it, if any
    pub source: Option<SpawnerId>,
    pub spin: f32,
    pub bob: f32,
}

impl ActiveItem {
    pub fn new(id: ItemId, position: Vec3, created_time: u64, effect: ItemEffect) -> Self {
        Self {
            id,
            position,
            created_time,
            lifetime_ms: None,
            effect,
            source: None,
            spin: 0.0,
            bob: 0.0,
        }
    }

    pub fn with_lifetime(mut self, lifetime_ms: Option<u64>) -> Self {
        self.lifetime_ms = lifetime_ms;
        self
    }

    pub fn with_source(mut self, source: SpawnerId) -> Self {
        self.source = Some(source);
        self
    }

    /// Idle animation state; the renderer reads `spin` and `bob`.
    pub fn update(&mut self, now_ms: u64) {
        let age_secs = now_ms.saturating_sub(self.created_time) as f32 / 1000.0;
        self.spin = (age_secs * SPIN_RATE).rem_euclid(std::f32::consts::TAU);
        self.bob = (age_secs * SPIN_RATE).sin() * BOB_HEIGHT;
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.lifetime_ms {
            Some(lifetime) => now_ms.saturating_sub(self.created_time) > lifetime,
            None => false,
        }
    }
}

/// Items currently in the world, keyed by id.
#[derive(Debug, Default)]
pub struct ActiveItemRegistry {
    items: BTreeMap<ItemId, ActiveItem>,
}

impl ActiveItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if an item with the same id is already present.
    pub fn insert(&mut self, item: ActiveItem) -> bool {
        if self.items.contains_key(&item.id) {
            return false;
        }
        self.items.insert(item.id.clone(), item);
        true
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<ActiveItem> {
        self.items.remove(id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&ActiveItem> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Any item within `radius` of `position`.
    pub fn is_occupied(&self, position: Vec3, radius: f32) -> bool {
        self.items
            .values()
            .any(|item| item.position.distance(position) < radius)
    }

    /// Ids of every item within `radius`, nearest first.
    pub fn within(&self, position: Vec3, radius: f32) -> Vec<ItemId> {
        let mut hits: Vec<(f32, &ItemId)> = self
            .items
            .values()
            .map(|item| (item.position.distance(position), &item.id))
            .filter(|(distance, _)| *distance < radius)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, id)| id.clone()).collect()
    }

    pub fn update_all(&mut self, now_ms: u64) {
        for item in self.items.values_mut() {
            item.update(now_ms);
        }
    }

    /// Remove every item past its lifetime.
    pub fn expire(&mut self, now_ms: u64) -> Vec<ActiveItem> {
        let expired: Vec<ItemId> = self
            .items
            .values()
            .filter(|item| item.is_expired(now_ms))
            .map(|item| item.id.clone())
            .collect();

        expired
            .iter()
            .filter_map(|id| self.items.remove(id))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) -> Vec<ActiveItem> {
        std::mem::take(&mut self.items).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boost_item(id: &str, position: Vec3, created_time: u64) -> ActiveItem {
        ActiveItem::new(id.into(), position, created_time, ItemEffect::SpeedBoost { multiplier: 1.41 })
    }

    #[test]
    fn test_occupancy_radius() {
        let mut items = ActiveItemRegistry::new();
        items.insert(boost_item("a", Vec3::new(10.0, 1.0, 0.0), 0));

        assert!(items.is_occupied(Vec3::new(11.5, 1.0, 0.0), 2.0));
        assert!(!items.is_occupied(Vec3::new(12.5, 1.0, 0.0), 2.0));
    }

    #[test]
    fn test_expire_respects_lifetime() {
        let mut items = ActiveItemRegistry::new();
        items.insert(boost_item("timed", Vec3::ZERO, 0).with_lifetime(Some(5000)));
        items.insert(boost_item("forever", Vec3::X * 10.0, 0));

        assert!(items.expire(5000).is_empty());
        let expired = items.expire(5001);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, ItemId::from("timed"));
        assert!(items.contains(&"forever".into()));
    }

    #[test]
    fn test_within_sorted_by_distance() {
        let mut items = ActiveItemRegistry::new();
        items.insert(boost_item("far", Vec3::new(2.5, 0.0, 0.0), 0));
        items.insert(boost_item("near", Vec3::new(1.0, 0.0, 0.0), 0));
        items.insert(boost_item("out", Vec3::new(9.0, 0.0, 0.0), 0));

        let hits = items.within(Vec3::ZERO, 3.0);
        assert_eq!(hits, vec![ItemId::from("near"), ItemId::from("far")]);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut items = ActiveItemRegistry::new();
        assert!(items.insert(boost_item("a", Vec3::ZERO, 0)));
        assert!(!items.insert(boost_item("a", Vec3::ONE, 5)));
        assert_eq!(items.get(&"a".into()).unwrap().created_time, 0);
    }
}
