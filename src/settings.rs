use crate::game_logic::{
    BOOST_DURATION_MS, BOOST_MULTIPLIER, BOUNCE_RESTITUTION, CollisionTuning, FEEDBACK_MIN_IMPACT,
    FORWARD_SPEED_RETENTION, FeedbackThresholds, HEAVY_IMPACT, ItemEffect, LifecycleConfig,
    MEDIUM_IMPACT, OCCUPANCY_RADIUS, PICKUP_BOOST_MULTIPLIER, PICKUP_RADIUS, RingPlacement,
    SPAWN_CHANCE_PER_TICK, SPAWNER_COOLDOWN_MS, SPAWNER_HEIGHT, SPAWNER_RING_SCALE,
};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;

/// Tunables for boosts, spawners and collisions.
///
/// Every field has a default, so a settings file only needs the values it
/// wants to change.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupSettings {
    pub boost_multiplier: f32,
    pub pickup_boost_multiplier: f32,
    pub boost_duration_ms: u64,
    pub spawner_cooldown_ms: u64,
    pub spawn_chance_per_tick: f32,
    pub occupancy_radius: f32,
    pub spawner_ring_scale: f32,
    pub spawner_height: f32,
    pub item_lifetime_ms: Option<u64>,
    pub pickup_radius: f32,
    pub speed_retention: f32,
    pub bounce_restitution: f32,
    pub feedback_min_impact: f32,
    pub medium_impact: f32,
    pub heavy_impact: f32,
}

impl Default for PowerupSettings {
    fn default() -> Self {
        Self {
            boost_multiplier: BOOST_MULTIPLIER,
            pickup_boost_multiplier: PICKUP_BOOST_MULTIPLIER,
            boost_duration_ms: BOOST_DURATION_MS,
            spawner_cooldown_ms: SPAWNER_COOLDOWN_MS,
            spawn_chance_per_tick: SPAWN_CHANCE_PER_TICK,
            occupancy_radius: OCCUPANCY_RADIUS,
            spawner_ring_scale: SPAWNER_RING_SCALE,
            spawner_height: SPAWNER_HEIGHT,
            item_lifetime_ms: None,
            pickup_radius: PICKUP_RADIUS,
            speed_retention: FORWARD_SPEED_RETENTION,
            bounce_restitution: BOUNCE_RESTITUTION,
            feedback_min_impact: FEEDBACK_MIN_IMPACT,
            medium_impact: MEDIUM_IMPACT,
            heavy_impact: HEAVY_IMPACT,
        }
    }
}

impl PowerupSettings {
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            cooldown_ms: self.spawner_cooldown_ms,
            spawn_chance: self.spawn_chance_per_tick,
            occupancy_radius: self.occupancy_radius,
            item_lifetime_ms: self.item_lifetime_ms,
            item_effect: ItemEffect::SpeedBoost {
                multiplier: self.pickup_boost_multiplier,
            },
            placement: RingPlacement {
                scale: self.spawner_ring_scale,
                height: self.spawner_height,
            },
        }
    }

    pub fn collision_tuning(&self) -> CollisionTuning {
        CollisionTuning {
            speed_retention: self.speed_retention,
            restitution: self.bounce_restitution,
        }
    }

    pub fn feedback_thresholds(&self) -> FeedbackThresholds {
        FeedbackThresholds {
            min_impact: self.feedback_min_impact,
            medium: self.medium_impact,
            heavy: self.heavy_impact,
        }
    }
}

pub fn load_powerup_settings(filename: &str) -> Result<PowerupSettings, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(filename)?;
    PowerupSettings::from_json(&json)
}

/// Size of the track the spawner ring is laid out on.
#[derive(Resource, Clone, Copy, Debug)]
pub struct TrackLayout {
    pub radius: f32,
    pub spawner_count: usize,
}

impl Default for TrackLayout {
    fn default() -> Self {
        Self {
            radius: 100.0,
            spawner_count: 5,
        }
    }
}
