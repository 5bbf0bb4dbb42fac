use crate::game_logic::{
    BOUNCE_RESTITUTION, FEEDBACK_MIN_IMPACT, FORWARD_SPEED_RETENTION, HEAVY_IMPACT, MEDIUM_IMPACT,
    VehicleBody,
};
use bevy::prelude::*;

/// A single physical contact, consumed as soon as it is resolved.
#[derive(Clone, Copy, Debug)]
pub struct CollisionEvent {
    pub pre_impact_speed: f32,
    pub is_reversing: bool,
}

impl CollisionEvent {
    /// Capture the event from the vehicle's state at the moment of contact.
    pub fn from_body(body: &impl VehicleBody) -> Self {
        Self {
            pre_impact_speed: body.speed(),
            is_reversing: body.speed() < 0.0,
        }
    }

    pub fn impact_magnitude(&self) -> f32 {
        self.pre_impact_speed.abs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionResponse {
    pub new_speed: f32,
    pub bounce_impulse: Vec3,
}

/// Tunables for `resolve_collision`.
#[derive(Clone, Copy, Debug)]
pub struct CollisionTuning {
    pub speed_retention: f32,
    pub restitution: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            speed_retention: FORWARD_SPEED_RETENTION,
            restitution: BOUNCE_RESTITUTION,
        }
    }
}

/// Work out the post-impact speed and the bounce impulse.
///
/// Reversing into something stops the car dead; a forward hit keeps a
/// fraction of the speed. The bounce always points against the facing
/// direction, even when the speed was zeroed.
pub fn resolve_collision(
    body: &impl VehicleBody,
    event: &CollisionEvent,
    tuning: &CollisionTuning,
) -> CollisionResponse {
    let new_speed = if event.is_reversing {
        0.0
    } else {
        event.pre_impact_speed * tuning.speed_retention
    };

    CollisionResponse {
        new_speed,
        bounce_impulse: -body.direction() * tuning.restitution,
    }
}

/// Resolve and write the result back into the body.
pub fn apply_collision(
    body: &mut impl VehicleBody,
    event: &CollisionEvent,
    tuning: &CollisionTuning,
) -> CollisionResponse {
    let response = resolve_collision(body, event, tuning);
    body.set_speed(response.new_speed);
    body.apply_bounce(-body.direction(), tuning.restitution);
    response
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImpactSeverity {
    Light,
    Medium,
    Heavy,
}

impl ImpactSeverity {
    pub fn message(&self) -> &'static str {
        match self {
            ImpactSeverity::Light => "Bump!",
            ImpactSeverity::Medium => "Crash!",
            ImpactSeverity::Heavy => "Heavy crash!",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FeedbackThresholds {
    pub min_impact: f32,
    pub medium: f32,
    pub heavy: f32,
}

impl Default for FeedbackThresholds {
    fn default() -> Self {
        Self {
            min_impact: FEEDBACK_MIN_IMPACT,
            medium: MEDIUM_IMPACT,
            heavy: HEAVY_IMPACT,
        }
    }
}

/// What the UI side should show for an impact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionFeedback {
    pub severity: ImpactSeverity,
    pub magnitude: f32,
    /// Camera shake strength in 0..=1, `None` for impacts too soft to shake
    pub shake: Option<f32>,
}

pub fn collision_feedback(
    pre_impact_speed: f32,
    max_speed: f32,
    thresholds: &FeedbackThresholds,
) -> CollisionFeedback {
    let magnitude = pre_impact_speed.abs();

    let severity = if magnitude > thresholds.heavy {
        ImpactSeverity::Heavy
    } else if magnitude > thresholds.medium {
        ImpactSeverity::Medium
    } else {
        ImpactSeverity::Light
    };

    let shake = if magnitude < thresholds.min_impact || max_speed <= 0.0 {
        None
    } else {
        Some((magnitude / max_speed).clamp(0.0, 1.0))
    };

    CollisionFeedback {
        severity,
        magnitude,
        shake,
    }
}
