use crate::game_logic::{BOUNCE_DECAY_RATE, VEHICLE_MAX_SPEED};
use bevy::prelude::*;

#[derive(Component)]
pub struct Car;

#[derive(Component)]
pub struct PlayerControlled;

/// What the collision resolver needs from a vehicle.
///
/// Implemented by `VehicleMotion`; anything else standing in for the physics
/// side (test doubles, a remote car proxy) can implement it too.
pub trait VehicleBody {
    fn speed(&self) -> f32;
    fn direction(&self) -> Vec3;
    fn max_speed(&self) -> f32;
    fn set_speed(&mut self, speed: f32);
    /// Hand an external impulse to the integrator.
    fn apply_bounce(&mut self, direction: Vec3, restitution: f32);
}

/// Speed and heading of a car. Negative speed means reversing.
#[derive(Component, Clone, Debug)]
pub struct VehicleMotion {
    pub speed: f32,
    pub direction: Vec3,
    pub max_speed: f32,
    /// Outstanding bounce impulse, drained by `integrate`
    pub bounce: Vec3,
}

impl Default for VehicleMotion {
    fn default() -> Self {
        Self::new(Vec3::X)
    }
}

impl VehicleMotion {
    pub fn new(direction: Vec3) -> Self {
        Self {
            speed: 0.0,
            direction: direction.normalize_or_zero(),
            max_speed: VEHICLE_MAX_SPEED,
            bounce: Vec3::ZERO,
        }
    }

    pub fn is_reversing(&self) -> bool {
        self.speed < 0.0
    }

    /// Advance `position` by one step.
    ///
    /// Speed is clamped to the max speed before the boost multiplier is
    /// applied, so only the effective speed ever exceeds it. The bounce
    /// impulse is added on top and decays towards zero.
    pub fn integrate(&mut self, position: &mut Vec3, boost_multiplier: f32, delta: f32) {
        self.speed = self.speed.clamp(-self.max_speed, self.max_speed);

        *position += self.direction * self.speed * boost_multiplier * delta;
        *position += self.bounce * delta;

        let decay = (1.0 - BOUNCE_DECAY_RATE * delta).max(0.0);
        self.bounce *= decay;
        if self.bounce.length_squared() < 1e-6 {
            self.bounce = Vec3::ZERO;
        }
    }
}

impl VehicleBody for VehicleMotion {
    fn speed(&self) -> f32 {
        self.speed
    }

    fn direction(&self) -> Vec3 {
        self.direction
    }

    fn max_speed(&self) -> f32 {
        self.max_speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn apply_bounce(&mut self, direction: Vec3, restitution: f32) {
        self.bounce += direction * restitution;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_clamps_speed() {
        let mut motion = VehicleMotion::new(Vec3::X);
        motion.speed = motion.max_speed * 4.0;
        let mut position = Vec3::ZERO;

        motion.integrate(&mut position, 1.0, 1.0);

        assert_eq!(motion.speed, motion.max_speed);
        assert!((position.x - motion.max_speed).abs() < 1e-4);
    }

    #[test]
    fn test_integrate_applies_boost_multiplier() {
        let mut motion = VehicleMotion::new(Vec3::Z);
        motion.speed = 10.0;
        let mut position = Vec3::ZERO;

        motion.integrate(&mut position, 2.0, 0.5);

        assert!((position.z - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_bounce_decays_to_zero() {
        let mut motion = VehicleMotion::new(Vec3::X);
        motion.apply_bounce(-Vec3::X, 0.5);
        let mut position = Vec3::ZERO;

        for _ in 0..120 {
            motion.integrate(&mut position, 1.0, 1.0 / 60.0);
        }

        assert_eq!(motion.bounce, Vec3::ZERO);
        assert!(position.x < 0.0);
    }
}
