// Simulation timing
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0; // 60 Hz fixed update

// Collision response
pub const FORWARD_SPEED_RETENTION: f32 = 0.3;
pub const BOUNCE_RESTITUTION: f32 = 0.5;
pub const BOUNCE_DECAY_RATE: f32 = 6.0; // fraction of the impulse shed per second

// Collision feedback thresholds (pre-impact speed magnitude)
pub const FEEDBACK_MIN_IMPACT: f32 = 5.0;
pub const MEDIUM_IMPACT: f32 = 10.0;
pub const HEAVY_IMPACT: f32 = 20.0;

// Speed boost
pub const BOOST_MULTIPLIER: f32 = 2.0;
pub const PICKUP_BOOST_MULTIPLIER: f32 = 1.41;
pub const BOOST_DURATION_MS: u64 = 3000;

// Spawners and items
pub const SPAWNER_COOLDOWN_MS: u64 = 10_000;
pub const SPAWN_CHANCE_PER_TICK: f32 = 0.02;
pub const OCCUPANCY_RADIUS: f32 = 2.0;
pub const SPAWNER_RING_SCALE: f32 = 0.85;
pub const SPAWNER_HEIGHT: f32 = 1.0;
pub const PICKUP_RADIUS: f32 = 3.0;

// Vehicle defaults
pub const VEHICLE_MAX_SPEED: f32 = 30.0;
