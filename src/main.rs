use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use rand::Rng;
use std::time::Duration;

use rust_racers_powerups::game_logic::{
    Car, CollisionEvent, FIXED_TIMESTEP, PlayerControlled, SpeedBoost, VehicleMotion,
};
use rust_racers_powerups::powerup_plugin::{
    BoostChanged, BoostRequest, CollisionFeedbackEvent, PowerupPlugin, VehicleCollision,
};
use rust_racers_powerups::settings::{PowerupSettings, TrackLayout, load_powerup_settings};

const SETTINGS_FILE: &str = "assets/powerups.json";
const DEMO_CARS: usize = 3;
const WALL_HIT_CHANCE: f32 = 0.002;
const BOOST_PRESS_CHANCE: f32 = 0.001;

fn main() {
    let settings = match load_powerup_settings(SETTINGS_FILE) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Could not load {} ({}), using defaults", SETTINGS_FILE, e);
            PowerupSettings::default()
        }
    };

    // Headless: the loop rate is set by the runner, the sim by the fixed step
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f32(
                FIXED_TIMESTEP,
            ))),
        )
        .add_plugins(LogPlugin::default())
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        .insert_resource(settings)
        .insert_resource(TrackLayout::default())
        .add_plugins(PowerupPlugin)
        .add_systems(Startup, spawn_demo_cars)
        .add_systems(FixedUpdate, drive_demo_cars)
        .add_systems(Update, (log_boost_changes, log_collision_feedback))
        .run();
}

fn spawn_demo_cars(mut commands: Commands, settings: Res<PowerupSettings>, layout: Res<TrackLayout>) {
    let lane = layout.radius * settings.spawner_ring_scale;

    for i in 0..DEMO_CARS {
        // stagger the cars around the ring, between spawners
        let angle = std::f32::consts::TAU * (i as f32 + 0.5) / DEMO_CARS as f32;
        let position = Vec3::new(lane * angle.cos(), settings.spawner_height, lane * angle.sin());

        let mut car = commands.spawn((
            Transform::from_translation(position),
            VehicleMotion::new(Vec3::new(-angle.sin(), 0.0, angle.cos())),
            SpeedBoost::new(settings.boost_duration_ms),
            Car,
        ));
        if i == 0 {
            car.insert(PlayerControlled);
        }
    }
}

// Follow the spawner ring; now and then hit a wall or press boost
fn drive_demo_cars(
    settings: Res<PowerupSettings>,
    layout: Res<TrackLayout>,
    mut cars: Query<(Entity, &Transform, &mut VehicleMotion), With<Car>>,
    mut collisions: EventWriter<VehicleCollision>,
    mut boosts: EventWriter<BoostRequest>,
) {
    let mut rng = rand::rng();
    let lane = layout.radius * settings.spawner_ring_scale;

    for (entity, transform, mut motion) in cars.iter_mut() {
        let position = transform.translation;
        let angle = position.z.atan2(position.x) + 0.1;
        let target = Vec3::new(lane * angle.cos(), position.y, lane * angle.sin());
        motion.direction = (target - position).normalize_or(motion.direction);

        // accelerate back towards cruising speed after a hit
        motion.speed = (motion.speed + 0.5).min(motion.max_speed * 0.8);

        if rng.random::<f32>() < WALL_HIT_CHANCE {
            collisions.write(VehicleCollision {
                entity,
                event: CollisionEvent::from_body(&*motion),
            });
        }
        if rng.random::<f32>() < BOOST_PRESS_CHANCE {
            boosts.write(BoostRequest { entity });
        }
    }
}

// Only the player's boosts reach the info log; AI cars stay at debug
fn log_boost_changes(mut changes: EventReader<BoostChanged>, players: Query<(), With<PlayerControlled>>) {
    for change in changes.read() {
        if players.contains(change.entity) {
            info!("player boost: {:?}", change.transition);
        } else {
            debug!("car {:?}: {:?}", change.entity, change.transition);
        }
    }
}

fn log_collision_feedback(mut feedback: EventReader<CollisionFeedbackEvent>) {
    for event in feedback.read() {
        let feedback = event.feedback;
        match feedback.shake {
            Some(shake) => info!(
                "{} (impact {:.1}, shake {:.2})",
                feedback.severity.message(),
                feedback.magnitude,
                shake
            ),
            None => debug!("{} (impact {:.1})", feedback.severity.message(), feedback.magnitude),
        }
    }
}
