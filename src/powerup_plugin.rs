use crate::game_logic::{
    ActiveItem, BoostTransition, Car, CollisionEvent, CollisionFeedback, ImpactSeverity, ItemEffect,
    ItemId, ItemPresenter, LifecycleScheduler, SpawnerId, SpeedBoost, TimerScheduler,
    VehicleMotion, apply_collision, collision_feedback,
};
use crate::settings::{PowerupSettings, TrackLayout};
use bevy::prelude::*;
use std::collections::HashMap;

/// Boost expiry timers for every car, keyed by the car entity.
pub type BoostTimers = TimerScheduler<Entity>;

// Marker for the world entity that stands in for a live item
#[derive(Component)]
pub struct PowerupItem {
    pub id: ItemId,
}

#[derive(Component)]
pub struct SpawnerMarker {
    pub id: SpawnerId,
}

/// Maps core ids to the entities the presenter spawned for them.
#[derive(Resource, Default)]
pub struct ItemEntities {
    pub items: HashMap<ItemId, Entity>,
    pub spawners: HashMap<SpawnerId, Entity>,
}

/// A car hit something this frame.
#[derive(Event, Clone, Copy, Debug)]
pub struct VehicleCollision {
    pub entity: Entity,
    pub event: CollisionEvent,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct CollisionFeedbackEvent {
    pub entity: Entity,
    pub feedback: CollisionFeedback,
}

/// Boost button pressed.
#[derive(Event, Clone, Copy, Debug)]
pub struct BoostRequest {
    pub entity: Entity,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct BoostChanged {
    pub entity: Entity,
    pub transition: BoostTransition,
}

#[derive(Event, Clone, Debug)]
pub struct ItemCollected {
    pub entity: Entity,
    pub item: ItemId,
    pub effect: ItemEffect,
}

/// Tear down every item, spawner and pending boost timer.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct PowerupTeardown;

pub struct PowerupPlugin;

impl Plugin for PowerupPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PowerupSettings>()
            .init_resource::<TrackLayout>()
            .init_resource::<BoostTimers>()
            .init_resource::<ItemEntities>()
            .add_event::<VehicleCollision>()
            .add_event::<CollisionFeedbackEvent>()
            .add_event::<BoostRequest>()
            .add_event::<BoostChanged>()
            .add_event::<ItemCollected>()
            .add_event::<PowerupTeardown>()
            .add_systems(Startup, setup_powerup_spawners)
            .add_systems(
                FixedUpdate,
                (
                    handle_boost_requests,
                    tick_powerup_lifecycle,
                    collect_powerups,
                    resolve_vehicle_collisions,
                    fire_boost_timers,
                    integrate_vehicle_motion,
                    teardown_powerups,
                )
                    .chain(),
            );
    }
}

/// Spawns and despawns stand-in entities for the core's rendering hooks.
struct EntityPresenter<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    entities: &'a mut ItemEntities,
}

impl ItemPresenter for EntityPresenter<'_, '_, '_> {
    fn item_spawned(&mut self, item: &ActiveItem) {
        let entity = self
            .commands
            .spawn((PowerupItem { id: item.id.clone() }, item_transform(item)))
            .id();
        self.entities.items.insert(item.id.clone(), entity);
    }

    fn item_updated(&mut self, item: &ActiveItem) {
        if let Some(entity) = self.entities.items.get(&item.id) {
            self.commands.entity(*entity).insert(item_transform(item));
        }
    }

    fn item_removed(&mut self, id: &ItemId) {
        if let Some(entity) = self.entities.items.remove(id) {
            self.commands.entity(entity).despawn();
        }
    }

    fn spawner_visibility(&mut self, id: &SpawnerId, visible: bool) {
        if let Some(entity) = self.entities.spawners.get(id) {
            let visibility = if visible {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
            self.commands.entity(*entity).insert(visibility);
        }
    }

    fn spawner_removed(&mut self, id: &SpawnerId) {
        if let Some(entity) = self.entities.spawners.remove(id) {
            self.commands.entity(entity).despawn();
        }
    }
}

// Spin around the vertical axis and bob above the resting position
fn item_transform(item: &ActiveItem) -> Transform {
    Transform::from_translation(item.position + Vec3::Y * item.bob)
        .with_rotation(Quat::from_rotation_y(item.spin))
}

fn now_ms(time: &Time) -> u64 {
    time.elapsed().as_millis() as u64
}

pub fn setup_powerup_spawners(
    mut commands: Commands,
    settings: Res<PowerupSettings>,
    layout: Res<TrackLayout>,
    mut entities: ResMut<ItemEntities>,
) {
    let mut scheduler = LifecycleScheduler::new(settings.lifecycle_config());
    scheduler.init_spawners(layout.radius, layout.spawner_count);

    for spawner in scheduler.spawners().iter() {
        let entity = commands
            .spawn((
                SpawnerMarker { id: spawner.id().clone() },
                Transform::from_translation(spawner.position()),
                Visibility::Visible,
            ))
            .id();
        entities.spawners.insert(spawner.id().clone(), entity);
    }

    info!(
        "{} power-up spawners ready on a track of radius {}",
        scheduler.spawners().len(),
        layout.radius
    );
    commands.insert_resource(scheduler);
}

pub fn handle_boost_requests(
    time: Res<Time>,
    settings: Res<PowerupSettings>,
    mut requests: EventReader<BoostRequest>,
    mut boosts: Query<&mut SpeedBoost>,
    mut timers: ResMut<BoostTimers>,
    mut changes: EventWriter<BoostChanged>,
) {
    let now = now_ms(&time);
    for request in requests.read() {
        let Ok(mut boost) = boosts.get_mut(request.entity) else {
            continue;
        };
        boost.set_duration_ms(settings.boost_duration_ms);
        let transition = boost.activate_with(settings.boost_multiplier, request.entity, now, &mut *timers);
        changes.write(BoostChanged {
            entity: request.entity,
            transition,
        });
    }
}

pub fn tick_powerup_lifecycle(
    mut commands: Commands,
    time: Res<Time>,
    scheduler: Option<ResMut<LifecycleScheduler>>,
    mut entities: ResMut<ItemEntities>,
) {
    let Some(mut scheduler) = scheduler else {
        return;
    };

    let mut rng = rand::rng();
    let mut presenter = EntityPresenter {
        commands: &mut commands,
        entities: &mut entities,
    };
    let report = scheduler.tick(now_ms(&time), &mut rng, &mut presenter);

    for id in &report.spawned {
        info!("Powerup {} spawned", id);
    }
    for id in &report.expired {
        info!("Powerup {} expired", id);
    }
}

pub fn collect_powerups(
    mut commands: Commands,
    time: Res<Time>,
    settings: Res<PowerupSettings>,
    scheduler: Option<ResMut<LifecycleScheduler>>,
    mut entities: ResMut<ItemEntities>,
    mut timers: ResMut<BoostTimers>,
    mut cars: Query<(Entity, &Transform, &mut SpeedBoost), With<Car>>,
    mut collected: EventWriter<ItemCollected>,
    mut changes: EventWriter<BoostChanged>,
) {
    let Some(mut scheduler) = scheduler else {
        return;
    };
    let now = now_ms(&time);

    for (entity, transform, mut boost) in cars.iter_mut() {
        let mut presenter = EntityPresenter {
            commands: &mut commands,
            entities: &mut entities,
        };
        let pickups =
            scheduler.collect_near(transform.translation, settings.pickup_radius, &mut presenter);

        for (item, effect) in pickups {
            boost.set_duration_ms(settings.boost_duration_ms);
            let transition = match effect {
                ItemEffect::SpeedBoost { multiplier } => {
                    boost.activate_with(multiplier, entity, now, &mut *timers)
                }
            };
            info!("Powerup {} collected! {:?}", item, transition);

            collected.write(ItemCollected {
                entity,
                item,
                effect,
            });
            changes.write(BoostChanged { entity, transition });
        }
    }
}

pub fn resolve_vehicle_collisions(
    settings: Res<PowerupSettings>,
    mut collisions: EventReader<VehicleCollision>,
    mut vehicles: Query<&mut VehicleMotion>,
    mut feedback: EventWriter<CollisionFeedbackEvent>,
) {
    let tuning = settings.collision_tuning();
    let thresholds = settings.feedback_thresholds();

    for collision in collisions.read() {
        let Ok(mut motion) = vehicles.get_mut(collision.entity) else {
            continue;
        };

        let response = apply_collision(&mut *motion, &collision.event, &tuning);
        let result = collision_feedback(collision.event.pre_impact_speed, motion.max_speed, &thresholds);

        if result.severity == ImpactSeverity::Heavy {
            info!(
                "{} speed {:.1} -> {:.1}",
                result.severity.message(),
                collision.event.pre_impact_speed,
                response.new_speed
            );
        }

        feedback.write(CollisionFeedbackEvent {
            entity: collision.entity,
            feedback: result,
        });
    }
}

pub fn fire_boost_timers(
    time: Res<Time>,
    mut timers: ResMut<BoostTimers>,
    mut boosts: Query<&mut SpeedBoost>,
    mut changes: EventWriter<BoostChanged>,
) {
    for (handle, entity) in timers.fire_due(now_ms(&time)) {
        let Ok(mut boost) = boosts.get_mut(entity) else {
            continue;
        };
        let transition = boost.on_timer_fired(handle, &mut *timers);
        if transition == BoostTransition::Expired {
            info!("Speed boost expired!");
            changes.write(BoostChanged { entity, transition });
        }
    }
}

pub fn integrate_vehicle_motion(
    time: Res<Time>,
    mut vehicles: Query<(&mut Transform, &mut VehicleMotion, Option<&SpeedBoost>)>,
) {
    let delta = time.delta_secs();
    for (mut transform, mut motion, boost) in vehicles.iter_mut() {
        let multiplier = boost.map_or(1.0, |boost| boost.multiplier());
        motion.integrate(&mut transform.translation, multiplier, delta);
    }
}

pub fn teardown_powerups(
    mut commands: Commands,
    mut requests: EventReader<PowerupTeardown>,
    scheduler: Option<ResMut<LifecycleScheduler>>,
    mut entities: ResMut<ItemEntities>,
    mut timers: ResMut<BoostTimers>,
    mut boosts: Query<(Entity, &mut SpeedBoost)>,
    mut changes: EventWriter<BoostChanged>,
) {
    if requests.read().count() == 0 {
        return;
    }

    for (entity, mut boost) in boosts.iter_mut() {
        let transition = boost.cancel(&mut *timers);
        if transition == BoostTransition::Cancelled {
            changes.write(BoostChanged { entity, transition });
        }
    }
    let orphaned = timers.cancel_all();

    if let Some(mut scheduler) = scheduler {
        let mut presenter = EntityPresenter {
            commands: &mut commands,
            entities: &mut entities,
        };
        scheduler.cleanup(&mut presenter);
    }

    info!("Power-ups torn down ({} stray timers cancelled)", orphaned);
}
