//! Platformer level container and per-frame tick
//!
//! A `Game` owns the registered levels and the live `Scene`. Loading a level
//! builds a brand new scene from the level's setup procedure and swaps it in
//! only if setup succeeded, so a broken level never replaces a working one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, CollisionKind};
use super::collision::{CollisionMap, ContactPhase, overlapping_pairs};
use super::entity::{
    Appearance, Effect, Entity, EntityId, EntityKind, GravityEffect, MovementAxis, MovingPlatform,
    Patrol, SurfaceInfo,
};
use super::player::{Control, Player, PlayerParams, StepContext, StepOutcome};
use super::timer::{Timer, Timers};
use crate::error::GameError;
use crate::settings::Settings;

/// Level setup procedure: repopulates an empty scene through its factories
pub type LevelSetup = Box<dyn Fn(&mut Scene) -> Result<(), GameError>>;

/// Whether the loop may touch the entity list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelState {
    /// Mid-transition; update and collision processing are no-ops
    Inactive,
    Active,
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Out of lives; only a restart leaves this phase
    GameOver,
}

/// Notable things that happened during a tick or call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelLoaded(String),
    LevelCompleted { from: String, to: String },
    LevelFailed,
    LifeLost { remaining: u32 },
    GameOver,
    ScoreAwarded(u32),
    EntityDestroyed(EntityId),
    GravityInverted { multiplier: f32 },
}

/// Delayed effects owned by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimedEffect {
    EndSpawnGrace,
    RestoreSize,
}

type Spawner = fn(&mut Scene, f32, f32, f32, f32) -> Result<EntityId, GameError>;

/// Kind names accepted by `Scene::spawn_named`, with default tunables
const SPAWNERS: &[(&str, Spawner)] = &[
    ("player", |s, x, y, w, h| s.add_player(x, y, w, h)),
    ("platform", |s, x, y, w, h| {
        s.add_platform(x, y, w, h, SurfaceInfo::default())
    }),
    ("ice", |s, x, y, w, h| {
        s.add_platform(x, y, w, h, SurfaceInfo::new(0.0, 0.95))
    }),
    ("moving_platform", |s, x, y, w, h| {
        s.add_moving_platform(x, y, w, h, MovementAxis::Horizontal, 1.0, 100.0)
    }),
    ("enemy", |s, x, y, w, h| {
        s.add_enemy(x, y, w, h, MovementAxis::Horizontal, 2.0, 100.0)
    }),
    ("star", |s, x, y, w, h| s.add_star(x, y, w, h, 100)),
    ("door", |s, x, y, w, h| s.add_door(x, y, w, h, "", false)),
    ("trampoline", |s, x, y, w, h| s.add_trampoline(x, y, w, h, 0.8)),
    ("treadmill", |s, x, y, w, h| s.add_treadmill(x, y, w, h, 2.0)),
    ("size_changer", |s, x, y, w, h| {
        s.add_size_changer(x, y, w, h, Vec2::splat(15.0), None)
    }),
    ("anti_gravity_block", |s, x, y, w, h| {
        s.add_gravity_block(x, y, w, h, GravityEffect::Invert)
    }),
    ("gravity_toggle", |s, x, y, w, h| {
        s.add_gravity_block(x, y, w, h, GravityEffect::Toggle)
    }),
];

/// Live entity set of one level (insertion order = draw order)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    entities: Vec<Entity>,
    next_id: EntityId,
    player_id: Option<EntityId>,
    /// Tunables for players added without explicit parameters
    pub player_defaults: PlayerParams,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(1, PlayerParams::default())
    }
}

impl Scene {
    /// Empty scene whose ids start at `first_id`
    pub fn new(first_id: EntityId, player_defaults: PlayerParams) -> Self {
        Self {
            entities: Vec::new(),
            next_id: first_id,
            player_id: None,
            player_defaults,
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player_id
    }

    pub fn player_entity(&self) -> Option<&Entity> {
        self.player_id.and_then(|id| self.get(id))
    }

    pub fn player_entity_mut(&mut self) -> Option<&mut Entity> {
        let id = self.player_id?;
        self.get_mut(id)
    }

    pub fn player(&self) -> Option<&Player> {
        self.player_entity().and_then(Entity::player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.player_entity_mut().and_then(Entity::player_mut)
    }

    fn spawn(
        &mut self,
        pos: Vec2,
        size: Vec2,
        collision: CollisionKind,
        kind: EntityKind,
        appearance: Appearance,
    ) -> Result<EntityId, GameError> {
        let body = Body::new(pos, size.x, size.y, collision)?;
        let id = self.next_id;
        self.next_id += 1;
        log::debug!("Spawned {} {} at ({:.0}, {:.0})", kind.name(), id, pos.x, pos.y);
        self.entities.push(Entity {
            id,
            body,
            kind,
            appearance,
        });
        Ok(id)
    }

    /// Add the player with the scene's default tunables
    pub fn add_player(&mut self, x: f32, y: f32, w: f32, h: f32) -> Result<EntityId, GameError> {
        self.add_player_with(x, y, w, h, self.player_defaults)
    }

    pub fn add_player_with(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        params: PlayerParams,
    ) -> Result<EntityId, GameError> {
        let player = Player::new(params, Vec2::new(w, h));
        let id = self.spawn(
            Vec2::new(x, y),
            Vec2::new(w, h),
            CollisionKind::Trigger,
            EntityKind::Player(Box::new(player)),
            Appearance::color("GREEN"),
        )?;
        if let Some(previous) = self.player_id.replace(id) {
            log::warn!("Player {previous} replaced by {id}; only the newest is controlled");
        }
        Ok(id)
    }

    pub fn add_platform(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        surface: SurfaceInfo,
    ) -> Result<EntityId, GameError> {
        self.spawn(
            Vec2::new(x, y),
            Vec2::new(w, h),
            CollisionKind::Solid,
            EntityKind::Platform(surface),
            Appearance::color("BROWN"),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_moving_platform(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        axis: MovementAxis,
        speed: f32,
        max_distance: f32,
    ) -> Result<EntityId, GameError> {
        let anchor = Vec2::new(x, y);
        self.spawn(
            anchor,
            Vec2::new(w, h),
            CollisionKind::Solid,
            EntityKind::MovingPlatform(MovingPlatform {
                surface: SurfaceInfo::default(),
                patrol: Patrol::new(axis, anchor, speed, max_distance),
                last_delta: Vec2::ZERO,
            }),
            Appearance::color("BROWN"),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_enemy(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        axis: MovementAxis,
        speed: f32,
        max_distance: f32,
    ) -> Result<EntityId, GameError> {
        let anchor = Vec2::new(x, y);
        self.spawn(
            anchor,
            Vec2::new(w, h),
            CollisionKind::Solid,
            EntityKind::Enemy(Patrol::new(axis, anchor, speed, max_distance)),
            Appearance::color("RED"),
        )
    }

    pub fn add_star(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        worth: u32,
    ) -> Result<EntityId, GameError> {
        self.spawn(
            Vec2::new(x, y),
            Vec2::new(w, h),
            CollisionKind::Trigger,
            EntityKind::Star { worth },
            Appearance::color("YELLOW"),
        )
    }

    pub fn add_door(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        target: &str,
        enabled: bool,
    ) -> Result<EntityId, GameError> {
        self.spawn(
            Vec2::new(x, y),
            Vec2::new(w, h),
            CollisionKind::Trigger,
            EntityKind::Door {
                target: target.to_string(),
                enabled,
            },
            Appearance::color("BROWN").with_accent("YELLOW"),
        )
    }

    pub fn add_trampoline(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        bounce: f32,
    ) -> Result<EntityId, GameError> {
        self.spawn(
            Vec2::new(x, y),
            Vec2::new(w, h),
            CollisionKind::Solid,
            EntityKind::Trampoline(SurfaceInfo::new(bounce, 0.0)),
            Appearance::color("BLUE"),
        )
    }

    pub fn add_treadmill(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        belt_speed: f32,
    ) -> Result<EntityId, GameError> {
        self.spawn(
            Vec2::new(x, y),
            Vec2::new(w, h),
            CollisionKind::Solid,
            EntityKind::Treadmill {
                surface: SurfaceInfo::default(),
                belt_speed,
            },
            Appearance::color("GRAY"),
        )
    }

    pub fn add_size_changer(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        size: Vec2,
        revert_after: Option<f32>,
    ) -> Result<EntityId, GameError> {
        self.spawn(
            Vec2::new(x, y),
            Vec2::new(w, h),
            CollisionKind::Trigger,
            EntityKind::SizeChanger { size, revert_after },
            Appearance::color("PURPLE"),
        )
    }

    pub fn add_gravity_block(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        effect: GravityEffect,
    ) -> Result<EntityId, GameError> {
        let color = match effect {
            GravityEffect::Invert => "ORANGE",
            GravityEffect::Toggle => "CYAN",
        };
        self.spawn(
            Vec2::new(x, y),
            Vec2::new(w, h),
            CollisionKind::Trigger,
            EntityKind::GravityBlock(effect),
            Appearance::color(color),
        )
    }

    /// Spawn an entity by kind name with default tunables
    pub fn spawn_named(
        &mut self,
        kind: &str,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) -> Result<EntityId, GameError> {
        let wanted = kind.to_lowercase();
        match SPAWNERS.iter().find(|(name, _)| *name == wanted) {
            Some((_, spawner)) => spawner(self, x, y, w, h),
            None => {
                let err = GameError::UnknownKind {
                    category: "entity",
                    name: kind.to_string(),
                };
                log::error!("{err}");
                Err(err)
            }
        }
    }

    pub fn set_door_enabled(&mut self, id: EntityId, enabled: bool) -> Result<(), GameError> {
        let entity = self.get_mut(id).ok_or(GameError::UnknownEntity(id))?;
        match &mut entity.kind {
            EntityKind::Door { enabled: flag, .. } => {
                *flag = enabled;
                Ok(())
            }
            _ => Err(GameError::WrongEntityKind {
                id,
                expected: "door",
            }),
        }
    }

    pub fn set_door_target(&mut self, id: EntityId, target: &str) -> Result<(), GameError> {
        let entity = self.get_mut(id).ok_or(GameError::UnknownEntity(id))?;
        match &mut entity.kind {
            EntityKind::Door { target: dest, .. } => {
                *dest = target.to_string();
                Ok(())
            }
            _ => Err(GameError::WrongEntityKind {
                id,
                expected: "door",
            }),
        }
    }

    pub fn set_appearance(&mut self, id: EntityId, appearance: Appearance) -> Result<(), GameError> {
        let entity = self.get_mut(id).ok_or(GameError::UnknownEntity(id))?;
        entity.appearance = appearance;
        Ok(())
    }

    /// Remove an entity. Removing one that is not present is an error.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity, GameError> {
        let index = self
            .entities
            .iter()
            .position(|e| e.id == id)
            .ok_or(GameError::UnknownEntity(id))?;
        if self.player_id == Some(id) {
            self.player_id = None;
        }
        Ok(self.entities.remove(index))
    }
}

/// Platformer session: level registry, live scene, score and lives
pub struct Game {
    pub settings: Settings,
    levels: Vec<(String, LevelSetup)>,
    scene: Scene,
    collisions: CollisionMap,
    timers: Timers<TimedEffect>,
    level_state: LevelState,
    phase: GamePhase,
    current_level: Option<String>,

    /// Banked score
    pub score: u32,
    /// Earned in the current level, banked on completion
    pub score_earned_this_level: u32,
    pub lives: u32,
    /// +1 normal, -1 inverted; survives level loads
    gravity_multiplier: f32,
    /// Seconds since the current level loaded
    level_time: f32,
    /// Seconds since the session started
    total_time: f32,
    next_id: EntityId,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(settings: Settings) -> Self {
        let lives = settings.starting_lives;
        Self {
            settings,
            levels: Vec::new(),
            scene: Scene::default(),
            collisions: CollisionMap::new(),
            timers: Timers::new(),
            level_state: LevelState::Inactive,
            phase: GamePhase::Playing,
            current_level: None,
            score: 0,
            score_earned_this_level: 0,
            lives,
            gravity_multiplier: 1.0,
            level_time: 0.0,
            total_time: 0.0,
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Register (or replace) a level's setup procedure
    pub fn define_level<F>(&mut self, name: &str, setup: F)
    where
        F: Fn(&mut Scene) -> Result<(), GameError> + 'static,
    {
        let setup: LevelSetup = Box::new(setup);
        match self.levels.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = setup,
            None => self.levels.push((name.to_string(), setup)),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn level_state(&self) -> LevelState {
        self.level_state
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn current_level(&self) -> Option<&str> {
        self.current_level.as_deref()
    }

    pub fn gravity_multiplier(&self) -> f32 {
        self.gravity_multiplier
    }

    pub fn level_time(&self) -> f32 {
        self.level_time
    }

    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    pub fn collisions(&self) -> &CollisionMap {
        &self.collisions
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn player_defaults(&self) -> PlayerParams {
        PlayerParams {
            wall_jump: self.settings.wall_jump,
            double_jump: self.settings.double_jump,
            air_strafe: self.settings.air_strafe,
            ..Default::default()
        }
    }

    /// Replace the scene with a freshly built copy of `name`.
    ///
    /// On failure the previous level stays loaded and active.
    pub fn load_level(&mut self, name: &str) -> Result<(), GameError> {
        let Some((_, setup)) = self.levels.iter().find(|(n, _)| n == name) else {
            let err = GameError::UnknownLevel(name.to_string());
            log::error!("{err}; keeping current level");
            return Err(err);
        };

        let previous_state = self.level_state;
        self.level_state = LevelState::Inactive;
        let mut scene = Scene::new(self.next_id, self.player_defaults());
        if let Err(err) = setup(&mut scene) {
            log::error!("Setup of level '{name}' failed: {err}; keeping current level");
            self.level_state = previous_state;
            return Err(err);
        }

        self.next_id = scene.next_id;
        self.scene = scene;
        self.collisions.clear();
        self.timers.clear();
        self.score_earned_this_level = 0;
        self.level_time = 0.0;
        self.current_level = Some(name.to_string());
        self.phase = GamePhase::Playing;
        self.start_spawn_grace();
        self.level_state = LevelState::Active;

        log::info!("Loaded level '{}' ({} entities)", name, self.scene.len());
        self.events.push(GameEvent::LevelLoaded(name.to_string()));
        Ok(())
    }

    fn start_spawn_grace(&mut self) {
        let grace = self.settings.spawn_grace_secs;
        if grace <= 0.0 {
            return;
        }
        let Some(id) = self.scene.player_id() else {
            return;
        };
        if let Some(player) = self.scene.player_mut() {
            player.invulnerable = true;
            self.timers
                .schedule(self.level_time + grace, Some(id), TimedEffect::EndSpawnGrace);
        }
    }

    /// Load the current level again; unbanked score is discarded
    pub fn reload_level(&mut self) -> Result<(), GameError> {
        let name = self
            .current_level
            .clone()
            .ok_or_else(|| GameError::UnknownLevel(String::new()))?;
        self.load_level(&name)
    }

    /// Bank this level's score, then switch to `target`
    pub fn handle_level_complete(&mut self, target: &str) -> Result<(), GameError> {
        self.score += self.score_earned_this_level;
        self.score_earned_this_level = 0;
        let from = self.current_level.clone().unwrap_or_default();
        log::info!("Level '{from}' complete, score {}", self.score);
        self.events.push(GameEvent::LevelCompleted {
            from,
            to: target.to_string(),
        });
        self.load_level(target)
    }

    /// Lose a life (if lives are on) and reload, or end the session
    pub fn handle_level_fail(&mut self) {
        self.events.push(GameEvent::LevelFailed);
        if self.settings.lives_enabled {
            self.lives = self.lives.saturating_sub(1);
            log::info!("Life lost, {} remaining", self.lives);
            self.events.push(GameEvent::LifeLost {
                remaining: self.lives,
            });
            if self.lives == 0 {
                self.game_over();
                return;
            }
        }
        if let Err(err) = self.reload_level() {
            log::error!("Reload after failure did not happen: {err}");
        }
    }

    fn game_over(&mut self) {
        log::info!("Game over with score {}", self.score);
        self.phase = GamePhase::GameOver;
        self.scene = Scene::new(self.next_id, self.player_defaults());
        self.collisions.clear();
        self.timers.clear();
        self.score_earned_this_level = 0;
        self.events.push(GameEvent::GameOver);
    }

    /// New session: restore lives and score, load the first defined level
    pub fn restart(&mut self) -> Result<(), GameError> {
        let first = self
            .levels
            .first()
            .map(|(name, _)| name.clone())
            .ok_or_else(|| GameError::UnknownLevel(String::new()))?;
        self.lives = self.settings.starting_lives;
        self.score = 0;
        self.gravity_multiplier = 1.0;
        self.total_time = 0.0;
        self.load_level(&first)
    }

    /// Reload key: restart after game over, reload otherwise
    pub fn reload_or_restart(&mut self) -> Result<(), GameError> {
        match self.phase {
            GamePhase::GameOver => self.restart(),
            GamePhase::Playing => self.reload_level(),
        }
    }

    pub fn press(&mut self, control: Control) {
        if self.phase != GamePhase::Playing || self.scene.is_empty() {
            return;
        }
        if let Some(player) = self.scene.player_mut() {
            player.press(control);
        }
    }

    pub fn release(&mut self, control: Control) {
        if let Some(player) = self.scene.player_mut() {
            player.release(control);
        }
    }

    /// Advance one fixed frame
    pub fn tick(&mut self) {
        if self.level_state != LevelState::Active || self.phase != GamePhase::Playing {
            return;
        }

        let mut effects = Vec::new();
        self.update_entities(&mut effects);
        self.dispatch_collisions(&mut effects);

        if let Some(level_change) = self.apply_effects(effects) {
            match level_change {
                Effect::CompleteLevel(target) => {
                    if let Err(err) = self.handle_level_complete(&target) {
                        log::error!("Door led nowhere: {err}");
                    }
                }
                Effect::FailLevel => self.handle_level_fail(),
                _ => {}
            }
            return;
        }

        let dt = self.settings.frame_secs();
        self.level_time += dt;
        self.total_time += dt;
        for timer in self.timers.drain_due(self.level_time) {
            self.fire_timer(timer);
        }
    }

    /// Scripted motion for every entity, then the player's own integrator
    fn update_entities(&mut self, effects: &mut Vec<Effect>) {
        let fps = self.settings.fps;
        let player_pos = self.scene.player_entity().map(|e| e.body.pos);
        let ctx = StepContext {
            gravity_multiplier: self.gravity_multiplier,
            fps,
            air_resistance: self.settings.air_resistance,
            canvas_height: self.settings.canvas_height,
        };

        for i in 0..self.scene.entities.len() {
            if !self.scene.entities[i].is_player() {
                self.scene.entities[i].update_motion(player_pos, fps);
                continue;
            }

            let me = self.scene.entities[i].id;
            let solids: Vec<(Body, SurfaceInfo)> = self
                .scene
                .entities
                .iter()
                .filter(|e| e.id != me && e.body.kind == CollisionKind::Solid)
                .filter_map(|e| e.surface_info().map(|s| (e.body, s)))
                .collect();

            let Entity { body, kind, .. } = &mut self.scene.entities[i];
            if let EntityKind::Player(player) = kind {
                player.scan_contacts(body, solids.iter().map(|(b, s)| (b, *s)));
                if player.integrate(body, &ctx) == StepOutcome::OutOfBounds {
                    log::info!("Player {me} fell out of the level");
                    effects.push(Effect::FailLevel);
                }
            }
        }
    }

    /// Advance the overlap relation; one `(me, other, phase)` per side of
    /// every contact edge, pair by pair
    fn contact_edges(&mut self) -> Vec<(EntityId, EntityId, ContactPhase)> {
        let pairs = overlapping_pairs(&self.scene.entities);
        let mut edges = Vec::new();
        for contact in self.collisions.update(pairs) {
            log::trace!(
                "{:?} {} <-> {}",
                contact.phase,
                contact.pair.first(),
                contact.pair.second()
            );
            for me in [contact.pair.first(), contact.pair.second()] {
                if let Some(other) = contact.pair.partner(me) {
                    edges.push((me, other, contact.phase));
                }
            }
        }
        edges
    }

    fn dispatch_collisions(&mut self, effects: &mut Vec<Effect>) {
        for (me, other, phase) in self.contact_edges() {
            let (Some(me), Some(other)) = (self.scene.get(me), self.scene.get(other)) else {
                continue;
            };
            if let Err(err) = me.react(other, phase, effects) {
                log::error!("{} {} reaction skipped: {err}", me.kind.name(), me.id);
            }
        }
    }

    /// Apply in-level effects in order and return the first level change
    fn apply_effects(&mut self, effects: Vec<Effect>) -> Option<Effect> {
        let mut level_change = None;
        let mut destroyed = Vec::new();
        for effect in effects {
            match effect {
                Effect::CompleteLevel(_) | Effect::FailLevel => {
                    if level_change.is_none() {
                        level_change = Some(effect);
                    }
                }
                Effect::AwardScore(worth) => {
                    self.score_earned_this_level += worth;
                    self.events.push(GameEvent::ScoreAwarded(worth));
                }
                Effect::Destroy(id) => {
                    if destroyed.contains(&id) {
                        continue;
                    }
                    match self.scene.remove(id) {
                        Ok(_) => {
                            self.collisions.forget(id);
                            destroyed.push(id);
                            self.events.push(GameEvent::EntityDestroyed(id));
                        }
                        Err(err) => log::error!("Destroy failed: {err}"),
                    }
                }
                Effect::InvertGravity => {
                    self.gravity_multiplier = if self.gravity_multiplier < 0.0 { 1.0 } else { -1.0 };
                    log::info!("Gravity multiplier now {}", self.gravity_multiplier);
                    self.events.push(GameEvent::GravityInverted {
                        multiplier: self.gravity_multiplier,
                    });
                }
                Effect::TogglePlayerGravity => {
                    if let Some(player) = self.scene.player_mut() {
                        player.gravity_enabled = !player.gravity_enabled;
                    }
                }
                Effect::ResizePlayer { size, revert_after } => {
                    if let Err(err) = self.resize_player(size) {
                        log::error!("Resize skipped: {err}");
                        continue;
                    }
                    if let (Some(secs), Some(id)) = (revert_after, self.scene.player_id()) {
                        self.timers
                            .schedule(self.level_time + secs, Some(id), TimedEffect::RestoreSize);
                    }
                }
            }
        }
        level_change
    }

    /// Resize keeping the foot (the side gravity pulls toward) in place
    fn resize_player(&mut self, size: Vec2) -> Result<(), GameError> {
        let inverted = self.gravity_multiplier < 0.0;
        let entity = self
            .scene
            .player_entity_mut()
            .ok_or(GameError::UnknownEntity(0))?;
        let foot = if inverted {
            entity.body.top()
        } else {
            entity.body.bottom()
        };
        entity.body.resize(size.x, size.y)?;
        entity.body.pos.y = if inverted {
            foot + size.y / 2.0
        } else {
            foot - size.y / 2.0
        };
        Ok(())
    }

    fn fire_timer(&mut self, timer: Timer<TimedEffect>) {
        let alive = timer.owner.is_none_or(|id| self.scene.get(id).is_some());
        if !alive {
            log::debug!("{:?} dropped: owner gone", timer.effect);
            return;
        }
        match timer.effect {
            TimedEffect::EndSpawnGrace => {
                if let Some(player) = self.scene.player_mut() {
                    player.invulnerable = false;
                }
            }
            TimedEffect::RestoreSize => {
                let Some(size) = self.scene.player().map(|p| p.base_size) else {
                    return;
                };
                if let Err(err) = self.resize_player(size) {
                    log::error!("Size restore skipped: {err}");
                }
            }
        }
    }
}
