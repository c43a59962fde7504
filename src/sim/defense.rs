//! Tower-defense wave/targeting loop
//!
//! Runs on wall-clock deltas rather than fixed frames. Enemies walk a
//! polyline path, towers pick the first enemy in range and fire on a
//! cooldown, leaked enemies cost lives.

use std::collections::HashMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Body, CollisionKind};
use super::entity::EntityId;
use super::timer::{Timer, Timers};
use crate::error::GameError;
use crate::settings::Settings;
use crate::{direction, distance};

/// Global game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefensePhase {
    Playing,
    Paused,
    GameOver,
    Victory,
}

/// Progress of the current wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveState {
    /// Not started yet (before the first wave)
    Pending,
    /// Scheduled spawns remain
    Spawning,
    /// Everything spawned, enemies still walking
    Draining,
    /// Wave cleared, next wave is on its delay timer
    Complete,
}

/// How an enemy picks its next waypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyMotion {
    Forward,
    /// Backtracks one waypoint with probability `ERRATIC_BACKTRACK`
    Erratic,
    /// Walks back one waypoint once, at the middle of the path
    Reverser { reversed: bool },
}

const ERRATIC_BACKTRACK: f64 = 0.25;

/// Per-kind enemy stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Pixels per second
    pub speed: f32,
    pub max_health: u32,
    /// Money awarded on death
    pub reward: u32,
    /// Lives lost on a leak at full health
    pub damage: u32,
    /// Radius at full health
    pub radius: f32,
}

/// An active enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: String,
    pub body: Body,
    pub stats: EnemyStats,
    pub health: u32,
    /// Index of the waypoint being walked toward
    pub target_index: usize,
    pub motion: EnemyMotion,
}

impl Enemy {
    pub fn new(
        id: EntityId,
        kind: &str,
        pos: Vec2,
        stats: EnemyStats,
        motion: EnemyMotion,
    ) -> Result<Self, GameError> {
        let diameter = stats.radius * 2.0;
        Ok(Self {
            id,
            kind: kind.to_string(),
            body: Body::new(pos, diameter, diameter, CollisionKind::Trigger)?,
            stats,
            health: stats.max_health,
            target_index: 1,
            motion,
        })
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    fn health_fraction(&self) -> f32 {
        self.health as f32 / self.stats.max_health.max(1) as f32
    }

    /// Render and hit radius, shrinking with health
    pub fn radius(&self) -> f32 {
        self.stats.radius * self.health_fraction()
    }

    /// Lives taken if this enemy leaks now
    pub fn contact_damage(&self) -> u32 {
        (self.stats.damage as f32 * self.health_fraction()).ceil() as u32
    }

    fn refresh_size(&mut self) -> Result<(), GameError> {
        let diameter = self.radius() * 2.0;
        self.body.resize(diameter, diameter)
    }
}

/// Ranged-tower payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpec {
    /// Pixels per second
    pub speed: f32,
    pub size: f32,
    /// Seconds before self-destruct
    pub lifetime: f32,
}

/// A placed tower
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub id: EntityId,
    pub kind: String,
    pub pos: Vec2,
    pub cost: u32,
    pub range: f32,
    pub damage: u32,
    /// Seconds between shots
    pub cooldown: f32,
    /// Counts down by elapsed time; fires at or below zero
    pub cooldown_timer: f32,
    pub target: Option<EntityId>,
    /// `None` = instant hit
    pub projectile: Option<ProjectileSpec>,
}

impl Tower {
    pub fn in_range(&self, enemy: &Enemy) -> bool {
        distance(self.pos, enemy.pos()) <= self.range + enemy.radius()
    }
}

/// A straight-flying shot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub body: Body,
    /// Pixels per second
    pub vel: Vec2,
    pub damage: u32,
}

/// One scheduled spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub kind: String,
    /// Seconds after the wave starts
    pub offset: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub spawns: Vec<SpawnEntry>,
}

/// Observable outcomes of a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefenseEvent {
    WaveStarted(usize),
    Spawned { id: EntityId, kind: String },
    Leaked { id: EntityId, damage: u32 },
    Killed { id: EntityId, reward: u32 },
    Fired { tower: EntityId, target: EntityId },
    WaveComplete(usize),
    GameOver,
    Victory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum DefenseTimer {
    NextWave,
    ExpireProjectile,
}

pub type EnemyCtor = fn(EntityId, Vec2) -> Result<Enemy, GameError>;
pub type TowerCtor = fn(EntityId, Vec2) -> Tower;

fn basic_enemy(id: EntityId, pos: Vec2) -> Result<Enemy, GameError> {
    let stats = EnemyStats {
        speed: 60.0,
        max_health: 3,
        reward: 10,
        damage: 1,
        radius: 12.0,
    };
    Enemy::new(id, "basic", pos, stats, EnemyMotion::Forward)
}

fn fast_enemy(id: EntityId, pos: Vec2) -> Result<Enemy, GameError> {
    let stats = EnemyStats {
        speed: 120.0,
        max_health: 1,
        reward: 8,
        damage: 1,
        radius: 8.0,
    };
    Enemy::new(id, "fast", pos, stats, EnemyMotion::Forward)
}

fn tank_enemy(id: EntityId, pos: Vec2) -> Result<Enemy, GameError> {
    let stats = EnemyStats {
        speed: 30.0,
        max_health: 10,
        reward: 30,
        damage: 3,
        radius: 18.0,
    };
    Enemy::new(id, "tank", pos, stats, EnemyMotion::Forward)
}

fn erratic_enemy(id: EntityId, pos: Vec2) -> Result<Enemy, GameError> {
    let stats = EnemyStats {
        speed: 70.0,
        max_health: 2,
        reward: 15,
        damage: 1,
        radius: 10.0,
    };
    Enemy::new(id, "erratic", pos, stats, EnemyMotion::Erratic)
}

fn reverser_enemy(id: EntityId, pos: Vec2) -> Result<Enemy, GameError> {
    let stats = EnemyStats {
        speed: 50.0,
        max_health: 4,
        reward: 20,
        damage: 2,
        radius: 14.0,
    };
    Enemy::new(id, "reverser", pos, stats, EnemyMotion::Reverser { reversed: false })
}

fn basic_tower(id: EntityId, pos: Vec2) -> Tower {
    Tower {
        id,
        kind: "basic".into(),
        pos,
        cost: 50,
        range: 100.0,
        damage: 1,
        cooldown: 0.5,
        cooldown_timer: 0.0,
        target: None,
        projectile: None,
    }
}

fn sniper_tower(id: EntityId, pos: Vec2) -> Tower {
    Tower {
        kind: "sniper".into(),
        cost: 100,
        range: 250.0,
        damage: 4,
        cooldown: 2.0,
        ..basic_tower(id, pos)
    }
}

fn rapid_tower(id: EntityId, pos: Vec2) -> Tower {
    Tower {
        kind: "rapid".into(),
        cost: 70,
        range: 70.0,
        damage: 1,
        cooldown: 0.15,
        ..basic_tower(id, pos)
    }
}

fn cannon_tower(id: EntityId, pos: Vec2) -> Tower {
    Tower {
        kind: "cannon".into(),
        cost: 120,
        range: 150.0,
        damage: 3,
        cooldown: 1.2,
        projectile: Some(ProjectileSpec {
            speed: 300.0,
            size: 8.0,
            lifetime: 1.5,
        }),
        ..basic_tower(id, pos)
    }
}

/// Tower-defense session
pub struct TowerDefense {
    path: Vec<Vec2>,
    waves: Vec<Wave>,
    wave_index: usize,
    wave_state: WaveState,
    /// Seconds since the current wave started
    wave_time: f32,
    pending: Vec<SpawnEntry>,

    enemies: Vec<Enemy>,
    towers: Vec<Tower>,
    projectiles: Vec<Projectile>,
    timers: Timers<DefenseTimer>,
    /// Seconds of unpaused play
    clock: f32,
    wave_delay: f32,

    phase: DefensePhase,
    pub money: u32,
    pub lives: u32,

    rng: Pcg32,
    next_id: EntityId,
    enemy_kinds: HashMap<String, EnemyCtor>,
    tower_kinds: HashMap<String, TowerCtor>,
    events: Vec<DefenseEvent>,
}

impl TowerDefense {
    /// New session on `path` (at least two waypoints)
    pub fn new(path: Vec<Vec2>, settings: &Settings, seed: u64) -> Result<Self, GameError> {
        if path.len() < 2 {
            return Err(GameError::InvalidPath {
                waypoints: path.len(),
            });
        }

        let mut enemy_kinds: HashMap<String, EnemyCtor> = HashMap::new();
        enemy_kinds.insert("basic".into(), basic_enemy);
        enemy_kinds.insert("fast".into(), fast_enemy);
        enemy_kinds.insert("tank".into(), tank_enemy);
        enemy_kinds.insert("erratic".into(), erratic_enemy);
        enemy_kinds.insert("reverser".into(), reverser_enemy);

        let mut tower_kinds: HashMap<String, TowerCtor> = HashMap::new();
        tower_kinds.insert("basic".into(), basic_tower);
        tower_kinds.insert("sniper".into(), sniper_tower);
        tower_kinds.insert("rapid".into(), rapid_tower);
        tower_kinds.insert("cannon".into(), cannon_tower);

        Ok(Self {
            path,
            waves: Vec::new(),
            wave_index: 0,
            wave_state: WaveState::Pending,
            wave_time: 0.0,
            pending: Vec::new(),
            enemies: Vec::new(),
            towers: Vec::new(),
            projectiles: Vec::new(),
            timers: Timers::new(),
            clock: 0.0,
            wave_delay: settings.wave_delay_secs,
            phase: DefensePhase::Playing,
            money: settings.starting_money,
            lives: settings.starting_lives,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            enemy_kinds,
            tower_kinds,
            events: Vec::new(),
        })
    }

    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn register_enemy(&mut self, name: &str, ctor: EnemyCtor) {
        self.enemy_kinds.insert(name.to_lowercase(), ctor);
    }

    pub fn register_tower(&mut self, name: &str, ctor: TowerCtor) {
        self.tower_kinds.insert(name.to_lowercase(), ctor);
    }

    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn phase(&self) -> DefensePhase {
        self.phase
    }

    pub fn wave_state(&self) -> WaveState {
        self.wave_state
    }

    pub fn wave_index(&self) -> usize {
        self.wave_index
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    pub fn drain_events(&mut self) -> Vec<DefenseEvent> {
        std::mem::take(&mut self.events)
    }

    /// Open a new (empty) wave for authoring and return its index
    pub fn add_wave(&mut self) -> usize {
        self.waves.push(Wave::default());
        self.waves.len() - 1
    }

    /// Schedule `kind` at `offset` seconds into the last authored wave
    pub fn add_enemy_to_wave(&mut self, kind: &str, offset: f32) -> Result<(), GameError> {
        let kind = kind.to_lowercase();
        if !self.enemy_kinds.contains_key(&kind) {
            let err = GameError::UnknownKind {
                category: "enemy",
                name: kind,
            };
            log::error!("{err}");
            return Err(err);
        }
        if self.waves.is_empty() {
            self.add_wave();
        }
        if let Some(wave) = self.waves.last_mut() {
            wave.spawns.push(SpawnEntry { kind, offset });
        }
        Ok(())
    }

    /// Spend money on a tower at `pos`
    pub fn place_tower(&mut self, kind: &str, pos: Vec2) -> Result<EntityId, GameError> {
        let Some(ctor) = self.tower_kinds.get(&kind.to_lowercase()).copied() else {
            let err = GameError::UnknownKind {
                category: "tower",
                name: kind.to_string(),
            };
            log::error!("{err}");
            return Err(err);
        };
        let mut tower = ctor(0, pos);
        if tower.cost > self.money {
            return Err(GameError::InsufficientFunds {
                cost: tower.cost,
                available: self.money,
            });
        }
        self.money -= tower.cost;
        tower.id = self.next_entity_id();
        log::info!("Placed {} tower {} ({} money left)", tower.kind, tower.id, self.money);
        let id = tower.id;
        self.towers.push(tower);
        Ok(id)
    }

    /// Begin the first wave
    pub fn start(&mut self) {
        if self.waves.is_empty() {
            log::warn!("No waves defined; nothing to defend against");
            self.win();
            return;
        }
        self.wave_index = 0;
        self.start_wave();
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            DefensePhase::Playing => DefensePhase::Paused,
            DefensePhase::Paused => DefensePhase::Playing,
            other => other,
        };
    }

    fn start_wave(&mut self) {
        self.pending = self.waves[self.wave_index].spawns.clone();
        self.wave_time = 0.0;
        self.wave_state = WaveState::Spawning;
        log::info!(
            "Wave {} started ({} enemies)",
            self.wave_index + 1,
            self.pending.len()
        );
        self.events.push(DefenseEvent::WaveStarted(self.wave_index));
    }

    /// Advance to the next wave, or win if none remain
    pub fn go_to_next_wave(&mut self) {
        if self.wave_index + 1 >= self.waves.len() {
            self.win();
            return;
        }
        self.wave_index += 1;
        self.start_wave();
    }

    fn win(&mut self) {
        log::info!("Victory with {} lives left", self.lives);
        self.phase = DefensePhase::Victory;
        self.events.push(DefenseEvent::Victory);
    }

    /// Advance by `dt` seconds of wall-clock time
    pub fn tick(&mut self, dt: f32) {
        if self.phase != DefensePhase::Playing {
            return;
        }
        self.clock += dt;

        if matches!(self.wave_state, WaveState::Spawning | WaveState::Draining) {
            self.wave_time += dt;
            self.spawn_due();
        }

        self.move_enemies(dt);
        if self.phase != DefensePhase::Playing {
            return;
        }

        self.update_towers(dt);
        self.move_projectiles(dt);

        for timer in self.timers.drain_due(self.clock) {
            self.fire_timer(timer);
        }

        self.check_wave_complete();
    }

    fn spawn_due(&mut self) {
        let wave_time = self.wave_time;
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|s| s.offset <= wave_time);
        self.pending = pending;

        for spawn in due {
            let Some(ctor) = self.enemy_kinds.get(&spawn.kind).copied() else {
                log::error!("Enemy kind '{}' vanished from the registry", spawn.kind);
                continue;
            };
            let id = self.next_entity_id();
            match ctor(id, self.path[0]) {
                Ok(enemy) => {
                    log::debug!("Spawned {} enemy {}", spawn.kind, id);
                    self.enemies.push(enemy);
                    self.events.push(DefenseEvent::Spawned {
                        id,
                        kind: spawn.kind,
                    });
                }
                Err(err) => log::error!("Could not spawn {}: {err}", spawn.kind),
            }
        }
        if self.pending.is_empty() && self.wave_state == WaveState::Spawning {
            self.wave_state = WaveState::Draining;
        }
    }

    fn move_enemies(&mut self, dt: f32) {
        let last = self.path.len() - 1;
        let mut leaked = Vec::new();

        for enemy in &mut self.enemies {
            let step = enemy.stats.speed * dt;
            let target = self.path[enemy.target_index];
            if distance(enemy.pos(), target) > step {
                enemy.body.pos += direction(enemy.pos(), target) * step;
                continue;
            }

            enemy.body.pos = target;
            if enemy.target_index == last {
                leaked.push(enemy.id);
                continue;
            }
            enemy.target_index = next_waypoint(enemy, last, &mut self.rng);
        }

        for id in leaked {
            let Some(index) = self.enemies.iter().position(|e| e.id == id) else {
                continue;
            };
            let enemy = self.enemies.remove(index);
            self.release_target(id);
            let damage = enemy.contact_damage();
            self.lives = self.lives.saturating_sub(damage);
            log::info!("Enemy {id} leaked, -{damage} lives ({} left)", self.lives);
            self.events.push(DefenseEvent::Leaked { id, damage });

            if self.lives == 0 {
                log::info!("Game over on wave {}", self.wave_index + 1);
                self.phase = DefensePhase::GameOver;
                self.events.push(DefenseEvent::GameOver);
                return;
            }
        }
    }

    fn update_towers(&mut self, dt: f32) {
        for i in 0..self.towers.len() {
            self.towers[i].cooldown_timer -= dt;

            let tower = &self.towers[i];
            let keep = tower.target.filter(|id| {
                self.enemies
                    .iter()
                    .find(|e| e.id == *id)
                    .is_some_and(|e| tower.in_range(e))
            });
            let target = keep.or_else(|| {
                self.enemies
                    .iter()
                    .find(|e| tower.in_range(e))
                    .map(|e| e.id)
            });
            self.towers[i].target = target;

            let Some(target) = target else {
                continue;
            };
            if self.towers[i].cooldown_timer > 0.0 {
                continue;
            }

            let tower = &mut self.towers[i];
            tower.cooldown_timer = tower.cooldown;
            let (tower_id, from, damage, projectile) =
                (tower.id, tower.pos, tower.damage, tower.projectile);
            self.events.push(DefenseEvent::Fired {
                tower: tower_id,
                target,
            });
            match projectile {
                None => self.damage_enemy(target, damage),
                Some(spec) => {
                    let aim = self
                        .enemies
                        .iter()
                        .find(|e| e.id == target)
                        .map(|e| e.pos())
                        .unwrap_or(from);
                    self.spawn_projectile(from, aim, spec, damage);
                }
            }
        }
    }

    fn spawn_projectile(&mut self, from: Vec2, aim: Vec2, spec: ProjectileSpec, damage: u32) {
        let body = match Body::new(from, spec.size, spec.size, CollisionKind::Trigger) {
            Ok(body) => body,
            Err(err) => {
                log::error!("Projectile not spawned: {err}");
                return;
            }
        };
        let id = self.next_entity_id();
        self.projectiles.push(Projectile {
            id,
            body,
            vel: direction(from, aim) * spec.speed,
            damage,
        });
        self.timers.schedule(
            self.clock + spec.lifetime,
            Some(id),
            DefenseTimer::ExpireProjectile,
        );
    }

    fn move_projectiles(&mut self, dt: f32) {
        let mut hits = Vec::new();
        for projectile in &mut self.projectiles {
            projectile.body.pos += projectile.vel * dt;
            let hit = self.enemies.iter().find(|e| {
                projectile
                    .body
                    .overlaps_padded(&e.body, e.body.hit_padding())
            });
            if let Some(enemy) = hit {
                hits.push((projectile.id, enemy.id, projectile.damage));
            }
        }
        for (projectile, enemy, damage) in hits {
            self.projectiles.retain(|p| p.id != projectile);
            self.timers.cancel_owner(projectile);
            self.damage_enemy(enemy, damage);
        }
    }

    /// Apply damage; death is resolved immediately
    pub fn damage_enemy(&mut self, id: EntityId, damage: u32) {
        let Some(index) = self.enemies.iter().position(|e| e.id == id) else {
            return;
        };
        let enemy = &mut self.enemies[index];
        enemy.health = enemy.health.saturating_sub(damage);
        if enemy.health > 0 {
            if let Err(err) = enemy.refresh_size() {
                log::error!("Enemy {id} resize skipped: {err}");
            }
            return;
        }

        let enemy = self.enemies.remove(index);
        self.money += enemy.stats.reward;
        self.release_target(id);
        log::debug!("Enemy {id} killed, +{} money", enemy.stats.reward);
        self.events.push(DefenseEvent::Killed {
            id,
            reward: enemy.stats.reward,
        });
    }

    fn release_target(&mut self, id: EntityId) {
        for tower in &mut self.towers {
            if tower.target == Some(id) {
                tower.target = None;
            }
        }
    }

    fn fire_timer(&mut self, timer: Timer<DefenseTimer>) {
        match timer.effect {
            DefenseTimer::NextWave => self.go_to_next_wave(),
            DefenseTimer::ExpireProjectile => {
                let Some(id) = timer.owner else {
                    return;
                };
                let before = self.projectiles.len();
                self.projectiles.retain(|p| p.id != id);
                if self.projectiles.len() == before {
                    log::trace!("Projectile {id} already gone");
                }
            }
        }
    }

    fn check_wave_complete(&mut self) {
        if !matches!(self.wave_state, WaveState::Spawning | WaveState::Draining) {
            return;
        }
        if !self.pending.is_empty() || !self.enemies.is_empty() {
            return;
        }
        self.wave_state = WaveState::Complete;
        log::info!("Wave {} complete", self.wave_index + 1);
        self.events.push(DefenseEvent::WaveComplete(self.wave_index));
        self.timers
            .schedule(self.clock + self.wave_delay, None, DefenseTimer::NextWave);
    }
}

/// Waypoint index to walk toward after reaching the current one
fn next_waypoint(enemy: &mut Enemy, last: usize, rng: &mut Pcg32) -> usize {
    let reached = enemy.target_index;
    match &mut enemy.motion {
        EnemyMotion::Forward => reached + 1,
        EnemyMotion::Erratic => {
            if reached >= 1 && rng.random_bool(ERRATIC_BACKTRACK) {
                reached - 1
            } else {
                reached + 1
            }
        }
        EnemyMotion::Reverser { reversed } => {
            let middle = last / 2;
            if !*reversed && reached == middle && reached >= 1 {
                *reversed = true;
                reached - 1
            } else {
                reached + 1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(lives: u32) -> Settings {
        Settings {
            starting_lives: lives,
            starting_money: 200,
            wave_delay_secs: 1.0,
            ..Settings::default()
        }
    }

    fn straight_path() -> Vec<Vec2> {
        vec![Vec2::new(0.0, 100.0), Vec2::new(400.0, 100.0)]
    }

    fn weak_enemy(id: EntityId, pos: Vec2) -> Result<Enemy, GameError> {
        let stats = EnemyStats {
            speed: 10.0,
            max_health: 1,
            reward: 25,
            damage: 1,
            radius: 10.0,
        };
        Enemy::new(id, "weak", pos, stats, EnemyMotion::Forward)
    }

    #[test]
    fn test_rejects_short_path() {
        let result = TowerDefense::new(vec![Vec2::ZERO], &settings(3), 1);
        assert!(matches!(result, Err(GameError::InvalidPath { waypoints: 1 })));
    }

    #[test]
    fn test_one_shot_kill_resolves_same_tick() {
        let mut td = TowerDefense::new(straight_path(), &settings(3), 1).unwrap();
        td.register_enemy("weak", weak_enemy);
        td.add_enemy_to_wave("weak", 0.0).unwrap();
        td.place_tower("basic", Vec2::new(0.0, 150.0)).unwrap();
        assert_eq!(td.money, 150);
        td.start();

        td.tick(0.1);

        assert!(td.enemies().is_empty());
        assert_eq!(td.money, 175);
        assert_eq!(td.towers()[0].target, None);
        let events = td.drain_events();
        assert!(events.iter().any(|e| matches!(e, DefenseEvent::Killed { reward: 25, .. })));
        assert!(!events.iter().any(|e| matches!(e, DefenseEvent::Leaked { .. })));
    }

    #[test]
    fn test_wave_drains_before_next_wave() {
        let path = vec![Vec2::ZERO, Vec2::new(100.0, 0.0)];
        let mut td = TowerDefense::new(path, &settings(10), 1).unwrap();
        for offset in [0.0, 0.5, 1.0] {
            td.add_enemy_to_wave("basic", offset).unwrap();
        }
        td.start();

        let mut log = Vec::new();
        for _ in 0..100 {
            td.tick(0.1);
            log.extend(td.drain_events());
        }

        let leaks: Vec<_> = log
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, DefenseEvent::Leaked { .. }))
            .map(|(i, _)| i)
            .collect();
        let complete = log
            .iter()
            .position(|e| *e == DefenseEvent::WaveComplete(0))
            .unwrap();
        let victory = log.iter().position(|e| *e == DefenseEvent::Victory).unwrap();

        assert_eq!(leaks.len(), 3);
        assert!(leaks.iter().all(|&i| i < complete));
        assert!(complete < victory);
        assert_eq!(td.lives, 7);
        assert_eq!(td.phase(), DefensePhase::Victory);
    }

    #[test]
    fn test_second_wave_starts_after_delay() {
        let path = vec![Vec2::ZERO, Vec2::new(30.0, 0.0)];
        let mut td = TowerDefense::new(path, &settings(10), 1).unwrap();
        td.add_enemy_to_wave("fast", 0.0).unwrap();
        td.add_wave();
        td.add_enemy_to_wave("fast", 0.0).unwrap();
        td.start();

        // 30px at 120px/s: leaks on the third tick, wave 1 done
        for _ in 0..3 {
            td.tick(0.1);
        }
        assert_eq!(td.wave_state(), WaveState::Complete);
        assert_eq!(td.wave_index(), 0);

        for _ in 0..11 {
            td.tick(0.1);
        }
        assert_eq!(td.wave_index(), 1);
        assert!(td.drain_events().contains(&DefenseEvent::WaveStarted(1)));
    }

    #[test]
    fn test_leaks_end_the_game() {
        let path = vec![Vec2::ZERO, Vec2::new(30.0, 0.0)];
        let mut td = TowerDefense::new(path, &settings(2), 1).unwrap();
        for _ in 0..3 {
            td.add_enemy_to_wave("tank", 0.0).unwrap();
        }
        td.start();
        for _ in 0..20 {
            td.tick(0.1);
        }
        // A full-health tank deals 3 damage; the first leak ends it
        assert_eq!(td.phase(), DefensePhase::GameOver);
        assert_eq!(td.lives, 0);
        assert_eq!(td.enemies().len(), 2);
    }

    #[test]
    fn test_damage_shrinks_enemy() {
        let mut td = TowerDefense::new(straight_path(), &settings(3), 1).unwrap();
        td.add_enemy_to_wave("tank", 0.0).unwrap();
        td.start();
        td.tick(0.01);
        let id = td.enemies()[0].id;

        td.damage_enemy(id, 5);
        let enemy = &td.enemies()[0];
        assert_eq!(enemy.health, 5);
        assert!((enemy.radius() - 9.0).abs() < 1e-5);
        assert_eq!(enemy.contact_damage(), 2); // ceil(3 * 0.5)
        assert!((enemy.body.width() - 18.0).abs() < 1e-4);
    }

    #[test]
    fn test_tower_releases_target_leaving_range() {
        let mut td = TowerDefense::new(straight_path(), &settings(3), 1).unwrap();
        td.add_enemy_to_wave("tank", 0.0).unwrap();
        td.place_tower("basic", Vec2::new(0.0, 160.0)).unwrap();
        td.start();

        td.tick(0.1);
        let id = td.enemies()[0].id;
        assert_eq!(td.towers()[0].target, Some(id));

        for _ in 0..40 {
            td.tick(0.1);
        }
        let enemy = &td.enemies()[0];
        assert!(enemy.health > 0 && enemy.health < 10);
        assert_eq!(td.towers()[0].target, None);
    }

    #[test]
    fn test_projectile_expires_and_late_timer_is_harmless() {
        let mut td = TowerDefense::new(straight_path(), &settings(3), 1).unwrap();
        let spec = ProjectileSpec {
            speed: 100.0,
            size: 4.0,
            lifetime: 0.5,
        };
        td.spawn_projectile(Vec2::ZERO, Vec2::new(0.0, -1.0), spec, 1);
        assert_eq!(td.projectiles().len(), 1);
        for _ in 0..4 {
            td.tick(0.1);
        }
        assert_eq!(td.projectiles().len(), 1);
        assert!(td.projectiles()[0].body.pos.y < -30.0);
        for _ in 0..2 {
            td.tick(0.1);
        }
        assert!(td.projectiles().is_empty());

        // Projectile consumed by a hit before its timer fires
        td.register_enemy("weak", weak_enemy);
        td.add_enemy_to_wave("weak", 0.0).unwrap();
        td.start();
        td.tick(0.01);
        let target = td.enemies()[0].pos();
        td.spawn_projectile(target - Vec2::new(0.0, 20.0), target, spec, 1);
        td.tick(0.1);
        assert!(td.projectiles().is_empty());
        assert!(td.enemies().is_empty());
        // The hit cancelled its expiry timer; only the next-wave delay is left
        let left = td.timers.drain_due(f32::INFINITY);
        assert!(!left.iter().any(|t| t.effect == DefenseTimer::ExpireProjectile));
        assert!(left.iter().all(|t| t.owner.is_none()));
    }

    #[test]
    fn test_registered_tower_kind() {
        fn laser_tower(id: EntityId, pos: Vec2) -> Tower {
            Tower {
                kind: "laser".into(),
                cost: 10,
                range: 500.0,
                damage: 5,
                ..basic_tower(id, pos)
            }
        }

        let mut td = TowerDefense::new(straight_path(), &settings(3), 1).unwrap();
        td.register_tower("laser", laser_tower);
        let id = td.place_tower("Laser", Vec2::new(200.0, 400.0)).unwrap();
        assert_eq!(td.money, 190);
        assert_eq!(td.towers()[0].id, id);
        assert_eq!(td.towers()[0].kind, "laser");

        // Far outside a basic tower's reach but within the laser's
        td.add_enemy_to_wave("tank", 0.0).unwrap();
        td.start();
        td.tick(0.01);
        assert_eq!(td.enemies()[0].health, 5);
    }

    #[test]
    fn test_cannon_fires_non_homing_projectile() {
        let mut td = TowerDefense::new(straight_path(), &settings(3), 1).unwrap();
        td.add_enemy_to_wave("tank", 0.0).unwrap();
        td.place_tower("cannon", Vec2::new(0.0, 200.0)).unwrap();
        td.start();
        td.tick(0.05);
        assert_eq!(td.projectiles().len(), 1);
        let vel = td.projectiles()[0].vel;
        assert!((vel.length() - 300.0).abs() < 1e-3);
        assert!(vel.y < 0.0);
    }

    #[test]
    fn test_insufficient_funds_and_unknown_kinds() {
        let mut td = TowerDefense::new(straight_path(), &settings(3), 1).unwrap();
        td.place_tower("cannon", Vec2::new(50.0, 50.0)).unwrap();
        assert_eq!(td.money, 80);
        assert_eq!(
            td.place_tower("sniper", Vec2::new(90.0, 50.0)),
            Err(GameError::InsufficientFunds {
                cost: 100,
                available: 80
            })
        );
        assert_eq!(td.money, 80);
        assert_eq!(td.towers().len(), 1);

        assert!(matches!(
            td.place_tower("laser", Vec2::ZERO),
            Err(GameError::UnknownKind { category: "tower", .. })
        ));
        assert!(matches!(
            td.add_enemy_to_wave("dragon", 0.0),
            Err(GameError::UnknownKind { category: "enemy", .. })
        ));
        assert_eq!(td.wave_count(), 0);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut td = TowerDefense::new(straight_path(), &settings(3), 1).unwrap();
        td.add_enemy_to_wave("basic", 0.0).unwrap();
        td.start();
        td.tick(0.1);
        let pos = td.enemies()[0].pos();

        td.toggle_pause();
        td.tick(0.5);
        assert_eq!(td.enemies()[0].pos(), pos);

        td.toggle_pause();
        td.tick(0.1);
        assert!(td.enemies()[0].pos().x > pos.x);
    }

    #[test]
    fn test_reverser_backtracks_once() {
        let path: Vec<Vec2> = (0..5).map(|i| Vec2::new(i as f32 * 10.0, 0.0)).collect();
        let mut enemy = reverser_enemy(1, path[0]).unwrap();
        let mut rng = Pcg32::seed_from_u64(0);
        let mut visited = Vec::new();
        while enemy.target_index != 4 {
            visited.push(enemy.target_index);
            enemy.target_index = next_waypoint(&mut enemy, 4, &mut rng);
        }
        assert_eq!(visited, vec![1, 2, 1, 2, 3]);
    }

    fn erratic_trace(seed: u64) -> Vec<(EntityId, Vec2, usize)> {
        let path: Vec<Vec2> = (0..6)
            .map(|i| Vec2::new(i as f32 * 40.0, if i % 2 == 0 { 0.0 } else { 40.0 }))
            .collect();
        let mut td = TowerDefense::new(path, &settings(100), seed).unwrap();
        for i in 0..3 {
            td.add_enemy_to_wave("erratic", i as f32 * 0.3).unwrap();
        }
        td.start();
        let mut trace = Vec::new();
        for _ in 0..200 {
            td.tick(1.0 / 30.0);
            trace.extend(td.enemies().iter().map(|e| (e.id, e.pos(), e.target_index)));
        }
        trace
    }

    #[test]
    fn test_erratic_movement_is_deterministic() {
        assert_eq!(erratic_trace(42), erratic_trace(42));
    }
}
