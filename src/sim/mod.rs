//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Single-threaded, advanced only by `tick`
//! - Seeded RNG only
//! - Stable iteration order (insertion order for platformer entities)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod defense;
pub mod entity;
pub mod game;
pub mod player;
pub mod timer;

pub use body::{Body, CollisionKind, Face};
pub use collision::{CollisionMap, Collider, Contact, ContactPhase, PairKey, overlapping_pairs};
pub use defense::{
    DefenseEvent, DefensePhase, Enemy, EnemyMotion, EnemyStats, Projectile, ProjectileSpec, Tower,
    TowerDefense, WaveState,
};
pub use entity::{
    Appearance, Effect, Entity, EntityId, EntityKind, GravityEffect, MovementAxis, Patrol,
    RenderKind, Role, SurfaceInfo,
};
pub use game::{Game, GameEvent, GamePhase, LevelState, Scene};
pub use player::{Control, Player, PlayerParams};
pub use timer::Timers;
