//! Bearcat - a small teaching library for 2D arcade games
//!
//! Core modules:
//! - `sim`: Simulation (bodies, collision dispatch, platformer and tower-defense loops)
//! - `renderer`: Draw-primitive boundary (`Canvas`) and scene painters
//! - `platform`: Keyboard mapping, time sources and the frame driver
//! - `settings`: Game-parameter toggles
//! - `error`: Crate-wide error type

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::GameError;
pub use settings::{Difficulty, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Gravitational acceleration (px/frame² at the reference frame rate, scaled by 1/fps)
    pub const GRAVITY: f32 = 9.81;
    /// Logical frame rate of the platformer tick
    pub const DEFAULT_FPS: f32 = 60.0;

    /// Default canvas dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 800.0;

    /// Face tolerance on the horizontal axis (absorbs one frame of penetration)
    pub const COLLISION_EPSILON_X: f32 = 10.0;
    /// Face tolerance on the vertical axis
    pub const COLLISION_EPSILON_Y: f32 = 10.0;

    /// Fraction of velocity kept (and reversed) when hitting a ceiling
    pub const CEILING_BOUNCE: f32 = 0.5;
    /// Fraction of horizontal velocity lost per airborne frame when air resistance is on
    pub const AIR_RESISTANCE: f32 = 0.05;
    /// How far past the canvas edge (fraction of height) counts as falling out
    pub const OUT_OF_BOUNDS_MARGIN: f32 = 0.1;

    /// Seconds a freshly spawned player ignores hazards
    pub const SPAWN_GRACE_SECS: f32 = 1.0;

    /// Tower-defense hit buffer numerator; padding = HIT_BUFFER / width
    pub const HIT_BUFFER: f32 = 20.0;
    /// Delay between a completed wave and the next one
    pub const WAVE_DELAY_SECS: f32 = 3.0;
    /// Largest wall-clock delta fed to the tower-defense tick
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum fixed steps per pumped frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Unit direction from `from` toward `to` (zero when they coincide)
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}
