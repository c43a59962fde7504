//! Game-parameter toggles
//!
//! Everything a level author can switch on or off without touching the
//! simulation code. Serializable so a course page can ship its own JSON.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GameError;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Lives granted at the start of a session
    pub fn starting_lives(&self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => 3,
            Difficulty::Hard => 1,
        }
    }

    /// Tower-defense starting budget
    pub fn starting_money(&self) -> u32 {
        match self {
            Difficulty::Easy => 300,
            Difficulty::Normal => 200,
            Difficulty::Hard => 120,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty preset
    pub difficulty: Difficulty,

    // === Lives ===
    /// Lose a life on level failure (off = plain reload)
    pub lives_enabled: bool,
    pub starting_lives: u32,

    // === Player movement ===
    /// Damp horizontal velocity while airborne
    pub air_resistance: bool,
    /// Default wall-jump toggle for new players
    pub wall_jump: bool,
    /// Default double-jump toggle for new players
    pub double_jump: bool,
    /// Allow steering while airborne
    pub air_strafe: bool,
    /// Seconds a freshly spawned player ignores hazards
    pub spawn_grace_secs: f32,

    // === Canvas / timing ===
    pub fps: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Tower defense ===
    pub starting_money: u32,
    pub wave_delay_secs: f32,
}

impl Default for Settings {
    fn default() -> Self {
        let difficulty = Difficulty::Normal;
        Self {
            difficulty,

            lives_enabled: false,
            starting_lives: difficulty.starting_lives(),

            air_resistance: false,
            wall_jump: false,
            double_jump: false,
            air_strafe: true,
            spawn_grace_secs: SPAWN_GRACE_SECS,

            fps: DEFAULT_FPS,
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,

            starting_money: difficulty.starting_money(),
            wave_delay_secs: WAVE_DELAY_SECS,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset (applies preset defaults)
    pub fn from_preset(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(difficulty);
        settings
    }

    /// Apply a difficulty preset (updates difficulty-dependent settings)
    pub fn apply_preset(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.starting_lives = difficulty.starting_lives();
        self.starting_money = difficulty.starting_money();

        // Hard mode always counts lives
        if difficulty == Difficulty::Hard {
            self.lives_enabled = true;
        }
    }

    /// Seconds per platformer tick
    pub fn frame_secs(&self) -> f32 {
        1.0 / self.fps
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| GameError::Settings(e.to_string()))?;
        settings.validate()?;
        log::info!(
            "Loaded settings ({} difficulty, lives {})",
            settings.difficulty.as_str(),
            if settings.lives_enabled { "on" } else { "off" }
        );
        Ok(settings)
    }

    /// Serialize settings to JSON
    pub fn to_json(&self) -> Result<String, GameError> {
        serde_json::to_string_pretty(self).map_err(|e| GameError::Settings(e.to_string()))
    }

    fn validate(&self) -> Result<(), GameError> {
        if !(self.fps > 0.0) {
            return Err(GameError::Settings(format!("fps must be > 0, got {}", self.fps)));
        }
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(GameError::Settings(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.lives_enabled && self.starting_lives == 0 {
            return Err(GameError::Settings(
                "starting_lives must be > 0 when lives are enabled".into(),
            ));
        }
        Ok(())
    }
}
