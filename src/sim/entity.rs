//! Platformer entities
//!
//! Every entity is a `Body` plus an `EntityKind` carrying its behavior and
//! payload. Collision handlers match on the *role* of the other entity, never
//! on a concrete type name.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, CollisionKind};
use super::collision::{Collider, ContactPhase};
use super::player::Player;
use crate::error::GameError;

/// Stable entity identifier (never reused within a session)
pub type EntityId = u32;

/// What an entity *is* to the things it touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    /// Anything the player can stand on
    Platform,
    /// Contact fails the level
    Hazard,
    Pickup,
    Door,
    /// One-shot player modifiers (size, gravity)
    Modifier,
}

/// Contact properties of a standable surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceInfo {
    /// Fraction of landing speed returned upward (0 = dead stop, 1 = perfect bounce)
    pub bounce: f32,
    /// Fraction of horizontal velocity carried into the next grounded frame
    /// (0 = full grip, values near 1 feel like ice)
    pub friction: f32,
    /// Displacement applied to a rider each frame (treadmill belt, moving platform)
    pub carry: Vec2,
}

impl SurfaceInfo {
    pub fn new(bounce: f32, friction: f32) -> Self {
        Self {
            bounce,
            friction,
            carry: Vec2::ZERO,
        }
    }
}

/// Scripted movement patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementAxis {
    Vertical,
    Horizontal,
    IncreasingDiagonal,
    DecreasingDiagonal,
    Circle,
    Follow,
}

impl MovementAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementAxis::Vertical => "vertical",
            MovementAxis::Horizontal => "horizontal",
            MovementAxis::IncreasingDiagonal => "increasing_diagonal",
            MovementAxis::DecreasingDiagonal => "decreasing_diagonal",
            MovementAxis::Circle => "circle",
            MovementAxis::Follow => "follow",
        }
    }

    /// Look up an axis by name; unknown names are logged and rejected
    pub fn from_name(name: &str) -> Result<Self, GameError> {
        let axis = match name.to_lowercase().as_str() {
            "vertical" => MovementAxis::Vertical,
            "horizontal" => MovementAxis::Horizontal,
            "increasing_diagonal" => MovementAxis::IncreasingDiagonal,
            "decreasing_diagonal" => MovementAxis::DecreasingDiagonal,
            "circle" => MovementAxis::Circle,
            "follow" => MovementAxis::Follow,
            _ => {
                log::error!(
                    "{name} IS AN INVALID MOVEMENT AXIS; VALID AXES ARE: vertical, horizontal, \
                     increasing_diagonal, decreasing_diagonal, circle, follow"
                );
                return Err(GameError::UnknownKind {
                    category: "movement axis",
                    name: name.to_string(),
                });
            }
        };
        Ok(axis)
    }
}

/// Back-and-forth (or circular, or chasing) scripted motion around an anchor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patrol {
    pub axis: MovementAxis,
    pub anchor: Vec2,
    /// +1 forward, -1 backward
    pub direction: f32,
    /// Pixels per frame
    pub speed: f32,
    /// Turn-around distance from the anchor (radius for circles, sight range for follow)
    pub max_distance: f32,
    /// Phase angle for circular motion (radians)
    pub theta: f32,
}

impl Patrol {
    pub fn new(axis: MovementAxis, anchor: Vec2, speed: f32, max_distance: f32) -> Self {
        Self {
            axis,
            anchor,
            direction: 1.0,
            speed,
            max_distance,
            theta: 0.0,
        }
    }

    /// Advance one frame and return the new center
    pub fn step(&mut self, pos: Vec2, player: Option<Vec2>, fps: f32) -> Vec2 {
        let stride = self.speed * self.direction;
        let next = match self.axis {
            MovementAxis::Vertical => {
                let next = Vec2::new(pos.x, pos.y + stride);
                self.turn_if((self.anchor.y - next.y).abs());
                next
            }
            MovementAxis::Horizontal => {
                let next = Vec2::new(pos.x + stride, pos.y);
                self.turn_if((self.anchor.x - next.x).abs());
                next
            }
            MovementAxis::IncreasingDiagonal => {
                let next = Vec2::new(pos.x + stride, pos.y - stride);
                self.turn_if(next.distance(self.anchor));
                next
            }
            MovementAxis::DecreasingDiagonal => {
                let next = Vec2::new(pos.x + stride, pos.y + stride);
                self.turn_if(next.distance(self.anchor));
                next
            }
            MovementAxis::Circle => Vec2::new(
                self.anchor.x + self.max_distance * self.theta.sin(),
                self.anchor.y + self.max_distance * self.theta.cos(),
            ),
            MovementAxis::Follow => match player {
                Some(target) if pos.distance(target) <= self.max_distance => {
                    let x_dir = if pos.x > target.x { -1.0 } else { 1.0 };
                    let y_dir = if pos.y > target.y { -1.0 } else { 1.0 };
                    Vec2::new(pos.x + self.speed * x_dir, pos.y + self.speed * y_dir)
                }
                _ => pos,
            },
        };
        self.theta = (self.theta + self.speed / fps) % std::f32::consts::TAU;
        next
    }

    fn turn_if(&mut self, travelled: f32) {
        if travelled >= self.max_distance {
            self.direction = -self.direction;
        }
    }
}

/// Platform that moves along a patrol and carries its rider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub surface: SurfaceInfo,
    pub patrol: Patrol,
    /// Displacement during the last update
    pub last_delta: Vec2,
}

/// What a gravity block does to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GravityEffect {
    /// Flip the session gravity multiplier between +1 and -1
    Invert,
    /// Switch the player's gravity on or off
    Toggle,
}

/// Entity variants and their payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityKind {
    Player(Box<Player>),
    Platform(SurfaceInfo),
    MovingPlatform(MovingPlatform),
    Trampoline(SurfaceInfo),
    Treadmill { surface: SurfaceInfo, belt_speed: f32 },
    Enemy(Patrol),
    Star { worth: u32 },
    Door { target: String, enabled: bool },
    SizeChanger { size: Vec2, revert_after: Option<f32> },
    GravityBlock(GravityEffect),
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Player(_) => "player",
            EntityKind::Platform(_) => "platform",
            EntityKind::MovingPlatform(_) => "moving platform",
            EntityKind::Trampoline(_) => "trampoline",
            EntityKind::Treadmill { .. } => "treadmill",
            EntityKind::Enemy(_) => "enemy",
            EntityKind::Star { .. } => "star",
            EntityKind::Door { .. } => "door",
            EntityKind::SizeChanger { .. } => "size changer",
            EntityKind::GravityBlock(_) => "gravity block",
        }
    }
}

/// Render classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderKind {
    Color,
    Image,
}

impl RenderKind {
    pub fn from_name(name: &str) -> Result<Self, GameError> {
        match name.to_lowercase().as_str() {
            "color" | "colour" => Ok(RenderKind::Color),
            "image" => Ok(RenderKind::Image),
            _ => {
                log::error!(
                    "{name} IS AN INVALID RENDERING TYPE; VALID TYPES ARE: color, image"
                );
                Err(GameError::InvalidStyle(name.to_string()))
            }
        }
    }
}

/// Per-entity render payload (owned, never shared between entities)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub render: RenderKind,
    /// Main colour name
    pub color: Option<String>,
    /// Secondary colour name (door knob)
    pub accent: Option<String>,
    /// Image path for image-classified entities
    pub image: Option<String>,
}

impl Appearance {
    pub fn color(name: &str) -> Self {
        Self {
            render: RenderKind::Color,
            color: Some(name.to_string()),
            accent: None,
            image: None,
        }
    }

    pub fn with_accent(mut self, name: &str) -> Self {
        self.accent = Some(name.to_string());
        self
    }

    pub fn image(path: &str) -> Self {
        Self {
            render: RenderKind::Image,
            color: None,
            accent: None,
            image: Some(path.to_string()),
        }
    }
}

/// Deferred game-level consequence of a collision or update
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AwardScore(u32),
    Destroy(EntityId),
    /// Bank the score, then switch to the named level
    CompleteLevel(String),
    FailLevel,
    InvertGravity,
    TogglePlayerGravity,
    ResizePlayer { size: Vec2, revert_after: Option<f32> },
}

impl Effect {
    /// Effects that swap out the entity list
    pub fn changes_level(&self) -> bool {
        matches!(self, Effect::CompleteLevel(_) | Effect::FailLevel)
    }
}

/// A live platformer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
    pub kind: EntityKind,
    pub appearance: Appearance,
}

impl Collider for Entity {
    fn collider_id(&self) -> EntityId {
        self.id
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn resolves_own_contacts(&self) -> bool {
        self.is_player()
    }
}

impl Entity {
    pub fn role(&self) -> Role {
        match self.kind {
            EntityKind::Player(_) => Role::Player,
            EntityKind::Platform(_)
            | EntityKind::MovingPlatform(_)
            | EntityKind::Trampoline(_)
            | EntityKind::Treadmill { .. } => Role::Platform,
            EntityKind::Enemy(_) => Role::Hazard,
            EntityKind::Star { .. } => Role::Pickup,
            EntityKind::Door { .. } => Role::Door,
            EntityKind::SizeChanger { .. } | EntityKind::GravityBlock(_) => Role::Modifier,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    pub fn player(&self) -> Option<&Player> {
        match &self.kind {
            EntityKind::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.kind {
            EntityKind::Player(player) => Some(player),
            _ => None,
        }
    }

    /// Surface the player can stand on, if this is platform-like
    pub fn surface_info(&self) -> Option<SurfaceInfo> {
        match &self.kind {
            EntityKind::Platform(surface) | EntityKind::Trampoline(surface) => Some(*surface),
            EntityKind::Treadmill {
                surface,
                belt_speed,
            } => Some(SurfaceInfo {
                carry: Vec2::new(*belt_speed, 0.0),
                ..*surface
            }),
            EntityKind::MovingPlatform(platform) => Some(SurfaceInfo {
                carry: platform.last_delta,
                ..platform.surface
            }),
            _ => None,
        }
    }

    /// Scripted per-frame motion (everything except the player)
    pub fn update_motion(&mut self, player: Option<Vec2>, fps: f32) {
        match &mut self.kind {
            EntityKind::Enemy(patrol) => {
                self.body.pos = patrol.step(self.body.pos, player, fps);
            }
            EntityKind::MovingPlatform(platform) => {
                let before = self.body.pos;
                self.body.pos = platform.patrol.step(before, player, fps);
                platform.last_delta = self.body.pos - before;
            }
            _ => {}
        }
    }

    /// React to a contact edge with `other`, pushing game-level effects.
    ///
    /// Triggers get trigger callbacks, solids get collision callbacks and
    /// `None` bodies never react.
    pub fn react(
        &self,
        other: &Entity,
        phase: ContactPhase,
        effects: &mut Vec<Effect>,
    ) -> Result<(), GameError> {
        match self.body.kind {
            CollisionKind::Trigger => self.on_trigger(other, phase, effects),
            CollisionKind::Solid => self.on_collision(other, phase, effects),
            CollisionKind::None => Ok(()),
        }
    }

    fn on_trigger(
        &self,
        other: &Entity,
        phase: ContactPhase,
        effects: &mut Vec<Effect>,
    ) -> Result<(), GameError> {
        if other.role() != Role::Player {
            return Ok(());
        }
        match (&self.kind, phase) {
            (EntityKind::Star { worth }, ContactPhase::Enter) => {
                effects.push(Effect::AwardScore(*worth));
                effects.push(Effect::Destroy(self.id));
            }
            (EntityKind::Door { target, enabled }, ContactPhase::Enter | ContactPhase::Stay) => {
                if !*enabled {
                    return Ok(());
                }
                if target.is_empty() {
                    return Err(GameError::UnknownLevel(String::new()));
                }
                effects.push(Effect::CompleteLevel(target.clone()));
            }
            (
                EntityKind::SizeChanger {
                    size,
                    revert_after,
                },
                ContactPhase::Enter,
            ) => {
                effects.push(Effect::ResizePlayer {
                    size: *size,
                    revert_after: *revert_after,
                });
                effects.push(Effect::Destroy(self.id));
            }
            (EntityKind::GravityBlock(effect), ContactPhase::Enter) => {
                effects.push(match effect {
                    GravityEffect::Invert => Effect::InvertGravity,
                    GravityEffect::Toggle => Effect::TogglePlayerGravity,
                });
                effects.push(Effect::Destroy(self.id));
            }
            _ => {}
        }
        Ok(())
    }

    fn on_collision(
        &self,
        other: &Entity,
        phase: ContactPhase,
        effects: &mut Vec<Effect>,
    ) -> Result<(), GameError> {
        match (&self.kind, other.role(), phase) {
            (EntityKind::Enemy(_), Role::Player, ContactPhase::Enter | ContactPhase::Stay) => {
                let shielded = other.player().is_some_and(|p| p.invulnerable);
                if !shielded {
                    effects.push(Effect::FailLevel);
                }
            }
            (_, role, ContactPhase::Exit) => {
                log::trace!("{} {} left {:?}", self.kind.name(), self.id, role);
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: EntityId, kind: EntityKind, collision: CollisionKind) -> Entity {
        Entity {
            id,
            body: Body::new(Vec2::ZERO, 10.0, 10.0, collision).unwrap(),
            kind,
            appearance: Appearance::color("RED"),
        }
    }

    fn player(id: EntityId) -> Entity {
        entity(
            id,
            EntityKind::Player(Box::new(Player::default())),
            CollisionKind::Trigger,
        )
    }

    #[test]
    fn test_horizontal_patrol_turns_at_max_distance() {
        let mut patrol = Patrol::new(MovementAxis::Horizontal, Vec2::ZERO, 5.0, 10.0);
        let mut pos = Vec2::ZERO;
        pos = patrol.step(pos, None, 60.0);
        assert_eq!(pos.x, 5.0);
        pos = patrol.step(pos, None, 60.0);
        assert_eq!(pos.x, 10.0);
        assert_eq!(patrol.direction, -1.0);
        pos = patrol.step(pos, None, 60.0);
        assert_eq!(pos.x, 5.0);
    }

    #[test]
    fn test_follow_only_chases_within_sight() {
        let mut patrol = Patrol::new(MovementAxis::Follow, Vec2::ZERO, 2.0, 50.0);
        let pos = patrol.step(Vec2::ZERO, Some(Vec2::new(30.0, -30.0)), 60.0);
        assert_eq!(pos, Vec2::new(2.0, -2.0));

        let far = patrol.step(Vec2::ZERO, Some(Vec2::new(300.0, 0.0)), 60.0);
        assert_eq!(far, Vec2::ZERO);
        assert_eq!(patrol.step(Vec2::ZERO, None, 60.0), Vec2::ZERO);
    }

    #[test]
    fn test_circle_orbits_anchor() {
        let anchor = Vec2::new(100.0, 100.0);
        let mut patrol = Patrol::new(MovementAxis::Circle, anchor, 6.0, 40.0);
        for _ in 0..30 {
            let pos = patrol.step(anchor, None, 60.0);
            assert!((pos.distance(anchor) - 40.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_axis_names() {
        assert_eq!(
            MovementAxis::from_name("Increasing_Diagonal"),
            Ok(MovementAxis::IncreasingDiagonal)
        );
        assert!(matches!(
            MovementAxis::from_name("zigzag"),
            Err(GameError::UnknownKind { .. })
        ));
        assert!(RenderKind::from_name("sprite").is_err());
    }

    #[test]
    fn test_star_reacts_to_player_only() {
        let star = entity(1, EntityKind::Star { worth: 250 }, CollisionKind::Trigger);
        let platform = entity(
            2,
            EntityKind::Platform(SurfaceInfo::default()),
            CollisionKind::Solid,
        );
        let mut effects = Vec::new();
        star.react(&platform, ContactPhase::Enter, &mut effects).unwrap();
        assert!(effects.is_empty());

        star.react(&player(3), ContactPhase::Enter, &mut effects).unwrap();
        assert_eq!(effects, vec![Effect::AwardScore(250), Effect::Destroy(1)]);

        effects.clear();
        star.react(&player(3), ContactPhase::Stay, &mut effects).unwrap();
        assert!(effects.is_empty());
    }

    #[test]
    fn test_disabled_door_does_nothing() {
        let door = entity(
            1,
            EntityKind::Door {
                target: "Level 2".into(),
                enabled: false,
            },
            CollisionKind::Trigger,
        );
        let mut effects = Vec::new();
        door.react(&player(2), ContactPhase::Enter, &mut effects).unwrap();
        assert!(effects.is_empty());
    }

    #[test]
    fn test_enemy_respects_invulnerability() {
        let enemy = entity(
            1,
            EntityKind::Enemy(Patrol::new(MovementAxis::Horizontal, Vec2::ZERO, 1.0, 10.0)),
            CollisionKind::Solid,
        );
        let mut hero = player(2);
        let mut effects = Vec::new();

        hero.player_mut().unwrap().invulnerable = true;
        enemy.react(&hero, ContactPhase::Enter, &mut effects).unwrap();
        assert!(effects.is_empty());

        hero.player_mut().unwrap().invulnerable = false;
        enemy.react(&hero, ContactPhase::Stay, &mut effects).unwrap();
        assert_eq!(effects, vec![Effect::FailLevel]);
    }

    #[test]
    fn test_none_body_never_reacts() {
        let mut star = entity(1, EntityKind::Star { worth: 5 }, CollisionKind::None);
        star.body.kind = CollisionKind::None;
        let mut effects = Vec::new();
        star.react(&player(2), ContactPhase::Enter, &mut effects).unwrap();
        assert!(effects.is_empty());
    }

    #[test]
    fn test_treadmill_surface_carries_belt_speed() {
        let treadmill = entity(
            1,
            EntityKind::Treadmill {
                surface: SurfaceInfo::new(0.0, 0.0),
                belt_speed: -3.0,
            },
            CollisionKind::Solid,
        );
        assert_eq!(treadmill.surface_info().unwrap().carry, Vec2::new(-3.0, 0.0));
        assert_eq!(treadmill.role(), Role::Platform);
    }
}
