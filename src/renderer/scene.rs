//! Scene painters: walk a game and issue canvas calls in draw order

use glam::Vec2;

use super::canvas::{Canvas, Color, Rotation, Style};
use super::{colors, shapes};
use crate::sim::{
    Appearance, DefensePhase, Entity, EntityKind, Game, GamePhase, RenderKind, TowerDefense,
};

/// Door outline is drawn slightly larger than its trigger box
const DOOR_SCALE: f32 = 1.2;
const TOWER_SIZE: f32 = 20.0;

/// Colour for an entity, warning and falling back when missing or unknown
fn resolve_color(appearance: &Appearance) -> Color {
    match appearance.color.as_deref() {
        Some(name) => colors::named(name).unwrap_or_else(|| {
            log::warn!("Unknown colour '{name}', drawing with the fallback colour");
            colors::FALLBACK
        }),
        None => {
            log::warn!("Render type set to COLOR but no color was provided");
            colors::FALLBACK
        }
    }
}

fn accent_color(appearance: &Appearance) -> Color {
    appearance
        .accent
        .as_deref()
        .and_then(colors::named)
        .unwrap_or(colors::YELLOW)
}

fn draw_entity(entity: &Entity, canvas: &mut dyn Canvas) {
    let center = entity.body.pos;
    let size = entity.body.size();

    if entity.appearance.render == RenderKind::Image {
        match entity.appearance.image.as_deref() {
            Some(path) => {
                canvas.draw_image(path, center, size);
                return;
            }
            None => log::warn!("Render type set to IMAGE but no image was provided"),
        }
    }

    canvas.set_fill_color(resolve_color(&entity.appearance));
    match &entity.kind {
        EntityKind::Enemy(_) => canvas.draw_oval(center, size, Style::Fill, None),
        EntityKind::Star { .. } => {
            let points = shapes::star(center, size.x.min(size.y) / 2.0);
            canvas.draw_polygon(&points, Style::Fill, None);
        }
        EntityKind::Door { enabled: true, .. } => {
            canvas.draw_rectangle(center, size * DOOR_SCALE, Style::Fill, None);
            let knob = size.x / 4.0;
            canvas.set_fill_color(accent_color(&entity.appearance));
            canvas.draw_oval(
                center + Vec2::new(size.x / 3.0, 0.0),
                Vec2::splat(knob),
                Style::Fill,
                None,
            );
        }
        EntityKind::Door { enabled: false, .. } => {
            canvas.set_border_color(resolve_color(&entity.appearance));
            canvas.draw_rectangle(center, size * DOOR_SCALE, Style::Frame, None);
        }
        _ => canvas.draw_rectangle(center, size, Style::Fill, None),
    }
}

/// Paint the platformer: every entity in insertion order, then the HUD
pub fn draw_platformer(game: &Game, canvas: &mut dyn Canvas) {
    canvas.clear(colors::BACKGROUND);

    if game.phase() == GamePhase::GameOver {
        let mid = Vec2::new(game.settings.canvas_width, game.settings.canvas_height) / 2.0;
        canvas.set_fill_color(colors::HUD_TEXT);
        canvas.draw_text("Game Over", mid);
        canvas.draw_text(&format!("Final score: {}", game.score), mid + Vec2::new(0.0, 30.0));
        canvas.draw_text("Press R to restart", mid + Vec2::new(0.0, 60.0));
        return;
    }

    for entity in game.scene().entities() {
        draw_entity(entity, canvas);
    }

    canvas.set_fill_color(colors::HUD_TEXT);
    let score = if game.score_earned_this_level != 0 {
        format!("Score: {} (+{})", game.score, game.score_earned_this_level)
    } else {
        format!("Score: {}", game.score)
    };
    canvas.draw_text(&score, Vec2::new(100.0, 25.0));
    canvas.draw_text(
        &format!("Time: {:.2}", game.level_time()),
        Vec2::new(400.0, 25.0),
    );
    if let Some(level) = game.current_level() {
        canvas.draw_text(level, Vec2::new(600.0, 25.0));
    }
    if game.settings.lives_enabled {
        canvas.draw_text(&format!("Lives: {}", game.lives), Vec2::new(720.0, 25.0));
    }
}

fn enemy_color(kind: &str) -> Color {
    match kind {
        "basic" => colors::RED,
        "fast" => colors::ORANGE,
        "tank" => colors::DARKRED,
        "erratic" => colors::PURPLE,
        "reverser" => colors::BLUE,
        _ => colors::FALLBACK,
    }
}

fn tower_color(kind: &str) -> Color {
    match kind {
        "basic" => colors::GREEN,
        "sniper" => colors::DARKBLUE,
        "rapid" => colors::LIGHTGREEN,
        "cannon" => colors::DARKORANGE,
        _ => colors::FALLBACK,
    }
}

/// Paint the tower-defense board: path, towers with range rings, enemies,
/// projectiles, then the HUD
pub fn draw_defense(td: &TowerDefense, canvas: &mut dyn Canvas) {
    canvas.clear(colors::BACKGROUND);

    canvas.set_border_color(colors::BROWN);
    for leg in td.path().windows(2) {
        canvas.draw_line(leg[0], leg[1]);
    }

    for tower in td.towers() {
        // Turn the tower to face whatever it is locked on to
        let facing = tower
            .target
            .and_then(|id| td.enemies().iter().find(|e| e.id == id))
            .map(|enemy| {
                let aim = enemy.pos() - tower.pos;
                Rotation::new(aim.y.atan2(aim.x).to_degrees(), tower.pos)
            });
        canvas.set_fill_color(tower_color(&tower.kind));
        canvas.draw_rectangle(tower.pos, Vec2::splat(TOWER_SIZE), Style::Fill, facing);
        canvas.set_border_color(colors::GRAY);
        canvas.draw_oval(tower.pos, Vec2::splat(tower.range * 2.0), Style::Frame, None);
    }

    for enemy in td.enemies() {
        canvas.set_fill_color(enemy_color(&enemy.kind));
        canvas.draw_oval(enemy.pos(), Vec2::splat(enemy.radius() * 2.0), Style::Fill, None);
    }

    canvas.set_fill_color(colors::BLACK);
    for projectile in td.projectiles() {
        canvas.draw_oval(projectile.body.pos, projectile.body.size(), Style::Fill, None);
    }

    canvas.set_fill_color(colors::HUD_TEXT);
    canvas.draw_text(&format!("Money: {}", td.money), Vec2::new(100.0, 25.0));
    canvas.draw_text(&format!("Lives: {}", td.lives), Vec2::new(300.0, 25.0));
    canvas.draw_text(
        &format!("Wave: {}/{}", (td.wave_index() + 1).min(td.wave_count()), td.wave_count()),
        Vec2::new(500.0, 25.0),
    );
    let banner = match td.phase() {
        DefensePhase::Playing => None,
        DefensePhase::Paused => Some("Paused"),
        DefensePhase::GameOver => Some("Game Over"),
        DefensePhase::Victory => Some("Victory!"),
    };
    if let Some(banner) = banner {
        canvas.draw_text(banner, Vec2::new(400.0, 400.0));
    }
}
