//! Named colours

use super::canvas::Color;

pub const DARKRED: Color = rgb(0x7D, 0x00, 0x00);
pub const RED: Color = rgb(0xFF, 0x00, 0x00);
pub const PINK: Color = rgb(0xFF, 0x96, 0x96);
pub const DARKORANGE: Color = rgb(0xA3, 0x52, 0x00);
pub const ORANGE: Color = rgb(0xFF, 0x80, 0x00);
pub const LIGHTORANGE: Color = rgb(0xFF, 0xB3, 0x66);
pub const DARKYELLOW: Color = rgb(0x9C, 0x9C, 0x00);
pub const YELLOW: Color = rgb(0xFF, 0xFF, 0x00);
pub const LIGHTYELLOW: Color = rgb(0xFF, 0xFF, 0x63);
pub const DARKGREEN: Color = rgb(0x00, 0x91, 0x00);
pub const GREEN: Color = rgb(0x00, 0xFF, 0x00);
pub const LIGHTGREEN: Color = rgb(0x6E, 0xFF, 0x6E);
pub const DARKBLUE: Color = rgb(0x00, 0x00, 0x82);
pub const BLUE: Color = rgb(0x00, 0x00, 0xFF);
pub const LIGHTBLUE: Color = rgb(0x5E, 0x5E, 0xFF);
pub const DARKPURPLE: Color = rgb(0x7D, 0x00, 0x99);
pub const PURPLE: Color = rgb(0xD0, 0x00, 0xFF);
pub const LIGHTPURPLE: Color = rgb(0xE4, 0x6B, 0xFF);

pub const BROWN: Color = rgb(0x8B, 0x45, 0x13);
pub const GRAY: Color = rgb(0x80, 0x80, 0x80);
pub const CYAN: Color = rgb(0x00, 0xFF, 0xFF);
pub const WHITE: Color = rgb(0xFF, 0xFF, 0xFF);
pub const BLACK: Color = rgb(0x00, 0x00, 0x00);

/// Used when an entity's colour is missing or unknown
pub const FALLBACK: Color = GRAY;
pub const BACKGROUND: Color = WHITE;
pub const HUD_TEXT: Color = BLACK;

const TABLE: &[(&str, Color)] = &[
    ("DARKRED", DARKRED),
    ("RED", RED),
    ("PINK", PINK),
    ("DARKORANGE", DARKORANGE),
    ("ORANGE", ORANGE),
    ("LIGHTORANGE", LIGHTORANGE),
    ("DARKYELLOW", DARKYELLOW),
    ("YELLOW", YELLOW),
    ("LIGHTYELLOW", LIGHTYELLOW),
    ("DARKGREEN", DARKGREEN),
    ("GREEN", GREEN),
    ("LIGHTGREEN", LIGHTGREEN),
    ("DARKBLUE", DARKBLUE),
    ("BLUE", BLUE),
    ("LIGHTBLUE", LIGHTBLUE),
    ("DARKPURPLE", DARKPURPLE),
    ("PURPLE", PURPLE),
    ("LIGHTPURPLE", LIGHTPURPLE),
    ("BROWN", BROWN),
    ("GRAY", GRAY),
    ("GREY", GRAY),
    ("CYAN", CYAN),
    ("WHITE", WHITE),
    ("BLACK", BLACK),
];

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// Look up a colour by name (case-insensitive) or `#RRGGBB` hex string
pub fn named(name: &str) -> Option<Color> {
    if name.starts_with('#') {
        return from_hex(name);
    }
    TABLE
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, c)| *c)
}

/// Parse `#RRGGBB`
pub fn from_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(rgb(channel(0)?, channel(2)?, channel(4)?))
}
