//! The `Canvas` trait and a recording implementation

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// RGBA, each channel in 0..=1
pub type Color = [f32; 4];

/// How a closed shape is painted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Style {
    Fill,
    Frame,
    FillFrame,
}

impl Style {
    pub fn from_name(name: &str) -> Result<Self, GameError> {
        match name.to_uppercase().as_str() {
            "FILL" => Ok(Style::Fill),
            "FRAME" => Ok(Style::Frame),
            "FILLFRAME" => Ok(Style::FillFrame),
            _ => {
                log::error!("{name} IS AN INVALID STYLE; VALID STYLES ARE: FILL, FRAME, FILLFRAME");
                Err(GameError::InvalidStyle(name.to_string()))
            }
        }
    }
}

/// Rotation by `degrees` (clockwise on screen) around `anchor`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub degrees: f32,
    pub anchor: Vec2,
}

impl Rotation {
    pub fn new(degrees: f32, anchor: Vec2) -> Self {
        Self { degrees, anchor }
    }
}

/// Drawing surface. Shapes are anchored at their center.
pub trait Canvas {
    fn clear(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_border_color(&mut self, color: Color);
    fn draw_rectangle(&mut self, center: Vec2, size: Vec2, style: Style, rotation: Option<Rotation>);
    fn draw_oval(&mut self, center: Vec2, size: Vec2, style: Style, rotation: Option<Rotation>);
    fn draw_polygon(&mut self, points: &[Vec2], style: Style, rotation: Option<Rotation>);
    fn draw_line(&mut self, from: Vec2, to: Vec2);
    fn draw_text(&mut self, text: &str, pos: Vec2);
    fn draw_image(&mut self, path: &str, center: Vec2, size: Vec2);
}

/// One recorded canvas call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    FillColor(Color),
    BorderColor(Color),
    Rectangle {
        center: Vec2,
        size: Vec2,
        style: Style,
        rotation: Option<Rotation>,
    },
    Oval {
        center: Vec2,
        size: Vec2,
        style: Style,
        rotation: Option<Rotation>,
    },
    Polygon {
        points: Vec<Vec2>,
        style: Style,
        rotation: Option<Rotation>,
    },
    Line {
        from: Vec2,
        to: Vec2,
    },
    Text {
        text: String,
        pos: Vec2,
    },
    Image {
        path: String,
        center: Vec2,
        size: Vec2,
    },
}

/// Canvas that keeps every call, for tests and headless runs
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of shape calls (rectangles, ovals, polygons, images)
    pub fn shape_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| {
                matches!(
                    op,
                    DrawOp::Rectangle { .. }
                        | DrawOp::Oval { .. }
                        | DrawOp::Polygon { .. }
                        | DrawOp::Image { .. }
                )
            })
            .count()
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, color: Color) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear(color));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.ops.push(DrawOp::FillColor(color));
    }

    fn set_border_color(&mut self, color: Color) {
        self.ops.push(DrawOp::BorderColor(color));
    }

    fn draw_rectangle(&mut self, center: Vec2, size: Vec2, style: Style, rotation: Option<Rotation>) {
        self.ops.push(DrawOp::Rectangle {
            center,
            size,
            style,
            rotation,
        });
    }

    fn draw_oval(&mut self, center: Vec2, size: Vec2, style: Style, rotation: Option<Rotation>) {
        self.ops.push(DrawOp::Oval {
            center,
            size,
            style,
            rotation,
        });
    }

    fn draw_polygon(&mut self, points: &[Vec2], style: Style, rotation: Option<Rotation>) {
        self.ops.push(DrawOp::Polygon {
            points: points.to_vec(),
            style,
            rotation,
        });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2) {
        self.ops.push(DrawOp::Line { from, to });
    }

    fn draw_text(&mut self, text: &str, pos: Vec2) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            pos,
        });
    }

    fn draw_image(&mut self, path: &str, center: Vec2, size: Vec2) {
        self.ops.push(DrawOp::Image {
            path: path.to_string(),
            center,
            size,
        });
    }
}
