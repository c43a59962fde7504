//! Draw-primitive boundary and scene painters
//!
//! The simulation never draws. Hosts implement [`Canvas`] over whatever
//! surface they have; the painters in `scene` walk a game and issue
//! primitives in draw order.

pub mod canvas;
pub mod colors;
pub mod scene;
pub mod shapes;

pub use canvas::{Canvas, Color, DrawOp, RecordingCanvas, Rotation, Style};
pub use scene::{draw_defense, draw_platformer};
