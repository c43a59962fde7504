//! Platform abstraction layer
//!
//! Everything between the simulation and the host:
//! - Keyboard mapping (`input`)
//! - Time sources and the fixed-rate frame driver (`time`)

pub mod input;
pub mod time;

pub use input::{KeyAction, key_down, key_up, map_key};
#[cfg(not(target_arch = "wasm32"))]
pub use time::SystemClock;
pub use time::{Clock, DeltaTimer, FrameDriver, ManualClock};
