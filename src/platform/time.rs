//! Time sources and the fixed-rate frame driver

use std::cell::Cell;
use std::rc::Rc;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};

/// Monotonic seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall-clock time since construction
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Hand-advanced clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Wall-clock delta between successive calls, clamped to `MAX_FRAME_DT`
pub struct DeltaTimer<C: Clock> {
    clock: C,
    last: f64,
}

impl<C: Clock> DeltaTimer<C> {
    pub fn new(clock: C) -> Self {
        let last = clock.now();
        Self { clock, last }
    }

    pub fn delta(&mut self) -> f32 {
        let now = self.clock.now();
        let dt = (now - self.last).max(0.0) as f32;
        self.last = now;
        dt.min(MAX_FRAME_DT)
    }
}

type FrameCallback = Box<dyn FnMut(f32)>;

/// Calls registered callbacks at a fixed rate from whatever the host pumps.
///
/// Uses an accumulator: each pump adds the clamped elapsed time and runs as
/// many whole steps as fit, at most `MAX_SUBSTEPS`.
pub struct FrameDriver<C: Clock> {
    timer: DeltaTimer<C>,
    step: f32,
    accumulator: f32,
    callbacks: Vec<FrameCallback>,
}

impl<C: Clock> FrameDriver<C> {
    pub fn new(clock: C, fps: f32) -> Self {
        Self {
            timer: DeltaTimer::new(clock),
            step: 1.0 / fps,
            accumulator: 0.0,
            callbacks: Vec::new(),
        }
    }

    /// Run `callback(step_secs)` once per fixed step
    pub fn register_frame_callback(&mut self, callback: impl FnMut(f32) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Catch up with the clock; returns the number of steps run
    pub fn pump(&mut self) -> u32 {
        self.accumulator += self.timer.delta();

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < MAX_SUBSTEPS {
            for callback in &mut self.callbacks {
                callback(self.step);
            }
            self.accumulator -= self.step;
            substeps += 1;
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_driver(clock: &ManualClock, fps: f32) -> (FrameDriver<ManualClock>, Rc<Cell<u32>>) {
        let mut driver = FrameDriver::new(clock.clone(), fps);
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        driver.register_frame_callback(move |_| seen.set(seen.get() + 1));
        (driver, count)
    }

    #[test]
    fn test_runs_whole_steps_only() {
        let clock = ManualClock::new();
        let (mut driver, count) = counting_driver(&clock, 20.0);

        assert_eq!(driver.pump(), 0);
        clock.advance(0.1);
        assert_eq!(driver.pump(), 2);
        assert_eq!(count.get(), 2);

        clock.advance(0.025);
        assert_eq!(driver.pump(), 0);
        clock.advance(0.025);
        assert_eq!(driver.pump(), 1);
    }

    #[test]
    fn test_stall_is_clamped() {
        let clock = ManualClock::new();
        let (mut driver, count) = counting_driver(&clock, 20.0);
        clock.advance(5.0);
        assert_eq!(driver.pump(), 2);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_substeps_capped() {
        let clock = ManualClock::new();
        let (mut driver, _) = counting_driver(&clock, 1000.0);
        clock.advance(0.1);
        assert_eq!(driver.pump(), MAX_SUBSTEPS);
    }

    #[test]
    fn test_delta_timer() {
        let clock = ManualClock::new();
        let mut timer = DeltaTimer::new(clock.clone());
        clock.advance(0.05);
        assert!((timer.delta() - 0.05).abs() < 1e-6);
        assert_eq!(timer.delta(), 0.0);
        clock.advance(1.0);
        assert_eq!(timer.delta(), MAX_FRAME_DT);
    }
}
