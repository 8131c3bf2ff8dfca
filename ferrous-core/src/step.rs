/*
Copyright 2020 Anish Jewalikar

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! The 60 Hz frame cadence and the external collaborator traits. Ported
//! from `chip8_run`/`current_time_ns`/`wait_until` in
//! `original_source/src/chip8.c`, using the exact remainder-distributing
//! instruction budget and the coarse-sleep-then-spin precision wait the
//! source uses.

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::machine::Machine;

/// Consumes the read-only framebuffer once per frame, after instructions
/// have run for that frame.
pub trait Display {
    fn present(&mut self, framebuffer: &Framebuffer, hires: bool);
}

/// A single per-frame command derived from `sound_timer > 0`.
pub trait Audio {
    fn set_tone_enabled(&mut self, enabled: bool);
}

/// Drives a [`Machine`] at a fixed instruction budget per second, spread
/// evenly across 60 frames, and fires the [`Display`]/[`Audio`]
/// collaborators once per frame.
///
/// Owns no window, no audio device, no event pump: the frontend retains
/// those and calls [`StepLoop::run_frame`] once per iteration of its own
/// loop, using [`StepLoop::wait_until`] to hold the 60 Hz cadence.
pub struct StepLoop {
    target_speed: u32,
    frame_number: u64,
    paused: bool,
}

impl StepLoop {
    pub fn new(target_speed: u32) -> Self {
        Self {
            target_speed,
            frame_number: 0,
            paused: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_paused(&mut self) {
        self.paused = !self.paused;
    }

    /// Run one frame: execute the instruction budget owed for
    /// `frame_number % 60` (the remainder-distributing formula), step the
    /// timers, then notify the display and audio collaborators. No-ops the
    /// instruction/timer portion while paused, but still presents the
    /// (unchanged) frame: pausing toggles execution without affecting input
    /// or the 60 Hz cadence.
    pub fn run_frame(
        &mut self,
        machine: &mut Machine,
        display: &mut impl Display,
        audio: &mut impl Audio,
    ) -> Result<()> {
        if !self.paused && !machine.is_stopped() {
            let target = self.target_speed as u64 * ((self.frame_number % 60) + 1) / 60;
            let mut executed = 0u64;
            while executed < target {
                if machine.step()?.is_none() {
                    break;
                }
                executed += 1;
            }
            machine.step_timers();
        }

        display.present(machine.framebuffer(), machine.is_high_res());
        audio.set_tone_enabled(machine.sound_timer() > 0);

        self.frame_number = (self.frame_number + 1) % 60;
        Ok(())
    }

    /// Monotonic clock reading suitable for computing the next frame's
    /// deadline (`Instant::now() + 1s/60`).
    pub fn next_tick(from: Instant) -> Instant {
        from + Duration::from_secs_f64(1.0 / 60.0)
    }

    /// Coarse-sleep to within ~100us of `deadline`, then spin-wait the
    /// remainder, the same two-phase strategy as `wait_until` in the
    /// source: a plain OS sleep is too imprecise for the last stretch, but
    /// spinning for a whole frame burns a core for nothing.
    pub fn wait_until(deadline: Instant) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }

        let remaining = deadline - now;
        if remaining > Duration::from_micros(100) {
            std::thread::sleep(remaining - Duration::from_micros(100));
        }

        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}
