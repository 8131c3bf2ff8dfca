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

//! Host-configurable behavior switches ("quirks").
//!
//! The source the interpreter core descends from left several of these
//! inconsistently hard-coded between its two opcode-table revisions. Rather
//! than pick one, every quirk is exposed here and defaults to the more
//! modern/SUPER-CHIP-accurate behavior.

/// Tunables for a [`crate::machine::Machine`] and its [`crate::step::StepLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Instructions executed per second by the step loop. Default 500.
    pub target_speed: u32,

    /// Initial integer scale factor suggested to the renderer. Default 10.
    pub default_scale: u32,

    /// `8XY6`/`8XYE` source their operand from `VY` instead of `VX`.
    pub shift_uses_vy: bool,

    /// `BNNN` uses `VX` (decoded from the opcode's high nibble) as the jump
    /// base register instead of `V0`.
    pub jump_uses_vx: bool,

    /// `FX55`/`FX65` post-increment `I` by `X + 1` after the transfer.
    /// Default `false`: the source leaves `I` untouched, which is the
    /// baseline behavior.
    pub load_store_increments_i: bool,

    /// `FX0A` resolves on key release rather than key press.
    pub wait_key_on_release: bool,

    /// `00BN`/`00DN`/`00CN` scroll by `N / 2` physical rows while in
    /// low-resolution mode, instead of `N` rows.
    pub lores_scroll_halves_n: bool,

    /// Optional hard cap on stack depth (classic CHIP-8 allowed 16 levels).
    /// `None` means the stack grows without a hard limit.
    pub stack_limit: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_speed: 500,
            default_scale: 10,
            shift_uses_vy: false,
            jump_uses_vx: false,
            load_store_increments_i: false,
            wait_key_on_release: false,
            lores_scroll_halves_n: false,
            stack_limit: None,
        }
    }
}
