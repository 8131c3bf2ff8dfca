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

//! SUPER-CHIP additions layered on top of the classic instruction set:
//! scrolling, the high-resolution toggle, halt, the big font, and RPL user
//! flags. Ported from the `00BN`/`00CN`/`00DN`/`00FB`/`00FC`/`00FD`/`00FE`/
//! `00FF`/`FX30`/`FX75`/`FX85` handlers in
//! `original_source/src/chip8_exec.c`.

use crate::machine::Machine;

impl Machine {
    fn scroll_rows(&self, n: u8) -> usize {
        if !self.hires && self.config.lores_scroll_halves_n {
            (n / 2) as usize
        } else {
            n as usize
        }
    }

    /// `00BN` / `00DN`.
    pub(crate) fn op_scroll_up(&mut self, n: u8) {
        let rows = self.scroll_rows(n);
        self.framebuffer.scroll_up(rows);
    }

    /// `00CN`.
    pub(crate) fn op_scroll_down(&mut self, n: u8) {
        let rows = self.scroll_rows(n);
        self.framebuffer.scroll_down(rows);
    }

    pub(crate) fn op_scroll_right(&mut self) {
        self.framebuffer.scroll_right_nibble();
    }

    pub(crate) fn op_scroll_left(&mut self) {
        self.framebuffer.scroll_left_nibble();
    }

    pub(crate) fn op_halt(&mut self) {
        self.stopped = true;
    }

    pub(crate) fn op_lores(&mut self) {
        self.hires = false;
    }

    pub(crate) fn op_hires(&mut self) {
        self.hires = true;
    }

    pub(crate) fn op_font_addr_high(&mut self, x: usize) {
        let digit = (self.registers[x] & 0xF) as u16;
        self.i = crate::font::HIGH_RES_FONT_OFFSET + digit * self.digit_sprite_len(true);
    }

    /// `FX75`: store `V0..=VX` into the RPL save area. `X` is clamped to
    /// the available flag count rather than panicking on out-of-range ROMs,
    /// matching the defined-but-unusual-input stance taken elsewhere on
    /// out-of-range arithmetic (wraparound, not a crash).
    pub(crate) fn op_store_flags(&mut self, x: usize) {
        let count = (x + 1).min(self.rpl_flags.len());
        self.rpl_flags[0..count].copy_from_slice(&self.registers[0..count]);
    }

    pub(crate) fn op_load_flags(&mut self, x: usize) {
        let count = (x + 1).min(self.rpl_flags.len());
        self.registers[0..count].copy_from_slice(&self.rpl_flags[0..count]);
    }
}
