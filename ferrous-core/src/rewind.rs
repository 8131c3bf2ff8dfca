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

//! A bounded ring of run-length-compressed snapshots, for rewinding
//! execution by one recorded frame at a time.
//! `original_source/chip8_state.c` only stubs this out
//! (`chip8_compress_state`/`chip8_decompress_state`/`chip8_history_add` are
//! empty bodies and `chip8_rewind_state` is declared but never defined);
//! the ring discipline and compression here are original: 60 seconds of
//! history at 60 Hz, compressed with run-length on memory and framebuffer.

use std::collections::VecDeque;

use crate::framebuffer::Framebuffer;
use crate::machine::{Machine, NUM_REGISTERS};

/// 60 seconds of history at a 60 Hz frame rate.
pub const DEFAULT_CAPACITY: usize = 3600;

/// A single run in a run-length-encoded byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Run {
    byte: u8,
    len: u32,
}

fn rle_encode(bytes: &[u8]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut iter = bytes.iter();
    if let Some(&first) = iter.next() {
        let mut current = Run { byte: first, len: 1 };
        for &byte in iter {
            if byte == current.byte {
                current.len += 1;
            } else {
                runs.push(current);
                current = Run { byte, len: 1 };
            }
        }
        runs.push(current);
    }
    runs
}

fn rle_decode(runs: &[Run], out: &mut [u8]) {
    let mut pos = 0;
    for run in runs {
        let end = pos + run.len as usize;
        out[pos..end].iter_mut().for_each(|b| *b = run.byte);
        pos = end;
    }
    debug_assert_eq!(pos, out.len());
}

/// A compressed snapshot of one [`Machine`], taken once per frame.
#[derive(Debug, Clone)]
struct Snapshot {
    memory: Vec<Run>,
    framebuffer: Vec<Run>,
    registers: [u8; NUM_REGISTERS],
    i: u16,
    dt: u8,
    st: u8,
    pc: u16,
    keypad: [bool; 16],
    stack: Vec<u16>,
    stack_limit: Option<u16>,
    hires: bool,
    stopped: bool,
}

/// A ring buffer of recent [`Machine`] snapshots, for rewinding execution.
pub struct History {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Record a snapshot of `machine`, evicting the oldest entry if the
    /// ring is already full.
    pub fn push(&mut self, machine: &Machine) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(Snapshot {
            memory: rle_encode(machine.memory.as_ref()),
            framebuffer: rle_encode(machine.framebuffer.as_bytes()),
            registers: machine.registers,
            i: machine.i,
            dt: machine.dt,
            st: machine.st,
            pc: machine.pc,
            keypad: machine.keypad,
            stack: machine.stack.as_slice().to_vec(),
            stack_limit: machine.config.stack_limit,
            hires: machine.hires,
            stopped: machine.stopped,
        });
    }

    /// Pop the most recent snapshot and apply it to `machine`, rewinding
    /// one recorded frame. Leaves `machine` untouched and returns `false`
    /// if history is empty.
    pub fn rewind(&mut self, machine: &mut Machine) -> bool {
        let snapshot = match self.entries.pop_back() {
            Some(s) => s,
            None => return false,
        };

        rle_decode(&snapshot.memory, machine.memory.as_mut());

        let mut fb_bytes = [0u8; crate::framebuffer::SIZE];
        rle_decode(&snapshot.framebuffer, &mut fb_bytes);
        let mut framebuffer = Framebuffer::new();
        framebuffer.load_bytes(&fb_bytes);
        machine.framebuffer = framebuffer;

        machine.registers = snapshot.registers;
        machine.i = snapshot.i;
        machine.dt = snapshot.dt;
        machine.st = snapshot.st;
        machine.pc = snapshot.pc;
        machine.keypad = snapshot.keypad;
        machine.stack =
            crate::stack::Stack::from_entries(snapshot.stack, crate::stack::INITIAL_CAPACITY, snapshot.stack_limit);
        machine.hires = snapshot.hires;
        machine.stopped = snapshot.stopped;

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn rewind_restores_prior_pc_and_registers() {
        let mut machine = Machine::new(Config::default());
        let mut history = History::new(DEFAULT_CAPACITY);

        history.push(&machine);
        machine.load_rom(&[0x60, 0x2a]).unwrap();
        machine.step().unwrap();
        assert_eq!(machine.registers()[0], 0x2a);
        assert_eq!(machine.pc(), 0x202);

        assert!(history.rewind(&mut machine));
        assert_eq!(machine.pc(), 0x200);
        assert_eq!(machine.registers()[0], 0);
    }

    #[test]
    fn rewind_on_empty_history_is_a_noop() {
        let mut machine = Machine::new(Config::default());
        let mut history = History::new(DEFAULT_CAPACITY);
        assert!(!history.rewind(&mut machine));
        assert_eq!(machine.pc(), 0x200);
    }

    #[test]
    fn evicts_oldest_entry_once_capacity_is_reached() {
        let machine = Machine::new(Config::default());
        let mut history = History::new(4);
        for _ in 0..10 {
            history.push(&machine);
        }
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn run_length_round_trips_sparse_and_dense_data() {
        let mut sparse = [0u8; 1024];
        sparse[100] = 0xFF;
        sparse[900] = 0x0F;

        let runs = rle_encode(&sparse);
        let mut out = [0u8; 1024];
        rle_decode(&runs, &mut out);
        assert_eq!(out, sparse);

        let dense: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let runs = rle_encode(&dense);
        let mut out = vec![0u8; dense.len()];
        rle_decode(&runs, &mut out);
        assert_eq!(out, dense);
    }
}
