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

//! Save state encoding: a fixed, unframed concatenation of every field
//! with no magic bytes and no version tag, byte-for-byte identical to
//! `chip8_dump_state`/`chip8_load_state` in `original_source/chip8_state.c`
//! and the little-endian `serialize_16`/`deserialize_16` helpers they call.
//! A generic `serde` format would add a header or length prefix neither
//! side of that format has room for, so this is hand-rolled on purpose.

use crate::config::Config;
use crate::framebuffer::{Framebuffer, SIZE as FRAMEBUFFER_SIZE};
use crate::machine::{Machine, MEMORY_SIZE, NUM_KEYS, NUM_REGISTERS, NUM_RPL_FLAGS};
use crate::stack::Stack;

/// Serialize `machine` to its exact fixed byte layout: memory, framebuffer,
/// registers, `I`, delay, sound, `PC`, keys, stack
/// capacity, stack length, then that many stack entries. RPL flags and
/// resolution/halted flags are intentionally outside this format, mirroring
/// the source, which never serializes them either.
pub fn dump(machine: &Machine) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        MEMORY_SIZE + FRAMEBUFFER_SIZE + NUM_REGISTERS + 2 + 1 + 1 + 2 + NUM_KEYS + 2 + 2
            + machine.stack.len() * 2,
    );

    out.extend_from_slice(machine.memory.as_ref());
    out.extend_from_slice(machine.framebuffer.as_bytes());
    out.extend_from_slice(&machine.registers);
    out.extend_from_slice(&machine.i.to_le_bytes());
    out.push(machine.dt);
    out.push(machine.st);
    out.extend_from_slice(&machine.pc.to_le_bytes());
    out.extend(machine.keypad.iter().map(|&pressed| pressed as u8));
    out.extend_from_slice(&(machine.stack.capacity() as u16).to_le_bytes());
    out.extend_from_slice(&(machine.stack.len() as u16).to_le_bytes());
    for entry in machine.stack.as_slice() {
        out.extend_from_slice(&entry.to_le_bytes());
    }

    out
}

/// Errors produced while decoding a dump buffer. Unlike [`crate::error::Error`]
/// these never arise from interpreting a ROM; they mean the buffer is
/// truncated or was produced by something else entirely.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("save state buffer is truncated: needed {needed} more bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.bytes.len() - self.pos < len {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed: len - (self.bytes.len() - self.pos),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16_le(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

/// Restore a [`Machine`] from a buffer produced by [`dump`]. Quirks
/// configuration, RPL flags, the resolution flag, and the halted flag are
/// not part of the format and are carried over unchanged from `template`
/// (ordinarily the machine the caller is about to overwrite).
pub fn restore(bytes: &[u8], config: Config) -> Result<Machine, DecodeError> {
    let mut reader = Reader::new(bytes);

    let mut memory = Box::new([0u8; MEMORY_SIZE]);
    memory.copy_from_slice(reader.take(MEMORY_SIZE)?);

    let mut fb_bytes = [0u8; FRAMEBUFFER_SIZE];
    fb_bytes.copy_from_slice(reader.take(FRAMEBUFFER_SIZE)?);
    let mut framebuffer = Framebuffer::new();
    framebuffer.load_bytes(&fb_bytes);

    let mut registers = [0u8; NUM_REGISTERS];
    registers.copy_from_slice(reader.take(NUM_REGISTERS)?);

    let i = reader.u16_le()?;
    let dt = reader.u8()?;
    let st = reader.u8()?;
    let pc = reader.u16_le()?;

    let mut keypad = [false; NUM_KEYS];
    for slot in keypad.iter_mut() {
        *slot = reader.u8()? != 0;
    }

    let capacity = reader.u16_le()? as usize;
    let sp = reader.u16_le()?;
    let mut entries = Vec::with_capacity(sp as usize);
    for _ in 0..sp {
        entries.push(reader.u16_le()?);
    }
    let stack = Stack::from_entries(entries, capacity, config.stack_limit);

    Ok(Machine {
        memory,
        framebuffer,
        registers,
        i,
        dt,
        st,
        pc,
        keypad,
        stack,
        rpl_flags: [0; NUM_RPL_FLAGS],
        hires: false,
        stopped: false,
        fx0a_latch: [false; NUM_KEYS],
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_freshly_reset_machine() {
        let machine = Machine::new(Config::default());
        let bytes = dump(&machine);
        let restored = restore(&bytes, Config::default()).unwrap();
        assert_eq!(dump(&restored), bytes);
    }

    #[test]
    fn round_trips_after_running_a_program_and_pushing_the_stack() {
        let mut machine = Machine::new(Config::default());
        machine.load_rom(&[0x22, 0x08]).unwrap();
        machine.step().unwrap();
        assert_eq!(machine.pc(), 0x208);

        let bytes = dump(&machine);
        let restored = restore(&bytes, Config::default()).unwrap();
        assert_eq!(dump(&restored), bytes);
        assert_eq!(restored.pc(), 0x208);
    }

    #[test]
    fn rejects_truncated_buffers() {
        let machine = Machine::new(Config::default());
        let mut bytes = dump(&machine);
        bytes.truncate(10);
        assert!(matches!(
            restore(&bytes, Config::default()),
            Err(DecodeError::Truncated { .. })
        ));
    }
}
