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

//! Error taxonomy for the execution core.

use thiserror::Error;

/// Errors that can arise while loading a program or stepping the machine.
///
/// All of these are fatal to the instruction that produced them: the core
/// never retries, it unwinds the error to the caller (typically a
/// [`crate::step::StepLoop`]) which logs it and stops.
#[derive(Debug, Error)]
pub enum Error {
    /// A ROM could not be read from disk.
    #[error("failed to read ROM: {0}")]
    Io(#[from] std::io::Error),

    /// The ROM is larger than the `0x1000 - 0x200` bytes of program space.
    #[error("ROM is {len} bytes, which exceeds the permitted {max} bytes")]
    RomTooLarge { len: usize, max: usize },

    /// A font blob handed to [`crate::machine::Machine::load_font`] isn't
    /// the length the target region expects.
    #[error("font data is {len} bytes, expected exactly {expected}")]
    InvalidFont { len: usize, expected: usize },

    /// The decoder could not map an opcode to any known operation.
    #[error("unknown opcode {opcode:#06x} at pc {pc:#06x}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    /// `00EE` executed with no return address on the stack.
    #[error("stack underflow on return")]
    StackUnderflow,

    /// A `2NNN` call pushed past the configured stack depth limit.
    #[error("stack overflow: exceeded the configured limit of {limit} entries")]
    StackOverflow { limit: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;
