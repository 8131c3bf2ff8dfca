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

//! Per-field state comparison for behavioral tests. Deliberately not a port of
//! `original_source/src/test.c`/`tests.c`'s assertion macros, which are
//! tied to a C string-formatting convention that has no Rust equivalent
//! worth imitating. What's ported instead is the idea: compare a machine
//! against the expected state one field at a time and report exactly which
//! fields disagree, rather than a single opaque `assert_eq!` on the whole
//! struct.

use std::fmt;

use crate::machine::Machine;

/// One field that differed between two [`Machine`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub field: &'static str,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// Compare every field of a machine's data model between `expected` and
/// `actual`, returning one [`FieldDiff`] per disagreement. An empty result
/// means the two machines are equivalent.
///
/// `memory` and `framebuffer` report only the first differing index rather
/// than the full 4096/1024-byte contents, since the common case during
/// debugging is a handful of stray bytes, not a wholesale mismatch.
pub fn compare(expected: &Machine, actual: &Machine) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();

    if let Some(index) = first_difference(expected.memory.as_ref(), actual.memory.as_ref()) {
        diffs.push(FieldDiff {
            field: "memory",
            expected: format!("[{index}] = {:#04x}", expected.memory[index]),
            actual: format!("[{index}] = {:#04x}", actual.memory[index]),
        });
    }

    if let Some(index) = first_difference(expected.framebuffer.as_bytes(), actual.framebuffer.as_bytes()) {
        diffs.push(FieldDiff {
            field: "framebuffer",
            expected: format!("[{index}] = {:#04x}", expected.framebuffer.as_bytes()[index]),
            actual: format!("[{index}] = {:#04x}", actual.framebuffer.as_bytes()[index]),
        });
    }

    if expected.registers != actual.registers {
        diffs.push(FieldDiff {
            field: "registers",
            expected: format!("{:02x?}", expected.registers),
            actual: format!("{:02x?}", actual.registers),
        });
    }

    push_if_ne(&mut diffs, "i", expected.i, actual.i);
    push_if_ne(&mut diffs, "dt", expected.dt, actual.dt);
    push_if_ne(&mut diffs, "st", expected.st, actual.st);
    push_if_ne(&mut diffs, "pc", expected.pc, actual.pc);
    push_if_ne(&mut diffs, "hires", expected.hires, actual.hires);
    push_if_ne(&mut diffs, "stopped", expected.stopped, actual.stopped);

    if expected.keypad != actual.keypad {
        diffs.push(FieldDiff {
            field: "keypad",
            expected: format!("{:?}", expected.keypad),
            actual: format!("{:?}", actual.keypad),
        });
    }

    if expected.stack.as_slice() != actual.stack.as_slice() {
        diffs.push(FieldDiff {
            field: "stack",
            expected: format!("{:04x?}", expected.stack.as_slice()),
            actual: format!("{:04x?}", actual.stack.as_slice()),
        });
    }

    if expected.rpl_flags != actual.rpl_flags {
        diffs.push(FieldDiff {
            field: "rpl_flags",
            expected: format!("{:02x?}", expected.rpl_flags),
            actual: format!("{:02x?}", actual.rpl_flags),
        });
    }

    diffs
}

fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter().zip(b.iter()).position(|(x, y)| x != y)
}

fn push_if_ne<T: PartialEq + fmt::Debug>(diffs: &mut Vec<FieldDiff>, field: &'static str, expected: T, actual: T) {
    if expected != actual {
        diffs.push(FieldDiff {
            field,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn identical_machines_have_no_diffs() {
        let a = Machine::new(Config::default());
        let b = Machine::new(Config::default());
        assert!(compare(&a, &b).is_empty());
    }

    #[test]
    fn reports_pc_and_register_divergence() {
        let a = Machine::new(Config::default());
        let mut b = Machine::new(Config::default());
        b.load_rom(&[0x60, 0x2a]).unwrap();
        b.step().unwrap();

        let diffs = compare(&a, &b);
        let fields: Vec<&str> = diffs.iter().map(|d| d.field).collect();
        assert!(fields.contains(&"pc"));
        assert!(fields.contains(&"registers"));
    }

    #[test]
    fn pinpoints_first_differing_memory_byte() {
        let a = Machine::new(Config::default());
        let mut b = Machine::new(Config::default());
        b.load_rom(&[0x00, 0x00, 0xAB]).unwrap();

        let diffs = compare(&a, &b);
        let memory_diff = diffs.iter().find(|d| d.field == "memory").unwrap();
        assert!(memory_diff.expected.starts_with("[514]"));
    }
}
