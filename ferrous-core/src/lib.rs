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

//! A (super) Chip-8 interpreter execution core.
//!
//! # Example
//!
//! ```rust
//! use ferrous_core::config::Config;
//! use ferrous_core::machine::Machine;
//!
//! let mut machine = Machine::new(Config::default());
//! machine.load_rom(&[0x00, 0xE0]).unwrap();
//! machine.step().unwrap();
//! ```

pub mod config;
pub mod decode;
pub mod diff;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod machine;
pub mod rewind;
pub mod serialize;
pub mod stack;
pub mod step;

mod ops;

pub use config::Config;
pub use error::{Error, Result};
pub use machine::Machine;
