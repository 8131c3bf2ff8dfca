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

//! Instruction semantics, split one module for the instructions every
//! CHIP-8 variant shares, one for the SUPER-CHIP additions. Both just add
//! `impl Machine` blocks; [`crate::machine::Machine::step`] is the single
//! dispatch point.

mod schip;
mod standard;
