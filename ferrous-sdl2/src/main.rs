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

use std::{fs, process, time::Instant};

use clap::{App, Arg};
use sdl2::{event::Event, keyboard::Keycode};

use ferrous_core::config::Config;
use ferrous_core::machine::Machine;
use ferrous_core::step::StepLoop;

mod audio;
mod display;

fn main() {
    let matches = App::new("ferrous-sdl2")
        .version("0.1.0")
        .about("An SDL2 frontend for the ferrous-core (super) Chip-8 interpreter.")
        .arg(
            Arg::with_name("file")
                .help("The ROM file to execute")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("speed")
                .help("Instructions executed per second")
                .short("i")
                .long("speed")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("scale")
                .help("Integer scale factor for the window")
                .short("x")
                .long("scale")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("shift-uses-vy")
                .help("8XY6/8XYE source their operand from VY instead of VX")
                .long("shift-uses-vy"),
        )
        .arg(
            Arg::with_name("jump-uses-vx")
                .help("BNNN uses VX instead of V0")
                .long("jump-uses-vx"),
        )
        .arg(
            Arg::with_name("load-store-increments-i")
                .help("FX55/FX65 post-increment I by X + 1")
                .long("load-store-increments-i"),
        )
        .get_matches();

    let path = matches.value_of("file").unwrap();
    let rom = fs::read(path).unwrap_or_else(|e| {
        eprintln!("could not read ROM {path}: {e}");
        process::exit(1);
    });

    let mut config = Config::default();
    if let Some(speed) = matches.value_of("speed") {
        config.target_speed = speed.parse().unwrap_or(config.target_speed);
    }
    if let Some(scale) = matches.value_of("scale") {
        config.default_scale = scale.parse().unwrap_or(config.default_scale);
    }
    config.shift_uses_vy = matches.is_present("shift-uses-vy");
    config.jump_uses_vx = matches.is_present("jump-uses-vx");
    config.load_store_increments_i = matches.is_present("load-store-increments-i");

    let mut machine = Machine::new(config);
    if let Err(e) = machine.load_rom(&rom) {
        eprintln!("{e}");
        process::exit(1);
    }

    let sdl_context = sdl2::init().unwrap();
    let mut event_pump = sdl_context.event_pump().unwrap();
    let mut renderer = display::Renderer::new(&sdl_context, config.default_scale);
    let mut beeper = audio::Beeper::new(&sdl_context);
    let mut step_loop = StepLoop::new(config.target_speed);

    'running: loop {
        let deadline = StepLoop::next_tick(Instant::now());

        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'running,
                Event::KeyDown {
                    keycode: Some(Keycode::P),
                    ..
                } => step_loop.toggle_paused(),
                Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                _ => {}
            }
        }

        machine.reset_keys();
        for keycode in event_pump.keyboard_state().pressed_scancodes().filter_map(Keycode::from_scancode) {
            if let Some(key) = hex_key(keycode) {
                machine.set_key(key, true);
            }
        }

        if let Err(e) = step_loop.run_frame(&mut machine, &mut renderer, &mut beeper) {
            eprintln!("{e}");
            process::exit(1);
        }

        StepLoop::wait_until(deadline);
    }

    process::exit(0);
}

/// Maps the standard physical keyboard layout onto hex keypad indices.
fn hex_key(key: Keycode) -> Option<usize> {
    match key {
        Keycode::Num1 => Some(0x1),
        Keycode::Num2 => Some(0x2),
        Keycode::Num3 => Some(0x3),
        Keycode::Num4 => Some(0xC),
        Keycode::Q => Some(0x4),
        Keycode::W => Some(0x5),
        Keycode::E => Some(0x6),
        Keycode::R => Some(0xD),
        Keycode::A => Some(0x7),
        Keycode::S => Some(0x8),
        Keycode::D => Some(0x9),
        Keycode::F => Some(0xE),
        Keycode::Z => Some(0xA),
        Keycode::X => Some(0x0),
        Keycode::C => Some(0xB),
        Keycode::V => Some(0xF),
        _ => None,
    }
}
