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

use sdl2::{pixels::Color, rect::Rect, render::Canvas, video::Window, Sdl};

use ferrous_core::framebuffer::{Framebuffer, DISPLAY_HEIGHT, DISPLAY_WIDTH, STRIDE};
use ferrous_core::step::Display;

/// Renders the packed framebuffer at its full physical 128x64 resolution,
/// scaled up by a fixed factor. The interpreter always exposes the full
/// physical surface and leaves logical-vs-physical presentation to the
/// renderer, so low-resolution mode just shows as doubled pixels rather
/// than a separately-sized window.
pub struct Renderer {
    canvas: Canvas<Window>,
    scale: i32,
}

impl Renderer {
    pub fn new(context: &Sdl, scale: u32) -> Self {
        let video_sys = context.video().unwrap();
        let window = video_sys
            .window(
                "ferrous-sdl2",
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .unwrap();

        let mut canvas = window.into_canvas().build().unwrap();
        canvas.set_draw_color(Color::RGB(0, 0, 0));
        canvas.clear();
        canvas.present();

        Self {
            canvas,
            scale: scale as i32,
        }
    }
}

impl Display for Renderer {
    fn present(&mut self, framebuffer: &Framebuffer, _hires: bool) {
        let bytes = framebuffer.as_bytes();

        for row in 0..DISPLAY_HEIGHT {
            for col in 0..DISPLAY_WIDTH {
                let byte = bytes[row * STRIDE + col / 8];
                let bit = (byte >> (7 - (col % 8))) & 0x1;

                let color = if bit == 0 {
                    Color::RGB(0, 0, 0)
                } else {
                    Color::RGB(255, 255, 255)
                };

                self.canvas.set_draw_color(color);

                let rect = Rect::new(
                    col as i32 * self.scale,
                    row as i32 * self.scale,
                    self.scale as u32,
                    self.scale as u32,
                );
                self.canvas.fill_rect(rect).unwrap();
            }
        }

        self.canvas.present();
    }
}
