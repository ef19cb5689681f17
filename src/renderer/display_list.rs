//! Recording renderer
//!
//! Keeps the composited command stream of the last frame. Used headless and
//! by tests to inspect what would have been drawn, and in which order.

use serde::Serialize;

use super::{DrawCommand, Renderer, Surface};

/// Commands submitted to one layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayList {
    pub z: i32,
    pub commands: Vec<DrawCommand>,
}

impl Surface for DisplayList {
    fn submit(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }
}

#[derive(Debug, Default)]
pub struct DisplayListRenderer {
    layers: Vec<DisplayList>,
    frames: u64,
}

impl DisplayListRenderer {
    /// Layers of the last composited frame, bottom first
    pub fn layers(&self) -> &[DisplayList] {
        &self.layers
    }

    /// Flattened commands in paint order
    pub fn commands(&self) -> Vec<&DrawCommand> {
        self.layers.iter().flat_map(|l| l.commands.iter()).collect()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DisplayListRenderer {
    type Layer = DisplayList;

    fn begin_layer(&mut self, z: i32) -> DisplayList {
        DisplayList {
            z,
            commands: Vec::new(),
        }
    }

    fn composite(&mut self, mut layers: Vec<(i32, DisplayList)>) {
        layers.sort_by_key(|(z, _)| *z);
        self.layers = layers.into_iter().map(|(_, layer)| layer).collect();
        self.frames += 1;
    }
}
