use super::ipc::*;
use crate::core::display::*;
use crate::core::error::*;

use log::*;
use std::sync::{Arc, Mutex};

const CHANNEL_NAMES: [&str; 4] = ["R", "G", "B", "A"];

struct TevState {
    chan: IPCChannel,
    /// Resolution of the image last created on the viewer.
    resolution: Option<[usize; 2]>,
}

/// Streams published images to a tev viewer over TCP.
///
/// The viewer image is (re)created whenever the resolution changes, then
/// each publication is sent as a sequence of tile updates.
pub struct TevDisplay {
    title: String,
    state: Mutex<TevState>,
}

impl TevDisplay {
    pub fn connect(hostname: &str, title: &str) -> Result<Self, PreviewError> {
        let chan = IPCChannel::new(hostname)?;
        info!("streaming preview to {}", chan.addr());
        Ok(TevDisplay {
            title: String::from(title),
            state: Mutex::new(TevState {
                chan,
                resolution: None,
            }),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn to_floats(image: &DisplayableImage) -> Vec<f32> {
        let mut buffer = Vec::with_capacity(image.pixels().len() * CHANNEL_NAMES.len());
        for i in 0..image.pixels().len() {
            let [a, r, g, b] = image.channels(i);
            for c in [r, g, b, a] {
                buffer.push(c as f32 / 255.0);
            }
        }
        buffer
    }
}

impl DisplaySink for TevDisplay {
    fn publish(&self, image: Arc<DisplayableImage>) -> Result<(), PreviewError> {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        let reconnected = !state.chan.is_connected();
        if reconnected || state.resolution != Some(image.resolution()) {
            let msg = IPCGen::create_image(
                &self.title,
                image.width() as u32,
                image.height() as u32,
                &CHANNEL_NAMES,
            );
            state.resolution = None;
            state.chan.send(&msg)?;
            state.resolution = Some(image.resolution());
            debug!(
                "created viewer image {}x{}",
                image.width(),
                image.height()
            );
        }

        let floats = TevDisplay::to_floats(&image);
        let tiles = gen_tiles(image.width(), image.height(), CHANNEL_NAMES.len(), &floats)?;
        for tile in tiles {
            let msg = IPCGen::update_image(
                &self.title,
                tile.x,
                tile.y,
                tile.width,
                tile.height,
                &tile.buffer,
                &CHANNEL_NAMES,
            );
            if let Err(e) = state.chan.send(&msg) {
                state.resolution = None;
                return Err(e);
            }
        }
        Ok(())
    }
}
