use crate::core::display::*;
use crate::core::error::*;
use crate::core::imageio::*;

use log::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Writes every published image to `<output_dir>/<counter>.png`.
pub struct SequentialDisplay {
    count: AtomicU64,
    output_dir: PathBuf,
}

impl SequentialDisplay {
    pub fn new(output_dir: &Path) -> Result<Self, PreviewError> {
        fs::create_dir_all(output_dir)?;
        info!("writing frames to {}", output_dir.display());
        Ok(SequentialDisplay {
            count: AtomicU64::new(0),
            output_dir: output_dir.to_path_buf(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn frames_written(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.output_dir.join(format!("{:08}.png", index))
    }
}

impl DisplaySink for SequentialDisplay {
    fn publish(&self, image: Arc<DisplayableImage>) -> Result<(), PreviewError> {
        let count = self.count.fetch_add(1, Ordering::Relaxed);
        let path = self.frame_path(count);
        write_image(&path, &image)?;
        trace!("wrote {}", path.display());
        Ok(())
    }
}
