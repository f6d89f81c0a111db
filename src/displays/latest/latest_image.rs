use crate::core::display::*;
use crate::core::error::*;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Sink that keeps only the most recent image, for a UI to pick up.
#[derive(Debug, Default)]
pub struct LatestImage {
    image: RwLock<Option<Arc<DisplayableImage>>>,
    count: AtomicU64,
}

impl LatestImage {
    pub fn new() -> Self {
        LatestImage::default()
    }

    pub fn latest(&self) -> Option<Arc<DisplayableImage>> {
        match self.image.read() {
            Ok(image) => image.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of images published so far.
    pub fn publications(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl DisplaySink for LatestImage {
    fn publish(&self, image: Arc<DisplayableImage>) -> Result<(), PreviewError> {
        let mut slot = match self.image.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(image);
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_latest_only() {
        let sink = LatestImage::new();
        assert!(sink.latest().is_none());
        let first = Arc::new(DisplayableImage::new(1, 1, vec![0xFF000000]).unwrap());
        let second = Arc::new(DisplayableImage::new(1, 1, vec![0xFFFFFFFF]).unwrap());
        sink.publish(Arc::clone(&first)).unwrap();
        sink.publish(Arc::clone(&second)).unwrap();
        assert_eq!(sink.publications(), 2);
        assert_eq!(sink.latest().unwrap().pixel(0, 0), 0xFFFFFFFF);
        // The sink dropped its claim on the first image.
        assert_eq!(Arc::strong_count(&first), 1);
    }
}
