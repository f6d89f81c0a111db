use super::display::*;
use crate::core::error::*;

use log::*;
use std::sync::Arc;

/// Fans each published image out to several sinks.
#[derive(Default)]
pub struct MultipleDisplay {
    displays: Vec<Arc<dyn DisplaySink>>,
}

impl MultipleDisplay {
    pub fn new() -> Self {
        MultipleDisplay::default()
    }

    pub fn add_display(&mut self, display: &Arc<dyn DisplaySink>) {
        self.displays.push(Arc::clone(display));
    }

    pub fn len(&self) -> usize {
        return self.displays.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.displays.is_empty();
    }
}

impl DisplaySink for MultipleDisplay {
    /// Every sink sees the image; the first failure is reported afterwards.
    fn publish(&self, image: Arc<DisplayableImage>) -> Result<(), PreviewError> {
        let mut first_error = None;
        for d in self.displays.iter() {
            if let Err(e) = d.publish(Arc::clone(&image)) {
                debug!("display sink failed: {}", e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
