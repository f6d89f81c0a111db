use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CADENCE: Duration = Duration::from_millis(8);
pub const DEFAULT_OUTPUT_PATH: &str = "./render.png";

/// Front end settings that are not part of a render request. Owned by the
/// caller and handed to whatever needs them; there is no process-wide copy.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewOptions {
    /// Interval between compositor ticks.
    pub cadence: Duration,
    /// Where the final composited image is saved.
    pub output_path: PathBuf,
    /// Every published frame is also written here when set.
    pub frames_dir: Option<PathBuf>,
    /// `host:port` of a tev viewer.
    pub display_server: Option<String>,
    pub quiet: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        PreviewOptions {
            cadence: DEFAULT_CADENCE,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            frames_dir: None,
            display_server: None,
            quiet: false,
        }
    }
}

impl PreviewOptions {
    pub fn new() -> Self {
        PreviewOptions::default()
    }

    /// Zero cadence would spin the compositor thread.
    pub fn with_cadence_ms(self, ms: u64) -> Self {
        PreviewOptions {
            cadence: Duration::from_millis(u64::max(1, ms)),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence_floor() {
        let o = PreviewOptions::new().with_cadence_ms(0);
        assert_eq!(o.cadence, Duration::from_millis(1));
        assert_eq!(PreviewOptions::default().cadence, Duration::from_millis(8));
    }
}
