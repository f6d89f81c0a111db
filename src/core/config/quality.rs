use serde::{Deserialize, Serialize};

/// Resolution and sampling presets.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Quality {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct QualitySettings {
    pub horizontal_resolution: usize,
    pub vertical_resolution: usize,
    pub maximum_iteration_count: usize,
    pub subpixels_per_pixel: usize,
    pub samples_per_subpixel: usize,
}

impl Quality {
    pub fn settings(&self) -> QualitySettings {
        match self {
            Quality::Low => QualitySettings {
                horizontal_resolution: 640,
                vertical_resolution: 360,
                maximum_iteration_count: 8,
                subpixels_per_pixel: 1,
                samples_per_subpixel: 2,
            },
            Quality::Medium => QualitySettings {
                horizontal_resolution: 1280,
                vertical_resolution: 720,
                maximum_iteration_count: 48,
                subpixels_per_pixel: 2,
                samples_per_subpixel: 2,
            },
            Quality::High => QualitySettings {
                horizontal_resolution: 1920,
                vertical_resolution: 1080,
                maximum_iteration_count: 2048,
                subpixels_per_pixel: 4,
                samples_per_subpixel: 128,
            },
        }
    }
}
