use crate::core::error::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output channel produced by the engine.
#[derive(
    Debug, Default, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    Colors,
    Wireframe,
    UvCoords,
    Depths,
    SurfaceNormals,
    RayIncidenceAngle,
    RayDirection,
    Iterations,
    #[default]
    RenderTime,
}

impl RenderMode {
    pub const ALL: [RenderMode; 9] = [
        RenderMode::Colors,
        RenderMode::Wireframe,
        RenderMode::UvCoords,
        RenderMode::Depths,
        RenderMode::SurfaceNormals,
        RenderMode::RayIncidenceAngle,
        RenderMode::RayDirection,
        RenderMode::Iterations,
        RenderMode::RenderTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Colors => "colors",
            RenderMode::Wireframe => "wireframe",
            RenderMode::UvCoords => "uv-coords",
            RenderMode::Depths => "depths",
            RenderMode::SurfaceNormals => "surface-normals",
            RenderMode::RayIncidenceAngle => "ray-incidence-angle",
            RenderMode::RayDirection => "ray-direction",
            RenderMode::Iterations => "iterations",
            RenderMode::RenderTime => "render-time",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RenderMode {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_' && *c != ' ')
            .flat_map(|c| c.to_lowercase())
            .collect();
        for mode in RenderMode::ALL.iter() {
            let name: String = mode.name().chars().filter(|c| *c != '-').collect();
            if name == key {
                return Ok(*mode);
            }
        }
        let msg = format!("unknown render mode \"{}\"", s);
        Err(PreviewError::config(&msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!(
            "surface-normals".parse::<RenderMode>(),
            Ok(RenderMode::SurfaceNormals)
        );
        assert_eq!("SurfaceNormals".parse::<RenderMode>(), Ok(RenderMode::SurfaceNormals));
        assert_eq!("render_time".parse::<RenderMode>(), Ok(RenderMode::RenderTime));
        assert!("sepia".parse::<RenderMode>().is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for mode in RenderMode::ALL.iter() {
            assert_eq!(mode.name().parse::<RenderMode>(), Ok(*mode));
        }
    }
}
