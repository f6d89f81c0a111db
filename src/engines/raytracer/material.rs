use crate::core::base::*;
use crate::core::spectrum::*;

/// Surface response used by the colour mode.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Material {
    pub diffuse_color: Argb,
    pub specular_color: Argb,
    pub emissive_color: Argb,
    pub specularity: Float,
    pub specular_exponent: Float,
    /// Fraction of the reflected ray's colour mixed into the surface colour.
    pub reflectiveness: Float,
}

impl Default for Material {
    fn default() -> Self {
        Material::diffuse(Argb::WHITE)
    }
}

impl Material {
    pub fn diffuse(color: Argb) -> Self {
        Material {
            diffuse_color: color,
            specular_color: Argb::WHITE,
            emissive_color: Argb::TRANSPARENT,
            specularity: 0.0,
            specular_exponent: 1.0,
            reflectiveness: 0.0,
        }
    }

    pub fn reflective(color: Argb, reflectiveness: Float) -> Self {
        Material {
            diffuse_color: color,
            specular_color: Argb::WHITE,
            emissive_color: Argb::TRANSPARENT,
            specularity: 0.5,
            specular_exponent: 32.0,
            reflectiveness: Float::clamp(reflectiveness, 0.0, 1.0),
        }
    }

    pub fn emissive(color: Argb) -> Self {
        Material {
            diffuse_color: Argb::TRANSPARENT,
            specular_color: Argb::TRANSPARENT,
            emissive_color: color,
            specularity: 0.0,
            specular_exponent: 1.0,
            reflectiveness: 0.0,
        }
    }

    pub fn is_reflective(&self) -> bool {
        self.reflectiveness > 0.0
    }
}
