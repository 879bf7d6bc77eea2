//! Core types shared by the loader and the frame loop: colour, placement, errors.

pub use glam::{Mat4, Quat, Vec3, vec3};

pub mod color;
pub mod placement;

pub use color::Rgb8;
pub use placement::Placement;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_placement_is_identity_matrix() {
        let p = Placement::origin();
        assert_eq!(p.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn placement_maps_ground_y_onto_world_z() {
        let p = Placement::new(3.0, -4.0, 0.0);
        let m = p.matrix().to_cols_array();
        // Translation column: (x, 0, y).
        assert!((m[12] - 3.0).abs() < 1e-6);
        assert!(m[13].abs() < 1e-6);
        assert!((m[14] + 4.0).abs() < 1e-6);
    }

    #[test]
    fn yaw_rotates_about_up_axis() {
        let p = Placement::new(0.0, 0.0, 90.0);
        let v = p.matrix().transform_point3(Vec3::X);
        assert!((v - vec3(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn non_finite_placement_is_rejected() {
        let err = Placement::try_new(f32::NAN, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, CoreError::NonFinite { field: "x", .. }));
    }
}
