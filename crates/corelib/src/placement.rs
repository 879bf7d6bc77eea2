use crate::{CoreError, CoreResult, Mat4, Quat, vec3};

/// Where an object sits on the ground plane.
///
/// `x`/`y` are ground-plane coordinates; the renderer maps `y` onto world Z.
/// `rotation_z` is the yaw in degrees, applied about the world up axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub rotation_z: f32,
}

impl Placement {
    #[inline]
    pub const fn origin() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation_z: 0.0,
        }
    }

    #[inline]
    pub const fn new(x: f32, y: f32, rotation_z: f32) -> Self {
        Self { x, y, rotation_z }
    }

    /// Like [`Placement::new`] but rejects NaN and infinities.
    pub fn try_new(x: f32, y: f32, rotation_z: f32) -> CoreResult<Self> {
        for (field, value) in [("x", x), ("y", y), ("rotation_z", rotation_z)] {
            if !value.is_finite() {
                return Err(CoreError::NonFinite { field, value });
            }
        }
        Ok(Self::new(x, y, rotation_z))
    }

    /// Build matrix = T(x, 0, y) * R_y(rotation_z).
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        let q = Quat::from_rotation_y(self.rotation_z.to_radians());
        Mat4::from_rotation_translation(q, vec3(self.x, 0.0, self.y))
    }
}
