// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A perspective camera supplying view and projection matrices.

use crate::math::{Mat4, Vec3};

/// A perspective camera described by projection parameters and a
/// look-at view.
///
/// The camera is read once per draw for its [`view`](Self::view) and
/// [`projection`](Self::projection) matrices; both use the left-handed,
/// zero-to-one depth convention of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// The vertical field of view in radians.
    pub fov_y_radians: f32,
    /// The aspect ratio of the viewport (width / height).
    pub aspect_ratio: f32,
    /// The distance to the near clipping plane. Must be a small positive value.
    pub z_near: f32,
    /// The distance to the far clipping plane. Must be larger than `z_near`.
    pub z_far: f32,
    /// The position of the camera in world space.
    pub eye: Vec3,
    /// The point in world space the camera is looking at.
    pub target: Vec3,
    /// The world-space up direction.
    pub up: Vec3,
}

impl Camera {
    /// Creates a perspective camera with the given parameters, positioned at
    /// the origin looking down the positive Z-axis.
    pub fn new_perspective(fov_y_radians: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fov_y_radians,
            aspect_ratio,
            z_near,
            z_far,
            eye: Vec3::ZERO,
            target: Vec3::Z,
            up: Vec3::Y,
        }
    }

    /// Replaces the projection parameters.
    pub fn set_projection_params(
        &mut self,
        fov_y_radians: f32,
        aspect_ratio: f32,
        z_near: f32,
        z_far: f32,
    ) {
        self.fov_y_radians = fov_y_radians;
        self.aspect_ratio = aspect_ratio;
        self.z_near = z_near;
        self.z_far = z_far;
    }

    /// Replaces the eye position and look-at target. The up direction stays +Y.
    pub fn set_view_params(&mut self, eye: Vec3, target: Vec3) {
        self.eye = eye;
        self.target = target;
    }

    /// Calculates the world-to-camera view matrix.
    ///
    /// Falls back to the identity matrix if the view parameters are
    /// degenerate (eye on top of target, or up parallel to the view
    /// direction).
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye, self.target, self.up).unwrap_or(Mat4::IDENTITY)
    }

    /// Calculates the camera-to-clip projection matrix.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_lh_zo(
            self.fov_y_radians,
            self.aspect_ratio,
            self.z_near,
            self.z_far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, Vec4, FRAC_PI_2};

    #[test]
    fn view_centers_the_eye() {
        let mut camera = Camera::new_perspective(FRAC_PI_2, 1.0, 0.01, 100.0);
        camera.set_view_params(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO);

        let at_eye = camera.view() * camera.eye.extend(1.0);
        assert!(approx_eq(at_eye.x, 0.0));
        assert!(approx_eq(at_eye.y, 0.0));
        assert!(approx_eq(at_eye.z, 0.0));
    }

    #[test]
    fn projection_preserves_centered_rays() {
        let camera = Camera::new_perspective(FRAC_PI_2, 1.0, 0.01, 100.0);
        // A point straight ahead stays centered in clip space.
        let clip = camera.projection() * Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert!(approx_eq(clip.x, 0.0));
        assert!(approx_eq(clip.y, 0.0));
    }

    #[test]
    fn degenerate_view_params_yield_identity() {
        let mut camera = Camera::new_perspective(FRAC_PI_2, 1.0, 0.01, 100.0);
        camera.set_view_params(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(camera.view(), Mat4::IDENTITY);
    }
}
