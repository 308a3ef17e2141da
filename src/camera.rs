use std::{f32::consts::PI, fmt};

use cgmath::{Matrix4, Point3, Rad, Vector3, perspective};
use log::trace;
use serde::Deserialize;

/// Spherical to cartesian with the polar axis along +Y.
pub fn spherical_to_cartesian(azimuth: f32, polar_angle: f32, radius: f32) -> Point3<f32> {
    let (sin_polar, cos_polar) = polar_angle.sin_cos();
    let (sin_azimuth, cos_azimuth) = azimuth.sin_cos();
    Point3::new(
        radius * sin_polar * sin_azimuth,
        radius * cos_polar,
        radius * sin_polar * cos_azimuth,
    )
}

/// Right-handed perspective projection with OpenGL clip depth.
pub fn projection_matrix(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Matrix4<f32> {
    perspective(Rad(fov), aspect_ratio, near, far)
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraLimits {
    /// Distance kept between the polar angle and either pole.
    pub polar_margin: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_fov: f32,
    pub max_fov: f32,
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            polar_margin: 0.01,
            min_radius: 0.05,
            max_radius: 30.0,
            min_fov: 0.1,
            max_fov: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. A degenerate viewport falls back to square.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 800)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomTarget {
    Radius,
    FieldOfView,
}

/// Orbit camera looking at the origin.
///
/// `azimuth` turns about +Y and is left unbounded. `polar_angle` is measured
/// from +Y and never reaches either pole, where the look-at basis degenerates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbitCamera {
    pub azimuth: f32,
    pub polar_angle: f32,
    pub radius: f32,
    pub fov: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            polar_angle: PI / 2.0,
            radius: 1.4,
            fov: 1.4,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Point3<f32> {
        spherical_to_cartesian(self.azimuth, self.polar_angle, self.radius)
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), Point3::new(0.0, 0.0, 0.0), Vector3::unit_y())
    }

    pub fn projection_matrix(
        &self,
        viewport: Viewport,
        projection: &ProjectionSettings,
    ) -> Matrix4<f32> {
        projection_matrix(
            self.fov,
            viewport.aspect_ratio(),
            projection.near,
            projection.far,
        )
    }

    pub fn view_projection(
        &self,
        viewport: Viewport,
        projection: &ProjectionSettings,
    ) -> Matrix4<f32> {
        self.projection_matrix(viewport, projection) * self.view_matrix()
    }

    #[must_use]
    pub fn clamped(self, limits: &CameraLimits) -> Self {
        Self {
            azimuth: self.azimuth,
            polar_angle: self
                .polar_angle
                .clamp(limits.polar_margin, PI - limits.polar_margin),
            radius: self.radius.clamp(limits.min_radius, limits.max_radius),
            fov: self.fov.clamp(limits.min_fov, limits.max_fov),
        }
    }

    /// Rotates by the given angles (radians), then re-clamps the polar angle.
    #[must_use]
    pub fn orbit(self, d_azimuth: f32, d_polar: f32, limits: &CameraLimits) -> Self {
        let next = Self {
            azimuth: self.azimuth + d_azimuth,
            polar_angle: self.polar_angle + d_polar,
            ..self
        }
        .clamped(limits);
        trace!(
            "orbit to azimuth {} polar {}",
            next.azimuth, next.polar_angle
        );
        next
    }

    /// Scales the zoom target by `exp(-delta)`; positive deltas zoom in.
    #[must_use]
    pub fn zoom(self, delta: f32, target: ZoomTarget, limits: &CameraLimits) -> Self {
        let factor = (-delta).exp();
        let next = match target {
            ZoomTarget::Radius => Self {
                radius: self.radius * factor,
                ..self
            },
            ZoomTarget::FieldOfView => Self {
                fov: self.fov * factor,
                ..self
            },
        }
        .clamped(limits);
        trace!("zoom {target:?} to radius {} fov {}", next.radius, next.fov);
        next
    }

    pub fn readout(&self) -> CameraReadout {
        CameraReadout {
            azimuth_deg: self.azimuth.to_degrees(),
            polar_deg: self.polar_angle.to_degrees(),
            radius: self.radius,
            fov_deg: self.fov.to_degrees(),
        }
    }
}

/// Human-readable camera values: angles in degrees, one decimal place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraReadout {
    pub azimuth_deg: f32,
    pub polar_deg: f32,
    pub radius: f32,
    pub fov_deg: f32,
}

impl fmt::Display for CameraReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "azimuth {:.1}°, polar {:.1}°, radius {:.1}, fov {:.1}°",
            self.azimuth_deg, self.polar_deg, self.radius, self.fov_deg
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use cgmath::{EuclideanSpace, Transform};

    use super::*;

    #[test]
    fn spherical_reference_points() {
        assert_abs_diff_eq!(
            spherical_to_cartesian(0.0, PI / 2.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
            epsilon = 1e-5
        );
        assert_abs_diff_eq!(
            spherical_to_cartesian(PI / 2.0, PI / 2.0, 1.0),
            Point3::new(1.0, 0.0, 0.0),
            epsilon = 1e-5
        );
        for azimuth in [0.0, 1.0, -2.5, 7.0] {
            assert_abs_diff_eq!(
                spherical_to_cartesian(azimuth, 0.0, 3.0),
                Point3::new(0.0, 3.0, 0.0),
                epsilon = 1e-5
            );
        }
    }

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let camera = OrbitCamera {
            azimuth: 0.7,
            polar_angle: 1.1,
            ..Default::default()
        };
        let eye_in_view = camera.view_matrix().transform_point(camera.eye());
        assert_abs_diff_eq!(eye_in_view, Point3::origin(), epsilon = 1e-5);

        // The look-at target sits straight ahead on -Z.
        let target = camera.view_matrix().transform_point(Point3::origin());
        assert_abs_diff_eq!(target, Point3::new(0.0, 0.0, -camera.radius), epsilon = 1e-5);
    }

    #[test]
    fn projection_follows_viewport_aspect() {
        let camera = OrbitCamera::default();
        let settings = ProjectionSettings::default();
        let square = camera.projection_matrix(Viewport::new(600, 600), &settings);
        let wide = camera.projection_matrix(Viewport::new(1200, 600), &settings);
        assert_relative_eq!(square.x.x, 2.0 * wide.x.x, max_relative = 1e-5);
        assert_eq!(square.y.y, wide.y.y);
        assert_eq!(Viewport::new(0, 10).aspect_ratio(), 1.0);
    }

    #[test]
    fn zoom_out_saturates_at_max_radius() {
        let limits = CameraLimits::default();
        let mut camera = OrbitCamera::default();
        for _ in 0..200 {
            camera = camera.zoom(-0.5, ZoomTarget::Radius, &limits);
        }
        assert_eq!(camera.radius, 30.0);
        assert_eq!(camera.zoom(-0.5, ZoomTarget::Radius, &limits).radius, 30.0);
        assert_eq!(camera.fov, OrbitCamera::default().fov);
    }

    #[test]
    fn fov_zoom_is_clamped_both_ways() {
        let limits = CameraLimits::default();
        let mut camera = OrbitCamera::default();
        for _ in 0..100 {
            camera = camera.zoom(-1.0, ZoomTarget::FieldOfView, &limits);
        }
        assert_eq!(camera.fov, 3.0);
        for _ in 0..100 {
            camera = camera.zoom(1.0, ZoomTarget::FieldOfView, &limits);
        }
        assert_eq!(camera.fov, 0.1);
        assert_eq!(camera.radius, OrbitCamera::default().radius);
    }

    #[test]
    fn polar_angle_stops_short_of_the_poles() {
        let limits = CameraLimits::default();
        let mut camera = OrbitCamera::default();
        for _ in 0..100 {
            camera = camera.orbit(0.0, 0.1, &limits);
        }
        assert_eq!(camera.polar_angle, PI - 0.01);
        for _ in 0..100 {
            camera = camera.orbit(0.0, -0.1, &limits);
        }
        assert_eq!(camera.polar_angle, 0.01);
    }

    #[test]
    fn azimuth_is_unbounded() {
        let camera = OrbitCamera::default().orbit(10.0, 0.0, &CameraLimits::default());
        assert_eq!(camera.azimuth, 10.0);
    }

    #[test]
    fn readout_uses_degrees_with_one_decimal() {
        let text = OrbitCamera::default().readout().to_string();
        assert_eq!(text, "azimuth 0.0°, polar 90.0°, radius 1.4, fov 80.2°");
    }
}
