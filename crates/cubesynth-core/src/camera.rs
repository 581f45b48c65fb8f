//! Camera description and the screen-space ray queries used for picking.
//!
//! These types avoid platform APIs so both front-ends (and the tests) share the
//! same projection math. Screen coordinates are logical (CSS) pixels with the
//! origin at the top-left corner of the viewport; device pixels are divided by
//! the display scale factor before they reach a [`Viewport`].

use crate::constants::{CAMERA_EYE, CAMERA_FOVY_DEG};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Looking straight down on the enclosure; screen-up points along -Z.
    pub fn top_down(aspect: f32) -> Self {
        Self {
            eye: Vec3::from(CAMERA_EYE),
            target: Vec3::ZERO,
            up: Vec3::NEG_Z,
            aspect,
            fovy_radians: CAMERA_FOVY_DEG.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Distance along a normalized ray to the first sphere hit in front of the origin.
#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t_near = -b - sq;
    if t_near >= 0.0 {
        return Some(t_near);
    }
    // origin inside the sphere: report the exit point
    let t_far = -b + sq;
    (t_far >= 0.0).then_some(t_far)
}

/// Device pixels to logical pixels. A non-positive or non-finite scale is treated as 1.
#[inline]
pub fn physical_to_logical(physical: Vec2, scale_factor: f32) -> Vec2 {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        physical / scale_factor
    } else {
        physical
    }
}

/// Camera plus the logical pixel size of the surface it renders into.
#[derive(Clone, Debug)]
pub struct Viewport {
    pub camera: Camera,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        let w = width.max(1.0);
        let h = height.max(1.0);
        Self {
            camera: Camera::top_down(w / h),
            width: w,
            height: h,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.camera.aspect = self.width / self.height;
    }

    /// World-space ray through a screen pixel.
    pub fn screen_ray(&self, screen: Vec2) -> Ray {
        let ndc_x = (2.0 * screen.x / self.width) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen.y / self.height);
        let inv = self.camera.view_proj().inverse();
        let p_near = inv * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let p0 = p_near.truncate() / p_near.w;
        let p1 = p_far.truncate() / p_far.w;
        Ray {
            origin: self.camera.eye,
            dir: (p1 - p0).normalize(),
        }
    }

    /// Project a world point to screen pixels; `None` when behind the camera.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.camera.view_proj() * world.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        ))
    }

    /// Hit point on a sphere under the pointer, if any.
    pub fn intersect_sphere(&self, screen: Vec2, center: Vec3, radius: f32) -> Option<Vec3> {
        let ray = self.screen_ray(screen);
        ray_sphere(ray.origin, ray.dir, center, radius).map(|t| ray.at(t))
    }

    /// Hit point on the horizontal plane `y = plane_y`, if the ray reaches it.
    pub fn intersect_horizontal_plane(&self, screen: Vec2, plane_y: f32) -> Option<Vec3> {
        let ray = self.screen_ray(screen);
        if ray.dir.y.abs() <= 1e-6 {
            return None;
        }
        let t = (plane_y - ray.origin.y) / ray.dir.y;
        (t >= 0.0).then(|| ray.at(t))
    }
}
