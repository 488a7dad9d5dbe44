use glam::{Mat4, Vec3, Vec4};

/// Half extent of the shadow frustum in world units.
pub const SHADOW_EXTENT: f32 = 40.0;
/// Depth reach of the shadow frustum on either side of the camera.
pub const SHADOW_DEPTH: f32 = 30.0;

/// Remaps shadow clip space to texture space. Texture v runs downward and
/// wgpu depth is already in [0, 1], so z passes through.
pub const SHADOW_BIAS: Mat4 = Mat4::from_cols(
    Vec4::new(0.5, 0.0, 0.0, 0.0),
    Vec4::new(0.0, -0.5, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 1.0, 0.0),
    Vec4::new(0.5, 0.5, 0.0, 1.0),
);

/// Used in place of a zero-length light direction.
pub const DEFAULT_LIGHT_DIRECTION: Vec3 = Vec3::NEG_Y;

fn light_direction(direction: Vec3) -> Vec3 {
    direction.try_normalize().unwrap_or_else(|| {
        log::warn!(
            "Light direction {} can't be normalised, pointing it at {}",
            direction,
            DEFAULT_LIGHT_DIRECTION
        );
        DEFAULT_LIGHT_DIRECTION
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Directional {
        direction: Vec3,
        color: Vec3,
    },
    Point {
        position: Vec3,
        radius: f32,
        color: Vec3,
    },
    Spot {
        position: Vec3,
        direction: Vec3,
        radius: f32,
        color: Vec3,
        inner_cos: f32,
        outer_cos: f32,
    },
}

impl Light {
    pub fn directional(direction: Vec3, color: Vec3) -> Self {
        Light::Directional {
            direction: light_direction(direction),
            color,
        }
    }

    pub fn point(position: Vec3, radius: f32, color: Vec3) -> Self {
        Light::Point {
            position,
            radius,
            color,
        }
    }

    /// Spot light with cone half-angles given in radians.
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        radius: f32,
        color: Vec3,
        inner_angle: f32,
        outer_angle: f32,
    ) -> Self {
        Light::Spot {
            position,
            direction: light_direction(direction),
            radius,
            color,
            inner_cos: inner_angle.cos(),
            outer_cos: outer_angle.cos(),
        }
    }

    pub fn color(&self) -> Vec3 {
        match *self {
            Light::Directional { color, .. }
            | Light::Point { color, .. }
            | Light::Spot { color, .. } => color,
        }
    }

    pub fn is_directional(&self) -> bool {
        matches!(self, Light::Directional { .. })
    }

    /// Bounding sphere of a point or spot light.
    pub fn volume(&self) -> Option<(Vec3, f32)> {
        match *self {
            Light::Directional { .. } => None,
            Light::Point {
                position, radius, ..
            }
            | Light::Spot {
                position, radius, ..
            } => Some((position, radius)),
        }
    }

    /// Model matrix for the unit sphere drawn as this light's volume.
    /// Directional lights cover the whole screen and use identity.
    pub fn volume_transform(&self) -> Mat4 {
        match self.volume() {
            Some((position, radius)) => {
                Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(radius))
            }
            None => Mat4::IDENTITY,
        }
    }
}

/// Face culling for a light volume draw. The sphere is drawn inside out, so
/// from outside the front faces are the far hemisphere and get culled; from
/// inside, only back faces are culled so the enclosing surface still
/// rasterizes.
pub fn cull_face_for(light: &Light, camera_position: Vec3) -> Option<wgpu::Face> {
    let (position, radius) = light.volume()?;
    if camera_position.distance_squared(position) < radius * radius {
        Some(wgpu::Face::Back)
    } else {
        Some(wgpu::Face::Front)
    }
}

/// World position of the eye for a view matrix.
pub fn camera_position(view: Mat4) -> Vec3 {
    view.inverse().transform_point3(Vec3::ZERO)
}

/// Fixed orthographic shadow frustum centred on the camera and oriented along
/// the light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalShadow {
    pub view: Mat4,
    pub projection: Mat4,
}

impl DirectionalShadow {
    pub fn new(direction: Vec3, eye: Vec3) -> Self {
        let look = direction.normalize_or(Vec3::NEG_Y);
        let up = if look.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };

        Self {
            view: Mat4::look_to_rh(eye, look, up),
            projection: Mat4::orthographic_rh(
                -SHADOW_EXTENT,
                SHADOW_EXTENT,
                -SHADOW_EXTENT,
                SHADOW_EXTENT,
                -SHADOW_DEPTH,
                SHADOW_DEPTH,
            ),
        }
    }

    /// Clip-space transform used when rendering the shadow map.
    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }

    /// World to shadow-texture transform used when sampling the shadow map.
    pub fn texture_matrix(&self) -> Mat4 {
        SHADOW_BIAS * self.view_proj()
    }
}

/// The shadow caster for a frame: the first light, when it is directional.
pub fn shadow_caster(lights: &[Light]) -> Option<Vec3> {
    match lights.first() {
        Some(Light::Directional { direction, .. }) => Some(*direction),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn degenerate_directions_fall_back_to_straight_down() {
        let Light::Directional { direction, .. } = Light::directional(Vec3::ZERO, Vec3::ONE) else {
            unreachable!();
        };
        assert_eq!(direction, DEFAULT_LIGHT_DIRECTION);

        let Light::Spot { direction, .. } =
            Light::spot(Vec3::ZERO, Vec3::splat(f32::NAN), 5.0, Vec3::ONE, 0.3, 0.5)
        else {
            unreachable!();
        };
        assert_eq!(direction, DEFAULT_LIGHT_DIRECTION);

        let Light::Directional { direction, .. } =
            Light::directional(Vec3::new(0.0, 0.0, -3.0), Vec3::ONE)
        else {
            unreachable!();
        };
        assert!((direction - Vec3::NEG_Z).length() < EPSILON);
    }

    #[test]
    fn camera_inside_volume_culls_back_faces() {
        let light = Light::point(Vec3::new(0.0, 2.0, 0.0), 5.0, Vec3::ONE);
        assert_eq!(
            cull_face_for(&light, Vec3::new(1.0, 2.0, 1.0)),
            Some(wgpu::Face::Back)
        );
    }

    #[test]
    fn camera_outside_volume_culls_front_faces() {
        let light = Light::point(Vec3::ZERO, 5.0, Vec3::ONE);
        assert_eq!(
            cull_face_for(&light, Vec3::new(0.0, 0.0, 20.0)),
            Some(wgpu::Face::Front)
        );
        // On the surface counts as outside
        assert_eq!(
            cull_face_for(&light, Vec3::new(5.0, 0.0, 0.0)),
            Some(wgpu::Face::Front)
        );
    }

    #[test]
    fn spot_lights_use_their_radius_for_culling() {
        let light = Light::spot(
            Vec3::ZERO,
            Vec3::NEG_Y,
            3.0,
            Vec3::ONE,
            0.3,
            0.5,
        );
        assert_eq!(cull_face_for(&light, Vec3::X), Some(wgpu::Face::Back));
        assert_eq!(cull_face_for(&light, Vec3::X * 4.0), Some(wgpu::Face::Front));
    }

    #[test]
    fn directional_lights_have_no_volume() {
        let light = Light::directional(Vec3::NEG_Y, Vec3::ONE);
        assert_eq!(cull_face_for(&light, Vec3::ZERO), None);
        assert_eq!(light.volume_transform(), Mat4::IDENTITY);
    }

    #[test]
    fn volume_transform_scales_unit_sphere_to_radius() {
        let light = Light::point(Vec3::new(1.0, 2.0, 3.0), 4.0, Vec3::ONE);
        let model = light.volume_transform();
        let surface = model.transform_point3(Vec3::X);
        assert!(surface.abs_diff_eq(Vec3::new(5.0, 2.0, 3.0), EPSILON));
    }

    #[test]
    fn spot_constructor_stores_cosines() {
        let light = Light::spot(Vec3::ZERO, Vec3::new(0.0, -2.0, 0.0), 1.0, Vec3::ONE, 0.0, 1.0);
        let Light::Spot {
            direction,
            inner_cos,
            outer_cos,
            ..
        } = light
        else {
            panic!("expected spot light");
        };
        assert!(direction.abs_diff_eq(Vec3::NEG_Y, EPSILON));
        assert!((inner_cos - 1.0).abs() < EPSILON);
        assert!((outer_cos - 1.0f32.cos()).abs() < EPSILON);
    }

    #[test]
    fn camera_position_inverts_view() {
        let eye = Vec3::new(3.0, 4.0, -5.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        assert!(camera_position(view).abs_diff_eq(eye, 1e-4));
    }

    #[test]
    fn bias_maps_clip_corners_to_texture_corners() {
        let top_left = SHADOW_BIAS * Vec4::new(-1.0, 1.0, 0.25, 1.0);
        let bottom_right = SHADOW_BIAS * Vec4::new(1.0, -1.0, 0.75, 1.0);
        assert!(top_left.abs_diff_eq(Vec4::new(0.0, 0.0, 0.25, 1.0), EPSILON));
        assert!(bottom_right.abs_diff_eq(Vec4::new(1.0, 1.0, 0.75, 1.0), EPSILON));
    }

    #[test]
    fn shadow_frustum_follows_the_camera() {
        let shadow = DirectionalShadow::new(Vec3::new(0.3, -1.0, 0.2), Vec3::new(10.0, 5.0, -3.0));
        let centre = shadow.texture_matrix().project_point3(Vec3::new(10.0, 5.0, -3.0));
        assert!((centre.x - 0.5).abs() < EPSILON);
        assert!((centre.y - 0.5).abs() < EPSILON);
        assert!((centre.z - 0.5).abs() < EPSILON);
    }

    #[test]
    fn straight_down_light_uses_fallback_up_vector() {
        let shadow = DirectionalShadow::new(Vec3::NEG_Y, Vec3::ZERO);
        assert!(shadow.view.is_finite());
        let below = shadow.view_proj().project_point3(Vec3::new(0.0, -10.0, 0.0));
        let above = shadow.view_proj().project_point3(Vec3::new(0.0, 10.0, 0.0));
        // Depth grows along the light direction
        assert!(below.z > above.z);
    }

    #[test]
    fn only_a_leading_directional_light_casts_shadows() {
        let sun = Light::directional(Vec3::NEG_Y, Vec3::ONE);
        let lamp = Light::point(Vec3::ZERO, 1.0, Vec3::ONE);
        assert_eq!(shadow_caster(&[sun, lamp]), Some(Vec3::NEG_Y));
        assert_eq!(shadow_caster(&[lamp, sun]), None);
        assert_eq!(shadow_caster(&[]), None);
    }
}
