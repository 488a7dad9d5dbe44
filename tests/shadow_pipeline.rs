use deferred_renderer::renderer::lights::{
    shadow_caster, DirectionalShadow, Light, SHADOW_BIAS, SHADOW_DEPTH, SHADOW_EXTENT,
};
use glam::{Mat4, Vec3, Vec4};

const EPSILON: f32 = 1e-5;

fn project_shadow_cpu(matrix: Mat4, world_pos: Vec3) -> Vec3 {
    let clip = matrix * world_pos.extend(1.0);
    if clip.w <= 0.0 {
        return Vec3::splat(-1.0);
    }
    let ndc = clip.truncate() / clip.w;
    Vec3::new(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5, ndc.z)
}

fn compute_ndc(matrix: Mat4, world_pos: Vec3) -> Vec3 {
    let clip = matrix * world_pos.extend(1.0);
    clip.truncate() / clip.w
}

fn approx_eq(a: Vec3, b: Vec3) {
    assert!(a.abs_diff_eq(b, EPSILON), "{a:?} != {b:?}");
}

fn in_unit_cube(p: Vec3) -> bool {
    p.cmpge(Vec3::splat(-EPSILON)).all() && p.cmple(Vec3::splat(1.0 + EPSILON)).all()
}

#[test]
fn texture_matrix_matches_manual_bias_of_light_clip_space() {
    let eye = Vec3::new(8.0, 10.0, 8.0);
    let light_direction = Vec3::new(0.4, -1.0, 0.2).normalize();
    let shadow = DirectionalShadow::new(light_direction, eye);

    let points = [
        Vec3::new(-3.5, 0.0, -2.0),
        Vec3::new(2.0, 1.0, 4.0),
        Vec3::new(4.5, -0.5, -3.0),
    ];

    for point in points {
        let expected = project_shadow_cpu(shadow.view_proj(), point);
        let projected = (shadow.texture_matrix() * point.extend(1.0)).truncate();
        approx_eq(projected, expected);
        assert!(in_unit_cube(projected), "{point:?} left the shadow map: {projected:?}");
    }
}

#[test]
fn shadow_frustum_is_centred_on_the_eye() {
    let eye = Vec3::new(-12.0, 3.0, 25.0);
    let shadow = DirectionalShadow::new(Vec3::new(-0.4, -1.0, -0.3), eye);

    let centre = (shadow.texture_matrix() * eye.extend(1.0)).truncate();
    approx_eq(centre, Vec3::splat(0.5));
}

#[test]
fn shadow_frustum_size_is_fixed() {
    let eye = Vec3::ZERO;
    let shadow = DirectionalShadow::new(Vec3::NEG_Y, eye);
    let right = shadow.view.inverse().transform_vector3(Vec3::X);

    let edge = compute_ndc(shadow.view_proj(), eye + right * SHADOW_EXTENT);
    assert!((edge.x - 1.0).abs() < EPSILON);

    // The light looks down -Y, so world depth maps straight onto NDC depth.
    let near = compute_ndc(shadow.view_proj(), eye + Vec3::Y * SHADOW_DEPTH);
    let far = compute_ndc(shadow.view_proj(), eye - Vec3::Y * SHADOW_DEPTH);
    assert!(near.z.abs() < EPSILON);
    assert!((far.z - 1.0).abs() < EPSILON);
}

#[test]
fn directional_shadow_texture_axis_is_flipped_from_clip_space() {
    let shadow = DirectionalShadow::new(Vec3::new(0.0, -1.0, 0.0), Vec3::ZERO);
    let up = shadow.view.inverse().transform_vector3(Vec3::Y);

    let top_world = up * 5.0;
    let bottom_world = -up * 5.0;

    let ndc_top = compute_ndc(shadow.view_proj(), top_world);
    let ndc_bottom = compute_ndc(shadow.view_proj(), bottom_world);
    assert!(ndc_top.y > ndc_bottom.y);

    let tex_top = (shadow.texture_matrix() * top_world.extend(1.0)).truncate();
    let tex_bottom = (shadow.texture_matrix() * bottom_world.extend(1.0)).truncate();

    assert!(tex_top.y < tex_bottom.y);
    assert!((tex_top.z - ndc_top.z).abs() < EPSILON);
    assert!((tex_bottom.z - ndc_bottom.z).abs() < EPSILON);
}

#[test]
fn vertical_light_picks_a_non_degenerate_up_axis() {
    let shadow = DirectionalShadow::new(Vec3::NEG_Y, Vec3::new(1.0, 2.0, 3.0));
    assert!(shadow.view.to_cols_array().iter().all(|v| v.is_finite()));
    assert!(shadow.texture_matrix().to_cols_array().iter().all(|v| v.is_finite()));
}

#[test]
fn bias_maps_clip_corners_to_texture_corners() {
    let top_left = SHADOW_BIAS * Vec4::new(-1.0, 1.0, 0.25, 1.0);
    let bottom_right = SHADOW_BIAS * Vec4::new(1.0, -1.0, 0.75, 1.0);
    approx_eq(top_left.truncate(), Vec3::new(0.0, 0.0, 0.25));
    approx_eq(bottom_right.truncate(), Vec3::new(1.0, 1.0, 0.75));
}

#[test]
fn only_a_leading_directional_light_casts_shadows() {
    let sun = Light::directional(Vec3::NEG_Y, Vec3::ONE);
    let lamp = Light::point(Vec3::ZERO, 4.0, Vec3::ONE);

    assert_eq!(shadow_caster(&[sun, lamp]), Some(Vec3::NEG_Y));
    assert_eq!(shadow_caster(&[lamp, sun]), None);
    assert_eq!(shadow_caster(&[]), None);
}
