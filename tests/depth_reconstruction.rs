//! Linear-depth reconstruction as done by the lighting shader.
//!
//! Conventions:
//! - Right-handed view space (camera looks down -Z).
//! - The G-buffer stores positive view distance along -Z.
//! - Pixel coordinates have their origin at the top-left.
use deferred_renderer::renderer::uniforms::CameraUniform;
use glam::{Mat4, Vec2, Vec3, Vec4};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;

fn camera() -> (Mat4, Mat4, CameraUniform) {
    let view = Mat4::look_at_rh(Vec3::new(6.0, 4.0, 9.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
    let proj = Mat4::perspective_rh(50_f32.to_radians(), WIDTH as f32 / HEIGHT as f32, 1.0, 10_000.0);
    (view, proj, CameraUniform::new(view, proj, WIDTH, HEIGHT))
}

/// What the geometry shader writes to the linear depth target.
fn linear_depth(view: Mat4, world: Vec3) -> f32 {
    -(view * world.extend(1.0)).z
}

/// Pixel coordinate (top-left origin) a world point lands on.
fn project_to_pixel(view_proj: Mat4, world: Vec3) -> Vec2 {
    let clip = view_proj * world.extend(1.0);
    let ndc = clip.truncate() / clip.w;
    Vec2::new(
        (ndc.x * 0.5 + 0.5) * WIDTH as f32,
        (0.5 - ndc.y * 0.5) * HEIGHT as f32,
    )
}

fn reconstruct_world_position(camera: &CameraUniform, pixel: Vec2, view_depth: f32) -> Vec3 {
    let inv_proj = Mat4::from_cols_array_2d(&camera.inv_proj);
    let inv_view = Mat4::from_cols_array_2d(&camera.inv_view);
    let uv = pixel * Vec2::new(camera.viewport[2], camera.viewport[3]);
    let ndc = Vec4::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 1.0, 1.0);
    let ray = inv_proj * ndc;
    let ray_view = ray.truncate() / ray.w;
    let view_position = ray_view * (view_depth / -ray_view.z);
    inv_view.transform_point3(view_position)
}

fn approx_eq3(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a - b).abs().max_element() <= eps
}

#[test]
fn reconstructed_position_matches_original_world_point() {
    let (view, proj, uniform) = camera();
    let view_proj = proj * view;

    let points = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(-2.5, 1.0, 1.5),
        Vec3::new(3.0, 0.5, -4.0),
        Vec3::new(0.0, 6.0, -20.0),
    ];

    for point in points {
        let pixel = project_to_pixel(view_proj, point);
        let depth = linear_depth(view, point);
        let rebuilt = reconstruct_world_position(&uniform, pixel, depth);
        assert!(
            approx_eq3(rebuilt, point, 1e-3),
            "{point:?} rebuilt as {rebuilt:?}"
        );
    }
}

#[test]
fn linear_depth_is_positive_distance_in_front_of_camera() {
    let (view, _, _) = camera();
    let in_front = Vec3::new(0.0, 1.0, 0.0);
    let eye = Vec3::new(6.0, 4.0, 9.0);

    let depth = linear_depth(view, in_front);
    assert!(depth > 0.0);
    assert!((depth - eye.distance(in_front)).abs() < 1e-4);
}

#[test]
fn centre_pixel_reconstructs_along_the_view_axis() {
    let (_, _, uniform) = camera();
    let eye = Vec3::from_slice(&uniform.position[..3]);
    let forward = (Vec3::new(0.0, 1.0, 0.0) - eye).normalize();

    let centre = Vec2::new(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0);
    let rebuilt = reconstruct_world_position(&uniform, centre, 5.0);
    assert!(approx_eq3(rebuilt, eye + forward * 5.0, 1e-3));
}
