use glam::{Mat4, Quat, Vec3};
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::asset::{Handle, Mesh};
use crate::renderer::{Light, Material, Renderer, Texture};

const POINT_LIGHT_COUNT: usize = 12;
const CUBE_GRID: i32 = 3;
const CUBE_SPACING: f32 = 4.0;
const ORBIT_RADIUS: f32 = 18.0;
const ORBIT_HEIGHT: f32 = 9.0;
const ORBIT_SPEED: f32 = 0.2;

struct PointLightSpec {
    center: Vec3,
    radius: f32,
    color: Vec3,
    phase: f32,
}

/// A ground plane, a grid of cubes, one shadow-casting sun and a handful of
/// coloured point and spot lights.
pub struct DemoScene {
    cube: Handle<Mesh>,
    sphere: Handle<Mesh>,
    floor: Material,
    crate_material: Material,
    lamp_material: Material,
    point_lights: Vec<PointLightSpec>,
    time: f32,
}

impl DemoScene {
    pub fn new(renderer: &mut Renderer) -> Self {
        info!("Creating demo scene...");

        let checker = Texture::checkerboard(
            renderer.device(),
            renderer.queue(),
            512,
            32,
            [200, 200, 200, 255],
            [40, 40, 40, 255],
            Some("DemoFloor"),
        );
        let floor_texture = renderer.add_texture(checker);

        let crate_texture = renderer.add_texture(Texture::checkerboard(
            renderer.device(),
            renderer.queue(),
            128,
            16,
            [180, 120, 70, 255],
            [120, 80, 40, 255],
            Some("DemoCrate"),
        ));

        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let point_lights = (0..POINT_LIGHT_COUNT)
            .map(|_| PointLightSpec {
                center: Vec3::new(
                    rng.gen_range(-12.0..12.0),
                    rng.gen_range(1.0..3.0),
                    rng.gen_range(-12.0..12.0),
                ),
                radius: rng.gen_range(4.0..8.0),
                color: Vec3::new(
                    rng.gen_range(0.2..1.0),
                    rng.gen_range(0.2..1.0),
                    rng.gen_range(0.2..1.0),
                ),
                phase: rng.gen_range(0.0..std::f32::consts::TAU),
            })
            .collect();

        info!("Demo scene ready with {} point lights", POINT_LIGHT_COUNT);

        Self {
            cube: renderer.cube_mesh(),
            sphere: renderer.sphere_mesh(),
            floor: Material::textured(floor_texture).with_specular(Vec3::splat(0.2), 8.0, 0.1),
            crate_material: Material::textured(crate_texture),
            lamp_material: Material::default().with_specular(Vec3::ONE, 64.0, 1.0),
            point_lights,
            time: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.time += dt;
    }

    pub fn camera_view(&self) -> Mat4 {
        let angle = self.time * ORBIT_SPEED;
        let eye = Vec3::new(angle.cos() * ORBIT_RADIUS, ORBIT_HEIGHT, angle.sin() * ORBIT_RADIUS);
        Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y)
    }

    /// Queues this frame's draws and lights.
    pub fn submit(&self, renderer: &mut Renderer) {
        renderer.set_3d_view_matrix(self.camera_view());

        // The sun goes first so it owns the shadow map.
        renderer.draw_light(Light::directional(
            Vec3::new(-0.4, -1.0, -0.3),
            Vec3::new(0.9, 0.85, 0.75),
        ));

        renderer.draw_3d(
            self.cube,
            self.floor,
            Mat4::from_scale_rotation_translation(
                Vec3::new(40.0, 0.2, 40.0),
                Quat::IDENTITY,
                Vec3::new(0.0, -0.1, 0.0),
            ),
        );

        for x in -CUBE_GRID / 2..=CUBE_GRID / 2 {
            for z in -CUBE_GRID / 2..=CUBE_GRID / 2 {
                let spin = Quat::from_rotation_y(self.time * 0.5 + (x * 3 + z) as f32);
                renderer.draw_3d(
                    self.cube,
                    self.crate_material,
                    Mat4::from_scale_rotation_translation(
                        Vec3::splat(1.5),
                        spin,
                        Vec3::new(x as f32 * CUBE_SPACING, 1.5, z as f32 * CUBE_SPACING),
                    ),
                );
            }
        }

        for spec in &self.point_lights {
            let bob = (self.time + spec.phase).sin() * 0.5;
            let position = spec.center + Vec3::Y * bob;
            renderer.draw_light(Light::point(position, spec.radius, spec.color));
            renderer.draw_3d(
                self.sphere,
                self.lamp_material,
                Mat4::from_scale_rotation_translation(Vec3::splat(0.15), Quat::IDENTITY, position),
            );
        }

        let sweep = self.time * 0.7;
        renderer.draw_light(Light::spot(
            Vec3::new(0.0, 8.0, 0.0),
            Vec3::new(sweep.cos() * 0.5, -1.0, sweep.sin() * 0.5),
            16.0,
            Vec3::new(1.0, 0.95, 0.8),
            0.25,
            0.4,
        ));
    }
}
