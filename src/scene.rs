//! Everything a frame draws: the camera, the light and the objects.

use crate::camera::Camera;
use crate::light::Light;
use crate::material::Material;
use crate::math::vec3::Vec3;
use crate::mesh::Mesh;

/// Uniform scale applied to every object by [`Scene::animate`]. Meshes are
/// fitted to `[-0.9, 0.9]` on load, so this sets their on-screen size.
pub const OBJECT_SCALE: f32 = 16.0;

/// A mesh placed in the scene with the material it is shaded with.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub mesh: Mesh,
    pub material: Material,
    /// Multiplier on the animation angle; negative spins the other way.
    pub spin: f32,
    /// World-space position of the mesh origin.
    pub offset: Vec3,
}

impl SceneObject {
    pub fn new(mesh: Mesh, material: Material) -> Self {
        Self {
            mesh,
            material,
            spin: 1.0,
            offset: Vec3::ZERO,
        }
    }

    pub fn with_spin(mut self, spin: f32) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub light: Light,
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new(camera: Camera, light: Light) -> Self {
        Self {
            camera,
            light,
            objects: Vec::new(),
        }
    }

    pub fn add(&mut self, object: SceneObject) -> &mut Self {
        self.objects.push(object);
        self
    }

    /// Poses every object for animation angle `angle` (radians): scaled by
    /// [`OBJECT_SCALE`], turned about +Y by `angle * spin` and moved to its
    /// offset.
    ///
    /// The pose is absolute, so calling this with the same angle twice gives
    /// the same frame.
    pub fn animate(&mut self, angle: f32) {
        for object in &mut self.objects {
            object
                .mesh
                .transform_mut()
                .set_scale(OBJECT_SCALE)
                .set_rotation(0.0, angle * object.spin, 0.0)
                .set_translation(object.offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mat4::Mat4;
    use crate::projection::Projection;
    use approx::assert_relative_eq;

    fn scene() -> Scene {
        let camera = Camera::new(
            Vec3::new(0.0, 0.0, 40.0),
            Vec3::ZERO,
            Projection::from_degrees(90.0, 1.0, 1.0, 100.0),
        );
        let mut scene = Scene::new(camera, Light::default());
        scene
            .add(SceneObject::new(Mesh::cube(), Material::default()).with_offset(Vec3::new(-10.0, 0.0, 0.0)))
            .add(
                SceneObject::new(Mesh::cube(), Material::default())
                    .with_spin(-1.0)
                    .with_offset(Vec3::new(10.0, 0.0, 0.0)),
            );
        scene
    }

    #[test]
    fn animate_poses_objects_absolutely() {
        let mut scene = scene();
        scene.animate(0.5);
        scene.animate(0.0);
        for object in &scene.objects {
            let rotation = object.mesh.transform().rotation_matrix();
            assert_eq!(rotation, Mat4::identity());
        }
    }

    #[test]
    fn objects_spin_in_opposite_directions() {
        let mut scene = scene();
        scene.animate(0.25);
        let left = scene.objects[0].mesh.transform().model_matrix() * Vec3::new(0.0, 0.0, 0.9);
        let right = scene.objects[1].mesh.transform().model_matrix() * Vec3::new(0.0, 0.0, 0.9);
        // Mirror images about the YZ plane.
        assert_relative_eq!(left.x, -right.x, epsilon = 1e-4);
        assert_relative_eq!(left.z, right.z, epsilon = 1e-4);
    }
}
