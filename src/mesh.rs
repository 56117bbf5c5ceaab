//! Polygon meshes and their loaders.
//!
//! A [`Mesh`] owns model-space vertices, polygon faces of any arity, the
//! normals derived from them and one display color per face. Meshes come
//! from the whitespace-separated `.d` format, from Wavefront OBJ files via
//! `tobj`, or from [`Mesh::cube`].
//!
//! # `.d` format
//!
//! ```text
//! data 4 1
//! -1 -1 0   1 -1 0   1 1 0   -1 1 0
//! 4 1 2 3 4
//! ```
//!
//! A header token, the vertex and face counts, the vertex triples, then each
//! face as a side count followed by that many 1-based vertex indices.

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use log::{debug, info};
use rand::Rng;

use crate::math::vec3::Vec3;
use crate::transform::Transform;

/// Side of the box every loaded model is scaled into, per axis.
const UNIT_BOX_EXTENT: f32 = 0.9;
/// Bounding boxes smaller than this are left unscaled.
const DEGENERATE_EXTENT: f32 = 1e-6;

/// Errors raised while loading meshes and textures.
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Image(image::ImageError),
    Obj(tobj::LoadError),
    Parse(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "I/O error: {}", e),
            LoadError::Image(e) => write!(f, "image error: {}", e),
            LoadError::Obj(e) => write!(f, "OBJ error: {}", e),
            LoadError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Image(e) => Some(e),
            LoadError::Obj(e) => Some(e),
            LoadError::Parse(_) => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<image::ImageError> for LoadError {
    fn from(e: image::ImageError) -> Self {
        LoadError::Image(e)
    }
}

impl From<tobj::LoadError> for LoadError {
    fn from(e: tobj::LoadError) -> Self {
        LoadError::Obj(e)
    }
}

/// An ordered list of vertex indices describing a convex, planar polygon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub indices: Vec<usize>,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
    face_normals: Vec<Vec3>,
    vertex_normals: Vec<Vec3>,
    face_colors: Vec<Vec3>,
    transform: Transform,
}

impl Mesh {
    /// Builds a mesh from raw geometry, deriving normals and face colors.
    ///
    /// Fails when a face has fewer than three sides or references a vertex
    /// that does not exist.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        faces: Vec<Face>,
    ) -> Result<Self, LoadError> {
        for (i, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(LoadError::Parse(format!(
                    "face {} has {} sides, need at least 3",
                    i,
                    face.len()
                )));
            }
            if let Some(&bad) = face.indices.iter().find(|&&v| v >= vertices.len()) {
                return Err(LoadError::Parse(format!(
                    "face {} references vertex {} but the mesh has {}",
                    i,
                    bad + 1,
                    vertices.len()
                )));
            }
        }

        let face_normals: Vec<Vec3> = faces
            .iter()
            .map(|face| {
                let v0 = vertices[face.indices[0]];
                let v1 = vertices[face.indices[1]];
                let v2 = vertices[face.indices[2]];
                (v1 - v0).cross(v2 - v0).normalize()
            })
            .collect();

        let mut vertex_normals = vec![Vec3::ZERO; vertices.len()];
        for (face, normal) in faces.iter().zip(&face_normals) {
            for &index in &face.indices {
                vertex_normals[index] += *normal;
            }
        }
        for normal in &mut vertex_normals {
            *normal = normal.normalize();
        }

        let mut rng = rand::rng();
        let face_colors = (0..faces.len())
            .map(|_| Vec3::new(rng.random::<f32>(), rng.random::<f32>(), rng.random::<f32>()))
            .collect();

        Ok(Self {
            name: name.into(),
            vertices,
            faces,
            face_normals,
            vertex_normals,
            face_colors,
            transform: Transform::default(),
        })
    }

    /// Loads a model file, choosing the parser by extension (`.obj` through
    /// tobj, anything else as `.d`), and fits it into the unit box.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let is_obj = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));

        let mesh = if is_obj {
            Self::from_obj(path)?
        } else {
            Self::parse(name, &fs::read_to_string(path)?)?
        };

        info!(
            "Loaded '{}' from {}: {} vertices, {} faces",
            mesh.name,
            path.display(),
            mesh.vertices.len(),
            mesh.faces.len()
        );
        Ok(mesh)
    }

    /// Reads a `.d` model from any reader.
    pub fn from_reader<R: Read>(name: impl Into<String>, mut reader: R) -> Result<Self, LoadError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(name, &text)
    }

    /// Parses a `.d` model and fits it into the unit box.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, LoadError> {
        let mut tokens = text.split_whitespace();

        tokens
            .next()
            .ok_or_else(|| LoadError::Parse("empty model file".to_string()))?;
        let vertex_count: usize = next_number(&mut tokens, "vertex count")?;
        let face_count: usize = next_number(&mut tokens, "face count")?;

        // Declared counts are not trusted for allocation.
        let mut vertices = Vec::new();
        for i in 0..vertex_count {
            let what = format!("coordinate of vertex {}", i + 1);
            let x = next_number(&mut tokens, &what)?;
            let y = next_number(&mut tokens, &what)?;
            let z = next_number(&mut tokens, &what)?;
            vertices.push(Vec3::new(x, y, z));
        }

        let mut faces = Vec::new();
        for i in 0..face_count {
            let sides: usize = next_number(&mut tokens, &format!("side count of face {}", i + 1))?;
            let mut indices = Vec::new();
            for _ in 0..sides {
                let index: usize = next_number(&mut tokens, &format!("index of face {}", i + 1))?;
                if index == 0 {
                    return Err(LoadError::Parse(format!(
                        "face {} uses index 0 but indices are 1-based",
                        i + 1
                    )));
                }
                indices.push(index - 1);
            }
            faces.push(Face::new(indices));
        }

        let mut mesh = Self::new(name, vertices, faces)?;
        mesh.resize_to_unit_box();
        Ok(mesh)
    }

    /// Loads every object of an OBJ file into one mesh, keeping polygon
    /// arities, and fits it into the unit box.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let options = tobj::LoadOptions {
            single_index: false,
            triangulate: false,
            ..Default::default()
        };
        let (models, _materials) = tobj::load_obj(path, &options)?;

        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            let offset = vertices.len();
            vertices.extend(
                mesh.positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );

            // An empty arity list means every face is a triangle.
            let mut cursor = 0;
            let mut push_face = |arity: usize| {
                let indices = mesh.indices[cursor..cursor + arity]
                    .iter()
                    .map(|&i| offset + i as usize)
                    .collect();
                cursor += arity;
                faces.push(Face::new(indices));
            };
            if mesh.face_arities.is_empty() {
                for _ in 0..mesh.indices.len() / 3 {
                    push_face(3);
                }
            } else {
                for &arity in &mesh.face_arities {
                    push_face(arity as usize);
                }
            }
            debug!("OBJ object '{}': {} positions", model.name, mesh.positions.len() / 3);
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut mesh = Self::new(name, vertices, faces)?;
        mesh.resize_to_unit_box();
        Ok(mesh)
    }

    /// Axis-aligned cube with six quad faces wound counter-clockwise when
    /// seen from outside.
    pub fn cube() -> Self {
        let vertices = vec![
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];
        let faces = [
            [4, 5, 6, 7], // front (+z)
            [1, 0, 3, 2], // back (-z)
            [5, 1, 2, 6], // right (+x)
            [0, 4, 7, 3], // left (-x)
            [7, 6, 2, 3], // top (+y)
            [0, 1, 5, 4], // bottom (-y)
        ]
        .iter()
        .map(|f| Face::new(f.to_vec()))
        .collect();

        let mut mesh = match Self::new("cube", vertices, faces) {
            Ok(mesh) => mesh,
            Err(e) => unreachable!("built-in cube is valid: {}", e),
        };
        mesh.resize_to_unit_box();
        mesh
    }

    /// Axis-aligned bounds of the model-space vertices, `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut iter = self.vertices.iter();
        let Some(&first) = iter.next() else {
            return (Vec3::ZERO, Vec3::ZERO);
        };
        iter.fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Rescales the vertices so the longest bounding-box side spans
    /// `[-0.9, 0.9]`, measured from the box minimum.
    ///
    /// Degenerate boxes are left untouched.
    pub fn resize_to_unit_box(&mut self) {
        let (min, max) = self.bounds();
        let longest = (max - min).max_component();
        if longest < DEGENERATE_EXTENT {
            debug!("'{}' has a degenerate bounding box, not resizing", self.name);
            return;
        }

        for v in &mut self.vertices {
            *v = ((*v - min) / longest * 2.0 - Vec3::ONE) * UNIT_BOX_EXTENT;
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face_normals(&self) -> &[Vec3] {
        &self.face_normals
    }

    pub fn vertex_normals(&self) -> &[Vec3] {
        &self.vertex_normals
    }

    pub fn face_colors(&self) -> &[Vec3] {
        &self.face_colors
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Mean of a face's vertices in model space.
    pub fn face_centroid(&self, face: usize) -> Vec3 {
        let indices = &self.faces[face].indices;
        let sum = indices
            .iter()
            .fold(Vec3::ZERO, |acc, &i| acc + self.vertices[i]);
        sum / indices.len() as f32
    }
}

fn next_number<'a, T, I>(tokens: &mut I, what: &str) -> Result<T, LoadError>
where
    T: std::str::FromStr,
    I: Iterator<Item = &'a str>,
{
    let token = tokens
        .next()
        .ok_or_else(|| LoadError::Parse(format!("unexpected end of file reading {}", what)))?;
    token
        .parse()
        .map_err(|_| LoadError::Parse(format!("invalid {} '{}'", what, token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const QUAD: &str = "data 4 1\n\
        -2 -2 0\n 2 -2 0\n 2 2 0\n -2 2 0\n\
        4 1 2 3 4\n";

    #[test]
    fn parses_d_format_with_one_based_indices() {
        let mesh = Mesh::parse("quad", QUAD).unwrap();
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.faces()[0].indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn face_normal_follows_counter_clockwise_winding() {
        let mesh = Mesh::parse("quad", QUAD).unwrap();
        assert_eq!(mesh.face_normals()[0], Vec3::FORWARD);
    }

    #[test]
    fn resize_maps_longest_side_to_unit_box() {
        let mesh = Mesh::parse("quad", QUAD).unwrap();
        let (min, max) = mesh.bounds();
        assert_relative_eq!(min.x, -0.9, epsilon = 1e-6);
        assert_relative_eq!(max.y, 0.9, epsilon = 1e-6);
        // The flat axis starts at the box minimum like every other axis.
        assert_relative_eq!(min.z, -0.9, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_box_is_not_resized() {
        let mut mesh = Mesh::new(
            "point",
            vec![Vec3::ONE, Vec3::ONE, Vec3::ONE],
            vec![Face::new(vec![0, 1, 2])],
        )
        .unwrap();
        mesh.resize_to_unit_box();
        assert_eq!(mesh.vertices()[0], Vec3::ONE);
        assert_eq!(mesh.face_normals()[0], Vec3::ZERO);
    }

    #[test]
    fn vertex_normals_average_incident_faces() {
        let mesh = Mesh::cube();
        let corner = mesh.vertex_normals()[6];
        let expected = Vec3::ONE.normalize();
        assert_relative_eq!(corner.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(corner.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(corner.z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn cube_faces_point_outward() {
        let mesh = Mesh::cube();
        for (i, normal) in mesh.face_normals().iter().enumerate() {
            let outward = mesh.face_centroid(i).normalize();
            assert_relative_eq!(normal.dot(outward), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn rejects_absurd_counts() {
        let err = Mesh::parse("huge", "data 4000000000000000000 1 0 0 0").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));

        let err = Mesh::parse("huge", "data 3 1 0 0 0 1 0 0 0 1 0 4000000000000000000 1 2 3")
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn obj_keeps_arities_and_offsets_later_objects() {
        let path = std::env::temp_dir().join(format!("scanfill-mixed-{}.obj", std::process::id()));
        std::fs::write(
            &path,
            "o quad\n\
             v 0 0 0\nv 2 0 0\nv 2 2 0\nv 0 2 0\n\
             f 1 2 3 4\n\
             o tri\n\
             v 0 0 1\nv 2 0 1\nv 1 2 1\n\
             f 5 6 7\n",
        )
        .unwrap();
        let mesh = Mesh::from_obj(&path);
        std::fs::remove_file(&path).unwrap();
        let mesh = mesh.unwrap();

        let arities: Vec<usize> = mesh.faces().iter().map(|f| f.indices.len()).collect();
        assert_eq!(arities, vec![4, 3]);
        assert_eq!(mesh.faces()[0].indices, vec![0, 1, 2, 3]);
        assert_eq!(mesh.faces()[1].indices, vec![4, 5, 6]);
        assert_eq!(mesh.vertices().len(), 7);

        // Longest extent (2 along x and y) spans [-0.9, 0.9].
        let (min, max) = mesh.bounds();
        assert_relative_eq!(min.x, -0.9, epsilon = 1e-6);
        assert_relative_eq!(max.y, 0.9, epsilon = 1e-6);
        assert_relative_eq!(mesh.vertices()[1].x, 0.9, epsilon = 1e-6);
        assert_relative_eq!(mesh.vertices()[6].z - mesh.vertices()[0].z, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = Mesh::parse("bad", "data 3 1 0 0 0 1 0 0 0 1 0 3 1 2 4").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn rejects_two_sided_face() {
        let err = Mesh::parse("bad", "data 2 1 0 0 0 1 0 0 2 1 2").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn rejects_truncated_file() {
        let err = Mesh::parse("bad", "data 3 1 0 0 0 1 0").unwrap_err();
        assert!(err.to_string().contains("unexpected end"));
    }

    #[test]
    fn face_colors_are_in_unit_range() {
        let mesh = Mesh::cube();
        assert_eq!(mesh.face_colors().len(), 6);
        for c in mesh.face_colors() {
            assert!(c.x >= 0.0 && c.x < 1.0);
        }
    }

    #[test]
    fn from_reader_matches_parse() {
        let mesh = Mesh::from_reader("quad", QUAD.as_bytes()).unwrap();
        assert_eq!(mesh.faces().len(), 1);
    }
}
