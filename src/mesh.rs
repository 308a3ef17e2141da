use cgmath::{InnerSpace, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("{name} must be at least 1, got {value}")]
    ZeroSegments { name: &'static str, value: u32 },
    #[error("{name} must be positive and finite, got {value}")]
    NonPositiveDimension { name: &'static str, value: f32 },
    #[error("torus needs 0 <= inner radius < outer radius, got inner {inner} and outer {outer}")]
    InvertedTorus { inner: f32, outer: f32 },
    #[error("index list length {0} is not a multiple of 3")]
    RaggedIndices(usize),
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("expected {expected} vertex colors, got {actual}")]
    ColorCountMismatch { expected: usize, actual: usize },
    #[error("{count} vertices cannot be addressed with u32 indices")]
    TooManyVertices { count: u64 },
    #[error("{count} indices do not fit in a u32 index buffer")]
    TooManyIndices { count: u64 },
}

pub(crate) fn require_segments(name: &'static str, value: u32) -> Result<u32, GeometryError> {
    if value == 0 {
        return Err(GeometryError::ZeroSegments { name, value });
    }
    Ok(value)
}

pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<f32, GeometryError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(GeometryError::NonPositiveDimension { name, value });
    }
    Ok(value)
}

// Vertex and index totals must stay within u32 so indices and draw counts never wrap.
pub(crate) fn require_addressable(vertices: u64, indices: u64) -> Result<(), GeometryError> {
    if vertices > u64::from(u32::MAX) {
        return Err(GeometryError::TooManyVertices { count: vertices });
    }
    if indices > u64::from(u32::MAX) {
        return Err(GeometryError::TooManyIndices { count: indices });
    }
    Ok(())
}

/// Colors attached to a mesh.
///
/// A mesh either carries one color shared by every vertex or exactly one
/// color per vertex.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshColors {
    Uniform(Vector3<f32>),
    PerVertex(Vec<Vector3<f32>>),
}

const DEFAULT_COLOR: Vector3<f32> = Vector3::new(1.0, 1.0, 1.0);

/// Indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vector3<f32>>,
    indices: Vec<u32>,
    colors: Option<MeshColors>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vector3<f32>>, indices: Vec<u32>) -> Result<Self, GeometryError> {
        if indices.len() % 3 != 0 {
            return Err(GeometryError::RaggedIndices(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(GeometryError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }
        Ok(Self {
            vertices,
            indices,
            colors: None,
        })
    }

    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            colors: None,
        }
    }

    pub fn vertices(&self) -> &[Vector3<f32>] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn colors(&self) -> Option<&MeshColors> {
        self.colors.as_ref()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn with_uniform_color(mut self, color: Vector3<f32>) -> Self {
        self.colors = Some(MeshColors::Uniform(color));
        self
    }

    pub fn with_vertex_colors(mut self, colors: Vec<Vector3<f32>>) -> Result<Self, GeometryError> {
        if colors.len() != self.vertices.len() {
            return Err(GeometryError::ColorCountMismatch {
                expected: self.vertices.len(),
                actual: colors.len(),
            });
        }
        self.colors = Some(MeshColors::PerVertex(colors));
        Ok(self)
    }

    /// One color per vertex. Meshes without colors come out white.
    pub fn vertex_colors(&self) -> Vec<Vector3<f32>> {
        match &self.colors {
            Some(MeshColors::PerVertex(colors)) => colors.clone(),
            Some(MeshColors::Uniform(color)) => vec![*color; self.vertices.len()],
            None => vec![DEFAULT_COLOR; self.vertices.len()],
        }
    }

    /// Line-list indices tracing the outline of every triangle.
    pub fn wire_indices(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.indices.len() * 2);
        for [a, b, c] in self.triangles() {
            out.extend_from_slice(&[a, b, b, c, c, a]);
        }
        out
    }

    /// Appends `other`, shifting its indices past the current vertices.
    ///
    /// Colors survive only when both sides agree on them; otherwise they are
    /// expanded to per-vertex lists.
    pub fn append(&mut self, other: &Mesh) -> Result<(), GeometryError> {
        require_addressable(
            self.vertices.len() as u64 + other.vertices.len() as u64,
            self.indices.len() as u64 + other.indices.len() as u64,
        )?;
        let offset = self.vertices.len() as u32;
        self.colors = match (&self.colors, &other.colors) {
            (None, None) => None,
            (Some(MeshColors::Uniform(a)), Some(MeshColors::Uniform(b))) if a == b => {
                Some(MeshColors::Uniform(*a))
            }
            _ if self.vertices.is_empty() => other.colors.clone(),
            _ => {
                let mut colors = self.vertex_colors();
                colors.extend(other.vertex_colors());
                Some(MeshColors::PerVertex(colors))
            }
        };
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
        Ok(())
    }

    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.magnitude())
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        )
        .unwrap()
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = Mesh::new(vec![Vector3::new(0.0, 0.0, 0.0)], vec![0, 0, 1]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfRange {
                index: 1,
                vertex_count: 1
            }
        );
    }

    #[test]
    fn rejects_ragged_indices() {
        let err = Mesh::new(vec![Vector3::new(0.0, 0.0, 0.0)], vec![0, 0]).unwrap_err();
        assert_eq!(err, GeometryError::RaggedIndices(2));
    }

    #[test]
    fn vertex_colors_must_match_vertex_count() {
        let err = triangle()
            .with_vertex_colors(vec![Vector3::new(1.0, 0.0, 0.0)])
            .unwrap_err();
        assert_eq!(
            err,
            GeometryError::ColorCountMismatch {
                expected: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn uniform_color_expands_to_every_vertex() {
        let red = Vector3::new(1.0, 0.0, 0.0);
        let mesh = triangle().with_uniform_color(red);
        assert_eq!(mesh.vertex_colors(), vec![red; 3]);
        assert_eq!(triangle().vertex_colors(), vec![DEFAULT_COLOR; 3]);
    }

    #[test]
    fn wire_indices_outline_each_triangle() {
        assert_eq!(triangle().wire_indices(), vec![0, 1, 1, 2, 2, 0]);
    }

    #[test]
    fn append_offsets_indices_and_merges_colors() {
        let red = Vector3::new(1.0, 0.0, 0.0);
        let blue = Vector3::new(0.0, 0.0, 1.0);
        let mut a = triangle().with_uniform_color(red);
        a.append(&triangle().with_uniform_color(blue)).unwrap();
        assert_eq!(a.indices(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(a.vertex_count(), 6);
        assert_eq!(a.vertex_colors()[2], red);
        assert_eq!(a.vertex_colors()[3], blue);

        let mut b = Mesh::empty();
        b.append(&triangle().with_uniform_color(red)).unwrap();
        assert_eq!(b.colors(), Some(&MeshColors::Uniform(red)));
    }

    #[test]
    fn counts_past_u32_are_rejected() {
        let max = u64::from(u32::MAX);
        assert_eq!(require_addressable(max, max), Ok(()));
        assert_eq!(
            require_addressable(max + 1, 0),
            Err(GeometryError::TooManyVertices { count: max + 1 })
        );
        assert_eq!(
            require_addressable(3, max + 1),
            Err(GeometryError::TooManyIndices { count: max + 1 })
        );
    }
}
