//! Procedural mesh generators.
//!
//! Every generator is a pure function of its parameters: the same inputs
//! always yield the same vertices in the same order.

use std::{
    f32::consts::{PI, TAU},
    ops::Range,
};

use cgmath::Vector3;
use log::debug;

use crate::mesh::{GeometryError, Mesh, require_addressable, require_positive, require_segments};

pub const TRUNK_SEGMENTS: u32 = 16;
pub const LEAF_COUNT: u32 = 6;
const LEAF_ANGLE_OFFSET: f32 = PI / 6.0;
const LEAF_SPREAD: f32 = PI / 3.0;
const LEAF_RISE: f32 = 0.2;
const LEAF_TIP_SCALE: f32 = 1.5;

// Vertex and index counts of a (rows + 1) x (columns + 1) grid.
fn grid_counts(rows: u32, columns: u32) -> Result<(usize, usize), GeometryError> {
    let vertices = (u64::from(rows) + 1).saturating_mul(u64::from(columns) + 1);
    let indices = (u64::from(rows) * u64::from(columns)).saturating_mul(6);
    require_addressable(vertices, indices)?;
    Ok((vertices as usize, indices as usize))
}

// Triangulates a (rows + 1) x (columns + 1) grid of vertices laid out row-major.
// Callers check the counts with `grid_counts` first.
fn grid_indices(rows: u32, columns: u32, capacity: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(capacity);
    for row in 0..rows {
        for column in 0..columns {
            let first = row * (columns + 1) + column;
            let second = first + columns + 1;
            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }
    indices
}

/// UV-sampled ellipsoid centred on the origin.
///
/// Latitude runs from the +Y pole (θ = 0) to the -Y pole (θ = π), longitude
/// sweeps a full turn. The seam column is duplicated so every band closes.
pub fn generate_ellipsoid(
    radius_x: f32,
    radius_y: f32,
    radius_z: f32,
    longitude_bands: u32,
    latitude_bands: u32,
) -> Result<Mesh, GeometryError> {
    require_segments("longitude_bands", longitude_bands)?;
    require_segments("latitude_bands", latitude_bands)?;
    require_positive("radius_x", radius_x)?;
    require_positive("radius_y", radius_y)?;
    require_positive("radius_z", radius_z)?;
    let (vertex_count, index_count) = grid_counts(latitude_bands, longitude_bands)?;

    let mut vertices = Vec::with_capacity(vertex_count);
    for lat in 0..=latitude_bands {
        let theta = lat as f32 * PI / latitude_bands as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for long in 0..=longitude_bands {
            let phi = long as f32 * TAU / longitude_bands as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            vertices.push(Vector3::new(
                radius_x * cos_phi * sin_theta,
                radius_y * cos_theta,
                radius_z * sin_phi * sin_theta,
            ));
        }
    }

    let indices = grid_indices(latitude_bands, longitude_bands, index_count);
    debug!(
        "ellipsoid ({radius_x}, {radius_y}, {radius_z}) with {longitude_bands}x{latitude_bands} bands: {} vertices, {} triangles",
        vertices.len(),
        indices.len() / 3
    );
    Mesh::new(vertices, indices)
}

pub fn generate_sphere(
    radius: f32,
    longitude_bands: u32,
    latitude_bands: u32,
) -> Result<Mesh, GeometryError> {
    generate_ellipsoid(radius, radius, radius, longitude_bands, latitude_bands)
}

/// Horizontal square of edge `size` in the y = 0 plane.
pub fn generate_plane(size: f32) -> Result<Mesh, GeometryError> {
    let half = require_positive("size", size)? / 2.0;
    let vertices = vec![
        Vector3::new(-half, 0.0, -half),
        Vector3::new(half, 0.0, -half),
        Vector3::new(half, 0.0, half),
        Vector3::new(-half, 0.0, half),
    ];
    Mesh::new(vertices, vec![0, 1, 2, 0, 2, 3])
}

// Side wall of an open cylinder standing on y = 0. Each sample pushes a base
// vertex followed by a top vertex.
fn cylinder_wall(height: f32, radius: f32, segments: u32) -> (Vec<Vector3<f32>>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(2 * (segments as usize + 1));
    let mut indices = Vec::with_capacity(6 * segments as usize);
    for i in 0..=segments {
        let angle = i as f32 * TAU / segments as f32;
        let (sin, cos) = angle.sin_cos();
        let (x, z) = (radius * cos, radius * sin);
        vertices.push(Vector3::new(x, 0.0, z));
        vertices.push(Vector3::new(x, height, z));

        if i < segments {
            let first = i * 2;
            let second = (i + 1) * 2;
            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }
    (vertices, indices)
}

/// Closed cylinder: side wall plus a fan cap at each end.
pub fn generate_cylinder(height: f32, radius: f32, segments: u32) -> Result<Mesh, GeometryError> {
    require_segments("segments", segments)?;
    require_positive("height", height)?;
    require_positive("radius", radius)?;
    // Wall pairs plus two cap centres; wall and caps take six indices per segment each.
    require_addressable(
        2 * (u64::from(segments) + 1) + 2,
        12 * u64::from(segments),
    )?;

    let (mut vertices, mut indices) = cylinder_wall(height, radius, segments);
    let bottom_centre = vertices.len() as u32;
    vertices.push(Vector3::new(0.0, 0.0, 0.0));
    let top_centre = bottom_centre + 1;
    vertices.push(Vector3::new(0.0, height, 0.0));
    for i in 0..segments {
        let base = i * 2;
        let next_base = (i + 1) * 2;
        indices.extend_from_slice(&[bottom_centre, next_base, base]);
        indices.extend_from_slice(&[top_centre, base + 1, next_base + 1]);
    }
    Mesh::new(vertices, indices)
}

/// Axis-aligned box centred on the origin.
pub fn generate_box(width: f32, height: f32, depth: f32) -> Result<Mesh, GeometryError> {
    let x = require_positive("width", width)? / 2.0;
    let y = require_positive("height", height)? / 2.0;
    let z = require_positive("depth", depth)? / 2.0;
    let vertices = vec![
        Vector3::new(-x, -y, z),
        Vector3::new(x, -y, z),
        Vector3::new(x, y, z),
        Vector3::new(-x, y, z),
        Vector3::new(-x, -y, -z),
        Vector3::new(x, -y, -z),
        Vector3::new(x, y, -z),
        Vector3::new(-x, y, -z),
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 1, 2, 0, 2, 3, // front
        5, 4, 7, 5, 7, 6, // back
        4, 0, 3, 4, 3, 7, // left
        1, 5, 6, 1, 6, 2, // right
        3, 2, 6, 3, 6, 7, // top
        4, 5, 1, 4, 1, 0, // bottom
    ];
    Mesh::new(vertices, indices)
}

/// Torus lying in the XZ plane.
///
/// `inner_radius` is the radius of the hole and `outer_radius` the overall
/// radius, so the tube has radius `(outer - inner) / 2`. `radial_segments`
/// go around the tube, `tubular_segments` around the ring.
pub fn generate_torus(
    inner_radius: f32,
    outer_radius: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> Result<Mesh, GeometryError> {
    require_segments("radial_segments", radial_segments)?;
    require_segments("tubular_segments", tubular_segments)?;
    if !(inner_radius.is_finite() && outer_radius.is_finite())
        || inner_radius < 0.0
        || inner_radius >= outer_radius
    {
        return Err(GeometryError::InvertedTorus {
            inner: inner_radius,
            outer: outer_radius,
        });
    }

    let ring = (inner_radius + outer_radius) / 2.0;
    let tube = (outer_radius - inner_radius) / 2.0;
    let (vertex_count, index_count) = grid_counts(radial_segments, tubular_segments)?;
    let mut vertices = Vec::with_capacity(vertex_count);
    for j in 0..=radial_segments {
        let v = j as f32 * TAU / radial_segments as f32;
        let (sin_v, cos_v) = v.sin_cos();
        for i in 0..=tubular_segments {
            let u = i as f32 * TAU / tubular_segments as f32;
            let (sin_u, cos_u) = u.sin_cos();
            let reach = ring + tube * cos_v;
            vertices.push(Vector3::new(reach * cos_u, tube * sin_v, reach * sin_u));
        }
    }

    let indices = grid_indices(radial_segments, tubular_segments, index_count);
    debug!(
        "torus ({inner_radius}, {outer_radius}) with {radial_segments}x{tubular_segments} segments: {} vertices",
        vertices.len()
    );
    Mesh::new(vertices, indices)
}

/// A palm tree mesh together with the split between trunk and leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct PalmTree {
    pub mesh: Mesh,
    trunk_vertex_count: u32,
    trunk_index_count: usize,
}

impl PalmTree {
    pub fn trunk_vertices(&self) -> Range<u32> {
        0..self.trunk_vertex_count
    }

    pub fn trunk_indices(&self) -> &[u32] {
        &self.mesh.indices()[..self.trunk_index_count]
    }

    pub fn leaf_indices(&self) -> &[u32] {
        &self.mesh.indices()[self.trunk_index_count..]
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }
}

/// Palm tree: a 16-sided trunk wall with six flat leaves fanned out just
/// above its top. Leaves share no vertices with the trunk or with each other.
pub fn generate_palm_tree(
    trunk_height: f32,
    trunk_radius: f32,
    leaf_size: f32,
) -> Result<PalmTree, GeometryError> {
    require_positive("trunk_height", trunk_height)?;
    require_positive("trunk_radius", trunk_radius)?;
    require_positive("leaf_size", leaf_size)?;

    let (mut vertices, mut indices) = cylinder_wall(trunk_height, trunk_radius, TRUNK_SEGMENTS);
    let trunk_vertex_count = vertices.len() as u32;
    let trunk_index_count = indices.len();

    let leaf_height = trunk_height + LEAF_RISE;
    let tip = leaf_size * LEAF_TIP_SCALE;
    for i in 0..LEAF_COUNT {
        let angle = i as f32 * TAU / LEAF_COUNT as f32 + LEAF_ANGLE_OFFSET;
        let start = vertices.len() as u32;
        vertices.push(Vector3::new(
            angle.cos() * leaf_size,
            leaf_height,
            angle.sin() * leaf_size,
        ));
        for side in [angle + LEAF_SPREAD, angle - LEAF_SPREAD] {
            vertices.push(Vector3::new(side.cos() * tip, leaf_height, side.sin() * tip));
        }
        indices.extend_from_slice(&[start, start + 1, start + 2]);
    }

    Ok(PalmTree {
        mesh: Mesh::new(vertices, indices)?,
        trunk_vertex_count,
        trunk_index_count,
    })
}

/// The shapes offered by the viewer's shape selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Shape {
    Island,
    Water,
    Palm,
    Sphere,
    Cube,
    Cylinder,
    Torus,
}

impl Shape {
    pub fn name(self) -> &'static str {
        match self {
            Shape::Island => "island",
            Shape::Water => "water",
            Shape::Palm => "palm",
            Shape::Sphere => "sphere",
            Shape::Cube => "cube",
            Shape::Cylinder => "cylinder",
            Shape::Torus => "torus",
        }
    }

    pub fn build(self) -> Result<Mesh, GeometryError> {
        match self {
            Shape::Island => generate_ellipsoid(1.5, 0.2, 1.5, 20, 20),
            Shape::Water => generate_plane(5.0),
            Shape::Palm => generate_palm_tree(0.3, 0.05, 0.1).map(PalmTree::into_mesh),
            Shape::Sphere => generate_sphere(0.5, 24, 16),
            Shape::Cube => generate_box(0.8, 0.8, 0.8),
            Shape::Cylinder => generate_cylinder(1.0, 0.3, 24),
            Shape::Torus => generate_torus(0.3, 0.7, 16, 32),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use approx::assert_abs_diff_eq;
    use cgmath::InnerSpace;
    use clap::ValueEnum;

    use super::*;

    #[test]
    fn ellipsoid_index_count_and_range() {
        for (long, lat) in [(1, 1), (3, 2), (20, 20), (7, 13)] {
            let mesh = generate_ellipsoid(1.5, 0.2, 1.5, long, lat).unwrap();
            assert_eq!(mesh.indices().len(), (lat * long * 6) as usize);
            assert_eq!(mesh.vertex_count(), ((lat + 1) * (long + 1)) as usize);
            assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertex_count()));
        }
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let r = 2.5;
        for (long, lat) in [(1, 1), (4, 3), (16, 9)] {
            let mesh = generate_ellipsoid(r, r, r, long, lat).unwrap();
            for v in mesh.vertices() {
                assert_abs_diff_eq!(v.magnitude(), r, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn ellipsoid_starts_at_the_north_pole() {
        let mesh = generate_ellipsoid(1.5, 0.2, 1.5, 4, 4).unwrap();
        let top = mesh.vertices()[0];
        assert_abs_diff_eq!(top, Vector3::new(0.0, 0.2, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn zero_bands_are_rejected() {
        assert_eq!(
            generate_ellipsoid(1.0, 1.0, 1.0, 0, 4).unwrap_err(),
            GeometryError::ZeroSegments {
                name: "longitude_bands",
                value: 0
            }
        );
        assert!(generate_ellipsoid(1.0, 1.0, 1.0, 4, 0).is_err());
        assert!(generate_torus(0.3, 0.7, 0, 8).is_err());
        assert!(generate_torus(0.3, 0.7, 8, 0).is_err());
        assert!(generate_cylinder(1.0, 1.0, 0).is_err());
    }

    #[test]
    fn oversized_grids_are_rejected_before_allocating() {
        assert_eq!(
            generate_ellipsoid(1.0, 1.0, 1.0, 70_000, 70_000).unwrap_err(),
            GeometryError::TooManyVertices {
                count: 70_001 * 70_001
            }
        );
        // The vertices fit in u32 but six indices per quad do not.
        assert_eq!(
            generate_ellipsoid(1.0, 1.0, 1.0, 40_000, 40_000).unwrap_err(),
            GeometryError::TooManyIndices {
                count: 6 * 40_000 * 40_000
            }
        );
        assert!(matches!(
            generate_torus(0.3, 0.7, u32::MAX, u32::MAX),
            Err(GeometryError::TooManyVertices { .. })
        ));
        assert!(matches!(
            generate_cylinder(1.0, 0.3, u32::MAX),
            Err(GeometryError::TooManyVertices { .. })
        ));
    }

    #[test]
    fn non_positive_dimensions_are_rejected() {
        assert!(generate_plane(0.0).is_err());
        assert!(generate_plane(f32::NAN).is_err());
        assert!(generate_ellipsoid(-1.0, 1.0, 1.0, 4, 4).is_err());
        assert!(generate_palm_tree(0.3, 0.0, 0.1).is_err());
        assert!(generate_box(1.0, 1.0, -1.0).is_err());
    }

    #[test]
    fn plane_corners_and_triangles() {
        let mesh = generate_plane(5.0).unwrap();
        let corners: Vec<(f32, f32, f32)> = mesh.vertices().iter().map(|v| (v.x, v.y, v.z)).collect();
        assert_eq!(
            corners,
            vec![
                (-2.5, 0.0, -2.5),
                (2.5, 0.0, -2.5),
                (2.5, 0.0, 2.5),
                (-2.5, 0.0, 2.5)
            ]
        );
        assert_eq!(mesh.triangle_count(), 2);

        // Both triangles share the 0-2 diagonal and together cover the square.
        let area: f32 = mesh
            .triangles()
            .map(|[a, b, c]| {
                let (a, b, c) = (
                    mesh.vertices()[a as usize],
                    mesh.vertices()[b as usize],
                    mesh.vertices()[c as usize],
                );
                (b - a).cross(c - a).magnitude() / 2.0
            })
            .sum();
        assert_abs_diff_eq!(area, 25.0, epsilon = 1e-4);
    }

    #[test]
    fn palm_leaves_are_separate_from_trunk() {
        let palm = generate_palm_tree(0.3, 0.05, 0.1).unwrap();
        assert_eq!(palm.leaf_indices().len(), 3 * LEAF_COUNT as usize);
        assert_eq!(palm.trunk_indices().len(), 6 * TRUNK_SEGMENTS as usize);
        let trunk = palm.trunk_vertices();
        assert_eq!(trunk.end, 2 * (TRUNK_SEGMENTS + 1));
        assert!(palm.leaf_indices().iter().all(|i| !trunk.contains(i)));

        let distinct: HashSet<u32> = palm.leaf_indices().iter().copied().collect();
        assert_eq!(distinct.len(), palm.leaf_indices().len());
    }

    #[test]
    fn palm_leaves_sit_above_the_trunk() {
        let palm = generate_palm_tree(0.35, 0.05, 0.12).unwrap();
        for &i in palm.leaf_indices() {
            assert_abs_diff_eq!(palm.mesh.vertices()[i as usize].y, 0.55, epsilon = 1e-6);
        }
    }

    #[test]
    fn torus_stays_between_its_radii() {
        let mesh = generate_torus(0.3, 0.7, 12, 24).unwrap();
        assert_eq!(mesh.indices().len(), 12 * 24 * 6);
        for v in mesh.vertices() {
            let planar = (v.x * v.x + v.z * v.z).sqrt();
            assert!(planar >= 0.3 - 1e-5 && planar <= 0.7 + 1e-5);
            assert!(v.y.abs() <= 0.2 + 1e-5);
        }
        assert!(generate_torus(0.7, 0.3, 8, 8).is_err());
    }

    #[test]
    fn generators_are_deterministic() {
        for &shape in Shape::value_variants() {
            assert_eq!(shape.build().unwrap(), shape.build().unwrap());
        }
    }

    #[test]
    fn labels_match_cli_names() {
        for &shape in Shape::value_variants() {
            let value = shape.to_possible_value().unwrap();
            assert_eq!(value.get_name(), shape.name());
            assert_eq!(Shape::from_str(shape.name(), true).unwrap(), shape);
        }
        assert!(Shape::from_str("volcano", true).is_err());
    }
}
