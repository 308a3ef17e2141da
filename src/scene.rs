use cgmath::{Matrix4, Vector3, Vector4};
use log::debug;

use crate::{
    camera::{OrbitCamera, ProjectionSettings, Viewport},
    mesh::{GeometryError, Mesh},
    shapes::{Shape, generate_ellipsoid, generate_palm_tree, generate_plane},
};

const WATER_COLOR: Vector4<f32> = Vector4::new(0.0, 0.4, 0.7, 1.0);
const ISLAND_COLOR: Vector4<f32> = Vector4::new(0.2, 0.6, 0.2, 1.0);
const ISLAND_SCALE: f32 = 0.5;

// (trunk height, trunk radius, leaf size) and placement of each palm.
const PALMS: [([f32; 3], [f32; 3]); 3] = [
    ([0.3, 0.05, 0.1], [0.1, 0.05, 0.2]),
    ([0.35, 0.05, 0.12], [-0.2, 0.05, -0.3]),
    ([0.3, 0.04, 0.1], [0.3, 0.05, -0.4]),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTransforms {
    pub model_view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub label: String,
    pub mesh: Mesh,
    pub model: Matrix4<f32>,
    pub color: Vector4<f32>,
}

impl DrawItem {
    pub fn new(label: impl Into<String>, mesh: Mesh, model: Matrix4<f32>, color: Vector4<f32>) -> Self {
        Self {
            label: label.into(),
            mesh,
            model,
            color,
        }
    }

    pub fn transforms(
        &self,
        camera: &OrbitCamera,
        viewport: Viewport,
        projection: &ProjectionSettings,
    ) -> DrawTransforms {
        DrawTransforms {
            model_view: camera.view_matrix() * self.model,
            projection: camera.projection_matrix(viewport, projection),
        }
    }
}

/// Everything drawn in one frame, in draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub items: Vec<DrawItem>,
}

impl Scene {
    /// Water, a flattened island and three palm trees.
    pub fn island() -> Result<Self, GeometryError> {
        let mut items = vec![
            DrawItem::new(
                "water",
                generate_plane(5.0)?,
                Matrix4::from_scale(1.0),
                WATER_COLOR,
            ),
            DrawItem::new(
                "island",
                generate_ellipsoid(1.5, 0.2, 1.5, 20, 20)?,
                Matrix4::from_scale(ISLAND_SCALE),
                ISLAND_COLOR,
            ),
        ];
        for (i, ([height, radius, leaf], [x, y, z])) in PALMS.into_iter().enumerate() {
            items.push(DrawItem::new(
                format!("palm{}", i + 1),
                generate_palm_tree(height, radius, leaf)?.into_mesh(),
                Matrix4::from_translation(Vector3::new(x, y, z)),
                ISLAND_COLOR,
            ));
        }
        let scene = Self { items };
        debug!(
            "island scene: {} items, {} triangles",
            scene.items.len(),
            scene.triangle_count()
        );
        Ok(scene)
    }

    /// A single shape at the origin.
    pub fn single(shape: Shape) -> Result<Self, GeometryError> {
        let color = match shape {
            Shape::Water => WATER_COLOR,
            _ => ISLAND_COLOR,
        };
        Ok(Self {
            items: vec![DrawItem::new(
                shape.name(),
                shape.build()?,
                Matrix4::from_scale(1.0),
                color,
            )],
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.items.iter().map(|item| item.mesh.vertex_count()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.items.iter().map(|item| item.mesh.triangle_count()).sum()
    }
}
