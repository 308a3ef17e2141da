//! CPU-side packing of meshes and per-draw uniforms into the byte layouts the
//! WGSL shaders read, plus the matching pipeline descriptors.
//!
//! Vertices are pulled from storage buffers, so the pipeline declares no
//! vertex buffers at all.

use cgmath::{Matrix4, Vector3, Vector4};
use encase::{ShaderType, StorageBuffer, UniformBuffer, internal::WriteInto};
use thiserror::Error;
use wgpu::{
    BindGroupLayoutEntry, BindingType, BufferBindingType, Face, FrontFace,
    PolygonMode, PrimitiveState, PrimitiveTopology, ShaderStages,
};

use crate::{
    camera::{OrbitCamera, ProjectionSettings, Viewport},
    mesh::Mesh,
    scene::DrawItem,
};

/// Maps OpenGL clip depth [-1, 1] onto wgpu's [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("failed to pack buffer: {0}")]
    Pack(#[from] encase::internal::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DrawMode {
    #[default]
    Wireframe,
    Filled,
}

impl DrawMode {
    pub fn primitive_state(self) -> PrimitiveState {
        let (topology, cull_mode) = match self {
            DrawMode::Wireframe => (PrimitiveTopology::LineList, None),
            DrawMode::Filled => (PrimitiveTopology::TriangleList, Some(Face::Back)),
        };
        PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode,
            unclipped_depth: false,
            polygon_mode: PolygonMode::Fill,
            conservative: false,
        }
    }

    pub fn indices(self, mesh: &Mesh) -> Vec<u32> {
        match self {
            DrawMode::Wireframe => mesh.wire_indices(),
            DrawMode::Filled => mesh.indices().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, ShaderType)]
pub struct GpuVertex {
    pub position: Vector3<f32>,
    pub color: Vector3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, ShaderType)]
pub struct DrawUniforms {
    pub model_view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub color: Vector4<f32>,
}

impl DrawUniforms {
    pub fn for_item(
        item: &DrawItem,
        camera: &OrbitCamera,
        viewport: Viewport,
        projection: &ProjectionSettings,
    ) -> Self {
        let transforms = item.transforms(camera, viewport, projection);
        Self {
            model_view: transforms.model_view,
            projection: OPENGL_TO_WGPU_MATRIX * transforms.projection,
            color: item.color,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, GpuError> {
        let mut interim_buffer = UniformBuffer::new(Vec::<u8>::new());
        interim_buffer.write(self)?;
        Ok(interim_buffer.into_inner())
    }
}

fn interim_storage_buffer<T: ShaderType + WriteInto>(st: &T) -> Result<Vec<u8>, GpuError> {
    let mut o = StorageBuffer::new(Vec::<u8>::new());
    o.write(st)?;
    Ok(o.into_inner())
}

/// Storage-buffer contents for one mesh in one draw mode.
#[derive(Debug, Clone)]
pub struct MeshBuffers {
    pub vertices: Vec<u8>,
    pub indices: Vec<u8>,
    pub index_count: u32,
    pub primitive: PrimitiveState,
}

impl MeshBuffers {
    pub fn pack(mesh: &Mesh, mode: DrawMode) -> Result<Self, GpuError> {
        let vertices: Vec<GpuVertex> = mesh
            .vertices()
            .iter()
            .zip(mesh.vertex_colors())
            .map(|(&position, color)| GpuVertex { position, color })
            .collect();
        let indices = mode.indices(mesh);
        Ok(Self {
            vertices: interim_storage_buffer(&vertices)?,
            index_count: indices.len() as u32,
            indices: interim_storage_buffer(&indices)?,
            primitive: mode.primitive_state(),
        })
    }
}

/// Layout of bind group 0: draw uniforms, vertices, indices.
pub fn draw_bind_group_layout_entries() -> [BindGroupLayoutEntry; 3] {
    let storage = |binding| BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::VERTEX,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };
    [
        BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(DrawUniforms::min_size()),
            },
            count: None,
        },
        storage(1),
        storage(2),
    ]
}
