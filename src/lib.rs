pub mod camera;
pub mod config;
pub mod gpu;
pub mod input;
pub mod mesh;
pub mod scene;
pub mod shapes;
pub mod snapshot;

pub use camera::{
    CameraLimits, CameraReadout, OrbitCamera, ProjectionSettings, Viewport, ZoomTarget,
    projection_matrix, spherical_to_cartesian,
};
pub use config::{ConfigError, ViewerConfig};
pub use gpu::{DrawMode, DrawUniforms, GpuError, MeshBuffers};
pub use input::{FrameRequests, InputEvent, InputSettings, OrbitController, WheelDelta, apply_input};
pub use mesh::{GeometryError, Mesh, MeshColors};
pub use scene::{DrawItem, Scene};
pub use shapes::{
    PalmTree, Shape, generate_box, generate_cylinder, generate_ellipsoid, generate_palm_tree,
    generate_plane, generate_sphere, generate_torus,
};
pub use snapshot::{SnapshotError, render_wireframe, save_png};
