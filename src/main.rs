use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use isla::{
    DrawMode, DrawUniforms, InputEvent, MeshBuffers, OrbitController, Scene, Shape, Viewport,
    ViewerConfig, WheelDelta, render_wireframe, save_png,
};
use log::info;

#[derive(Parser)]
#[command(name = "isla")]
#[command(about = "Build the island scene, orbit the camera and write a wireframe snapshot")]
struct Cli {
    /// TOML file with camera, limits, input and projection settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show a single shape instead of the full island scene
    #[arg(short, long, value_enum)]
    shape: Option<Shape>,

    /// Drag the camera by this many pixels
    #[arg(long, num_args = 2, value_names = ["DX", "DY"], allow_negative_numbers = true)]
    drag: Option<Vec<f32>>,

    /// Turn the wheel by this many lines (positive zooms in)
    #[arg(long, allow_negative_numbers = true)]
    zoom: Option<f32>,

    /// Apply the wheel to the field of view instead of the orbit radius
    #[arg(long)]
    zoom_fov: bool,

    /// Index layout used when packing GPU buffers
    #[arg(long, value_enum, default_value_t = DrawMode::Wireframe)]
    mode: DrawMode,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(short, long, default_value = "isla.png")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    let viewport = Viewport::new(
        cli.width.unwrap_or(config.viewport.width),
        cli.height.unwrap_or(config.viewport.height),
    );

    let mut camera = config.initial_camera();
    let mut controller = OrbitController::new(config.input, config.limits);
    if let Some(drag) = &cli.drag {
        controller.handle(
            &mut camera,
            InputEvent::Drag {
                dx: drag[0],
                dy: drag[1],
            },
        );
    }
    if let Some(lines) = cli.zoom {
        controller.handle(
            &mut camera,
            InputEvent::Wheel {
                delta: WheelDelta::Line(lines),
                modifier: cli.zoom_fov,
            },
        );
    }
    info!("camera {}", camera.readout());

    let scene = match cli.shape {
        Some(shape) => Scene::single(shape),
        None => Scene::island(),
    }
    .context("building scene")?;
    info!(
        "scene: {} items, {} vertices, {} triangles",
        scene.items.len(),
        scene.vertex_count(),
        scene.triangle_count()
    );

    for item in &scene.items {
        let buffers = MeshBuffers::pack(&item.mesh, cli.mode)?;
        let uniforms =
            DrawUniforms::for_item(item, &camera, viewport, &config.projection).to_bytes()?;
        info!(
            "{}: {} vertex bytes, {} indices ({:?}), {} uniform bytes",
            item.label,
            buffers.vertices.len(),
            buffers.index_count,
            buffers.primitive.topology,
            uniforms.len()
        );
    }

    let image = render_wireframe(&scene, &camera, viewport, &config.projection)?;
    save_png(&image, &cli.output)?;
    Ok(())
}
