//! Entry point for the drive-around demo.
//! Loads the scene once at startup and reports what the frame loop will draw.

use std::path::PathBuf;

use anyhow::{Context, Result};
use asset::{AssetRoot, IndexPolicy, LoadOptions, Scene, SceneManifest};

fn parse_assets_arg() -> AssetRoot {
    // --assets=<dir>, default ./resources
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--assets=") {
            return AssetRoot::new(val);
        }
    }
    AssetRoot::default()
}

fn parse_scene_arg() -> Option<PathBuf> {
    std::env::args().find_map(|arg| arg.strip_prefix("--scene=").map(PathBuf::from))
}

fn parse_index_width_arg() -> IndexPolicy {
    // Accept: --index-width=auto|u8|u16|u32
    let mut policy = IndexPolicy::Auto;
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--index-width=") {
            policy = val.parse().unwrap_or_else(|e| {
                log::warn!("{e}, falling back to auto.");
                IndexPolicy::Auto
            });
        }
    }
    policy
}

fn parse_print_scene_arg() -> bool {
    std::env::args().any(|arg| arg == "--print-scene")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let root = parse_assets_arg();
    let scene_path = parse_scene_arg();
    let options = LoadOptions {
        index_policy: parse_index_width_arg(),
    };

    let manifest = match &scene_path {
        Some(path) => SceneManifest::from_file(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => SceneManifest::builtin(),
    };

    if parse_print_scene_arg() {
        print!("{}", manifest.to_toml_string()?);
        return Ok(());
    }

    log::info!(
        "Starting drive. Assets: {}, index width: {:?}",
        root.root().display(),
        options.index_policy
    );

    let scene = Scene::load(&root, &manifest, &options).context("Failed to load scene")?;

    for mesh in scene.meshes() {
        let (x, y) = mesh.position();
        log::info!(
            "  {:<14} at ({:>6.1}, {:>6.1}) yaw {:>5.1}: {} verts, {} tris ({})",
            mesh.name,
            x,
            y,
            mesh.rotation_z(),
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.face_indices.width()
        );
    }

    let missing = scene.meshes().filter(|m| m.is_empty()).count();
    if missing > 0 {
        log::warn!("{missing} object(s) loaded without geometry");
    }

    log::info!(
        "Vehicle starts at ({}, {}) heading {}. Bye!",
        scene.vehicle_start.x,
        scene.vehicle_start.y,
        scene.vehicle_start.rotation_z
    );
    Ok(())
}
