//! Startup scene: which models to load, where they sit and how they're tinted.
//!
//! A manifest can come from a TOML file:
//!
//! ```toml
//! [vehicle_start]
//! y = -4.0
//! direction = 180.0
//!
//! [[scenery]]
//! model = "ground.obj"
//! color = [128, 128, 128]
//!
//! [[scenery]]
//! model = "tree.obj"
//! color = [60, 128, 60]
//! x = -10.0
//! y = -100.0
//!
//! [[vehicle]]
//! model = "chasis.obj"
//! color = [255, 255, 0]
//! ```

use std::{fs, io, path::Path};

use corelib::{CoreError, Placement, Rgb8};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    locate::AssetRoot,
    mesh::{Mesh, MeshDesc},
    obj::{LoadOptions, load_mesh},
};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read scene manifest '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse scene manifest '{origin}': {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize scene manifest: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid placement for '{model}': {source}")]
    InvalidEntry {
        model: String,
        #[source]
        source: CoreError,
    },
}

/// One model instance in the manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    /// File name under the models directory.
    pub model: String,
    pub color: [u8; 3],
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    /// Yaw in degrees.
    #[serde(default)]
    pub rotation_z: f32,
}

impl SceneEntry {
    pub fn new(model: &str, color: [u8; 3], x: f32, y: f32) -> Self {
        Self {
            model: model.to_owned(),
            color,
            x,
            y,
            rotation_z: 0.0,
        }
    }

    pub fn desc(&self) -> Result<MeshDesc, ManifestError> {
        let placement = Placement::try_new(self.x, self.y, self.rotation_z).map_err(|source| {
            ManifestError::InvalidEntry {
                model: self.model.clone(),
                source,
            }
        })?;
        Ok(MeshDesc::new(
            self.model.clone(),
            placement,
            Rgb8::from(self.color),
        ))
    }
}

/// Initial vehicle pose handed to the frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleStart {
    pub x: f32,
    pub y: f32,
    /// Heading in degrees.
    pub direction: f32,
}

impl Default for VehicleStart {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: -4.0,
            direction: 180.0,
        }
    }
}

impl VehicleStart {
    pub fn placement(&self) -> Placement {
        Placement::new(self.x, self.y, self.direction)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneManifest {
    #[serde(default)]
    pub vehicle_start: VehicleStart,
    #[serde(default)]
    pub scenery: Vec<SceneEntry>,
    #[serde(default)]
    pub vehicle: Vec<SceneEntry>,
}

impl SceneManifest {
    /// The drive-around course: ground, buildings and hill, a row of trees
    /// along each of the north and south edges, and the three vehicle parts.
    pub fn builtin() -> Self {
        const GREY: [u8; 3] = [128, 128, 128];
        const TREE: [u8; 3] = [60, 128, 60];
        const BLADDER: [u8; 3] = [30, 30, 30];
        const BODY: [u8; 3] = [255, 255, 0];

        let mut scenery = vec![
            SceneEntry::new("ground.obj", GREY, 0.0, 0.0),
            SceneEntry::new("buildings.obj", GREY, 0.0, 0.0),
            SceneEntry::new("hill.obj", GREY, 0.0, 0.0),
        ];
        for row_y in [-100.0, 100.0] {
            // 0, -10 .. -90, then 10 .. 90
            let xs = std::iter::once(0)
                .chain((1..=9).map(|i| -10 * i))
                .chain((1..=9).map(|i| 10 * i));
            scenery.extend(xs.map(|x| SceneEntry::new("tree.obj", TREE, x as f32, row_y)));
        }

        let vehicle = vec![
            SceneEntry::new("bladder.obj", BLADDER, 0.0, 0.0),
            SceneEntry::new("chasis.obj", BODY, 0.0, 0.0),
            SceneEntry::new("fans.obj", BODY, 0.0, 0.0),
        ];

        Self {
            vehicle_start: VehicleStart::default(),
            scenery,
            vehicle,
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ManifestError> {
        toml::from_str(contents).map_err(|source| ManifestError::Parse {
            origin: "<inline>".to_owned(),
            source,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ManifestError::Parse {
            origin: path.display().to_string(),
            source,
        })
    }

    /// Read `path`, falling back to [`SceneManifest::builtin`] on any error.
    pub fn from_file_or_builtin(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(manifest) => {
                log::info!("Loaded scene manifest from {}", path.display());
                manifest
            }
            Err(e) => {
                log::warn!("{e}, using built-in scene");
                Self::builtin()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ManifestError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Every entry as a mesh description, scenery first.
    fn descs(&self) -> Result<(Vec<MeshDesc>, Vec<MeshDesc>), ManifestError> {
        let scenery: Vec<MeshDesc> = self
            .scenery
            .iter()
            .map(SceneEntry::desc)
            .collect::<Result<_, _>>()?;
        let vehicle: Vec<MeshDesc> = self
            .vehicle
            .iter()
            .map(SceneEntry::desc)
            .collect::<Result<_, _>>()?;
        Ok((scenery, vehicle))
    }
}

/// Loaded scene, owning every mesh.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub scenery: Vec<Mesh>,
    pub vehicle: Vec<Mesh>,
    pub vehicle_start: Placement,
}

impl Scene {
    /// Load every manifest entry in order.
    ///
    /// Placements are checked before any file is opened. Individual model
    /// failures don't stop the load; those meshes come back empty.
    pub fn load(
        root: &AssetRoot,
        manifest: &SceneManifest,
        options: &LoadOptions,
    ) -> Result<Self, ManifestError> {
        let (scenery, vehicle) = manifest.descs()?;
        let load_all = |descs: Vec<MeshDesc>| -> Vec<Mesh> {
            descs
                .iter()
                .map(|desc| load_mesh(root.model_path(&desc.name), desc, options))
                .collect()
        };

        let scene = Self {
            scenery: load_all(scenery),
            vehicle: load_all(vehicle),
            vehicle_start: manifest.vehicle_start.placement(),
        };
        log::info!(
            "Scene loaded: {} scenery objects, {} vehicle parts, {} triangles",
            scene.scenery.len(),
            scene.vehicle.len(),
            scene.triangle_count()
        );
        Ok(scene)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.scenery.iter().chain(self.vehicle.iter())
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes().map(Mesh::triangle_count).sum()
    }
}
