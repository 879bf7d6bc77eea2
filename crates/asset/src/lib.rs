//! Asset loading for the drive-around scene.
//! OBJ subset reader (`v` and `f a//n` records), mesh container handed to the
//! renderer, asset path resolution and the startup scene manifest.

pub mod error;
pub mod locate;
pub mod mesh;
pub mod obj;
pub mod scene;

pub use error::{LoadError, MalformedRecord, RecordTag};
pub use locate::AssetRoot;
pub use mesh::{IndexBuffer, IndexPolicy, IndexWidth, Mesh, MeshDesc};
pub use obj::{
    LoadOptions, LoadReport, ParsedObj, load_mesh, parse_obj_reader, parse_obj_str, try_load_mesh,
};
pub use scene::{ManifestError, Scene, SceneEntry, SceneManifest, VehicleStart};
