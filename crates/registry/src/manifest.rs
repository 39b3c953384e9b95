use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::descriptor::{RendererDescriptor, SceneDelegateDescriptor};
use crate::registry::RegistryError;

/// A plugin manifest: the delegates one installed plugin contributes.
///
/// ```json
/// {
///   "renderers": [
///     { "id": "HdArnoldRendererPlugin", "displayName": "Arnold",
///       "settings": [ { "key": "AASamples", "default": { "int": 3 } } ] }
///   ],
///   "sceneDelegates": [ { "id": "HdMayaProxyDelegate" } ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginManifest {
    pub renderers: Vec<RendererDescriptor>,
    pub scene_delegates: Vec<SceneDelegateDescriptor>,
}

impl PluginManifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
            RegistryError::Manifest {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self).map_err(|source| RegistryError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }
}
