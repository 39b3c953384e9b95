use hdbridge_common::{RendererId, SceneDelegateId};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::descriptor::{RendererDescriptor, SceneDelegateDescriptor};
use crate::manifest::PluginManifest;

/// Errors from registry queries and discovery.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no delegate registered with id {0:?}")]
    NotFound(String),
    #[error("delegate id {0:?} is already registered")]
    DuplicateId(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid plugin manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Catalog of installed renderers and scene delegates.
///
/// Registration order is preserved, so listings are stable for the lifetime
/// of the registry.
#[derive(Debug, Clone)]
pub struct DelegateRegistry {
    renderers: Vec<RendererDescriptor>,
    scene_delegates: Vec<SceneDelegateDescriptor>,
}

impl Default for DelegateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl DelegateRegistry {
    /// Registry holding the built-in Storm and Embree renderers and the
    /// default scene delegate.
    pub fn with_builtins() -> Self {
        Self {
            renderers: vec![RendererDescriptor::storm(), RendererDescriptor::embree()],
            scene_delegates: vec![SceneDelegateDescriptor::default_delegate()],
        }
    }

    /// Built-ins plus every `*.json` plugin manifest found in `dirs`.
    ///
    /// Manifests in one directory load in file-name order. Directories that do
    /// not exist are skipped.
    pub fn discover<P: AsRef<Path>>(dirs: &[P]) -> Result<Self, RegistryError> {
        let _span = tracing::info_span!("delegate_discovery").entered();
        let mut registry = Self::with_builtins();
        for dir in dirs {
            let dir = dir.as_ref();
            if !dir.is_dir() {
                tracing::debug!(dir = %dir.display(), "plugin directory missing, skipping");
                continue;
            }
            let mut manifests: Vec<PathBuf> = std::fs::read_dir(dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            manifests.sort();
            for path in manifests {
                registry.load_manifest(&path)?;
            }
        }
        tracing::debug!(
            renderers = registry.renderers.len(),
            scene_delegates = registry.scene_delegates.len(),
            "delegate discovery complete"
        );
        Ok(registry)
    }

    /// Register everything one manifest declares. Returns how many delegates
    /// were added. A manifest with any clashing id registers nothing.
    pub fn load_manifest(&mut self, path: impl AsRef<Path>) -> Result<usize, RegistryError> {
        let manifest = PluginManifest::load(path.as_ref())?;
        self.check_manifest(&manifest)?;
        let added = manifest.renderers.len() + manifest.scene_delegates.len();
        for renderer in manifest.renderers {
            self.register_renderer(renderer)?;
        }
        for delegate in manifest.scene_delegates {
            self.register_scene_delegate(delegate)?;
        }
        tracing::debug!(path = %path.as_ref().display(), added, "plugin manifest loaded");
        Ok(added)
    }

    fn check_manifest(&self, manifest: &PluginManifest) -> Result<(), RegistryError> {
        let mut renderers: BTreeSet<&str> = self.renderers.iter().map(|r| r.id.as_str()).collect();
        for renderer in &manifest.renderers {
            if !renderers.insert(renderer.id.as_str()) {
                return Err(RegistryError::DuplicateId(renderer.id.0.clone()));
            }
        }
        let mut delegates: BTreeSet<&str> =
            self.scene_delegates.iter().map(|d| d.id.as_str()).collect();
        for delegate in &manifest.scene_delegates {
            if !delegates.insert(delegate.id.as_str()) {
                return Err(RegistryError::DuplicateId(delegate.id.0.clone()));
            }
        }
        Ok(())
    }

    pub fn register_renderer(&mut self, renderer: RendererDescriptor) -> Result<(), RegistryError> {
        if self.renderers.iter().any(|r| r.id == renderer.id) {
            return Err(RegistryError::DuplicateId(renderer.id.0));
        }
        tracing::debug!(id = %renderer.id, name = %renderer.display_name, "renderer registered");
        self.renderers.push(renderer);
        Ok(())
    }

    pub fn register_scene_delegate(
        &mut self,
        delegate: SceneDelegateDescriptor,
    ) -> Result<(), RegistryError> {
        if self.scene_delegates.iter().any(|d| d.id == delegate.id) {
            return Err(RegistryError::DuplicateId(delegate.id.0));
        }
        tracing::debug!(id = %delegate.id, "scene delegate registered");
        self.scene_delegates.push(delegate);
        Ok(())
    }

    /// Every installed rendering backend, selectable or not.
    pub fn backend_ids(&self) -> Vec<RendererId> {
        self.renderers.iter().map(|r| r.id.clone()).collect()
    }

    /// Backends that may be chosen as a renderer. Always contains the
    /// Storm-like default.
    pub fn renderer_ids(&self) -> Vec<RendererId> {
        self.renderers
            .iter()
            .filter(|r| r.supported || r.storm_like)
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn renderer(&self, id: &str) -> Result<&RendererDescriptor, RegistryError> {
        self.renderers
            .iter()
            .find(|r| r.id.as_str() == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn renderers(&self) -> &[RendererDescriptor] {
        &self.renderers
    }

    /// Human-readable name of an installed renderer.
    pub fn display_name(&self, id: &str) -> Result<&str, RegistryError> {
        self.renderer(id).map(|r| r.display_name.as_str())
    }

    /// The default renderer.
    pub fn storm_like_id(&self) -> &RendererId {
        // `with_builtins` registers Storm first and nothing removes it.
        self.renderers
            .iter()
            .find(|r| r.storm_like)
            .map(|r| &r.id)
            .unwrap_or(&self.renderers[0].id)
    }

    pub fn scene_delegate_ids(&self) -> Vec<SceneDelegateId> {
        self.scene_delegates.iter().map(|d| d.id.clone()).collect()
    }
}
