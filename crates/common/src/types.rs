use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of the built-in rasterizing renderer. Always installed and selectable.
pub const STORM_RENDERER_ID: &str = "HdStormRendererPlugin";

/// Id of the built-in ray-tracing renderer.
pub const EMBREE_RENDERER_ID: &str = "HdEmbreeRendererPlugin";

/// Id of the scene delegate that is always registered.
pub const DEFAULT_SCENE_DELEGATE_ID: &str = "HdMayaSceneDelegate";

/// Stable identifier of a rendering backend (a render delegate plugin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RendererId(pub String);

impl RendererId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The default rasterizing renderer.
    pub fn storm() -> Self {
        Self::new(STORM_RENDERER_ID)
    }
}

impl fmt::Display for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RendererId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of a scene delegate (how host scene data is fed to a renderer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneDelegateId(pub String);

impl SceneDelegateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneDelegateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneDelegateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Opaque handle of a viewport editor owned by the host (e.g. `modelPanel4`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditorHandle(pub String);

impl EditorHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EditorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EditorHandle {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storm_id_matches_constant() {
        assert_eq!(RendererId::storm().as_str(), STORM_RENDERER_ID);
    }

    #[test]
    fn ids_display_verbatim() {
        assert_eq!(RendererId::from("HdFooPlugin").to_string(), "HdFooPlugin");
        assert_eq!(EditorHandle::from("modelPanel4").to_string(), "modelPanel4");
        assert_eq!(SceneDelegateId::from("Scene").to_string(), "Scene");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&RendererId::storm()).unwrap();
        assert_eq!(json, format!("\"{STORM_RENDERER_ID}\""));
    }
}
