//! Delegate registry: which rendering backends and scene delegates exist.
//!
//! # Invariants
//! - Ids are unique within their namespace.
//! - Descriptors are immutable once registered.
//! - The Storm-like default renderer and the default scene delegate are
//!   always present.

mod descriptor;
mod manifest;
mod registry;

pub use descriptor::{RenderSetting, RendererDescriptor, SceneDelegateDescriptor, SettingValue};
pub use manifest::PluginManifest;
pub use registry::{DelegateRegistry, RegistryError};

pub fn crate_info() -> &'static str {
    "hdbridge-registry v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("registry"));
    }
}
