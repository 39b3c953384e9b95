use hdbridge_common::{BridgeConfig, RendererId};
use hdbridge_registry::{DelegateRegistry, SettingValue};
use serde::Serialize;
use std::collections::BTreeMap;

pub const ENABLE_MOTION_SAMPLES: &str = "EnableMotionSamples";
pub const TEXTURE_MEMORY_PER_TEXTURE: &str = "TextureMemoryPerTexture";
pub const MAXIMUM_SHADOW_MAP_RESOLUTION: &str = "MaximumShadowMapResolution";
pub const COLOR_SELECTION_HIGHLIGHT: &str = "ColorSelectionHighlight";
pub const COLOR_SELECTION_HIGHLIGHT_COLOR: &str = "ColorSelectionHighlightColor";
pub const WIREFRAME_SELECTION_HIGHLIGHT: &str = "WireframeSelectionHighlight";
pub const SELECTION_OUTLINE: &str = "SelectionOutline";

/// Errors from attribute access.
#[derive(Debug, thiserror::Error)]
pub enum GlobalsError {
    #[error("render-global attribute {0} does not exist")]
    MissingAttribute(String),
    #[error("render-global attribute {name} holds {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Attribute name of a renderer-specific setting: `<rendererId>__<key>`.
pub fn renderer_attribute_name(renderer: &RendererId, key: &str) -> String {
    format!("{renderer}__{key}")
}

/// Every attribute `create` makes, with its default, in creation order.
pub fn documented_defaults(
    config: &BridgeConfig,
    registry: &DelegateRegistry,
) -> Vec<(String, SettingValue)> {
    let mut defaults = vec![
        (ENABLE_MOTION_SAMPLES, SettingValue::Bool(false)),
        (TEXTURE_MEMORY_PER_TEXTURE, SettingValue::Int(4096)),
        (MAXIMUM_SHADOW_MAP_RESOLUTION, SettingValue::Int(2048)),
        (COLOR_SELECTION_HIGHLIGHT, SettingValue::Bool(true)),
        (
            COLOR_SELECTION_HIGHLIGHT_COLOR,
            SettingValue::Color([1.0, 1.0, 0.0, 0.5]),
        ),
        (WIREFRAME_SELECTION_HIGHLIGHT, SettingValue::Bool(true)),
        (SELECTION_OUTLINE, SettingValue::Float(4.0)),
    ]
    .into_iter()
    .map(|(setting, value)| (config.attribute_name(setting), value))
    .collect::<Vec<_>>();

    for renderer in registry.renderers() {
        for setting in &renderer.settings {
            defaults.push((
                renderer_attribute_name(&renderer.id, &setting.key),
                setting.default.clone(),
            ));
        }
    }
    defaults
}

/// Render-global attributes of the current document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderGlobals {
    #[serde(skip)]
    config: BridgeConfig,
    attributes: BTreeMap<String, SettingValue>,
}

impl RenderGlobals {
    /// Globals of a fresh document: no attributes yet.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            attributes: BTreeMap::new(),
        }
    }

    /// Ensure every documented attribute exists. Existing attributes keep
    /// their values. Returns how many attributes were created.
    pub fn create(&mut self, registry: &DelegateRegistry) -> usize {
        let mut created = 0;
        for (name, default) in documented_defaults(&self.config, registry) {
            if !self.attributes.contains_key(&name) {
                tracing::debug!(attribute = %name, value = %default, "render global created");
                self.attributes.insert(name, default);
                created += 1;
            }
        }
        created
    }

    /// Put documented defaults back into every attribute that exists.
    pub fn reset_defaults(&mut self, registry: &DelegateRegistry) {
        for (name, default) in documented_defaults(&self.config, registry) {
            if let Some(slot) = self.attributes.get_mut(&name) {
                *slot = default;
            }
        }
        tracing::debug!("render globals reset to defaults");
    }

    /// Drop every attribute, as when the host opens a new document.
    pub fn new_document(&mut self) {
        self.attributes.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.attributes.get(name)
    }

    /// Bridge-wide setting by its short name, e.g. [`ENABLE_MOTION_SAMPLES`].
    pub fn setting(&self, setting: &str) -> Option<&SettingValue> {
        self.attributes.get(&self.config.attribute_name(setting))
    }

    /// Change an existing attribute. The value type cannot change.
    pub fn set(&mut self, name: &str, value: SettingValue) -> Result<(), GlobalsError> {
        let slot = self
            .attributes
            .get_mut(name)
            .ok_or_else(|| GlobalsError::MissingAttribute(name.to_string()))?;
        if std::mem::discriminant(slot) != std::mem::discriminant(&value) {
            return Err(GlobalsError::TypeMismatch {
                name: name.to_string(),
                expected: slot.kind(),
                actual: value.kind(),
            });
        }
        *slot = value;
        Ok(())
    }

    pub fn attributes(&self) -> &BTreeMap<String, SettingValue> {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdbridge_common::EMBREE_RENDERER_ID;

    fn motion_samples(config: &BridgeConfig) -> String {
        config.attribute_name(ENABLE_MOTION_SAMPLES)
    }

    #[test]
    fn fresh_document_has_no_attributes() {
        let globals = RenderGlobals::new(BridgeConfig::default());
        assert!(!globals.contains(&motion_samples(&BridgeConfig::default())));
        assert!(globals.is_empty());
    }

    #[test]
    fn create_installs_documented_defaults() {
        let registry = DelegateRegistry::with_builtins();
        let config = BridgeConfig::default();
        let mut globals = RenderGlobals::new(config.clone());
        let created = globals.create(&registry);

        assert_eq!(created, documented_defaults(&config, &registry).len());
        let motion = globals.get(&motion_samples(&config)).unwrap();
        assert!(!motion.is_truthy());
        assert_eq!(
            globals.setting(COLOR_SELECTION_HIGHLIGHT_COLOR),
            Some(&SettingValue::Color([1.0, 1.0, 0.0, 0.5]))
        );
        let embree_ao = renderer_attribute_name(
            &RendererId::from(EMBREE_RENDERER_ID),
            "ambientOcclusionSamples",
        );
        assert_eq!(globals.get(&embree_ao), Some(&SettingValue::Int(16)));
    }

    #[test]
    fn create_is_idempotent_and_keeps_edits() {
        let registry = DelegateRegistry::with_builtins();
        let config = BridgeConfig::default();
        let mut globals = RenderGlobals::new(config.clone());
        globals.create(&registry);
        let once = globals.attributes().clone();

        assert_eq!(globals.create(&registry), 0);
        assert_eq!(globals.attributes(), &once);

        globals
            .set(&motion_samples(&config), SettingValue::Bool(true))
            .unwrap();
        globals.create(&registry);
        assert_eq!(
            globals.get(&motion_samples(&config)),
            Some(&SettingValue::Bool(true))
        );
    }

    #[test]
    fn set_checks_existence_and_type() {
        let registry = DelegateRegistry::with_builtins();
        let config = BridgeConfig::default();
        let mut globals = RenderGlobals::new(config.clone());
        assert!(matches!(
            globals.set(&motion_samples(&config), SettingValue::Bool(true)),
            Err(GlobalsError::MissingAttribute(_))
        ));
        globals.create(&registry);
        let err = globals
            .set(&motion_samples(&config), SettingValue::Int(1))
            .unwrap_err();
        assert!(matches!(err, GlobalsError::TypeMismatch { expected: "bool", .. }));
        assert_eq!(
            err.to_string(),
            "render-global attribute hdbridgeEnableMotionSamples holds bool, got int"
        );
        assert_eq!(
            GlobalsError::MissingAttribute("hdbridgeNope".into()).to_string(),
            "render-global attribute hdbridgeNope does not exist"
        );
    }

    #[test]
    fn reset_and_new_document() {
        let registry = DelegateRegistry::with_builtins();
        let config = BridgeConfig::default();
        let mut globals = RenderGlobals::new(config.clone());
        globals.create(&registry);
        globals
            .set(&motion_samples(&config), SettingValue::Bool(true))
            .unwrap();

        globals.reset_defaults(&registry);
        assert_eq!(
            globals.get(&motion_samples(&config)),
            Some(&SettingValue::Bool(false))
        );

        globals.new_document();
        assert!(globals.is_empty());
    }

    #[test]
    fn serializes_attribute_map() {
        let registry = DelegateRegistry::with_builtins();
        let mut globals = RenderGlobals::new(BridgeConfig::default());
        globals.create(&registry);
        let json = serde_json::to_value(&globals).unwrap();
        assert_eq!(
            json["attributes"]["hdbridgeEnableMotionSamples"],
            serde_json::json!({"bool": false})
        );
    }
}
