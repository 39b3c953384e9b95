use serde::{Deserialize, Serialize};

use crate::types::RendererId;

/// Naming conventions the bridge shares with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Prefix of renderer-override names assigned to editors. The rest of the
    /// name is the renderer id.
    pub override_prefix: String,
    /// Prefix of the bridge-wide render-global attributes.
    pub attribute_prefix: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            override_prefix: "hdbridgeRenderOverride_".into(),
            attribute_prefix: "hdbridge".into(),
        }
    }
}

impl BridgeConfig {
    /// Override name the host assigns to an editor to select `renderer`.
    pub fn override_name(&self, renderer: &RendererId) -> String {
        format!("{}{}", self.override_prefix, renderer)
    }

    /// Full attribute name for a bridge-wide setting, e.g. `EnableMotionSamples`.
    pub fn attribute_name(&self, setting: &str) -> String {
        format!("{}{}", self.attribute_prefix, setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_name_is_prefix_plus_id() {
        let config = BridgeConfig::default();
        assert_eq!(
            config.override_name(&RendererId::storm()),
            "hdbridgeRenderOverride_HdStormRendererPlugin"
        );
    }

    #[test]
    fn attribute_name_uses_prefix() {
        let config = BridgeConfig {
            attribute_prefix: "mtoh".into(),
            ..BridgeConfig::default()
        };
        assert_eq!(
            config.attribute_name("EnableMotionSamples"),
            "mtohEnableMotionSamples"
        );
    }
}
