use hdbridge_common::{BridgeConfig, RendererId};

/// What an editor's renderer-override name asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideTarget {
    /// Empty name: the default renderer.
    Default,
    /// One of ours: `<prefix><rendererId>`.
    Renderer(RendererId),
    /// An override owned by some other plugin.
    Foreign(String),
}

/// Decode an override name assigned to an editor by the host.
pub fn parse_override_name(config: &BridgeConfig, name: &str) -> OverrideTarget {
    if name.is_empty() {
        return OverrideTarget::Default;
    }
    match name.strip_prefix(config.override_prefix.as_str()) {
        Some(id) if !id.is_empty() => OverrideTarget::Renderer(RendererId::new(id)),
        _ => OverrideTarget::Foreign(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_default() {
        assert_eq!(
            parse_override_name(&BridgeConfig::default(), ""),
            OverrideTarget::Default
        );
    }

    #[test]
    fn prefixed_name_strips_prefix() {
        let config = BridgeConfig::default();
        let name = config.override_name(&RendererId::storm());
        assert_eq!(
            parse_override_name(&config, &name),
            OverrideTarget::Renderer(RendererId::storm())
        );
    }

    #[test]
    fn bare_prefix_and_other_names_are_foreign() {
        let config = BridgeConfig::default();
        assert!(matches!(
            parse_override_name(&config, &config.override_prefix),
            OverrideTarget::Foreign(_)
        ));
        assert_eq!(
            parse_override_name(&config, "arnoldViewOverride"),
            OverrideTarget::Foreign("arnoldViewOverride".into())
        );
    }
}
