use hdbridge_common::{BridgeConfig, EditorHandle, RendererId};
use hdbridge_registry::DelegateRegistry;
use std::collections::{BTreeMap, BTreeSet};

use crate::override_name::{OverrideTarget, parse_override_name};

/// Errors from override operations.
#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    #[error("unknown render delegate {0}")]
    UnknownDelegate(RendererId),
}

/// What an activate/deactivate call did to one editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationChange {
    /// Editor went from the default renderer to `0`.
    Activated(RendererId),
    /// Editor moved from one renderer straight to another.
    Switched { from: RendererId, to: RendererId },
    /// Editor already was in the requested state.
    Unchanged,
    /// Editor went back to the default renderer from `0`.
    Cleared(RendererId),
}

/// Per-editor renderer overrides.
///
/// An editor with no entry uses the host's default renderer. Every mutation
/// is complete when the call returns, so the next query observes it.
#[derive(Debug, Clone)]
pub struct ViewportOverrideController {
    config: BridgeConfig,
    selectable: BTreeSet<RendererId>,
    overrides: BTreeMap<EditorHandle, RendererId>,
}

impl ViewportOverrideController {
    /// Controller accepting the renderers `registry` marks selectable.
    pub fn new(registry: &DelegateRegistry) -> Self {
        Self::with_config(registry, BridgeConfig::default())
    }

    pub fn with_config(registry: &DelegateRegistry, config: BridgeConfig) -> Self {
        Self {
            config,
            selectable: registry.renderer_ids().into_iter().collect(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Make `renderer` the override of `editor`, replacing any previous one.
    pub fn activate(
        &mut self,
        editor: &EditorHandle,
        renderer: &RendererId,
    ) -> Result<ActivationChange, OverrideError> {
        if !self.selectable.contains(renderer) {
            return Err(OverrideError::UnknownDelegate(renderer.clone()));
        }
        let change = match self.overrides.insert(editor.clone(), renderer.clone()) {
            None => ActivationChange::Activated(renderer.clone()),
            Some(previous) if previous == *renderer => ActivationChange::Unchanged,
            Some(previous) => ActivationChange::Switched {
                from: previous,
                to: renderer.clone(),
            },
        };
        if change != ActivationChange::Unchanged {
            tracing::debug!(%editor, %renderer, ?change, "renderer override set");
        }
        Ok(change)
    }

    /// Return `editor` to the default renderer.
    pub fn deactivate(&mut self, editor: &EditorHandle) -> ActivationChange {
        match self.overrides.remove(editor) {
            Some(previous) => {
                tracing::debug!(%editor, renderer = %previous, "renderer override cleared");
                ActivationChange::Cleared(previous)
            }
            None => ActivationChange::Unchanged,
        }
    }

    /// Apply an override name assigned by the host.
    ///
    /// The empty string clears the override; `<prefix><id>` activates `id`. A
    /// name owned by another plugin means none of our renderers draws the
    /// editor, so it is cleared as well.
    pub fn apply_override_name(
        &mut self,
        editor: &EditorHandle,
        name: &str,
    ) -> Result<ActivationChange, OverrideError> {
        match parse_override_name(&self.config, name) {
            OverrideTarget::Default => Ok(self.deactivate(editor)),
            OverrideTarget::Renderer(id) => self.activate(editor, &id),
            OverrideTarget::Foreign(other) => {
                tracing::trace!(%editor, override_name = %other, "editor drawn by another override");
                Ok(self.deactivate(editor))
            }
        }
    }

    /// Check that applying `name` would succeed, without changing anything.
    pub fn validate_override_name(&self, name: &str) -> Result<(), OverrideError> {
        match parse_override_name(&self.config, name) {
            OverrideTarget::Renderer(id) if !self.selectable.contains(&id) => {
                Err(OverrideError::UnknownDelegate(id))
            }
            _ => Ok(()),
        }
    }

    pub fn active_for(&self, editor: &EditorHandle) -> Option<&RendererId> {
        self.overrides.get(editor)
    }

    /// Renderers overriding at least one editor, each listed once, sorted.
    pub fn list_active(&self) -> Vec<RendererId> {
        self.overrides
            .values()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Editors currently drawn by `renderer`.
    pub fn editors_using(&self, renderer: &RendererId) -> Vec<EditorHandle> {
        self.overrides
            .iter()
            .filter(|(_, r)| *r == renderer)
            .map(|(e, _)| e.clone())
            .collect()
    }

    /// Clear every override. Returns how many editors were reset.
    pub fn reset(&mut self) -> usize {
        let cleared = self.overrides.len();
        self.overrides.clear();
        if cleared > 0 {
            tracing::debug!(cleared, "all renderer overrides cleared");
        }
        cleared
    }
}
