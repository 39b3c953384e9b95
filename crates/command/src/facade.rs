use hdbridge_common::BridgeConfig;
use hdbridge_globals::RenderGlobals;
use hdbridge_registry::DelegateRegistry;
use hdbridge_viewport::ViewportOverrideController;
use std::fmt;

use crate::request::{CommandError, CommandRequest};

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Ordered ids (renderers, scene delegates, or active renderers).
    Ids(Vec<String>),
    /// A single string, e.g. a display name.
    Text(String),
    /// Render globals ensured; the count of attributes that had to be created.
    GlobalsCreated(usize),
}

impl CommandOutput {
    pub fn ids(&self) -> Option<&[String]> {
        match self {
            Self::Ids(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ids(ids) => {
                for id in ids {
                    writeln!(f, "{id}")?;
                }
                Ok(())
            }
            Self::Text(text) => writeln!(f, "{text}"),
            Self::GlobalsCreated(_) => Ok(()),
        }
    }
}

/// The bridge command: owns the registry, the per-editor overrides and the
/// render globals of the current document.
pub struct CommandFacade {
    registry: DelegateRegistry,
    overrides: ViewportOverrideController,
    globals: RenderGlobals,
}

impl CommandFacade {
    pub fn new(registry: DelegateRegistry) -> Self {
        Self::with_config(registry, BridgeConfig::default())
    }

    pub fn with_config(registry: DelegateRegistry, config: BridgeConfig) -> Self {
        let overrides = ViewportOverrideController::with_config(&registry, config.clone());
        Self {
            registry,
            overrides,
            globals: RenderGlobals::new(config),
        }
    }

    /// Run a validated request.
    pub fn execute(&mut self, request: &CommandRequest) -> Result<CommandOutput, CommandError> {
        let _span = tracing::info_span!("bridge_command", flag = request.flag()).entered();

        let output = match request {
            CommandRequest::ListRenderers => CommandOutput::Ids(
                self.registry
                    .renderer_ids()
                    .into_iter()
                    .map(|id| id.0)
                    .collect(),
            ),
            CommandRequest::ListActiveRenderers => CommandOutput::Ids(
                self.overrides
                    .list_active()
                    .into_iter()
                    .map(|id| id.0)
                    .collect(),
            ),
            CommandRequest::ListDelegates => CommandOutput::Ids(
                self.registry
                    .scene_delegate_ids()
                    .into_iter()
                    .map(|id| id.0)
                    .collect(),
            ),
            CommandRequest::GetRendererDisplayName { renderer } => {
                CommandOutput::Text(self.registry.display_name(renderer.as_str())?.to_string())
            }
            CommandRequest::CreateRenderGlobals => {
                CommandOutput::GlobalsCreated(self.globals.create(&self.registry))
            }
            CommandRequest::UpdateRenderGlobals => {
                return Err(CommandError::Unsupported(request.flag()));
            }
        };
        tracing::debug!(?output, "command complete");
        Ok(output)
    }

    /// Validate `(flag, value)` pairs and run them.
    pub fn execute_flags<I, N, V>(&mut self, flags: I) -> Result<CommandOutput, CommandError>
    where
        I: IntoIterator<Item = (N, Option<V>)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let request = CommandRequest::from_flags(flags)?;
        self.execute(&request)
    }

    /// Parse command-line style tokens and run them.
    pub fn execute_args<S: AsRef<str>>(&mut self, args: &[S]) -> Result<CommandOutput, CommandError> {
        let request = CommandRequest::parse_args(args)?;
        self.execute(&request)
    }

    /// Clear every override and restore render-global defaults.
    pub fn reset(&mut self) {
        self.overrides.reset();
        self.globals.reset_defaults(&self.registry);
    }

    /// Forget document state, as when the host opens a new scene.
    pub fn new_document(&mut self) {
        self.globals.new_document();
    }

    pub fn registry(&self) -> &DelegateRegistry {
        &self.registry
    }

    pub fn overrides(&self) -> &ViewportOverrideController {
        &self.overrides
    }

    pub fn overrides_mut(&mut self) -> &mut ViewportOverrideController {
        &mut self.overrides
    }

    pub fn globals(&self) -> &RenderGlobals {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut RenderGlobals {
        &mut self.globals
    }
}

impl Default for CommandFacade {
    fn default() -> Self {
        Self::new(DelegateRegistry::with_builtins())
    }
}
