use hdbridge_common::RendererId;
use hdbridge_registry::RegistryError;
use hdbridge_viewport::OverrideError;

/// Errors from validating or running a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid flag: {0}")]
    InvalidFlag(String),
    #[error("flags -{first} and -{second} cannot be combined")]
    ConflictingFlags {
        first: &'static str,
        second: &'static str,
    },
    #[error("usage: {0}")]
    Usage(String),
    #[error("-{0} is not supported")]
    Unsupported(&'static str),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Override(#[from] OverrideError),
}

/// One validated bridge command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRequest {
    ListRenderers,
    ListActiveRenderers,
    ListDelegates,
    GetRendererDisplayName { renderer: RendererId },
    CreateRenderGlobals,
    UpdateRenderGlobals,
}

impl CommandRequest {
    /// Long name of the primary flag.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::ListRenderers => "listRenderers",
            Self::ListActiveRenderers => "listActiveRenderers",
            Self::ListDelegates => "listDelegates",
            Self::GetRendererDisplayName { .. } => "getRendererDisplayName",
            Self::CreateRenderGlobals => "createRenderGlobals",
            Self::UpdateRenderGlobals => "updateRenderGlobals",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Primary {
    ListRenderers,
    ListActiveRenderers,
    ListDelegates,
    GetRendererDisplayName,
    CreateRenderGlobals,
    UpdateRenderGlobals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagKind {
    Primary(Primary),
    /// `-renderer <id>`.
    Renderer,
}

/// A recognised flag and its short alias.
#[derive(Debug, Clone, Copy)]
pub struct FlagSpec {
    pub long: &'static str,
    pub short: &'static str,
    kind: FlagKind,
}

impl FlagSpec {
    pub fn takes_value(&self) -> bool {
        self.kind == FlagKind::Renderer
    }
}

/// Every flag the command accepts.
pub const FLAGS: &[FlagSpec] = &[
    FlagSpec {
        long: "listRenderers",
        short: "lr",
        kind: FlagKind::Primary(Primary::ListRenderers),
    },
    FlagSpec {
        long: "listActiveRenderers",
        short: "lar",
        kind: FlagKind::Primary(Primary::ListActiveRenderers),
    },
    FlagSpec {
        long: "listDelegates",
        short: "ld",
        kind: FlagKind::Primary(Primary::ListDelegates),
    },
    FlagSpec {
        long: "getRendererDisplayName",
        short: "gn",
        kind: FlagKind::Primary(Primary::GetRendererDisplayName),
    },
    FlagSpec {
        long: "createRenderGlobals",
        short: "crg",
        kind: FlagKind::Primary(Primary::CreateRenderGlobals),
    },
    FlagSpec {
        long: "updateRenderGlobals",
        short: "urg",
        kind: FlagKind::Primary(Primary::UpdateRenderGlobals),
    },
    FlagSpec {
        long: "renderer",
        short: "r",
        kind: FlagKind::Renderer,
    },
];

fn lookup(name: &str) -> Option<&'static FlagSpec> {
    FLAGS.iter().find(|f| f.long == name || f.short == name)
}

fn parse_bool(flag: &str, value: &str) -> Result<bool, CommandError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(CommandError::Usage(format!(
            "-{flag} takes a boolean, got {value:?}"
        ))),
    }
}

impl CommandRequest {
    /// Validate `(flag, value)` pairs into a request. Flag names may be long
    /// or short; boolean flags treat a missing value as true and a falsy
    /// value as absent.
    pub fn from_flags<I, N, V>(flags: I) -> Result<Self, CommandError>
    where
        I: IntoIterator<Item = (N, Option<V>)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut primary: Option<(&'static FlagSpec, Primary)> = None;
        let mut renderer: Option<RendererId> = None;
        let mut seen_any = false;

        for (name, value) in flags {
            let name = name.as_ref();
            let spec = lookup(name).ok_or_else(|| CommandError::InvalidFlag(name.to_string()))?;
            seen_any = true;
            match spec.kind {
                FlagKind::Renderer => {
                    let value = value
                        .as_ref()
                        .map(|v| <V as AsRef<str>>::as_ref(v).trim())
                        .filter(|v| !v.is_empty())
                        .ok_or_else(|| {
                            CommandError::Usage("-renderer needs a renderer id".into())
                        })?;
                    if renderer.is_some() {
                        return Err(CommandError::Usage("-renderer given more than once".into()));
                    }
                    renderer = Some(RendererId::new(value));
                }
                FlagKind::Primary(op) => {
                    let enabled = match &value {
                        Some(v) => parse_bool(spec.long, <V as AsRef<str>>::as_ref(v))?,
                        None => true,
                    };
                    if !enabled {
                        continue;
                    }
                    match primary {
                        Some((existing, _)) if existing.long != spec.long => {
                            return Err(CommandError::ConflictingFlags {
                                first: existing.long,
                                second: spec.long,
                            });
                        }
                        _ => primary = Some((spec, op)),
                    }
                }
            }
        }

        let Some((primary, op)) = primary else {
            return Err(CommandError::Usage(if seen_any {
                "no operation flag given".into()
            } else {
                "at least one flag is required".into()
            }));
        };

        match (op, renderer) {
            (Primary::GetRendererDisplayName, Some(renderer)) => {
                Ok(Self::GetRendererDisplayName { renderer })
            }
            (Primary::GetRendererDisplayName, None) => Err(CommandError::Usage(
                "-getRendererDisplayName needs -renderer <id>".into(),
            )),
            (_, Some(_)) => Err(CommandError::Usage(format!(
                "-renderer does not apply to -{}",
                primary.long
            ))),
            (Primary::ListRenderers, None) => Ok(Self::ListRenderers),
            (Primary::ListActiveRenderers, None) => Ok(Self::ListActiveRenderers),
            (Primary::ListDelegates, None) => Ok(Self::ListDelegates),
            (Primary::CreateRenderGlobals, None) => Ok(Self::CreateRenderGlobals),
            (Primary::UpdateRenderGlobals, None) => Ok(Self::UpdateRenderGlobals),
        }
    }

    /// Parse command-line style tokens: `-lr`, `-lr 0`, `-r HdStormRendererPlugin -gn`.
    /// A flag consumes the next token as its value unless that token is itself
    /// a flag; boolean flags then validate it as a boolean.
    pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Self, CommandError> {
        let mut pairs: Vec<(String, Option<String>)> = Vec::new();
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        let mut tokens = args.into_iter().peekable();

        while let Some(token) = tokens.next() {
            let name = token
                .strip_prefix('-')
                .filter(|n| !n.is_empty())
                .ok_or_else(|| CommandError::InvalidFlag(token.to_string()))?;
            let spec = lookup(name).ok_or_else(|| CommandError::InvalidFlag(name.to_string()))?;
            let value = match tokens.peek() {
                Some(next) if !next.starts_with('-') => tokens.next().map(str::to_string),
                _ => None,
            };
            pairs.push((name.to_string(), value));
        }

        Self::from_flags(pairs)
    }
}
