use hdbridge_common::{
    DEFAULT_SCENE_DELEGATE_ID, EMBREE_RENDERER_ID, RendererId, STORM_RENDERER_ID,
    SceneDelegateId,
};
use serde::{Deserialize, Serialize};

/// A typed setting value. Also the value type of render-global attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Color([f32; 4]),
    String(String),
}

impl SettingValue {
    /// Name of the variant, for type-mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Color(_) => "color",
            Self::String(_) => "string",
        }
    }

    /// Host-style truthiness: false, zero and empty strings are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Color(c) => c.iter().any(|v| *v != 0.0),
            Self::String(s) => !s.is_empty(),
        }
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Color([r, g, b, a]) => write!(f, "{r} {g} {b} {a}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// A renderer-specific setting exposed as a render-global attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSetting {
    pub key: String,
    pub default: SettingValue,
}

impl RenderSetting {
    pub fn new(key: impl Into<String>, default: SettingValue) -> Self {
        Self {
            key: key.into(),
            default,
        }
    }
}

/// An installed rendering backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererDescriptor {
    pub id: RendererId,
    pub display_name: String,
    /// Rasterizes through the host's own GPU pipeline (the default renderer).
    #[serde(default)]
    pub storm_like: bool,
    /// Can be selected on this machine. Unsupported backends stay listed as
    /// installed but are rejected by renderer selection.
    #[serde(default = "supported_default")]
    pub supported: bool,
    #[serde(default)]
    pub settings: Vec<RenderSetting>,
}

fn supported_default() -> bool {
    true
}

impl RendererDescriptor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: RendererId::new(id),
            display_name: display_name.into(),
            storm_like: false,
            supported: true,
            settings: Vec::new(),
        }
    }

    /// The built-in GL rasterizer.
    pub fn storm() -> Self {
        Self {
            storm_like: true,
            settings: vec![
                RenderSetting::new("enableTinyPrimCulling", SettingValue::Bool(false)),
                RenderSetting::new("volumeRaymarchingStepSize", SettingValue::Float(1.0)),
            ],
            ..Self::new(STORM_RENDERER_ID, "GL")
        }
    }

    /// The built-in CPU ray tracer.
    pub fn embree() -> Self {
        Self {
            settings: vec![
                RenderSetting::new("enableAmbientOcclusion", SettingValue::Bool(true)),
                RenderSetting::new("enableSceneColors", SettingValue::Bool(true)),
                RenderSetting::new("ambientOcclusionSamples", SettingValue::Int(16)),
                RenderSetting::new("samplesToConvergence", SettingValue::Int(100)),
            ],
            ..Self::new(EMBREE_RENDERER_ID, "Embree")
        }
    }
}

/// A scene delegate implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDelegateDescriptor {
    pub id: SceneDelegateId,
}

impl SceneDelegateDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: SceneDelegateId::new(id),
        }
    }

    pub fn default_delegate() -> Self {
        Self::new(DEFAULT_SCENE_DELEGATE_ID)
    }
}
