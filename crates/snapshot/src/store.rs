use hdbridge_common::EditorHandle;
use hdbridge_image::{ComparisonResult, ImageBuffer, ImageError, PixelFormat, compare};
use std::path::{Component, Path, PathBuf};

use crate::config::SnapshotConfig;

/// Anything that can render the current frame of an editor.
///
/// `capture` returns only once the frame is fully rendered.
pub trait FrameSource {
    fn capture(&mut self, editor: &EditorHandle) -> Result<ImageBuffer, CaptureError>;
}

/// The host could not produce a frame.
#[derive(Debug, thiserror::Error)]
#[error("capture of editor {editor} failed: {reason}")]
pub struct CaptureError {
    pub editor: EditorHandle,
    pub reason: String,
}

/// Errors from snapshot assertions.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot {name} mismatch: distance {distance} exceeds threshold {threshold}")]
    Mismatch {
        name: String,
        distance: f64,
        threshold: f64,
    },
    #[error("snapshot name {0:?} must be a relative path inside the case directory")]
    InvalidName(String),
    #[error("no reference image for snapshot {name} at {}", path.display())]
    MissingReference { name: String, path: PathBuf },
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("image error: {0}")]
    Image(#[from] ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SnapshotError {
    /// Distance and threshold of a failed comparison, for diagnostics.
    pub fn distance(&self) -> Option<(f64, f64)> {
        match self {
            Self::Mismatch {
                distance,
                threshold,
                ..
            } => Some((*distance, *threshold)),
            _ => None,
        }
    }
}

/// Reference images for one test case.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    config: SnapshotConfig,
    case: String,
}

impl SnapshotStore {
    /// Store for the test case `case` (a relative path, e.g. `basic_render/flat`).
    pub fn new(config: SnapshotConfig, case: impl Into<String>) -> Self {
        Self {
            config,
            case: case.into(),
        }
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    pub fn case(&self) -> &str {
        &self.case
    }

    /// Where the reference for `name` is stored. Names made of anything but
    /// plain path segments are rejected so they cannot leave the case directory.
    pub fn reference_path(&self, name: &str) -> Result<PathBuf, SnapshotError> {
        let relative = Path::new(name);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if name.is_empty() || !plain {
            return Err(SnapshotError::InvalidName(name.to_string()));
        }
        Ok(self.config.root.join(&self.case).join(relative))
    }

    pub fn has_reference(&self, name: &str) -> bool {
        self.reference_path(name).is_ok_and(|p| p.is_file())
    }

    pub fn load_reference(&self, name: &str) -> Result<ImageBuffer, SnapshotError> {
        let path = self.reference_path(name)?;
        if !path.is_file() {
            return Err(SnapshotError::MissingReference {
                name: name.to_string(),
                path,
            });
        }
        Ok(ImageBuffer::load(&path)?)
    }

    /// Write `image` as the reference for `name`, replacing any previous one.
    pub fn save_reference(&self, name: &str, image: &ImageBuffer) -> Result<PathBuf, SnapshotError> {
        let path = self.reference_path(name)?;
        image.save_png(&path)?;
        tracing::info!(snapshot = name, path = %path.display(), digest = %image.digest(), "reference recorded");
        Ok(path)
    }

    /// Judge an already captured frame against the reference for `name`.
    ///
    /// In record mode the frame becomes the reference and the verdict is an
    /// identical pass.
    pub fn judge(
        &self,
        name: &str,
        actual: &ImageBuffer,
        threshold: f64,
    ) -> Result<ComparisonResult, SnapshotError> {
        let _span = tracing::info_span!("snapshot_judge", case = %self.case, snapshot = name).entered();

        if self.config.record {
            self.save_reference(name, actual)?;
            self.remove_stale_actual(name);
            return Ok(ComparisonResult {
                identical: true,
                distance: 0.0,
                threshold,
            });
        }

        let reference = self.load_reference(name)?;
        let result = match compare(
            &match_layout(actual, &reference),
            &reference,
            threshold,
            self.config.metric,
        ) {
            Ok(result) => result,
            Err(e) => {
                self.write_actual(name, actual);
                return Err(e.into());
            }
        };

        if result.passed() {
            tracing::info!(
                distance = result.distance,
                threshold,
                identical = result.identical,
                "snapshot passed"
            );
            self.remove_stale_actual(name);
            Ok(result)
        } else {
            tracing::warn!(
                distance = result.distance,
                threshold,
                actual = %actual.digest(),
                reference = %reference.digest(),
                "snapshot mismatch"
            );
            self.write_actual(name, actual);
            Err(SnapshotError::Mismatch {
                name: name.to_string(),
                distance: result.distance,
                threshold,
            })
        }
    }

    /// Capture `editor` and require it to equal the reference exactly.
    pub fn assert_equal(
        &self,
        source: &mut impl FrameSource,
        editor: &EditorHandle,
        name: &str,
    ) -> Result<ComparisonResult, SnapshotError> {
        let frame = source.capture(editor)?;
        self.judge(name, &frame, 0.0)
    }

    /// Capture `editor` and require it to be within `tolerance` of the
    /// reference, or the configured default tolerance when `None`.
    pub fn assert_close(
        &self,
        source: &mut impl FrameSource,
        editor: &EditorHandle,
        name: &str,
        tolerance: Option<f64>,
    ) -> Result<ComparisonResult, SnapshotError> {
        let threshold = tolerance.unwrap_or(self.config.default_tolerance);
        let frame = source.capture(editor)?;
        self.judge(name, &frame, threshold)
    }

    /// Path the failing frame for `name` is written to.
    pub fn actual_path(&self, name: &str) -> Result<PathBuf, SnapshotError> {
        let reference = self.reference_path(name)?;
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        Ok(reference.with_file_name(format!("{stem}.actual.png")))
    }

    fn write_actual(&self, name: &str, actual: &ImageBuffer) {
        let Ok(path) = self.actual_path(name) else {
            return;
        };
        if let Err(e) = actual.save_png(&path) {
            tracing::warn!(path = %path.display(), "failed to write actual frame: {e}");
        }
    }

    /// A passing verdict supersedes the frame left by an earlier failure.
    fn remove_stale_actual(&self, name: &str) {
        let Ok(path) = self.actual_path(name) else {
            return;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "stale actual frame removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), "failed to remove actual frame: {e}"),
        }
    }
}

/// An RGB capture compares against an RGBA reference by widening it with
/// opaque alpha; any other layout difference is left for `compare` to reject.
fn match_layout(actual: &ImageBuffer, reference: &ImageBuffer) -> ImageBuffer {
    match (actual.format(), reference.format()) {
        (PixelFormat::Rgb8, PixelFormat::Rgba8) => actual.to_rgba8(),
        _ => actual.clone(),
    }
}
