use serde::{Deserialize, Serialize};

use crate::buffer::{ImageBuffer, ImageError, Samples};

/// How per-channel differences are folded into one distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// `sum |a - b| / (width * height * channels * range)`: the mean absolute
    /// channel difference as a fraction of the channel range.
    #[default]
    MeanAbsolute,
    /// `sum ((a - b) / range)^2` over every channel of every pixel.
    SumSquared,
}

/// Verdict of comparing a frame against a reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// True iff the distance is exactly zero.
    pub identical: bool,
    pub distance: f64,
    pub threshold: f64,
}

impl ComparisonResult {
    /// Pass iff `distance <= threshold`.
    pub fn passed(&self) -> bool {
        self.distance <= self.threshold
    }
}

/// Distance between two buffers of the same shape and format.
pub fn distance(
    actual: &ImageBuffer,
    reference: &ImageBuffer,
    metric: Metric,
) -> Result<f64, ImageError> {
    if actual.dimensions() != reference.dimensions() {
        return Err(ImageError::DimensionMismatch {
            actual: actual.dimensions(),
            reference: reference.dimensions(),
        });
    }
    if actual.format() != reference.format() {
        return Err(ImageError::FormatMismatch {
            actual: actual.format(),
            reference: reference.format(),
        });
    }

    let format = actual.format();
    let range = format.channel_range();
    let count = actual.samples().len();
    if count == 0 {
        return Ok(0.0);
    }

    let d = match (actual.samples(), reference.samples()) {
        (Samples::U8(a), Samples::U8(b)) => match metric {
            // Integer accumulation keeps the sum exact.
            Metric::MeanAbsolute => {
                let sum: u64 = a
                    .iter()
                    .zip(b)
                    .map(|(x, y)| u64::from(x.abs_diff(*y)))
                    .sum();
                sum as f64 / (count as f64 * range)
            }
            Metric::SumSquared => {
                let sum: u64 = a
                    .iter()
                    .zip(b)
                    .map(|(x, y)| {
                        let d = u64::from(x.abs_diff(*y));
                        d * d
                    })
                    .sum();
                sum as f64 / (range * range)
            }
        },
        (Samples::F32(a), Samples::F32(b)) => {
            let diffs = a.iter().zip(b).map(|(x, y)| f64::from(*x) - f64::from(*y));
            match metric {
                Metric::MeanAbsolute => {
                    diffs.map(f64::abs).sum::<f64>() / (count as f64 * range)
                }
                Metric::SumSquared => diffs.map(|d| (d / range) * (d / range)).sum::<f64>(),
            }
        }
        // `ImageBuffer::new` ties the sample kind to the format, which matched above.
        _ => {
            return Err(ImageError::FormatMismatch {
                actual: actual.format(),
                reference: reference.format(),
            });
        }
    };

    tracing::trace!(?metric, distance = d, "frame distance computed");
    Ok(d)
}

/// Compare `actual` against `reference` with a pass threshold.
pub fn compare(
    actual: &ImageBuffer,
    reference: &ImageBuffer,
    threshold: f64,
    metric: Metric,
) -> Result<ComparisonResult, ImageError> {
    let distance = distance(actual, reference, metric)?;
    Ok(ComparisonResult {
        identical: distance == 0.0,
        distance,
        threshold,
    })
}
