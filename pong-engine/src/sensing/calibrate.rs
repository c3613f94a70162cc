//! Channel baseline calibration
//!
//! Before monitoring starts, each channel takes a burst of measurements of
//! the empty rack and reduces them to a reference distance. The median keeps
//! a single stray echo from skewing the reference.

use std::thread;
use std::time::Duration;

use tracing::debug;

use super::probe::{DistanceProbe, Measurement};
use crate::error::{Error, Result};

/// Take `samples` measurements at a fixed spacing and reduce them to a
/// baseline distance.
///
/// Timed-out measurements carry no distance and are excluded; if more than
/// half of the samples time out the channel cannot be trusted and
/// calibration fails. A baseline that is not positive would make the
/// relative threshold degenerate, so it is rejected here, before any
/// polling loop can divide or scale by it.
pub fn calibrate<P: DistanceProbe>(
    probe: &mut P,
    samples: usize,
    spacing: Duration,
) -> Result<f64> {
    if samples == 0 {
        return Err(Error::Calibration("sample count must be positive".to_string()));
    }

    let mut readings = Vec::with_capacity(samples);
    for i in 0..samples {
        match probe.measure()? {
            Measurement::Reading(cm) => readings.push(cm),
            Measurement::Timeout => debug!("calibration sample {i} timed out"),
        }
        if !spacing.is_zero() {
            thread::sleep(spacing);
        }
    }

    if readings.len() * 2 < samples {
        return Err(Error::Calibration(format!(
            "only {}/{} samples returned a reading",
            readings.len(),
            samples
        )));
    }

    let baseline = median(&mut readings);
    if baseline <= 0.0 {
        return Err(Error::Calibration(format!(
            "baseline {baseline:.2} cm is not usable"
        )));
    }
    Ok(baseline)
}

/// Median of a non-empty slice; an even count averages the middle pair
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}
