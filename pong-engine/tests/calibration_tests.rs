//! Unit tests for channel calibration
//!
//! All scripts run with zero spacing so the suite stays fast; the spacing
//! is data, not logic.

use std::time::Duration;

use pong_engine::sensing::calibrate::calibrate;
use pong_engine::sensing::{ProbeStep, ScriptedProbe};

fn readings(values: &[f64]) -> ScriptedProbe {
    ScriptedProbe::new(values.iter().map(|&v| ProbeStep::Reading(v)).collect())
}

#[test]
fn test_median_of_odd_sample_count() {
    let mut probe = readings(&[10.0, 12.0, 11.0]);
    let baseline = calibrate(&mut probe, 3, Duration::ZERO).unwrap();
    assert_eq!(baseline, 11.0);
}

#[test]
fn test_median_of_even_sample_count() {
    let mut probe = readings(&[10.0, 20.0, 12.0, 14.0]);
    let baseline = calibrate(&mut probe, 4, Duration::ZERO).unwrap();
    assert_eq!(baseline, 13.0);
}

#[test]
fn test_single_outlier_does_not_skew_baseline() {
    let mut probe = readings(&[30.0, 30.1, 29.9, 30.0, 300.0, 30.0, 29.8, 30.2, 30.0, 30.1]);
    let baseline = calibrate(&mut probe, 10, Duration::ZERO).unwrap();
    assert!((baseline - 30.0).abs() < 0.2);
}

#[test]
fn test_identical_streams_yield_identical_baselines() {
    let script = [31.2, 30.8, 31.0, 30.9, 31.1];
    let a = calibrate(&mut readings(&script), 5, Duration::ZERO).unwrap();
    let b = calibrate(&mut readings(&script), 5, Duration::ZERO).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_timeouts_are_excluded_from_the_median() {
    let mut probe = ScriptedProbe::new(vec![
        ProbeStep::Reading(30.0),
        ProbeStep::Timeout,
        ProbeStep::Reading(32.0),
        ProbeStep::Reading(31.0),
        ProbeStep::Timeout,
    ]);
    let baseline = calibrate(&mut probe, 5, Duration::ZERO).unwrap();
    assert_eq!(baseline, 31.0);
}

#[test]
fn test_timeout_majority_fails_calibration() {
    let mut probe = ScriptedProbe::new(vec![
        ProbeStep::Timeout,
        ProbeStep::Reading(30.0),
        ProbeStep::Timeout,
        ProbeStep::Reading(31.0),
        ProbeStep::Timeout,
    ]);
    assert!(calibrate(&mut probe, 5, Duration::ZERO).is_err());
}

#[test]
fn test_zero_baseline_is_rejected() {
    let mut probe = readings(&[0.0, 0.0, 0.0]);
    assert!(calibrate(&mut probe, 3, Duration::ZERO).is_err());
}

#[test]
fn test_zero_samples_is_rejected() {
    let mut probe = readings(&[30.0]);
    assert!(calibrate(&mut probe, 0, Duration::ZERO).is_err());
}

#[test]
fn test_probe_fault_fails_calibration() {
    let mut probe = ScriptedProbe::new(vec![ProbeStep::Reading(30.0), ProbeStep::Fault]);
    assert!(calibrate(&mut probe, 3, Duration::ZERO).is_err());
}
