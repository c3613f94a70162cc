//! Sensor array monitor
//!
//! Owns every channel and runs one polling thread per channel. Each loop
//! measures, compares against the channel's calibrated baseline, debounces,
//! and hands detected hits to the shared [`HitSink`].
//!
//! Shutdown ordering is fixed: set the stop flag, join every worker, then
//! release hardware, so no loop ever touches a released line.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use pong_common::events::{EventBus, GameEvent};
use pong_common::params::Tunables;

use super::calibrate;
use super::driver::PulseProbe;
use super::probe::{DistanceProbe, Measurement};
use crate::config::SensorPins;
use crate::dispatch::HitSink;
use crate::error::{Error, Result};
use crate::hal::GpioBank;

/// One measurement channel and its detection state
///
/// Owned exclusively by its polling thread while monitoring runs; ownership
/// returns to the monitor through the join.
pub struct Channel<P> {
    index: usize,
    probe: P,
    baseline: Option<f64>,
    last_trigger: Option<Instant>,
}

impl<P> Channel<P> {
    pub fn new(index: usize, probe: P) -> Self {
        Self {
            index,
            probe,
            baseline: None,
            last_trigger: None,
        }
    }

    /// Target index this channel reports hits for
    pub fn index(&self) -> usize {
        self.index
    }

    /// Calibrated reference distance, if calibration has run
    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }
}

/// Sensor array monitor: independent polling loops over one shared sink
pub struct SensorArray<P> {
    channels: Vec<Channel<P>>,
    workers: Vec<JoinHandle<Channel<P>>>,
    running: Arc<AtomicBool>,
    tunables: Tunables,
    events: EventBus,
}

impl<P: DistanceProbe + Send + 'static> SensorArray<P> {
    pub fn new(tunables: Tunables, events: EventBus) -> Self {
        Self {
            channels: Vec::new(),
            workers: Vec::new(),
            running: Arc::new(AtomicBool::new(false)),
            tunables,
            events,
        }
    }

    /// Add a channel reporting hits for `index`
    ///
    /// The index is the caller's target index; it survives even when
    /// neighbouring channels failed to bind.
    pub fn add_channel(&mut self, index: usize, probe: P) {
        self.channels.push(Channel::new(index, probe));
    }

    /// Number of channels currently owned by the monitor
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Target indices of the owned channels, in channel order
    pub fn channel_indices(&self) -> Vec<usize> {
        self.channels.iter().map(Channel::index).collect()
    }

    /// Calibrate every channel in turn, blocking until done
    ///
    /// A channel that cannot produce a usable baseline is dropped from
    /// monitoring with an error log; its peers are unaffected.
    pub fn calibrate_all(&mut self) {
        let samples = self.tunables.calibration_samples;
        let spacing = self.tunables.calibration_spacing();

        let mut kept = Vec::with_capacity(self.channels.len());
        for mut channel in self.channels.drain(..) {
            match calibrate::calibrate(&mut channel.probe, samples, spacing) {
                Ok(baseline) => {
                    info!("Channel {} baseline: {:.2} cm", channel.index, baseline);
                    self.events.emit_lossy(GameEvent::CalibrationCompleted {
                        channel: channel.index,
                        baseline_cm: baseline,
                        timestamp: chrono::Utc::now(),
                    });
                    channel.baseline = Some(baseline);
                    kept.push(channel);
                }
                Err(e) => {
                    error!("Channel {} failed calibration, dropping it: {}", channel.index, e);
                    channel.probe.release();
                }
            }
        }
        self.channels = kept;
    }

    /// Spawn one polling loop per channel
    ///
    /// Every channel must hold a usable baseline; an unset or non-positive
    /// baseline is rejected here rather than letting a degenerate threshold
    /// into the loops.
    pub fn start_monitoring(&mut self, sink: Arc<dyn HitSink>) -> Result<()> {
        if !self.workers.is_empty() {
            return Err(Error::Monitor("already monitoring".to_string()));
        }
        if self.channels.is_empty() {
            return Err(Error::Monitor("no channels available".to_string()));
        }
        for channel in &self.channels {
            match channel.baseline {
                Some(b) if b > 0.0 => {}
                _ => {
                    return Err(Error::Calibration(format!(
                        "channel {} has no usable baseline",
                        channel.index
                    )))
                }
            }
        }

        self.running.store(true, Ordering::SeqCst);
        let count = self.channels.len();
        for channel in self.channels.drain(..) {
            let running = Arc::clone(&self.running);
            let sink = Arc::clone(&sink);
            let tunables = self.tunables.clone();
            self.workers
                .push(thread::spawn(move || poll_loop(channel, running, tunables, sink)));
        }

        info!("Monitoring started on {count} channels");
        self.events.emit_lossy(GameEvent::MonitoringStarted {
            channels: count,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    /// Signal every polling loop, join them all, then release hardware
    ///
    /// No-op when not monitoring. Worst-case stop latency is one loop
    /// iteration: the poll sleep plus an in-flight measurement.
    pub fn stop_monitoring(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if self.workers.is_empty() {
            return;
        }

        for worker in self.workers.drain(..) {
            match worker.join() {
                Ok(channel) => self.channels.push(channel),
                Err(e) => error!("Polling worker panicked: {e:?}"),
            }
        }

        // Every loop has observed the flag; only now is hardware released.
        for channel in self.channels.drain(..) {
            let Channel { probe, .. } = channel;
            probe.release();
        }

        info!("Monitoring stopped");
        self.events.emit_lossy(GameEvent::MonitoringStopped {
            timestamp: chrono::Utc::now(),
        });
    }

    /// True only while the flag is set and every polling loop is alive
    ///
    /// Health reporting only; nothing inside the monitor keys off this.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && !self.workers.is_empty()
            && self.workers.iter().all(|w| !w.is_finished())
    }
}

/// Bind every configured channel of a pulse-echo rack
///
/// A channel whose lines cannot be claimed is reported and skipped; the
/// remaining channels keep their configured target indices.
pub fn setup<B: GpioBank + 'static>(
    bank: &B,
    pins: &[SensorPins],
    tunables: Tunables,
    events: EventBus,
) -> SensorArray<PulseProbe<B>> {
    let echo_wait = tunables.echo_wait();
    let mut array = SensorArray::new(tunables, events);
    for (index, p) in pins.iter().enumerate() {
        match PulseProbe::open(bank, p.trigger, p.echo, echo_wait) {
            Ok(probe) => array.add_channel(index, probe),
            Err(e) => error!(
                "Channel {index} failed to bind (trigger {}, echo {}): {e}",
                p.trigger, p.echo
            ),
        }
    }
    array
}

/// One channel's polling loop
///
/// Per-iteration failures are logged and the loop moves on to its next
/// iteration; one channel's fault never stops its peers or the process.
fn poll_loop<P: DistanceProbe>(
    mut channel: Channel<P>,
    running: Arc<AtomicBool>,
    tunables: Tunables,
    sink: Arc<dyn HitSink>,
) -> Channel<P> {
    // Validated by start_monitoring before the thread was spawned.
    let Some(baseline) = channel.baseline else {
        error!("Channel {} entered polling without a baseline", channel.index);
        return channel;
    };
    let threshold = tunables.threshold_fraction * baseline;
    let poll = tunables.poll_interval();
    let debounce = tunables.debounce();

    while running.load(Ordering::SeqCst) {
        match channel.probe.measure() {
            Ok(Measurement::Reading(cm)) => {
                let now = Instant::now();
                let deviation = (cm - baseline).abs();
                let debounced = channel
                    .last_trigger
                    .map_or(true, |t| now.duration_since(t) > debounce);
                if deviation > threshold && debounced {
                    debug!(
                        "Channel {} triggered ({cm:.1} cm vs baseline {baseline:.1} cm)",
                        channel.index
                    );
                    if let Err(e) = sink.on_hit(channel.index) {
                        warn!("Channel {} dispatch failed: {e}", channel.index);
                    }
                    channel.last_trigger = Some(now);
                }
            }
            Ok(Measurement::Timeout) => {
                debug!("Channel {} measurement timed out", channel.index);
            }
            Err(e) => {
                warn!("Channel {} measurement failed: {e}", channel.index);
            }
        }
        thread::sleep(poll);
    }

    channel
}
