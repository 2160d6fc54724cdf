//! Epoch/step tracking on a rescaled global-step timeline
//!
//! [`StepTracker`] follows a training loop through its epoch and in-epoch
//! step counters and maps the current position onto a monotonic global-step
//! axis where one epoch spans exactly [`STEPS_PER_EPOCH`] units. Inverted
//! advances are rejected: epochs and steps must never decrease.
//!
//! # Example
//!
//! ```
//! use milpasos::StepTracker;
//!
//! # fn main() -> Result<(), milpasos::TrackError> {
//! let mut tb = StepTracker::detached(2)?;
//!
//! tb.advance_epoch(0)?;
//! assert_eq!(tb.global_step()?, 0);
//!
//! assert!(tb.advance_step(0)?);
//! assert_eq!(tb.global_step()?, 500);
//!
//! assert!(tb.advance_step(1)?);
//! assert_eq!(tb.global_step()?, 1000);
//! # Ok(())
//! # }
//! ```


use crate::sink::{MetricSink, NullSink, SinkError};

/// Number of global steps one epoch is stretched onto
pub const STEPS_PER_EPOCH: u64 = 1000;

/// Errors from tracker operations
///
/// Apart from [`TrackError::Sink`], these are contract violations by the
/// calling loop and are surfaced immediately, never retried.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("epoch length must be positive")]
    InvalidEpochLength,

    #[error("epoch never set")]
    EpochNotSet,

    #[error("already passed epoch: {current} (old) > {requested} (new)")]
    OutOfOrderEpoch { current: u64, requested: u64 },

    #[error("already passed step: {current} (old) > {requested} (new)")]
    OutOfOrderStep { current: u64, requested: u64 },

    #[error("step {step} out of range for epoch length {epoch_length}")]
    StepOutOfRange { step: u64, epoch_length: u64 },

    #[error("sink write failed: {0}")]
    Sink(#[from] SinkError),
}

/// Result alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackError>;

/// In-epoch step cursor doubling as the duplicate-suppression cache
///
/// `advance_epoch` resets the cursor to `Idle`, which is why the first step
/// advance of an epoch always reports a fresh global step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepCursor {
    /// No step recorded in the current epoch yet
    Idle,
    /// A step was recorded; `changed` caches whether it opened a new
    /// global-step bucket, replayed when the same step is advanced again
    Advanced { step: u64, changed: bool },
}

impl StepCursor {
    fn step(self) -> Option<u64> {
        match self {
            StepCursor::Idle => None,
            StepCursor::Advanced { step, .. } => Some(step),
        }
    }
}

/// Tracks training epochs and steps, reporting 1 epoch as 1k global steps
///
/// The tracker owns nothing but counters: the sink is a shared capability it
/// writes through, and its lifecycle (flushing, closing) stays with the
/// caller. Not synchronized; use one tracker per logical training loop.
#[derive(Debug)]
pub struct StepTracker<S = NullSink> {
    epoch_length: u64,
    epoch: Option<u64>,
    cursor: StepCursor,
    /// Global step recorded by the most recent step advance
    last_global_step: Option<u64>,
    sink: Option<S>,
}

impl StepTracker {
    /// Create a tracker without a sink
    ///
    /// Writes fall back to the debug log instead of a metrics backend.
    pub fn detached(epoch_length: u64) -> Result<Self> {
        Self::new(epoch_length, None)
    }
}

impl<S: MetricSink> StepTracker<S> {
    /// Create a tracker expecting `epoch_length` steps per epoch
    ///
    /// Every [`scalar`](Self::scalar) and [`text`](Self::text) call writes
    /// through `sink`; pass `None` to route writes to the debug log.
    pub fn new(epoch_length: u64, sink: Option<S>) -> Result<Self> {
        if epoch_length == 0 {
            return Err(TrackError::InvalidEpochLength);
        }
        Ok(Self {
            epoch_length,
            epoch: None,
            cursor: StepCursor::Idle,
            last_global_step: None,
            sink,
        })
    }

    /// Number of steps expected per epoch
    #[must_use]
    pub fn epoch_length(&self) -> u64 {
        self.epoch_length
    }

    /// Last epoch advanced to, if any
    #[must_use]
    pub fn epoch(&self) -> Option<u64> {
        self.epoch
    }

    /// Borrow the injected sink, if any
    #[must_use]
    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    /// Mutably borrow the injected sink, if any
    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    /// Set the current epoch
    ///
    /// Epochs must be non-decreasing. Advancing resets the in-epoch step, so
    /// the next [`advance_step`](Self::advance_step) always reports a fresh
    /// global step.
    pub fn advance_epoch(&mut self, epoch: u64) -> Result<()> {
        if let Some(current) = self.epoch {
            if epoch < current {
                return Err(TrackError::OutOfOrderEpoch {
                    current,
                    requested: epoch,
                });
            }
        }
        self.epoch = Some(epoch);
        self.cursor = StepCursor::Idle;
        self.last_global_step = None;
        Ok(())
    }

    /// Set the current in-epoch step, reporting whether the global step moved
    ///
    /// Returns `true` when this step lands on a global-step bucket no earlier
    /// advance reached; on `false`, the caller should skip metric computation
    /// for this iteration. Advancing to the current step again replays the
    /// cached answer without recomputing. Steps must be non-decreasing within
    /// an epoch and below the epoch length.
    pub fn advance_step(&mut self, step: u64) -> Result<bool> {
        let epoch = self.epoch.ok_or(TrackError::EpochNotSet)?;
        if step >= self.epoch_length {
            return Err(TrackError::StepOutOfRange {
                step,
                epoch_length: self.epoch_length,
            });
        }
        if let StepCursor::Advanced {
            step: current,
            changed,
        } = self.cursor
        {
            if step == current {
                return Ok(changed);
            }
            if step < current {
                return Err(TrackError::OutOfOrderStep {
                    current,
                    requested: step,
                });
            }
        }

        let global_step = self.scale(epoch, Some(step));
        let changed = self.last_global_step != Some(global_step);
        self.cursor = StepCursor::Advanced { step, changed };
        self.last_global_step = Some(global_step);
        Ok(changed)
    }

    /// Current global step
    ///
    /// Pure; repeated calls between advances return the same value. Before
    /// any step advance the value sits exactly on the epoch boundary,
    /// `epoch * 1000`.
    pub fn global_step(&self) -> Result<u64> {
        let epoch = self.epoch.ok_or(TrackError::EpochNotSet)?;
        Ok(self.scale(epoch, self.cursor.step()))
    }

    /// Write a scalar value at the current global step
    ///
    /// The global step is resolved fresh at write time, so several writes
    /// within one step share the same coordinate. Sink failures propagate
    /// unmodified.
    pub fn scalar(&mut self, name: &str, value: f64) -> Result<()> {
        let step = self.global_step()?;
        match &mut self.sink {
            Some(sink) => sink.write_scalar(name, value, step)?,
            None => log::debug!("[{step}] {name}: {value:.5}"),
        }
        Ok(())
    }

    /// Write a text value at the current global step
    pub fn text(&mut self, name: &str, value: &str) -> Result<()> {
        let step = self.global_step()?;
        match &mut self.sink {
            Some(sink) => sink.write_text(name, value, step)?,
            None => log::debug!("[{step}] {name}:\n{value}"),
        }
        Ok(())
    }

    /// Rescale an epoch/step position onto the global-step axis
    ///
    /// A step index counts as completed work, so step `k` contributes
    /// `(k + 1) / epoch_length` of an epoch. Computed in `f64` with a
    /// truncating cast to stay compatible with previously logged timelines.
    fn scale(&self, epoch: u64, step: Option<u64>) -> u64 {
        let mut position = epoch as f64;
        if let Some(step) = step {
            position += (step + 1) as f64 / self.epoch_length as f64;
        }
        (position * STEPS_PER_EPOCH as f64) as u64
    }
}
