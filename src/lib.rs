//! Rescales training epochs onto a fixed 1000-step timeline.
//!
//! Metric streams emitted by runs with different epoch lengths are hard to
//! compare on a raw iteration axis. `milpasos` stretches every epoch onto
//! 1000 logical "global steps", so a run with 40 batches per epoch and a run
//! with 4000 land on the same axis. The tracker also tells the training loop
//! when a step advance did *not* reach a new global-step bucket, so expensive
//! metric computation can be skipped for that iteration.
//!
//! # Architecture
//!
//! - [`StepTracker`]: epoch/step cursors, global-step computation, and
//!   duplicate suppression
//! - [`MetricSink`]: pluggable write capability for scalar/text metrics
//! - [`InMemorySink`] / [`JsonlFileSink`] / [`NullSink`]: bundled sinks
//!
//! # Example
//!
//! ```
//! use milpasos::{InMemorySink, StepTracker};
//!
//! # fn main() -> Result<(), milpasos::TrackError> {
//! let mut tb = StepTracker::new(4, Some(InMemorySink::new()))?;
//!
//! for epoch in 0..2 {
//!     tb.advance_epoch(epoch)?;
//!     // Reported exactly at the epoch boundary: global step = epoch * 1000.
//!     tb.scalar("lr", 1e-3)?;
//!
//!     for step in 0..4 {
//!         if tb.advance_step(step)? {
//!             // Only reached when a new global-step bucket opens up.
//!             tb.scalar("loss", 0.5)?;
//!         }
//!     }
//! }
//!
//! assert_eq!(tb.global_step()?, 2000);
//! # Ok(())
//! # }
//! ```

pub mod sink;
pub mod tracker;

pub use sink::{
    InMemorySink, JsonlFileSink, MetricRecord, MetricSink, MetricValue, NullSink, SinkError,
};
pub use tracker::{StepTracker, TrackError, STEPS_PER_EPOCH};
