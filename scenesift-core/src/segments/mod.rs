//! Segment inference: from sparse match timestamps to keep/discard intervals.
//!
//! The pipeline samples one frame every few seconds, so the classifier only
//! ever confirms isolated points on the timeline. This module turns those
//! points into contiguous, non-overlapping time ranges:
//!
//! - [`build_intervals`] groups consecutive matches into runs, pads them and
//!   drops runs that are too short.
//! - [`CutPlan`] classifies the result as "nothing matched", "whole stream"
//!   or a normal list of segments.
//! - [`invert_intervals`] derives the discarded material for the optional
//!   inverse compilation.
//!
//! Everything here is pure and allocation-light; no I/O happens in this module.

mod builder;
mod interval;
mod invert;
mod plan;

pub use builder::build_intervals;
pub use interval::{Interval, SegmentParams};
pub use invert::{Inversion, invert_intervals};
pub use plan::{CutPlan, WHOLE_STREAM_TOLERANCE_SECS};
