//! Scripted sources and recording subscribers for exercising cascade controllers.
#![warn(missing_docs)]

mod recorder;
mod source;

pub use recorder::{Event, RecordingSubscriber};
pub use source::{MockBehavior, MockSource, MockSourceBuilder};
