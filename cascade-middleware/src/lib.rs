#![doc = include_str!("../README.md")]
//! cascade-middleware
//!
//! Re-exports for source decorators.
#![warn(missing_docs)]

mod builder;
mod dispatch;
mod mapping;
mod timeout;

pub use crate::builder::{RAW_SOURCE_LAYER, SourceBuilder};
pub use crate::dispatch::DispatchSubscriber;
pub use crate::mapping::{FnMapper, Mapper, MappingSource};
pub use crate::timeout::{TimeoutLayer, TimeoutSource};
