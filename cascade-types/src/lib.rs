//! Data model and configuration primitives shared across the cascade crates.
#![warn(missing_docs)]

mod config;
mod error;
mod layer;
mod params;
mod response;
mod selector;
mod source_type;

pub use config::{ChainPolicy, ControllerConfig, RefreshPolicy, RegistryKind};
pub use error::{CascadeError, ErrorCause, ErrorKind, ResponseError, ResponseErrorBuilder};
pub use layer::{LayerSpec, LayerStack};
pub use params::{ParallelParams, SourceParams};
pub use response::Response;
pub use selector::SourceSelector;
pub use source_type::SourceType;
