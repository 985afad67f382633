#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod catalog;
pub mod classify;
pub mod collect;
pub mod error;
pub mod models;
pub mod patch;
pub mod pipeline;
pub mod resolver;

pub use catalog::AssetCatalog;
pub use classify::ClassifierRules;
pub use error::RelinkError;
pub use models::{ArtifactPayload, AssetRole, BootstrapChunk, RelinkReport};
pub use pipeline::RelinkPipeline;
pub use resolver::{ResolveContext, basename_resolver};
