//! Metadata registry and configuration documents for Tool Stash.
//!
//! - [`registry`]: `configs/meta.yaml`, the source of truth for attached tools
//! - [`tools`]: the per-tool record
//! - [`runs`]: named run definitions in `configs/runs.yaml`
//! - [`experiment`]: experiment/example documents under `configs/`
//! - [`validation`]: the registry's `validation` section

pub mod error;
pub mod experiment;
pub mod registry;
pub mod runs;
pub mod tools;
pub mod validation;

pub use error::{Error, Result};
pub use experiment::ExperimentDocument;
pub use registry::{RegistryDocument, RegistryStore};
pub use runs::{RunDefinition, RunDefinitions};
pub use tools::ToolRecord;
pub use validation::ValidationPolicy;
