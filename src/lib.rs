//! Lookup service mapping free-text molecule descriptions to SMILES strings,
//! pre-rendered structure assets, and best-adsorber pairings for known PFAS
//! contaminants.
//!
//! The fixed compound catalogue lives in [`registry`], name/SMILES/stem
//! resolution in [`resolve`], the LLM oracle client in [`oracle`], binding
//! tables in [`binding`], and per-request orchestration in [`pipeline`]. The
//! HTTP surface is a thin axum layer under `src/bin/server`.

pub mod binding;
pub mod config;
pub mod error;
pub mod oracle;
pub mod pipeline;
pub mod registry;
pub mod resolve;

pub use error::{AssetError, BindingError, OracleError, PipelineError, StemError};
pub use pipeline::{Pipeline, ResolutionResult};
pub use registry::{registry, Molecule};
