//! # lpi-installer
//!
//! Drives one install run: the portal is unpacked and wired to its database,
//! then the selected application server is unpacked and wired to the portal.
//!
//! - [`Portal`]: the portal role (extract, configure, initialize)
//! - [`StrategyRegistry`]: resolves the database and server variants by key
//! - [`InstallPipeline`]: the ordered, state-tracked install sequence

pub mod pipeline;
pub mod portal;
pub mod registry;

pub use pipeline::{InstallPipeline, PipelineReport, PipelineState, Step, StepFailure};
pub use portal::Portal;
pub use registry::{ResolutionError, Role, StrategyRegistry, Unresolved, Variants};
