// # rome53-core
//
// Core library for rome53, a one-shot dynamic-DNS updater for Route 53.
//
// ## Architecture Overview
//
// - **WanIpResolver**: Trait for learning the host's public IPv4 address
// - **ZoneLister**: Trait for enumerating hosted zones and their records
// - **RecordUpdater**: Trait for changing one A record and tracking the change
// - **Updater**: Runs locate → guard → decide → update → wait, once
// - **Reporter**: Progress, summary and error output
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Workflow logic is separate from provider and resolver implementations
// 2. **Fail Safe**: Nothing but a single-valued A record is ever rewritten
// 3. **Explicit State**: Settings and output sinks are passed in, never global
// 4. **Library-First**: The binary is a thin layer over this crate

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod report;
pub mod traits;

// Re-export core types for convenience
pub use config::{Mode, RunConfig};
pub use domain::DomainName;
pub use engine::propagation::{CancelHandle, CancelToken, cancellation};
pub use engine::{Outcome, Propagation, Updater};
pub use error::{Error, ExitStatus, Result};
pub use report::{Colour, Reporter};
pub use traits::{RecordUpdater, WanIpResolver, ZoneLister};
