//! cfgdiff core - config diff engine and session coordinator
//!
//! Computes line edit scripts between a device's source config and a
//! candidate config, renders them as unified or side-by-side diffs, and
//! drives the get/load/commit/abort/diff lifecycle through a platform trait.

pub mod change;
pub mod diff;
pub mod memory;
pub mod platform;
pub mod record;
pub mod render;
pub mod session;
pub mod substitute;

pub use change::{EditLine, EditScript, LineTag};
pub use diff::{DiffEngine, DiffError, LineDiffer, DEFAULT_HINT_CUTOFF};
pub use memory::{MemoryPlatform, MemoryTransport};
pub use platform::{
    ConfigError, ConfigPlatform, ConfigResponse, LoadOptions, Operation, Transport, TransportError,
};
pub use record::{DiffRecord, DiffSummary};
pub use render::{render_side_by_side, render_unified, terminal_width, DiffColors};
pub use session::{ConfigSession, OnOpen};
pub use similar::Algorithm;
pub use substitute::{render_substituted, Substitute};
