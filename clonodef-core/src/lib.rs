//! Clonodef Core Library
//!
//! Model of the clonotype redefinition block: option resolution over the
//! published result pool, numbering availability, run statistics, and the
//! helper steps that prepare FASTA and numbering-region tables.

pub mod types;
pub mod io;
pub mod stats;
pub mod label;
pub mod retentive;
pub mod pool;
pub mod numbering;
pub mod options;
pub mod model;
pub mod fasta;
pub mod regions;

// Re-export commonly used types and functions
pub use types::{AxisSpec, ColumnRef, ColumnSpec, DatasetMode, NumberingScheme, PlRef};
pub use stats::{parse_stats, StatsRecord};
pub use label::compute_default_label;
pub use pool::{OptionEntry, ResultPool, SnapshotPool};
pub use numbering::is_numbering_available;
pub use model::{BlockArgs, BlockModel, BlockOutputs, EngineOutputs, StaticEngineOutputs, UiState};

/// Version information for the clonodef core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
