pub mod criteria;
pub mod layout;
pub mod loaders;
pub mod record;
pub mod stats;
pub mod update;

pub use criteria::{FilterCriteria, TextField};
pub use layout::{ColumnAddress, ColumnLayout, Field, ResolvedLayout};
pub use loaders::{load_config, load_layout};
pub use record::{PackingInfo, PackingRecord, PackingStatus};
pub use stats::{PackingSnapshot, PackingStats};
pub use update::{
    BatchFailure, BatchReport, CellWrite, UpdatePayload, UpdateRequest, UpdateResult, WriteOutcome,
};
