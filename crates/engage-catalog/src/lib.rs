//! Static catalogs for the engagement platform: honors values per task,
//! task membership per platform and mission kind, and degen duration
//! presets.
//!
//! Everything here is deterministic reference data. Catalogs are built
//! once (usually the `standard()` tables) and shared read-only; none of
//! the lookups mutate state.

pub mod honors;
pub mod presets;
pub mod tasks;

pub use honors::HonorsCatalog;
pub use presets::{DegenPreset, DegenPresetTable, DegenValidation};
pub use tasks::TaskCatalog;
