//! Per-user statistics: incremental event-driven aggregation, per-mission
//! completion counters, and batch reconciliation.
//!
//! The incremental path is best-effort (failures journaled, never
//! retried); the reconciler is the correctness backstop. Both paths must
//! agree on any event history, and that equivalence is what the
//! integration tests pin down.

pub mod aggregator;
pub mod counters;
pub mod reconcile;
pub mod store;
pub mod summary;

pub use aggregator::{participation_delta, ParticipationDelta, StatsAggregator};
pub use counters::MissionCounterStore;
pub use reconcile::{ReconcileReport, RecomputedStats, Reconciler, StatsSource};
pub use store::{MemoryStatsStore, StatsFailure, StatsStore};
pub use summary::{StatsDelta, UserStatsSummary};
