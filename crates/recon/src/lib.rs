//! `twin-recon`: roster reconciliation and mutual-preference pairing.
//!
//! Pure engine crate: receives pre-loaded students and preference edges,
//! returns change sets and per-group reports. No CLI or IO dependencies.

pub mod error;
pub mod grouping;
pub mod model;
pub mod pairing;
pub mod preferences;
pub mod reconcile;
pub mod report;

pub use error::TwinError;
pub use grouping::{group_by_label, group_labels};
pub use model::{
    ChangeKind, GroupReport, Pair, PairStatus, PersistedStudent, PreferenceEdge,
    ReconciliationResult, ReportRow, StoreCommand, StudentNumber, StudentRecord,
};
pub use pairing::find_mutual_pairs;
pub use preferences::PreferenceBook;
pub use reconcile::reconcile;
pub use report::{build_group_report, build_reports};
