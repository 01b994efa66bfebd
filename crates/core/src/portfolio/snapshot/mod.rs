//! Portfolio snapshot module - recording and storing historical valuations.

mod snapshot_model;
mod snapshot_recorder;
mod snapshot_service;
mod snapshot_traits;

pub use snapshot_model::*;
pub use snapshot_recorder::record_snapshot;
pub use snapshot_service::SnapshotService;
pub use snapshot_traits::*;

#[cfg(test)]
mod snapshot_service_tests;
