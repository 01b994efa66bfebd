mod version_builder;

pub use version_builder::{build_version, VersionDraft};
