//! Shared tracing targets for cache diagnostics.
//!
//! Each area of the crate logs under its own target so subscribers can filter
//! entry resolution noise separately from tree maintenance or archiving.

/// Target used when resolving and manipulating individual cache entries.
pub(crate) const ENTRY_TARGET: &str = "cachedir::entry";

/// Target used by recursive clear and disk usage walks.
pub(crate) const TREE_TARGET: &str = "cachedir::tree";

/// Target used by backup and restore.
pub(crate) const ARCHIVE_TARGET: &str = "cachedir::archive";

/// Target used when the active cache root changes.
pub(crate) const REGISTRY_TARGET: &str = "cachedir::registry";
