//! A common naming contract for pluggable components.
//!
//! Formatters, job runners, and schedulers are all registered into a
//! priority-ordered, name-keyed registry (see the plugin registries in
//! `gemforge-pipeline` and `gemforge-jobs`). [`Provider`] is the shared
//! contract those registries key off of.

/// A component that can identify itself by a stable name.
///
/// The name is used as the registry key and must be unique within a single
/// registry; it is not required to be globally unique across registries.
pub trait Provider {
    /// The name this provider is registered under.
    fn name(&self) -> &str;
}
