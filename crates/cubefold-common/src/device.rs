use core::{fmt::Debug, hash::Hash};

/// A device a runtime creates compute clients for.
///
/// Devices key the client cache of a runtime: every equal device shares one client.
pub trait Device: Default + Clone + Eq + Hash + Debug + Send + Sync + 'static {}
