use bytemuck::Pod;

/// Folds the indices of a work range into a single value.
///
/// Every index of `[0, work_count)` is accumulated exactly once, into one of many partial values
/// that are combined with `join` in an unspecified order: `join` must be associative and
/// commutative, and the value produced by `init` must be its identity.
pub trait ReduceFunctor: Send + Sync {
    /// The reduced value, copied word by word between units.
    type Value: Pod + Send + Sync;

    /// Resets `value` to the identity of `join`.
    fn init(&self, value: &mut Self::Value);

    /// Adds the contribution of `index` to `value`.
    fn accumulate(&self, index: usize, value: &mut Self::Value);

    /// Combines `other` into `value`.
    fn join(&self, value: &mut Self::Value, other: &Self::Value);

    /// A fresh value, as produced by `init`.
    fn identity(&self) -> Self::Value {
        let mut value: Self::Value = bytemuck::Zeroable::zeroed();
        self.init(&mut value);
        value
    }
}
