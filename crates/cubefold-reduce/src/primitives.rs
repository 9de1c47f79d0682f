use cubefold_runtime::kernel::UnitContext;

use crate::{ReduceFunctor, SlotLayout};

/// Reduces the first `slots` slots of the shared memory into slot 0.
///
/// Every unit of the cube must call this function, even those without a slot. Each level folds
/// the upper half of the remaining slots into the lower half, so `slots` doesn't need to be a
/// power of two: the middle slot of an odd count is carried to the next level untouched.
pub fn reduce_tree<F: ReduceFunctor>(
    unit: &UnitContext<'_>,
    functor: &F,
    layout: &SlotLayout,
    slots: u32,
) {
    let shared = unit.shared();
    let unit_pos = unit.unit_pos;
    let mut active = slots;

    while active > 1 {
        let half = active.div_ceil(2);

        // Slots written by units of another plane must be visible before they are read.
        unit.sync_units_if_needed(active);

        if unit_pos < active - half {
            let mut value: F::Value = shared.load(layout.offset(unit_pos));
            let other: F::Value = shared.load(layout.offset(unit_pos + half));
            functor.join(&mut value, &other);
            shared.store(layout.offset(unit_pos), &value);
        }

        active = half;
    }
}
