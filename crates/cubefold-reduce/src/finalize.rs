use core::marker::PhantomData;

use bytemuck::Pod;
use cubefold_runtime::{kernel::UnitContext, storage::GlobalMemory};

use crate::SlotLayout;

/// What a cube does with its reduced value, found in shared memory slot 0.
pub(crate) trait CubeFinalize<V>: Send + Sync {
    /// Called by every unit of the cube once the tree reduction is done.
    fn finalize(&self, unit: &UnitContext<'_>, layout: &SlotLayout);
}

/// Hands the reduced value to a host callback, once.
///
/// Only unit 0 of a launch made of a single cube calls the callback: on any other launch the value
/// of a cube is partial.
#[derive(new)]
pub(crate) struct SerialFinalize<V, Fin> {
    callback: Fin,
    _value: PhantomData<fn(&V)>,
}

impl<V, Fin> CubeFinalize<V> for SerialFinalize<V, Fin>
where
    V: Pod,
    Fin: Fn(&V) + Send + Sync,
{
    fn finalize(&self, unit: &UnitContext<'_>, _layout: &SlotLayout) {
        if unit.cube_count.num_cubes() == 1 && unit.unit_pos == 0 {
            let value: V = unit.shared().load(0);
            (self.callback)(&value);
        }
    }
}

/// Writes the value of every cube to its slot of the partial result buffer.
///
/// Units of the cube copy the words of the value in stripes.
#[derive(new)]
pub(crate) struct BlockFinalize {
    partials: GlobalMemory,
}

impl<V: Pod> CubeFinalize<V> for BlockFinalize {
    fn finalize(&self, unit: &UnitContext<'_>, layout: &SlotLayout) {
        // Slot 0 was last written by unit 0.
        unit.sync_units_if_needed(layout.value_words as u32);

        let shared = unit.shared();
        let output = layout.offset(unit.cube_pos);
        let units = unit.cube_dim.num_elems() as usize;

        let mut word = unit.unit_pos as usize;
        while word < layout.value_words {
            self.partials
                .store_word(output + word, shared.load_word(word));
            word += units;
        }
    }
}
