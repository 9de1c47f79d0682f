use cubefold_runtime::{
    kernel::{Kernel, UnitContext},
    storage::GlobalMemory,
};

/// Every cube writes `lhs + rhs` for its own position.
pub struct DummyElementwiseAddition {
    pub lhs: GlobalMemory,
    pub rhs: GlobalMemory,
    pub out: GlobalMemory,
}

impl Kernel for DummyElementwiseAddition {
    fn name(&self) -> &'static str {
        "dummy_elementwise_addition"
    }

    fn execute(&self, unit: &UnitContext<'_>) {
        let pos = unit.absolute_pos();
        let value = self.lhs.load_word(pos) + self.rhs.load_word(pos);
        self.out.store_word(pos, value);
    }
}

/// Stores the cube position in shared memory, then copies it to the output after a barrier.
pub struct DummySharedCopy {
    pub out: GlobalMemory,
}

impl Kernel for DummySharedCopy {
    fn name(&self) -> &'static str {
        "dummy_shared_copy"
    }

    fn execute(&self, unit: &UnitContext<'_>) {
        let shared = unit.shared();
        shared.store_word(0, unit.cube_pos * 10);
        unit.sync_units();
        self.out.store_word(unit.cube_pos as usize, shared.load_word(0));
    }
}
