use cubefold_runtime::{
    client::ComputeClient,
    kernel::{Kernel, UnitContext},
    runtime::Runtime,
    server::{CubeCount, CubeDim, Handle},
    storage::GlobalMemory,
};

use crate::{
    ReduceConfig, ReduceError, ReduceFunctor, ReducePath, SlotLayout,
    finalize::{BlockFinalize, CubeFinalize, SerialFinalize},
    primitives::reduce_tree,
};

/// Every unit folds a strided share of the work range into its slot, then the cube reduces its
/// slots and finalizes.
struct ReduceKernel<'a, F, Fin> {
    work_count: usize,
    functor: &'a F,
    finalize: Fin,
    layout: SlotLayout,
}

impl<F, Fin> Kernel for ReduceKernel<'_, F, Fin>
where
    F: ReduceFunctor,
    Fin: CubeFinalize<F::Value>,
{
    fn name(&self) -> &'static str {
        "reduce_functor"
    }

    fn execute(&self, unit: &UnitContext<'_>) {
        let mut value = self.functor.identity();
        let stride = unit.num_units();

        let mut index = unit.absolute_pos();
        while index < self.work_count {
            self.functor.accumulate(index, &mut value);
            index += stride;
        }

        unit.shared()
            .store(self.layout.offset(unit.unit_pos), &value);

        reduce_tree(unit, self.functor, &self.layout, unit.cube_dim.num_elems());
        self.finalize.finalize(unit, &self.layout);
    }
}

/// A single cube with one unit per partial value reduces the partial result buffer.
struct MergeKernel<'a, F, Fin> {
    partials: GlobalMemory,
    functor: &'a F,
    finalize: Fin,
    layout: SlotLayout,
}

impl<F, Fin> Kernel for MergeKernel<'_, F, Fin>
where
    F: ReduceFunctor,
    Fin: CubeFinalize<F::Value>,
{
    fn name(&self) -> &'static str {
        "reduce_partials"
    }

    fn execute(&self, unit: &UnitContext<'_>) {
        let shared = unit.shared();
        let units = unit.cube_dim.num_elems();
        let words = self.layout.words(units);

        // Consecutive units copy consecutive words.
        let mut word = unit.unit_pos as usize;
        while word < words {
            shared.store_word(word, self.partials.load_word(word));
            word += units as usize;
        }

        reduce_tree(unit, self.functor, &self.layout, units);
        self.finalize.finalize(unit, &self.layout);
    }
}

/// Runs the reduction described by `config`, handing the result to `finalize`.
pub(crate) fn launch_reduce<R, F, Fin>(
    client: &ComputeClient<R::Server>,
    work_count: usize,
    functor: &F,
    finalize: Fin,
    config: &ReduceConfig,
) -> Result<(), ReduceError>
where
    R: Runtime,
    F: ReduceFunctor,
    Fin: Fn(&F::Value) + Send + Sync,
{
    let finalize = SerialFinalize::new(finalize);

    match config.path {
        ReducePath::SingleCube => {
            let kernel = ReduceKernel {
                work_count,
                functor,
                finalize,
                layout: config.layout,
            };
            client.launch(
                &kernel,
                config.launch_count(),
                config.launch_dim(),
                config.shared_words(),
            )?;
        }
        ReducePath::MultiCube => {
            let partials = client.allocate(
                config.layout.slot_bytes(),
                config.cube_count as usize,
                "reduce partials",
            )?;

            let result =
                launch_multi_cube::<R, F, _>(client, &partials, work_count, functor, finalize, config);
            let released = client.dealloc(partials);

            result?;
            released?;
        }
    }

    Ok(())
}

fn launch_multi_cube<R, F, Fin>(
    client: &ComputeClient<R::Server>,
    partials: &Handle,
    work_count: usize,
    functor: &F,
    finalize: Fin,
    config: &ReduceConfig,
) -> Result<(), ReduceError>
where
    R: Runtime,
    F: ReduceFunctor,
    Fin: CubeFinalize<F::Value>,
{
    let partials = client.binding(partials)?;

    let kernel = ReduceKernel {
        work_count,
        functor,
        finalize: BlockFinalize::new(partials.clone()),
        layout: config.layout,
    };
    client.launch(
        &kernel,
        config.launch_count(),
        config.launch_dim(),
        config.shared_words(),
    )?;

    let kernel = MergeKernel {
        partials,
        functor,
        finalize,
        layout: config.layout,
    };
    client.launch(
        &kernel,
        CubeCount::new_single(),
        CubeDim::new_1d(config.cube_count),
        config.layout.words(config.cube_count),
    )?;

    Ok(())
}
