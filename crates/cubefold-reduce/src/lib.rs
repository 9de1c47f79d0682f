//! Tree reduction of a work range over the cubes of a compute device.
//!
//! A [ReduceFunctor] folds every index of `[0, work_count)` into a single value. Work that fits
//! in one cube is reduced by a single launch; larger work writes one partial value per cube and
//! merges them with a second launch.

#[macro_use]
extern crate derive_new;

mod config;
mod error;
mod finalize;
mod functor;
mod instructions;
mod launch;
mod primitives;
mod shared;
mod strategy;

pub use config::*;
pub use error::*;
pub use functor::*;
pub use instructions::*;
pub use primitives::*;
pub use shared::*;
pub use strategy::*;


use bytemuck::Pod;
use cubefold_runtime::{client::ComputeClient, runtime::Runtime};

use crate::launch::launch_reduce;

/// Reduces `[0, work_count)` with `functor` and returns the value.
///
/// Without a strategy the launch shape is picked from the device properties. A work count of zero
/// returns the identity of the functor.
pub fn reduce<R: Runtime, F: ReduceFunctor>(
    client: &ComputeClient<R::Server>,
    work_count: usize,
    functor: &F,
    strategy: Option<ReduceStrategy>,
) -> Result<F::Value, ReduceError> {
    reduce_into::<R, F, _, _>(client, work_count, functor, |value| *value, strategy)
}

/// Reduces `[0, work_count)` with `functor` and hands the value to `finalize`.
///
/// `finalize` is called exactly once when the reduction succeeds, from a unit of the last launch.
pub fn reduce_with_finalize<R, F, Fin>(
    client: &ComputeClient<R::Server>,
    work_count: usize,
    functor: &F,
    finalize: Fin,
    strategy: Option<ReduceStrategy>,
) -> Result<(), ReduceError>
where
    R: Runtime,
    F: ReduceFunctor,
    Fin: Fn(&F::Value) + Send + Sync,
{
    let properties = &client.properties().hardware;
    let layout = SlotLayout::new::<F::Value>(properties.shared_memory_banks);
    let config = ReduceConfig::generate(properties, work_count, layout, strategy)?;

    launch_reduce::<R, F, Fin>(client, work_count, functor, finalize, &config)
}

// Reduces, maps the value on the device and reads it back from a one value cell.
pub(crate) fn reduce_into<R, F, O, Map>(
    client: &ComputeClient<R::Server>,
    work_count: usize,
    functor: &F,
    map: Map,
    strategy: Option<ReduceStrategy>,
) -> Result<O, ReduceError>
where
    R: Runtime,
    F: ReduceFunctor,
    O: Pod + Send + Sync,
    Map: Fn(&F::Value) -> O + Send + Sync,
{
    let cell = client.allocate(size_of::<O>(), 1, "reduce result")?;

    let result = client
        .binding(&cell)
        .map_err(ReduceError::from)
        .and_then(|output| {
            reduce_with_finalize::<R, F, _>(
                client,
                work_count,
                functor,
                move |value| output.store(0, &map(value)),
                strategy,
            )
        })
        .and_then(|_| client.read_value::<O>(&cell).map_err(ReduceError::from));
    let released = client.dealloc(cell);

    let value = result?;
    released?;

    Ok(value)
}
