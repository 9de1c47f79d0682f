use num_traits::{Float, NumCast};

use super::{ReduceElement, ReduceInstruction, Sum};

/// Mean of the items, NaN for an empty slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl<In: ReduceElement + Float> ReduceInstruction<In> for Mean {
    type Accumulator = In;
    type Output = In;

    fn null_accumulator(&self) -> In {
        <Sum as ReduceInstruction<In>>::null_accumulator(&Sum)
    }

    fn reduce(&self, accumulator: &mut In, item: In, coordinate: usize) {
        <Sum as ReduceInstruction<In>>::reduce(&Sum, accumulator, item, coordinate);
    }

    fn fuse_accumulators(&self, accumulator: &mut In, other: &In) {
        <Sum as ReduceInstruction<In>>::fuse_accumulators(&Sum, accumulator, other);
    }

    fn merge(&self, accumulator: &In, count: usize) -> In {
        match <In as NumCast>::from(count) {
            Some(count) => *accumulator / count,
            None => In::nan(),
        }
    }
}
