use super::{ReduceElement, ReduceInstruction};

/// Smallest item, or the highest value of the type (positive infinity for floats) for an empty
/// slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

impl<In: ReduceElement> ReduceInstruction<In> for Min {
    type Accumulator = In;
    type Output = In;

    fn null_accumulator(&self) -> In {
        In::highest()
    }

    fn reduce(&self, accumulator: &mut In, item: In, _coordinate: usize) {
        if item < *accumulator {
            *accumulator = item;
        }
    }

    fn fuse_accumulators(&self, accumulator: &mut In, other: &In) {
        if *other < *accumulator {
            *accumulator = *other;
        }
    }

    fn merge(&self, accumulator: &In, _count: usize) -> In {
        *accumulator
    }
}
