use super::{ReduceElement, ReduceInstruction};

/// Largest item, or the lowest value of the type (negative infinity for floats) for an empty
/// slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

impl<In: ReduceElement> ReduceInstruction<In> for Max {
    type Accumulator = In;
    type Output = In;

    fn null_accumulator(&self) -> In {
        In::lowest()
    }

    fn reduce(&self, accumulator: &mut In, item: In, _coordinate: usize) {
        if item > *accumulator {
            *accumulator = item;
        }
    }

    fn fuse_accumulators(&self, accumulator: &mut In, other: &In) {
        if *other > *accumulator {
            *accumulator = *other;
        }
    }

    fn merge(&self, accumulator: &In, _count: usize) -> In {
        *accumulator
    }
}
