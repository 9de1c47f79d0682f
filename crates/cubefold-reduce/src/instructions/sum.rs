use super::{ReduceElement, ReduceInstruction};

/// Sum of the items.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl<In: ReduceElement> ReduceInstruction<In> for Sum {
    type Accumulator = In;
    type Output = In;

    fn null_accumulator(&self) -> In {
        In::zero()
    }

    fn reduce(&self, accumulator: &mut In, item: In, _coordinate: usize) {
        *accumulator = *accumulator + item;
    }

    fn fuse_accumulators(&self, accumulator: &mut In, other: &In) {
        *accumulator = *accumulator + *other;
    }

    fn merge(&self, accumulator: &In, _count: usize) -> In {
        *accumulator
    }
}

/// Product of the items.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prod;

impl<In: ReduceElement> ReduceInstruction<In> for Prod {
    type Accumulator = In;
    type Output = In;

    fn null_accumulator(&self) -> In {
        In::one()
    }

    fn reduce(&self, accumulator: &mut In, item: In, _coordinate: usize) {
        *accumulator = *accumulator * item;
    }

    fn fuse_accumulators(&self, accumulator: &mut In, other: &In) {
        *accumulator = *accumulator * *other;
    }

    fn merge(&self, accumulator: &In, _count: usize) -> In {
        *accumulator
    }
}
