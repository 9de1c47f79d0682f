use num_traits::ToPrimitive;

use super::{ArgAccumulator, ReduceElement, ReduceInstruction};

/// Compute the coordinate of the minimum item.
///
/// If there are multiple minima, the lowest coordinate is returned. An empty slice returns
/// `u64::MAX`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgMin;

impl ArgMin {
    fn choose(accumulator: &mut ArgAccumulator, value: f64, coordinate: u64) {
        let better = value < accumulator.value
            || (value == accumulator.value && coordinate < accumulator.coordinate);

        if better {
            accumulator.value = value;
            accumulator.coordinate = coordinate;
        }
    }
}

impl<In: ReduceElement> ReduceInstruction<In> for ArgMin {
    type Accumulator = ArgAccumulator;
    type Output = u64;

    fn null_accumulator(&self) -> ArgAccumulator {
        ArgAccumulator {
            value: f64::INFINITY,
            coordinate: u64::MAX,
        }
    }

    fn reduce(&self, accumulator: &mut ArgAccumulator, item: In, coordinate: usize) {
        let value = item.to_f64().unwrap_or(f64::NAN);
        Self::choose(accumulator, value, coordinate as u64);
    }

    fn fuse_accumulators(&self, accumulator: &mut ArgAccumulator, other: &ArgAccumulator) {
        Self::choose(accumulator, other.value, other.coordinate);
    }

    fn merge(&self, accumulator: &ArgAccumulator, _count: usize) -> u64 {
        accumulator.coordinate
    }
}
