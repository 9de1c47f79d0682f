mod argmax;
mod argmin;
mod max;
mod mean;
mod min;
mod sum;

pub use argmax::*;
pub use argmin::*;
pub use max::*;
pub use mean::*;
pub use min::*;
pub use sum::*;

use core::marker::PhantomData;

use bytemuck::{Pod, Zeroable};
use cubefold_common::word::{WORD_SIZE, word_count};
use cubefold_runtime::{client::ComputeClient, runtime::Runtime, storage::GlobalMemory};
use half::{bf16, f16};
use num_traits::{Float, Num, NumCast};

use crate::{ReduceError, ReduceFunctor, ReduceStrategy, reduce_into};

/// Numbers the built-in instructions can reduce.
pub trait ReduceElement: Pod + Send + Sync + Num + NumCast + PartialOrd {
    /// The value no item is smaller than: negative infinity for floats.
    fn lowest() -> Self;
    /// The value no item is larger than: positive infinity for floats.
    fn highest() -> Self;
}

macro_rules! impl_reduce_element_float {
    ($($ty:ty),*) => {
        $(impl ReduceElement for $ty {
            fn lowest() -> Self {
                <$ty as Float>::neg_infinity()
            }

            fn highest() -> Self {
                <$ty as Float>::infinity()
            }
        })*
    };
}

macro_rules! impl_reduce_element_int {
    ($($ty:ty),*) => {
        $(impl ReduceElement for $ty {
            fn lowest() -> Self {
                <$ty>::MIN
            }

            fn highest() -> Self {
                <$ty>::MAX
            }
        })*
    };
}

impl_reduce_element_float!(f16, bf16, f32, f64);
impl_reduce_element_int!(i8, i16, i32, i64, u8, u16, u32, u64);

/// An operation folding the items of a slice into a single output.
pub trait ReduceInstruction<In>: Send + Sync {
    /// Partial state, combined across units and cubes.
    type Accumulator: Pod + Send + Sync;
    /// The final result.
    type Output: Pod + Send + Sync;

    /// The accumulator of an empty slice.
    fn null_accumulator(&self) -> Self::Accumulator;

    /// Adds the item at `coordinate` to the accumulator.
    fn reduce(&self, accumulator: &mut Self::Accumulator, item: In, coordinate: usize);

    /// Combines two accumulators.
    fn fuse_accumulators(&self, accumulator: &mut Self::Accumulator, other: &Self::Accumulator);

    /// Turns the accumulator of the whole slice, of `count` items, into the output.
    fn merge(&self, accumulator: &Self::Accumulator, count: usize) -> Self::Output;
}

/// Accumulator of the instructions returning a coordinate.
///
/// Items are compared as `f64`, which is exact for every float and for integers of 32 bits or
/// less.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ArgAccumulator {
    /// The best item so far.
    pub value: f64,
    /// The coordinate of the best item, `u64::MAX` when nothing was reduced.
    pub coordinate: u64,
}

/// Applies a [ReduceInstruction] to a slice stored in device memory.
pub struct SliceReduce<In, Inst> {
    input: GlobalMemory,
    stride: usize,
    instruction: Inst,
    _input: PhantomData<fn() -> In>,
}

impl<In: Pod, Inst> SliceReduce<In, Inst> {
    /// Reduces the items of `input`, one item every `word_count::<In>()` words.
    pub fn new(input: GlobalMemory, instruction: Inst) -> Self {
        Self {
            input,
            stride: word_count::<In>(),
            instruction,
            _input: PhantomData,
        }
    }

    /// The instruction applied to the slice.
    pub fn instruction(&self) -> &Inst {
        &self.instruction
    }
}

impl<In, Inst> ReduceFunctor for SliceReduce<In, Inst>
where
    In: Pod + Send + Sync,
    Inst: ReduceInstruction<In>,
{
    type Value = Inst::Accumulator;

    fn init(&self, value: &mut Self::Value) {
        *value = self.instruction.null_accumulator();
    }

    fn accumulate(&self, index: usize, value: &mut Self::Value) {
        let item: In = self.input.load(index * self.stride);
        self.instruction.reduce(value, item, index);
    }

    fn join(&self, value: &mut Self::Value, other: &Self::Value) {
        self.instruction.fuse_accumulators(value, other);
    }
}

/// Copies `input` to the device and reduces it with `instruction`.
///
/// Both the input buffer and the result cell are released before returning, also on failure.
pub fn reduce_slice<R, In, Inst>(
    client: &ComputeClient<R::Server>,
    input: &[In],
    instruction: Inst,
    strategy: Option<ReduceStrategy>,
) -> Result<Inst::Output, ReduceError>
where
    R: Runtime,
    In: Pod + Send + Sync,
    Inst: ReduceInstruction<In>,
{
    let stride = word_count::<In>();
    let handle = client.allocate(stride * WORD_SIZE, input.len(), "reduce input")?;

    let result = client
        .binding(&handle)
        .map_err(ReduceError::from)
        .and_then(|memory| {
            for (index, item) in input.iter().enumerate() {
                memory.store(index * stride, item);
            }

            let functor = SliceReduce::new(memory, instruction);
            let count = input.len();

            reduce_into::<R, _, _, _>(
                client,
                count,
                &functor,
                |accumulator| functor.instruction().merge(accumulator, count),
                strategy,
            )
        });
    let released = client.dealloc(handle);

    let output = result?;
    released?;

    Ok(output)
}
