use cubefold::prelude::*;

const BUCKETS: usize = 16;

/// Histogram of a pseudo random sequence, reduced as a single value.
struct Histogram {
    seed: u64,
}

impl Histogram {
    fn sample(&self, index: usize) -> usize {
        // SplitMix64.
        let mut z = self.seed.wrapping_add((index as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15));
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        ((z ^ (z >> 31)) % BUCKETS as u64) as usize
    }
}

impl ReduceFunctor for Histogram {
    type Value = [u32; BUCKETS];

    fn init(&self, value: &mut Self::Value) {
        *value = [0; BUCKETS];
    }

    fn accumulate(&self, index: usize, value: &mut Self::Value) {
        value[self.sample(index)] += 1;
    }

    fn join(&self, value: &mut Self::Value, other: &Self::Value) {
        for (bucket, count) in value.iter_mut().zip(other) {
            *bucket += *count;
        }
    }
}

fn main() -> Result<(), ReduceError> {
    env_logger::init();

    let client = CpuRuntime::client(&CpuDevice);
    let work_count = 1_000_000;

    let histogram = reduce::<CpuRuntime, _>(&client, work_count, &Histogram { seed: 7 }, None)?;
    let total: u32 = histogram.iter().sum();

    for (bucket, count) in histogram.iter().enumerate() {
        println!("{bucket:>2} {count}");
    }
    println!("total {total} of {work_count}");

    let values: Vec<f32> = (0..work_count).map(|i| (i % 1000) as f32).collect();
    let mean = reduce_slice::<CpuRuntime, _, _>(&client, &values, Mean, None)?;
    let argmax = reduce_slice::<CpuRuntime, _, _>(&client, &values, ArgMax, None)?;
    println!("mean {mean}, first maximum at {argmax}");

    Ok(())
}
