use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    thread,
};

use cubefold_common::{backtrace::BackTrace, word::AtomicWord};
use cubefold_runtime::{
    kernel::{CubeBarrier, CubePoisoned, Kernel, UnitContext},
    server::{CubeCount, CubeDim, LaunchError},
};

/// Executes a slice of the cubes of a launch, one cube after the other.
#[derive(new)]
pub struct Worker<'a> {
    id: usize,
    kernel: &'a dyn Kernel,
    cube_count: CubeCount,
    cube_dim: CubeDim,
    shared_words: usize,
    plane_size: Option<u32>,
}

impl Worker<'_> {
    /// Runs every cube in `cubes`, stopping at the first failing one.
    pub fn run(&self, cubes: &[u32]) -> Result<(), LaunchError> {
        log::trace!("Worker {} started on {} cubes", self.id, cubes.len());

        for cube_pos in cubes {
            self.execute_cube(*cube_pos)?;
        }

        log::trace!("Worker {} stopped", self.id);
        Ok(())
    }

    // Every unit gets its own thread so that units can wait on each other at the cube barrier.
    fn execute_cube(&self, cube_pos: u32) -> Result<(), LaunchError> {
        let units = self.cube_dim.num_elems();
        let shared: Vec<AtomicWord> = (0..self.shared_words)
            .map(|_| AtomicWord::new(0))
            .collect();
        let barrier = CubeBarrier::new(units as usize);
        let failure = spin::Mutex::new(None::<String>);

        thread::scope(|scope| {
            let (shared, barrier, failure) = (&shared, &barrier, &failure);

            for unit_pos in 0..units {
                let spawned = thread::Builder::new()
                    .name(format!("cubefold-cube{cube_pos}-unit{unit_pos}"))
                    .spawn_scoped(scope, move || {
                        let unit = UnitContext::new(
                            unit_pos,
                            cube_pos,
                            self.cube_dim,
                            self.cube_count,
                            self.plane_size,
                            shared,
                            barrier,
                        );

                        if let Err(payload) =
                            catch_unwind(AssertUnwindSafe(|| self.kernel.execute(&unit)))
                        {
                            barrier.poison();
                            if let Some(reason) = panic_reason(payload.as_ref()) {
                                failure.lock().get_or_insert(reason);
                            }
                        }
                    });

                if let Err(err) = spawned {
                    barrier.poison();
                    failure
                        .lock()
                        .get_or_insert(format!("Can't spawn unit {unit_pos}: {err}"));
                    break;
                }
            }
        });

        match failure.into_inner() {
            None => Ok(()),
            Some(reason) => Err(LaunchError::Unknown {
                reason: format!(
                    "Kernel {} failed in cube {cube_pos}: {reason}",
                    self.kernel.name()
                ),
                backtrace: BackTrace::capture(),
            }),
        }
    }
}

// Units released from a poisoned barrier carry no reason of their own.
fn panic_reason(payload: &(dyn Any + Send)) -> Option<String> {
    if payload.is::<CubePoisoned>() {
        None
    } else if let Some(reason) = payload.downcast_ref::<&'static str>() {
        Some(reason.to_string())
    } else if let Some(reason) = payload.downcast_ref::<String>() {
        Some(reason.clone())
    } else {
        Some("unit panicked".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    struct CountUnits {
        seen: AtomicU32,
    }

    impl Kernel for CountUnits {
        fn name(&self) -> &'static str {
            "count_units"
        }

        fn execute(&self, unit: &UnitContext<'_>) {
            let shared = unit.shared();
            shared.store_word(unit.unit_pos as usize, 1);
            unit.sync_units();

            if unit.unit_pos == 0 {
                let total: u32 = (0..unit.cube_dim.num_elems() as usize)
                    .map(|i| shared.load_word(i))
                    .sum();
                self.seen.fetch_add(total, Ordering::Relaxed);
            }
        }
    }

    struct PanicOnUnit(u32);

    impl Kernel for PanicOnUnit {
        fn name(&self) -> &'static str {
            "panic_on_unit"
        }

        fn execute(&self, unit: &UnitContext<'_>) {
            if unit.unit_pos == self.0 {
                panic!("unit {} failed", self.0);
            }
            unit.sync_units();
            unit.sync_units();
        }
    }

    #[test_log::test]
    fn units_of_a_cube_share_memory() {
        let kernel = CountUnits {
            seen: AtomicU32::new(0),
        };
        let worker = Worker::new(
            0,
            &kernel,
            CubeCount::new_1d(3),
            CubeDim::new_1d(8),
            8,
            None,
        );

        worker.run(&[0, 1, 2]).unwrap();

        assert_eq!(kernel.seen.load(Ordering::Relaxed), 24);
    }

    #[test_log::test]
    fn panicking_unit_fails_the_cube_without_deadlock() {
        let kernel = PanicOnUnit(2);
        let worker = Worker::new(
            0,
            &kernel,
            CubeCount::new_single(),
            CubeDim::new_1d(4),
            0,
            None,
        );

        let err = worker.run(&[0]).unwrap_err();

        match err {
            LaunchError::Unknown { reason, .. } => assert!(reason.contains("unit 2 failed")),
            err => panic!("Unexpected error {err}"),
        }
    }
}
