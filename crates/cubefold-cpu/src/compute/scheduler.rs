use std::{sync::mpsc, thread};

use cubefold_common::backtrace::BackTrace;
use cubefold_runtime::{
    kernel::Kernel,
    server::{CubeCount, CubeDim, LaunchError},
};

use super::worker::Worker;

/// Distributes the cubes of a launch over a fixed number of workers.
#[derive(Debug)]
pub struct Scheduler {
    worker_count: usize,
}

impl Default for Scheduler {
    fn default() -> Self {
        let available_parallelism = thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or(1);

        Self::new(available_parallelism)
    }
}

impl Scheduler {
    /// Creates a scheduler running at most `worker_count` cubes at the same time.
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }

    /// The number of workers.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Executes every cube of the launch and waits for all of them.
    ///
    /// Cubes are split in contiguous chunks, one per worker. The first error reported by a
    /// worker is returned once every worker is done.
    pub fn dispatch_execute(
        &self,
        kernel: &dyn Kernel,
        cube_count: CubeCount,
        cube_dim: CubeDim,
        shared_words: usize,
        plane_size: Option<u32>,
    ) -> Result<(), LaunchError> {
        let cubes: Vec<u32> = (0..cube_count.num_cubes()).collect();
        let chunk_size = cubes.len().div_ceil(self.worker_count).max(1);
        let (send, receive) = mpsc::channel();

        thread::scope(|scope| {
            for (id, chunk) in cubes.chunks(chunk_size).enumerate() {
                let worker_send = send.clone();
                let worker = Worker::new(
                    id,
                    kernel,
                    cube_count,
                    cube_dim,
                    shared_words,
                    plane_size,
                );

                let spawned = thread::Builder::new()
                    .name(format!("cubefold-worker{id}"))
                    .spawn_scoped(scope, move || {
                        // The receiver outlives the scope.
                        let _ = worker_send.send(worker.run(chunk));
                    });

                if let Err(err) = spawned {
                    let _ = send.send(Err(LaunchError::Unknown {
                        reason: format!("Can't spawn worker {id}: {err}"),
                        backtrace: BackTrace::capture(),
                    }));
                    break;
                }
            }
        });
        drop(send);

        receive.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};
    use cubefold_runtime::kernel::UnitContext;

    struct MarkCubes {
        visits: Vec<AtomicU32>,
    }

    impl Kernel for MarkCubes {
        fn name(&self) -> &'static str {
            "mark_cubes"
        }

        fn execute(&self, unit: &UnitContext<'_>) {
            self.visits[unit.cube_pos as usize].fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test_log::test]
    fn every_cube_runs_once_per_unit() {
        let kernel = MarkCubes {
            visits: (0..10).map(|_| AtomicU32::new(0)).collect(),
        };

        Scheduler::new(3)
            .dispatch_execute(&kernel, CubeCount::new_1d(10), CubeDim::new_1d(4), 0, None)
            .unwrap();

        for visits in kernel.visits.iter() {
            assert_eq!(visits.load(Ordering::Relaxed), 4);
        }
    }

    struct PanicInCube(u32);

    impl Kernel for PanicInCube {
        fn name(&self) -> &'static str {
            "panic_in_cube"
        }

        fn execute(&self, unit: &UnitContext<'_>) {
            if unit.cube_pos == self.0 {
                panic!("cube {} failed", self.0);
            }
        }
    }

    #[test_log::test]
    fn failing_worker_is_reported_after_every_worker_is_done() {
        let kernel = PanicInCube(5);

        let err = Scheduler::new(4)
            .dispatch_execute(&kernel, CubeCount::new_1d(8), CubeDim::new_1d(2), 0, None)
            .unwrap_err();

        match err {
            LaunchError::Unknown { reason, .. } => assert!(reason.contains("cube 5 failed")),
            err => panic!("Unexpected error {err}"),
        }
    }

    #[test]
    fn more_workers_than_cubes() {
        let kernel = MarkCubes {
            visits: (0..2).map(|_| AtomicU32::new(0)).collect(),
        };

        Scheduler::new(16)
            .dispatch_execute(&kernel, CubeCount::new_1d(2), CubeDim::new_1d(1), 0, None)
            .unwrap();

        for visits in kernel.visits.iter() {
            assert_eq!(visits.load(Ordering::Relaxed), 1);
        }
    }

    #[test]
    fn zero_workers_is_one_worker() {
        assert_eq!(Scheduler::new(0).worker_count(), 1);
    }
}
