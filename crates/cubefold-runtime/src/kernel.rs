use core::sync::atomic::Ordering;
use cubefold_common::word::{AtomicWord, Word, load_value, store_value};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::server::{CubeCount, CubeDim};

/// A kernel is executed once by every unit of every cube of a launch.
///
/// Units of the same cube share a shared memory region and can wait on each other with
/// [UnitContext::sync_units]; units of different cubes can only communicate through global
/// memory, across launches.
pub trait Kernel: Send + Sync {
    /// Name used when logging launches.
    fn name(&self) -> &'static str;

    /// Executes the kernel for one unit.
    fn execute(&self, unit: &UnitContext<'_>);
}

/// Everything a unit knows about where it runs.
pub struct UnitContext<'a> {
    /// Position of the unit in its cube.
    pub unit_pos: u32,
    /// Position of the cube in the launch.
    pub cube_pos: u32,
    /// Number of units in the cube.
    pub cube_dim: CubeDim,
    /// Number of cubes in the launch.
    pub cube_count: CubeCount,
    /// Number of units in lock-step, if any.
    pub plane_size: Option<u32>,
    shared: SharedMemory<'a>,
    barrier: &'a CubeBarrier,
}

impl<'a> UnitContext<'a> {
    /// Creates the context of a unit. Every unit of a cube must share the same shared memory and
    /// barrier, the barrier being sized for the whole cube.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        unit_pos: u32,
        cube_pos: u32,
        cube_dim: CubeDim,
        cube_count: CubeCount,
        plane_size: Option<u32>,
        shared: &'a [AtomicWord],
        barrier: &'a CubeBarrier,
    ) -> Self {
        Self {
            unit_pos,
            cube_pos,
            cube_dim,
            cube_count,
            plane_size,
            shared: SharedMemory { words: shared },
            barrier,
        }
    }

    /// Position of the unit across all cubes of the launch.
    pub fn absolute_pos(&self) -> usize {
        self.cube_pos as usize * self.cube_dim.num_elems() as usize + self.unit_pos as usize
    }

    /// Total number of units in the launch.
    pub fn num_units(&self) -> usize {
        self.cube_count.num_cubes() as usize * self.cube_dim.num_elems() as usize
    }

    /// The shared memory of the cube.
    pub fn shared(&self) -> SharedMemory<'a> {
        self.shared
    }

    /// Waits until every unit of the cube reaches this point.
    ///
    /// Writes done to shared or global memory before the barrier are visible to every unit of
    /// the cube after it. Unwinds with [CubePoisoned] when another unit of the cube panicked.
    pub fn sync_units(&self) {
        self.barrier.wait();
    }

    /// Waits only when the first `active_units` units span more than one plane.
    pub fn sync_units_if_needed(&self, active_units: u32) {
        if crate::requires_sync(self.plane_size, active_units) {
            self.sync_units();
        }
    }
}

/// Barrier shared by the units of a cube.
///
/// Unlike [std::sync::Barrier], it can be poisoned: once a unit fails, every unit waiting or
/// arriving at the barrier unwinds instead of waiting forever for the failed one.
#[derive(Debug)]
pub struct CubeBarrier {
    units: usize,
    state: Mutex<BarrierState>,
    cvar: Condvar,
}

#[derive(Debug, Default)]
struct BarrierState {
    arrived: usize,
    generation: usize,
    poisoned: bool,
}

/// Unwind payload of units released from a poisoned [CubeBarrier].
#[derive(Debug)]
pub struct CubePoisoned;

impl CubeBarrier {
    /// Creates a barrier for `units` units.
    pub fn new(units: usize) -> Self {
        Self {
            units: units.max(1),
            state: Mutex::new(BarrierState::default()),
            cvar: Condvar::new(),
        }
    }

    /// Blocks until every unit of the cube called `wait`.
    pub fn wait(&self) {
        let mut state = self.lock();
        if state.poisoned {
            drop(state);
            std::panic::resume_unwind(Box::new(CubePoisoned));
        }

        state.arrived += 1;
        if state.arrived == self.units {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();
            return;
        }

        let generation = state.generation;
        while generation == state.generation && !state.poisoned {
            state = self
                .cvar
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if generation == state.generation {
            drop(state);
            std::panic::resume_unwind(Box::new(CubePoisoned));
        }
    }

    /// Releases every waiting unit; later calls to `wait` unwind immediately.
    pub fn poison(&self) {
        self.lock().poisoned = true;
        self.cvar.notify_all();
    }

    /// Whether a unit poisoned the barrier.
    pub fn is_poisoned(&self) -> bool {
        self.lock().poisoned
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared memory of a cube, addressed by word.
#[derive(Clone, Copy)]
pub struct SharedMemory<'a> {
    words: &'a [AtomicWord],
}

impl<'a> SharedMemory<'a> {
    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the shared memory holds no word.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Reads the word at `index`.
    pub fn load_word(&self, index: usize) -> Word {
        self.words[index].load(Ordering::Relaxed)
    }

    /// Writes the word at `index`.
    pub fn store_word(&self, index: usize, word: Word) {
        self.words[index].store(word, Ordering::Relaxed)
    }

    /// Reads a value starting at word `offset`.
    pub fn load<V: bytemuck::Pod>(&self, offset: usize) -> V {
        load_value(&self.words[offset..])
    }

    /// Writes a value starting at word `offset`.
    pub fn store<V: bytemuck::Pod>(&self, offset: usize, value: &V) {
        store_value(&self.words[offset..], value)
    }
}
