mod base;
mod words_cpu;

pub use base::*;
pub use words_cpu::*;
