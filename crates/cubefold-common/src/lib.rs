#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! Common types shared by the cubefold crates.

extern crate alloc;

/// Backtrace captured by runtime errors.
pub mod backtrace;

/// Device identification.
pub mod device;

/// Random number generation for test data.
pub mod rand;

/// Reinterpretation of plain-data values as 32-bit memory words.
pub mod word;
