//! A middle-level reader and writer of DICOM data sets: Component B,
//! orchestrating the codec (`dicom-encoding`) into whole-dataset decode and
//! encode, plus a bidirectionally walkable flattened view of a dataset tree.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod dataset;
pub mod error;
pub mod stateful;

pub use error::{Error, Result};
pub use stateful::{read_dataset, write_dataset};
