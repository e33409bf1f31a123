//! The stateful dataset reader and writer: Component B's orchestration of
//! the codec (`dicom-encoding`) into whole-dataset decode/encode, per §4.2.

pub mod decode;
pub mod encode;

pub use decode::read_dataset;
pub use encode::write_dataset;
