//! The codec engine (Component A): tag/VR/length header framing, per-VR
//! primitive value encode/decode, and the transfer syntax profiles that tie
//! VR model, endianness, and pixel data framing together.
//!
//! This crate does not know how to walk a whole dataset tree or recognize
//! sequence nesting — that orchestration lives in `dicom-parser`. It only
//! implements the per-element wire format for one transfer syntax at a
//! time.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod decode;
pub mod encode;
pub mod error;
pub mod primitive_value;
pub mod text;
pub mod transfer_syntax;

pub use decode::{Decode, DecodeToken, HeaderDecoder};
pub use encode::{Encode, HeaderEncoder};
pub use error::{Error, Result};
pub use transfer_syntax::TransferSyntax;
