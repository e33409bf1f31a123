//! Core types for a DICOM Upper Layer / DIMSE network node: tags, value
//! representations, lengths, data elements, the in-memory dataset tree, and
//! the encapsulated pixel data container.
//!
//! This crate intentionally knows nothing about the wire encoding (see
//! `dicom-encoding`/`dicom-parser`) or the network protocol (see
//! `dicom-ul`/`dicom-dimse`); it only defines the data model those crates
//! operate on.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod dataset;
pub mod dictionary;
pub mod error;
pub mod header;
pub mod length;
pub mod pixeldata;
pub mod tag;
pub mod value;
pub mod vr;

pub use dataset::{DataSetBuilder, InMemDataSet, InMemElement};
pub use dictionary::{DataDictionary, DictionaryEntry};
pub use error::{Error, Result};
pub use header::{DataElement, DataElementHeader, Header};
pub use length::Length;
pub use pixeldata::PixelFragmentSequence;
pub use tag::Tag;
pub use value::{PrimitiveValue, Value};
pub use vr::VR;
