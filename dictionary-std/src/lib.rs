//! The standard data dictionary collaborator named in §1 as out of scope
//! for the core but replaced freely: a small built-in attribute table (the
//! DIMSE command-set group plus commonly negotiated dataset attributes),
//! the line-format parser for the dictionary file format of §6, and a
//! handful of well-known SOP class UID constants used to key a DIMSE
//! handler registry.
//!
//! Nothing upstream of this crate depends on it directly — `dicom-core`
//! only knows the [`DataDictionary`](dicom_core::dictionary::DataDictionary)
//! trait, and `dicom-parser`/`dicom-dimse` take any implementation of it as
//! a parameter. This crate is the one concrete implementation this node
//! ships with.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod data_element;
pub mod entries;
pub mod parse;
pub mod sop_uids;

pub use data_element::StandardDataDictionary;
