//! mdspec fixture schema
//!
//! Defines the record shapes of the CommonMark conformance corpus: one
//! `TestCase` per spec example and one `SpecVersionEntry` per published
//! spec version.

mod fixture;

pub use fixture::{SchemaError, SpecVersionEntry, TestCase};
