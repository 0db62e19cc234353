#![doc = include_str!("../README.md")]

//! Loris data model.
//!
//! This crate defines the symbolic vocabulary of the pipeline: typed
//! attributes as recorded by the GUI-exploration store, the proposition
//! catalog and its inference rules, proposition-encoded states and
//! transitions, the temporal model assembled from them, recorded execution
//! traces, and temporal patterns/oracles with their serialization sinks.

pub mod attributes;
pub mod encoding;
pub mod model;
pub mod oracles;
pub mod propositions;
pub mod traces;
