#![doc = include_str!("../README.md")]

//! Loris pipeline engine.
//!
//! A build streams concrete states out of a [`store::GraphStore`], encodes
//! them through the proposition catalog into a `TemporalModel`, and hands
//! the finished model to the oracle generator and the checker dispatcher.
//! The build is single-threaded and single-pass; the finished model is
//! immutable and safe to share.

pub mod builder;
pub mod dispatch;
pub mod generator;
pub mod logging;
pub mod store;
