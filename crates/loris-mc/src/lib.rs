#![doc = include_str!("../README.md")]

//! Model-checker integration.
//!
//! External checkers are black boxes behind the [`checker::ModelChecker`]
//! trait: configure with a model and an oracle list, point at an executable,
//! run, and read back the annotated oracle list. The export module renders a
//! temporal model into the text formats those executables consume.

pub mod backends;
pub mod checker;
pub mod export;
