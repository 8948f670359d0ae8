//! Core library for sxtools
//!
//! This crate implements the **Functional Core** of the sxtools application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! - **`sxtools_core`** (this crate): Pure transformation functions with zero I/O
//! - **`sxtools`**: I/O operations and orchestration (the Imperative Shell)
//!
//! All functions here are deterministic and testable with fixture data alone:
//! wire models for the StackExchange API, the user filter chain, the
//! pagination decision rule, and the output transforms. HTTP and terminal
//! output live in the shell crate.

pub mod se;
