//! Test utilities for the Tessera crates.
//!
//! - [`data_gen`] generates deterministic random shards and remap rules
//! - [`reference`] holds naive models of regrouping and term merging that
//!   the real implementations are checked against

pub mod data_gen;
pub mod reference;
