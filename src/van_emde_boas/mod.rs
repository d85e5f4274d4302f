//! van Emde Boas tree
//!
//! A recursive fixed-universe ordered set with O(log log u) `insert`,
//! `delete`, `member`, `predecessor`, and `successor`, and O(1)
//! `minimum`/`maximum`. The universe `0..u` (with `u` of the form 2^(2^k))
//! is split into √u clusters of √u keys each, with a summary tree tracking
//! which clusters are occupied and the minimum hoisted out of the clusters
//! entirely.

pub mod tree;

pub use tree::VanEmdeBoasTree;
