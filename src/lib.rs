//! In-memory SSA intermediate representation for a single procedure, plus the
//! two canonical control-flow analyses that optimization passes depend on: the
//! dominator tree and the natural-loop nesting tree.
//!
//! The `ir` module defines the data model: a [`ir::Graph`] owns the basic
//! blocks and instructions of one procedure, and [`ir::IrBuilder`] constructs
//! them one at a time while keeping the CFG edges and use-def chains wired.
//! The analyses borrow a finished graph read-only; their results are invalid
//! after any CFG mutation and must be recomputed.

#![deny(missing_docs, trivial_numeric_casts, unused_extern_crates)]
#![warn(unused_import_braces)]

pub mod dominator_tree;
pub mod entity;
pub mod ir;
pub mod loop_analysis;
pub mod packed_option;
pub mod traversal;
pub mod verifier;
pub mod write;

pub use crate::verifier::verify_graph;
pub use crate::write::write_graph;

/// Version number of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
