//! Graph well-formedness verifier.
//!
//! The mutation API panics on the violations it can see locally (appending
//! past a terminator, desynchronized use-def lists). Everything else — edge
//! symmetry broken by hand-wired graphs, phi arity drifting as predecessors
//! are added, a terminator followed by more instructions — only becomes
//! visible when looking at the whole graph, which is this module's job. Run
//! it before handing a graph to the analyses; they assume these invariants
//! and do not re-check them.

use crate::ir::{Block, Graph, Inst};
use thiserror::Error;

/// A verifier error, naming the entity where verification failed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{entity}: {message}")]
pub struct VerifierError {
    /// The block or instruction the error was detected on, rendered as in
    /// the text dump.
    pub entity: String,
    /// Error message.
    pub message: String,
}

/// Result of verifying a graph. Verification stops at the first error.
pub type VerifierResult = Result<(), VerifierError>;

macro_rules! verifier_err {
    ( $entity:expr, $( $arg:tt )* ) => {
        return Err(VerifierError {
            entity: $entity.to_string(),
            message: format!( $( $arg )* ),
        })
    };
}

/// Verify the structural invariants of `graph`.
pub fn verify_graph(graph: &Graph) -> VerifierResult {
    for block in graph.blocks() {
        verify_edge_symmetry(graph, block)?;
        verify_layout(graph, block)?;
        verify_terminator(graph, block)?;
        verify_phis(graph, block)?;
    }
    for inst in graph.insts() {
        verify_use_def_symmetry(graph, inst)?;
    }
    Ok(())
}

fn count<T: PartialEq>(haystack: &[T], needle: &T) -> usize {
    haystack.iter().filter(|x| *x == needle).count()
}

/// Each side of the CFG edge lists must mirror the other, counting parallel
/// edges separately.
fn verify_edge_symmetry(graph: &Graph, block: Block) -> VerifierResult {
    for &succ in graph.successors(block) {
        let forward = count(graph.successors(block), &succ);
        let backward = count(graph.predecessors(succ), &block);
        if forward != backward {
            verifier_err!(
                block,
                "{} successor edges to {}, but {} predecessor entries back",
                forward,
                succ,
                backward
            );
        }
    }
    for &pred in graph.predecessors(block) {
        if count(graph.successors(pred), &block) == 0 {
            verifier_err!(block, "predecessor {} has no matching successor edge", pred);
        }
    }
    Ok(())
}

/// The intrusive instruction chain must agree with the block's first/last
/// pointers and every member must point back at the block.
fn verify_layout(graph: &Graph, block: Block) -> VerifierResult {
    let first = graph[block].first_inst();
    let last = graph[block].last_inst();
    if first.is_none() != last.is_none() {
        verifier_err!(block, "half-empty instruction list");
    }

    let mut prev: Option<Inst> = None;
    let mut steps = 0;
    let mut cursor = first;
    while let Some(inst) = cursor {
        if steps > graph.num_insts() {
            verifier_err!(block, "instruction list does not terminate");
        }
        steps += 1;
        if graph[inst].block() != Some(block) {
            verifier_err!(inst, "in the list of {} but its parent is elsewhere", block);
        }
        if graph[inst].prev() != prev {
            verifier_err!(inst, "prev link does not match the list order of {}", block);
        }
        prev = Some(inst);
        cursor = graph[inst].next();
    }
    if prev != last {
        verifier_err!(block, "last instruction pointer does not match the list");
    }
    Ok(())
}

/// A terminator may only come last, and the successor list must match what
/// the terminator (or its absence) implies.
fn verify_terminator(graph: &Graph, block: Block) -> VerifierResult {
    let mut insts = graph.block_insts(block).peekable();
    while let Some(inst) = insts.next() {
        if graph[inst].is_terminator() && insts.peek().is_some() {
            verifier_err!(inst, "terminator is not the last instruction of {}", block);
        }
    }

    let last = match graph[block].last_inst() {
        Some(last) => last,
        // Blocks without instructions occur while the graph is being built;
        // their successor lists are unconstrained.
        None => return Ok(()),
    };
    let succs = graph.successors(block);
    if let Some(destination) = graph[last].jump_destination() {
        if succs != [destination] {
            verifier_err!(block, "jmp to {} but successors are {:?}", destination, succs);
        }
    } else if let Some((then_dest, else_dest)) = graph[last].branch_destinations() {
        if succs != [then_dest, else_dest] {
            verifier_err!(
                block,
                "branch targets ({}, {}) but successors are {:?}",
                then_dest,
                else_dest,
                succs
            );
        }
    } else if graph[last].is_terminator() && !succs.is_empty() {
        verifier_err!(block, "returns but has successors {:?}", succs);
    }
    Ok(())
}

/// A phi needs exactly one operand per predecessor of its block.
fn verify_phis(graph: &Graph, block: Block) -> VerifierResult {
    let num_preds = graph.predecessors(block).len();
    for inst in graph.block_insts(block) {
        if graph[inst].is_phi() && graph[inst].operands().len() != num_preds {
            verifier_err!(
                inst,
                "phi has {} operands but {} has {} predecessors",
                graph[inst].operands().len(),
                block,
                num_preds
            );
        }
    }
    Ok(())
}

/// `v ∈ operands(u)` exactly as often as `u ∈ users(v)`.
fn verify_use_def_symmetry(graph: &Graph, inst: Inst) -> VerifierResult {
    for &value in graph[inst].operands() {
        let uses = count(graph[inst].operands(), &value);
        let records = count(graph[value].users(), &inst);
        if uses != records {
            verifier_err!(
                inst,
                "uses {} {} times but is recorded as a user {} times",
                value,
                uses,
                records
            );
        }
    }
    for &user in graph[inst].users() {
        if count(graph[user].operands(), &inst) == 0 {
            verifier_err!(inst, "lists user {} which does not use it", user);
        }
    }
    Ok(())
}
