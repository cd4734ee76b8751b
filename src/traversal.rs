//! Depth-first traversals of the control-flow graph.
//!
//! All traversals start at the entry block, follow successor lists in their
//! stored order, and silently ignore unreachable blocks, so their results are
//! deterministic for a fixed graph. The masked pre-order accepts a
//! caller-supplied visited set that acts both as an exclusion mask and as a
//! cumulative record; the dominator computation uses it to answer "what is
//! reachable while pretending block X does not exist".

use crate::entity::{EntitySet, SecondaryMap};
use crate::ir::{Block, Graph};

/// Enumerate the blocks reachable from the entry in depth-first pre-order.
pub fn preorder(graph: &Graph) -> Vec<Block> {
    let mut visited = EntitySet::new();
    preorder_masked(graph, &mut visited)
}

/// Depth-first pre-order that skips any block already in `visited`.
///
/// Blocks reached by the traversal are added to `visited`, so the set doubles
/// as a record of everything seen. Pre-seeding it with the entry yields an
/// empty traversal.
pub fn preorder_masked(graph: &Graph, visited: &mut EntitySet<Block>) -> Vec<Block> {
    let mut order = Vec::new();
    if let Some(entry) = graph.entry_block() {
        pre_visit(graph, entry, visited, &mut order);
    }
    order
}

fn pre_visit(graph: &Graph, block: Block, visited: &mut EntitySet<Block>, order: &mut Vec<Block>) {
    if visited.contains(block) {
        return;
    }
    visited.insert(block);
    order.push(block);
    for &succ in graph.successors(block) {
        pre_visit(graph, succ, visited, order);
    }
}

/// Enumerate the reachable blocks in reverse post-order: every block appears
/// before all of its successors except along back edges.
pub fn reverse_postorder(graph: &Graph) -> Vec<Block> {
    let mut visited = EntitySet::new();
    let mut order = Vec::new();
    if let Some(entry) = graph.entry_block() {
        post_visit(graph, entry, &mut visited, &mut order);
    }
    order.reverse();
    order
}

fn post_visit(graph: &Graph, block: Block, visited: &mut EntitySet<Block>, order: &mut Vec<Block>) {
    if visited.contains(block) {
        return;
    }
    visited.insert(block);
    for &succ in graph.successors(block) {
        post_visit(graph, succ, visited, order);
    }
    order.push(block);
}

/// Node states of the back-edge discovery walk.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
enum Color {
    /// Not visited yet.
    #[default]
    White,
    /// On the recursion stack.
    Grey,
    /// Fully processed.
    Black,
}

/// Find the DFS back edges of the graph as ⟨header, tail⟩ pairs, where the
/// header is the ancestor on the recursion stack and the tail the block whose
/// outgoing edge closes the cycle. Pairs are reported in discovery order.
pub fn back_edges(graph: &Graph) -> Vec<(Block, Block)> {
    let mut colors = SecondaryMap::new();
    let mut edges = Vec::new();
    if let Some(entry) = graph.entry_block() {
        color_visit(graph, entry, &mut colors, &mut edges);
    }
    edges
}

fn color_visit(
    graph: &Graph,
    block: Block,
    colors: &mut SecondaryMap<Block, Color>,
    edges: &mut Vec<(Block, Block)>,
) {
    colors[block] = Color::Grey;
    for &succ in graph.successors(block) {
        match colors[succ] {
            Color::White => color_visit(graph, succ, colors, edges),
            Color::Grey => edges.push((succ, block)),
            Color::Black => {}
        }
    }
    colors[block] = Color::Black;
}
