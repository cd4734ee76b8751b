//! Dominator tree over the blocks of a graph.
//!
//! Block `d` dominates block `b` iff every path from the entry to `b` passes
//! through `d`. The computation here exploits that definition directly: for
//! each candidate `d`, a depth-first traversal runs with `d` masked out, and
//! whatever reachable block the traversal can no longer reach is dominated by
//! `d`. That is `O(V·(V+E))`, which is fine for procedure-sized graphs; a
//! Lengauer-Tarjan variant could replace it behind the same queries if it
//! ever shows up in profiles.

use crate::entity::{EntitySet, SecondaryMap};
use crate::ir::{Block, Graph};
use crate::traversal;
use log::debug;

/// The dominance relation of one graph, with the immediate-dominator tree on
/// top of it.
///
/// The tree borrows nothing: it is a snapshot of the graph it was computed
/// from and is stale once the CFG changes. Unreachable blocks dominate
/// nothing, are dominated by nothing, and sit in no children list.
#[derive(Clone, Default)]
pub struct DominatorTree {
    /// Strict dominators of each block, in reverse post-order. Non-empty for
    /// every reachable block except the entry (the entry is in every list).
    dominators: SecondaryMap<Block, Vec<Block>>,
    /// Blocks each block strictly dominates, in reverse post-order.
    dominated: SecondaryMap<Block, Vec<Block>>,
    /// Immediate children in the dominator tree.
    children: SecondaryMap<Block, Vec<Block>>,
}

impl DominatorTree {
    /// Create an empty tree; fill it with [`compute`](Self::compute).
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate and compute the dominator tree of `graph`.
    pub fn with_graph(graph: &Graph) -> Self {
        let mut tree = Self::new();
        tree.compute(graph);
        tree
    }

    /// Compute the dominance relation of `graph`, replacing any previous
    /// contents. On a graph with no blocks every query is false apart from
    /// the reflexive identity.
    pub fn compute(&mut self, graph: &Graph) {
        self.clear();
        let order = traversal::reverse_postorder(graph);
        debug!(
            "computing dominator tree over {} reachable of {} blocks",
            order.len(),
            graph.num_blocks()
        );

        for &candidate in &order {
            // Everything the masked traversal cannot reach is dominated by
            // the candidate. `reached` ends up holding reach ∪ {candidate}.
            let mut reached = EntitySet::new();
            reached.insert(candidate);
            traversal::preorder_masked(graph, &mut reached);

            for &block in &order {
                if block != candidate && !reached.contains(block) {
                    self.dominated[candidate].push(block);
                    self.dominators[block].push(candidate);
                }
            }
        }

        for &block in &order {
            self.compute_children(block);
        }
    }

    /// Remove all computed data.
    pub fn clear(&mut self) {
        self.dominators.clear();
        self.dominated.clear();
        self.children.clear();
    }

    /// Does `a` dominate `b`? Reflexively true for `a == b`.
    pub fn dominates(&self, a: Block, b: Block) -> bool {
        a == b || self.dominated[a].contains(&b)
    }

    /// The blocks whose immediate dominator is `block`. The order is
    /// implementation-defined but stable for one computed tree.
    pub fn immediate_children(&self, block: Block) -> &[Block] {
        &self.children[block]
    }

    /// The strict dominators of `block`, entry first.
    pub fn dominators(&self, block: Block) -> &[Block] {
        &self.dominators[block]
    }

    /// The blocks strictly dominated by `block`.
    pub fn dominated_blocks(&self, block: Block) -> &[Block] {
        &self.dominated[block]
    }

    /// A dominated block `x` is an immediate child of `block` iff every other
    /// dominator of `x` also dominates `block`, i.e. no strict dominator of
    /// `x` sits strictly between `block` and `x`.
    fn compute_children(&mut self, block: Block) {
        let mut children = Vec::new();
        for &x in &self.dominated[block] {
            if self.dominators[x].iter().all(|&d| self.dominates(d, block)) {
                children.push(x);
            }
        }
        self.children[block] = children;
    }
}
