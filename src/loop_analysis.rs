//! Natural-loop detection and the loop nesting tree.
//!
//! Loops are discovered from the DFS back edges of the graph, one loop per
//! header block. A back edge whose header dominates its tail is reducible and
//! contributes the classic natural-loop body: everything that reaches the
//! tail backwards without crossing the header. A back edge whose header does
//! *not* dominate its tail belongs to an irreducible region; the loop object
//! is still created and flagged, but its body is left at just the header and
//! the recorded tails, since "the blocks between" is not well defined without
//! dominance. Loops sharing a header share one object, with bodies unioned.

use crate::dominator_tree::DominatorTree;
use crate::entity::{entity_impl, EntitySet, PrimaryMap, SecondaryMap};
use crate::ir::{Block, Graph};
use crate::packed_option::PackedOption;
use crate::traversal;
use core::fmt;
use log::{debug, trace};
use std::collections::{BTreeSet, VecDeque};

/// An opaque reference to one loop of a graph.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Loop(u32);
entity_impl!(Loop, "loop");

/// One natural or irreducible loop.
struct LoopData {
    header: Block,
    /// Member blocks, including the header. Ordered by block number so the
    /// dump is stable.
    blocks: BTreeSet<Block>,
    /// Source blocks of the back edges targeting the header, in discovery
    /// order.
    back_edges: Vec<Block>,
    parent: PackedOption<Loop>,
    sub_loops: Vec<Loop>,
    reducible: bool,
}

impl LoopData {
    fn new(header: Block) -> Self {
        let mut blocks = BTreeSet::new();
        blocks.insert(header);
        Self {
            header,
            blocks,
            back_edges: Vec::new(),
            parent: PackedOption::default(),
            sub_loops: Vec::new(),
            reducible: true,
        }
    }
}

/// Loop analysis of one graph: all of its loops assembled into a nesting
/// tree. Stale after any CFG mutation, like every derived structure.
#[derive(Default)]
pub struct LoopAnalysis {
    loops: PrimaryMap<Loop, LoopData>,
}

impl LoopAnalysis {
    /// Create an empty analysis; fill it with [`compute`](Self::compute).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dominator tree for `graph` and analyze its loops.
    pub fn with_graph(graph: &Graph) -> Self {
        let domtree = DominatorTree::with_graph(graph);
        let mut analysis = Self::new();
        analysis.compute(graph, &domtree);
        analysis
    }

    /// Analyze the loops of `graph`, replacing any previous contents.
    /// `domtree` must have been computed over the same graph in its current
    /// shape.
    pub fn compute(&mut self, graph: &Graph, domtree: &DominatorTree) {
        self.loops.clear();
        self.find_loops(graph, domtree);
        self.assign_parents();
        debug!("loop analysis found {} loops", self.loops.len());
    }

    /// Iterate over all loops. The order is unspecified.
    pub fn loops(&self) -> impl DoubleEndedIterator<Item = Loop> + '_ {
        self.loops.keys()
    }

    /// Number of loops found.
    pub fn num_loops(&self) -> usize {
        self.loops.len()
    }

    /// The loop whose header is `block`, if any.
    pub fn loop_with_header(&self, block: Block) -> Option<Loop> {
        self.loops.keys().find(|&lp| self.loops[lp].header == block)
    }

    /// The header block of `lp`.
    pub fn header(&self, lp: Loop) -> Block {
        self.loops[lp].header
    }

    /// The member blocks of `lp`, in block-number order. Always contains the
    /// header and every back-edge tail.
    pub fn blocks(&self, lp: Loop) -> impl ExactSizeIterator<Item = Block> + '_ {
        self.loops[lp].blocks.iter().copied()
    }

    /// The back-edge tails of `lp`, in discovery order.
    pub fn back_edges(&self, lp: Loop) -> &[Block] {
        &self.loops[lp].back_edges
    }

    /// The innermost loop enclosing `lp`, if any.
    pub fn parent(&self, lp: Loop) -> Option<Loop> {
        self.loops[lp].parent.expand()
    }

    /// The loops directly nested inside `lp`.
    pub fn sub_loops(&self, lp: Loop) -> &[Loop] {
        &self.loops[lp].sub_loops
    }

    /// Is `block` a member of `lp`?
    pub fn contains(&self, lp: Loop, block: Block) -> bool {
        self.loops[lp].blocks.contains(&block)
    }

    /// Is `lp` reducible, i.e. does its header dominate all of its back-edge
    /// tails? Only reducible loops get their body expanded.
    pub fn is_reducible(&self, lp: Loop) -> bool {
        self.loops[lp].reducible
    }

    fn find_loops(&mut self, graph: &Graph, domtree: &DominatorTree) {
        let mut header_loop: SecondaryMap<Block, PackedOption<Loop>> = SecondaryMap::new();

        // Unreachable blocks are invisible to the analyses, including blocks
        // that only a backward walk would find.
        let mut reachable = EntitySet::new();
        traversal::preorder_masked(graph, &mut reachable);

        for (header, tail) in traversal::back_edges(graph) {
            trace!("back edge {} -> {}", tail, header);
            let lp = match header_loop[header].expand() {
                Some(lp) => lp,
                None => {
                    let lp = self.loops.push(LoopData::new(header));
                    header_loop[header] = lp.into();
                    lp
                }
            };
            self.loops[lp].back_edges.push(tail);
            self.loops[lp].blocks.insert(tail);

            if !domtree.dominates(header, tail) {
                // The header does not dominate the tail, so the edge closes
                // an irreducible region and there is no natural-loop body to
                // collect.
                self.loops[lp].reducible = false;
                continue;
            }

            // Natural-loop body: walk backwards from the tail, stopping at
            // the header. A second back edge into the same header unions
            // into the existing body.
            let mut worklist = VecDeque::new();
            let mut visited = EntitySet::new();
            worklist.push_back(tail);
            visited.insert(tail);
            while let Some(current) = worklist.pop_front() {
                for &pred in graph.predecessors(current) {
                    if pred != header && reachable.contains(pred) && !visited.contains(pred) {
                        worklist.push_back(pred);
                        visited.insert(pred);
                        self.loops[lp].blocks.insert(pred);
                    }
                }
            }
        }
    }

    /// Attach every loop to the tightest enclosing loop: the candidate must
    /// contain the loop's header, with no third loop sitting between the two.
    fn assign_parents(&mut self) {
        let mut order: Vec<Loop> = self.loops.keys().collect();
        order.sort_by(|&x, &y| self.loops[y].blocks.len().cmp(&self.loops[x].blocks.len()));

        for &lp in &order {
            let header = self.loops[lp].header;
            for &candidate in &order {
                if candidate == lp || !self.loops[candidate].blocks.contains(&header) {
                    continue;
                }
                let interposed = order.iter().any(|&other| {
                    other != candidate
                        && other != lp
                        && self.loops[candidate]
                            .blocks
                            .contains(&self.loops[other].header)
                        && self.loops[other].blocks.contains(&header)
                });
                if !interposed {
                    self.loops[lp].parent = candidate.into();
                    self.loops[candidate].sub_loops.push(lp);
                    break;
                }
            }
        }
    }
}

impl fmt::Display for LoopAnalysis {
    /// Human-readable dump: one section per loop.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.loops.is_empty() {
            return writeln!(f, "no loops found");
        }
        for lp in self.loops.keys() {
            let data = &self.loops[lp];
            writeln!(f, "{}: header {}", lp, data.header)?;

            write!(f, "  blocks:")?;
            for block in &data.blocks {
                write!(f, " {}", block)?;
            }
            writeln!(f)?;

            write!(f, "  back edges:")?;
            for tail in &data.back_edges {
                write!(f, " {}->{}", tail, data.header)?;
            }
            writeln!(f)?;

            if !data.reducible {
                writeln!(f, "  irreducible")?;
            }
            if let Some(parent) = data.parent.expand() {
                writeln!(f, "  parent loop header: {}", self.loops[parent].header)?;
            }
            if !data.sub_loops.is_empty() {
                write!(f, "  sub-loops:")?;
                for &sub in &data.sub_loops {
                    write!(f, " {}", self.loops[sub].header)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
