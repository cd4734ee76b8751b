//! Per-block data: CFG edges and the intrusive instruction list.

use super::entities::{Block, Inst};
use crate::packed_option::PackedOption;
use smallvec::SmallVec;

/// Contents of a basic block: its CFG edges and the head/tail of its
/// instruction list. The instructions themselves are chained through their
/// intrusive prev/next links.
#[derive(Clone, Debug, Default)]
pub struct BlockData {
    pub(super) predecessors: SmallVec<[Block; 2]>,
    pub(super) successors: SmallVec<[Block; 2]>,
    pub(super) first_inst: PackedOption<Inst>,
    pub(super) last_inst: PackedOption<Inst>,
}

impl BlockData {
    /// Create an empty block with no edges.
    pub fn new() -> Self {
        Self::default()
    }

    /// The ordered predecessor list.
    pub fn predecessors(&self) -> &[Block] {
        &self.predecessors
    }

    /// The ordered successor list. For a block ending in a conditional
    /// branch, the order matches ⟨taken target, fallthrough target⟩.
    pub fn successors(&self) -> &[Block] {
        &self.successors
    }

    /// The first instruction in the block, if any.
    pub fn first_inst(&self) -> Option<Inst> {
        self.first_inst.expand()
    }

    /// The last instruction in the block, if any.
    pub fn last_inst(&self) -> Option<Inst> {
        self.last_inst.expand()
    }

    /// Append `block` to the successor list.
    ///
    /// No deduplication is performed and the matching predecessor entry is
    /// not added; callers wiring edges by hand must keep the two sides
    /// symmetric themselves. [`Graph::add_edge`](super::Graph::add_edge) and
    /// the builder do.
    pub fn add_successor(&mut self, block: Block) {
        self.successors.push(block);
    }

    /// Append `block` to the predecessor list. See
    /// [`add_successor`](Self::add_successor) for the symmetry obligation.
    pub fn add_predecessor(&mut self, block: Block) {
        self.predecessors.push(block);
    }
}
