//! The `Graph` owns all basic blocks and instructions of one procedure.
//!
//! Blocks and instructions live in two flat arenas and reference each other
//! through entity indexes, so the cyclic shape of the IR carries no ownership
//! cycles. Ids are dense, assigned in insertion order, and never reused for
//! the life of the graph. The first-created block is the entry block.

use super::block::BlockData;
use super::entities::{Block, Inst};
use super::instruction::InstData;
use crate::entity::PrimaryMap;
use crate::write::write_graph;
use core::fmt;
use core::ops::{Index, IndexMut};

/// A procedure: the arena of its blocks and instructions plus the designated
/// entry block.
///
/// Mutation goes through the methods here (or the
/// [`IrBuilder`](super::IrBuilder) on top of them) so that the paired
/// invariants hold at all times: successor/predecessor lists mirror each
/// other when edges are added with [`add_edge`](Graph::add_edge), and
/// operand/user lists mirror each other always.
#[derive(Clone, Default)]
pub struct Graph {
    blocks: PrimaryMap<Block, BlockData>,
    insts: PrimaryMap<Inst, InstData>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            blocks: PrimaryMap::new(),
            insts: PrimaryMap::new(),
        }
    }

    /// Create a new block. The first block created in a graph is its entry.
    pub fn make_block(&mut self) -> Block {
        self.blocks.push(BlockData::new())
    }

    /// Create a new instruction from `data`. The instruction is owned by the
    /// graph but not yet part of any block; use
    /// [`append_inst`](Graph::append_inst) to place it.
    pub fn make_inst(&mut self, data: InstData) -> Inst {
        debug_assert!(data.block().is_none());
        self.insts.push(data)
    }

    /// The entry block, or `None` if no block has been created.
    pub fn entry_block(&self) -> Option<Block> {
        self.blocks.keys().next()
    }

    /// Number of blocks created in this graph.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Number of instructions created in this graph.
    pub fn num_insts(&self) -> usize {
        self.insts.len()
    }

    /// Iterate over all blocks in creation order.
    pub fn blocks(&self) -> impl DoubleEndedIterator<Item = Block> + '_ {
        self.blocks.keys()
    }

    /// Iterate over all instructions in creation order, placed or not.
    pub fn insts(&self) -> impl DoubleEndedIterator<Item = Inst> + '_ {
        self.insts.keys()
    }

    /// The ordered predecessor list of `block`.
    pub fn predecessors(&self, block: Block) -> &[Block] {
        self.blocks[block].predecessors()
    }

    /// The ordered successor list of `block`.
    pub fn successors(&self, block: Block) -> &[Block] {
        self.blocks[block].successors()
    }

    /// Add a CFG edge from `from` to `to`, appending to both the successor
    /// list of `from` and the predecessor list of `to`. No deduplication:
    /// adding the same edge twice yields parallel edges.
    pub fn add_edge(&mut self, from: Block, to: Block) {
        self.blocks[from].add_successor(to);
        self.blocks[to].add_predecessor(from);
    }

    /// Append `inst` at the end of `block`.
    ///
    /// Panics if `inst` was already placed, or if `block` already ends in a
    /// terminator.
    pub fn append_inst(&mut self, block: Block, inst: Inst) {
        assert!(
            self.insts[inst].block().is_none(),
            "{} is already in {}",
            inst,
            self.insts[inst].block.unwrap(),
        );
        if let Some(last) = self.blocks[block].last_inst.expand() {
            assert!(
                !self.insts[last].is_terminator(),
                "cannot append {} to {} after terminator {}",
                inst,
                block,
                last,
            );
            self.insts[last].next = inst.into();
            self.insts[inst].prev = last.into();
        } else {
            self.blocks[block].first_inst = inst.into();
        }
        self.blocks[block].last_inst = inst.into();
        self.insts[inst].block = block.into();
    }

    /// Iterate over the instructions of `block` in layout order.
    pub fn block_insts(&self, block: Block) -> Insts {
        Insts {
            graph: self,
            next: self.blocks[block].first_inst(),
        }
    }

    /// Append `value` to the operand list of `inst` and record `inst` as a
    /// user of `value`, preserving use-def symmetry.
    pub fn add_operand(&mut self, inst: Inst, value: Inst) {
        self.insts[inst].operands.push(value);
        self.insts[value].users.push(inst);
    }

    /// Replace the operand list of `inst` wholesale. User lists are updated
    /// on both the removed and the added edges.
    pub fn set_operands(&mut self, inst: Inst, values: &[Inst]) {
        let old = core::mem::take(&mut self.insts[inst].operands);
        for value in old {
            let users = &mut self.insts[value].users;
            let pos = users
                .iter()
                .position(|&u| u == inst)
                .expect("use-def lists out of sync");
            users.remove(pos);
        }
        for &value in values {
            self.add_operand(inst, value);
        }
    }

    /// The predecessor block a phi operand flows in from: the block of the
    /// operand at `index`. Panics if `phi` is not a phi instruction or the
    /// operand is not placed in a block.
    pub fn phi_input_block(&self, phi: Inst, index: usize) -> Block {
        assert!(self.insts[phi].is_phi(), "{} is not a phi", phi);
        let value = self.insts[phi].operands()[index];
        self.insts[value]
            .block()
            .expect("phi operand is not placed in a block")
    }
}

impl Index<Block> for Graph {
    type Output = BlockData;

    fn index(&self, block: Block) -> &BlockData {
        &self.blocks[block]
    }
}

impl IndexMut<Block> for Graph {
    fn index_mut(&mut self, block: Block) -> &mut BlockData {
        &mut self.blocks[block]
    }
}

impl Index<Inst> for Graph {
    type Output = InstData;

    fn index(&self, inst: Inst) -> &InstData {
        &self.insts[inst]
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_graph(f, self)
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_graph(f, self)
    }
}

/// Iterator over the instructions of one block, in layout order.
pub struct Insts<'a> {
    graph: &'a Graph,
    next: Option<Inst>,
}

impl<'a> Iterator for Insts<'a> {
    type Item = Inst;

    fn next(&mut self) -> Option<Inst> {
        let inst = self.next?;
        self.next = self.graph[inst].next();
        Some(inst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{InstPayload, IrBuilder, Opcode, Type};

    #[test]
    fn empty() {
        let graph = Graph::new();
        assert_eq!(graph.entry_block(), None);
        assert_eq!(graph.num_blocks(), 0);
        assert_eq!(graph.num_insts(), 0);
    }

    #[test]
    fn dense_ids() {
        let mut graph = Graph::new();
        let b0 = graph.make_block();
        let b1 = graph.make_block();
        let b2 = graph.make_block();
        assert_eq!(
            graph.blocks().map(|b| b.to_string()).collect::<Vec<_>>(),
            ["BB_0", "BB_1", "BB_2"]
        );
        assert_eq!(graph.entry_block(), Some(b0));

        for block in [b0, b1, b2] {
            assert_eq!(graph.predecessors(block), []);
            assert_eq!(graph.successors(block), []);
            assert_eq!(graph.block_insts(block).count(), 0);
        }
    }

    #[test]
    fn branches_and_jumps() {
        let mut graph = Graph::new();
        let (bb0, bb1, bb2, cond);
        {
            let mut builder = IrBuilder::new(&mut graph);
            bb0 = builder.create_block();
            bb1 = builder.create_block();
            bb2 = builder.create_block();

            builder.switch_to_block(bb0);
            cond = builder.param(0);
            builder.ja(cond, bb2, bb1);

            builder.switch_to_block(bb1);
            builder.je(cond, bb1, bb2);

            builder.switch_to_block(bb2);
            builder.ret(Type::U32, cond);
        }

        assert_eq!(graph.predecessors(bb0), []);
        assert_eq!(graph.successors(bb0), [bb2, bb1]);
        assert_eq!(graph.predecessors(bb1), [bb0, bb1]);
        assert_eq!(graph.successors(bb1), [bb1, bb2]);
        assert_eq!(graph.predecessors(bb2), [bb0, bb1]);
        assert_eq!(graph.successors(bb2), []);

        // The condition value is used by both branches and the return.
        assert_eq!(graph[cond].users().len(), 3);
    }

    #[test]
    fn intrusive_layout() {
        let mut graph = Graph::new();
        let block = graph.make_block();
        let a = graph.make_inst(InstData::new(
            Opcode::Const,
            Type::I64,
            InstPayload::Const {
                value: 1,
                signed: true,
            },
        ));
        let b = graph.make_inst(InstData::new(Opcode::Add, Type::I64, InstPayload::None));
        graph.append_inst(block, a);
        graph.append_inst(block, b);

        assert_eq!(graph[block].first_inst(), Some(a));
        assert_eq!(graph[block].last_inst(), Some(b));
        assert_eq!(graph[a].prev(), None);
        assert_eq!(graph[a].next(), Some(b));
        assert_eq!(graph[b].prev(), Some(a));
        assert_eq!(graph[b].next(), None);
        assert_eq!(graph[a].block(), Some(block));
        assert_eq!(graph.block_insts(block).collect::<Vec<_>>(), [a, b]);
    }

    #[test]
    #[should_panic(expected = "after terminator")]
    fn append_after_terminator() {
        let mut graph = Graph::new();
        let (bb0, bb1, value);
        {
            let mut builder = IrBuilder::new(&mut graph);
            bb0 = builder.create_block();
            bb1 = builder.create_block();
            builder.switch_to_block(bb0);
            value = builder.param(0);
            builder.jump(bb1);
        }
        let stray = graph.make_inst(InstData::new(Opcode::Ret, Type::U32, InstPayload::None));
        let _ = value;
        graph.append_inst(bb0, stray);
    }

    #[test]
    fn operand_rewiring() {
        let mut graph = Graph::new();
        let block = graph.make_block();
        let mk = |graph: &mut Graph, value| {
            let inst = graph.make_inst(InstData::new(
                Opcode::Const,
                Type::I64,
                InstPayload::Const {
                    value,
                    signed: true,
                },
            ));
            graph.append_inst(block, inst);
            inst
        };
        let c1 = mk(&mut graph, 1);
        let c2 = mk(&mut graph, 2);
        let c3 = mk(&mut graph, 3);
        let sum = graph.make_inst(InstData::new(Opcode::Add, Type::I64, InstPayload::None));
        graph.append_inst(block, sum);
        graph.add_operand(sum, c1);
        graph.add_operand(sum, c2);

        assert_eq!(graph[sum].operands(), [c1, c2]);
        assert_eq!(graph[c1].users(), [sum]);
        assert_eq!(graph[c2].users(), [sum]);

        graph.set_operands(sum, &[c3, c3]);

        assert_eq!(graph[sum].operands(), [c3, c3]);
        assert_eq!(graph[c1].users(), []);
        assert_eq!(graph[c2].users(), []);
        // One user entry per operand edge.
        assert_eq!(graph[c3].users(), [sum, sum]);
    }
}
