//! One-at-a-time construction of a procedure.
//!
//! The builder appends instructions to a current block and keeps the graph
//! well-formed as it goes: operand/user edges are wired eagerly by every
//! constructor, and terminators wire the CFG edges they imply, so successor
//! and predecessor lists never have to be touched by hand. Phi operands are
//! the exception: loop-carried values do not exist yet when the phi is
//! created, so they are added later through [`Graph::add_operand`].

use super::entities::{Block, Inst};
use super::graph::Graph;
use super::instruction::{InstData, InstPayload, Opcode};
use super::types::Type;
use crate::packed_option::PackedOption;

/// Builder appending instructions to a [`Graph`], one block at a time.
pub struct IrBuilder<'a> {
    graph: &'a mut Graph,
    current: PackedOption<Block>,
}

impl<'a> IrBuilder<'a> {
    /// Create a builder appending to `graph`.
    pub fn new(graph: &'a mut Graph) -> Self {
        Self {
            graph,
            current: PackedOption::default(),
        }
    }

    /// Create a new block. The first block created is the graph's entry.
    pub fn create_block(&mut self) -> Block {
        self.graph.make_block()
    }

    /// Make `block` the insertion point for subsequent instructions.
    pub fn switch_to_block(&mut self, block: Block) {
        self.current = block.into();
    }

    /// The current insertion block, if one has been selected.
    pub fn current_block(&self) -> Option<Block> {
        self.current.expand()
    }

    /// Insert a finished record at the end of the current block, wiring the
    /// CFG edges its payload implies.
    fn insert(&mut self, data: InstData) -> Inst {
        let block = self
            .current
            .expand()
            .expect("no insertion block selected");
        let payload = data.payload();
        let inst = self.graph.make_inst(data);
        self.graph.append_inst(block, inst);
        match payload {
            InstPayload::Jump { destination } => {
                self.graph.add_edge(block, destination);
            }
            InstPayload::Branch {
                then_dest,
                else_dest,
            } => {
                self.graph.add_edge(block, then_dest);
                self.graph.add_edge(block, else_dest);
            }
            _ => {}
        }
        inst
    }

    fn binary(&mut self, opcode: Opcode, ty: Type, lhs: Inst, rhs: Inst) -> Inst {
        let inst = self.insert(InstData::new(opcode, ty, InstPayload::None));
        self.graph.add_operand(inst, lhs);
        self.graph.add_operand(inst, rhs);
        inst
    }

    /// Incoming procedure argument number `index`.
    pub fn param(&mut self, index: u32) -> Inst {
        self.insert(InstData::new(
            Opcode::Param,
            Type::U32,
            InstPayload::Param { index },
        ))
    }

    /// Signed integer constant of type `ty`.
    pub fn iconst(&mut self, ty: Type, value: i64) -> Inst {
        self.insert(InstData::new(
            Opcode::Const,
            ty,
            InstPayload::Const {
                value: value as u64,
                signed: true,
            },
        ))
    }

    /// Unsigned integer constant of type `ty`.
    pub fn uconst(&mut self, ty: Type, value: u64) -> Inst {
        self.insert(InstData::new(
            Opcode::Const,
            ty,
            InstPayload::Const {
                value,
                signed: false,
            },
        ))
    }

    /// Phi with no operands yet; add one operand per predecessor of the
    /// owning block, in predecessor order, via [`Graph::add_operand`].
    pub fn phi(&mut self, ty: Type) -> Inst {
        self.insert(InstData::new(Opcode::Phi, ty, InstPayload::None))
    }

    /// Integer addition.
    pub fn add(&mut self, ty: Type, lhs: Inst, rhs: Inst) -> Inst {
        self.binary(Opcode::Add, ty, lhs, rhs)
    }

    /// Integer subtraction.
    pub fn sub(&mut self, ty: Type, lhs: Inst, rhs: Inst) -> Inst {
        self.binary(Opcode::Sub, ty, lhs, rhs)
    }

    /// Integer multiplication.
    pub fn mul(&mut self, ty: Type, lhs: Inst, rhs: Inst) -> Inst {
        self.binary(Opcode::Mul, ty, lhs, rhs)
    }

    /// Integer division.
    pub fn div(&mut self, ty: Type, lhs: Inst, rhs: Inst) -> Inst {
        self.binary(Opcode::Div, ty, lhs, rhs)
    }

    /// Bitwise and.
    pub fn band(&mut self, ty: Type, lhs: Inst, rhs: Inst) -> Inst {
        self.binary(Opcode::And, ty, lhs, rhs)
    }

    /// Comparison of `lhs` and `rhs`; produces a `u8` flag value consumed by
    /// conditional branches.
    pub fn cmp(&mut self, lhs: Inst, rhs: Inst) -> Inst {
        self.binary(Opcode::Cmp, Type::U8, lhs, rhs)
    }

    /// Unconditional jump to `destination`. Terminates the current block.
    pub fn jump(&mut self, destination: Block) -> Inst {
        self.insert(InstData::new(
            Opcode::Jmp,
            Type::Void,
            InstPayload::Jump { destination },
        ))
    }

    fn branch(&mut self, opcode: Opcode, cond: Inst, then_dest: Block, else_dest: Block) -> Inst {
        let inst = self.insert(InstData::new(
            opcode,
            Type::Void,
            InstPayload::Branch {
                then_dest,
                else_dest,
            },
        ));
        self.graph.add_operand(inst, cond);
        inst
    }

    /// Branch to `then_dest` on "above", `else_dest` otherwise.
    pub fn ja(&mut self, cond: Inst, then_dest: Block, else_dest: Block) -> Inst {
        self.branch(Opcode::Ja, cond, then_dest, else_dest)
    }

    /// Branch to `then_dest` on "above or equal", `else_dest` otherwise.
    pub fn jae(&mut self, cond: Inst, then_dest: Block, else_dest: Block) -> Inst {
        self.branch(Opcode::Jae, cond, then_dest, else_dest)
    }

    /// Branch to `then_dest` on "equal", `else_dest` otherwise.
    pub fn je(&mut self, cond: Inst, then_dest: Block, else_dest: Block) -> Inst {
        self.branch(Opcode::Je, cond, then_dest, else_dest)
    }

    /// Return `value` from the procedure.
    pub fn ret(&mut self, ty: Type, value: Inst) -> Inst {
        let inst = self.insert(InstData::new(Opcode::Ret, ty, InstPayload::None));
        self.graph.add_operand(inst, value);
        inst
    }
}
