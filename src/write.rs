//! Converting a graph into its stable line-oriented text form.
//!
//! The format is consumed by tests and humans:
//!
//! ```text
//! BB_<id>:
//! <instr_id>. <result_type> <opcode> <operands>
//! ```
//!
//! Type and opcode tokens are the lowercase enumeration names; operand
//! rendering depends on the instruction kind. `Display` on
//! [`Graph`](crate::ir::Graph) goes through [`write_graph`].

use crate::entity::EntityRef;
use crate::ir::{Block, Graph, Inst, InstPayload, Opcode};
use core::fmt::{self, Write};

/// Write all blocks of `graph`, in creation order.
pub fn write_graph(w: &mut dyn Write, graph: &Graph) -> fmt::Result {
    for block in graph.blocks() {
        write_block(w, graph, block)?;
    }
    Ok(())
}

/// Write the label of `block` and its instructions, one per line.
pub fn write_block(w: &mut dyn Write, graph: &Graph, block: Block) -> fmt::Result {
    writeln!(w, "{}:", block)?;
    for inst in graph.block_insts(block) {
        write_inst(w, graph, inst)?;
        writeln!(w)?;
    }
    Ok(())
}

/// Write one instruction line, without the trailing newline.
pub fn write_inst(w: &mut dyn Write, graph: &Graph, inst: Inst) -> fmt::Result {
    let data = &graph[inst];
    write!(
        w,
        "{}. {} {} ",
        inst.index(),
        data.result_type(),
        data.opcode()
    )?;

    match data.payload() {
        InstPayload::Param { index } => write!(w, "{}", index),
        InstPayload::Const { value, signed } => {
            if signed {
                write!(w, "{}", value as i64)
            } else {
                write!(w, "{}", value)
            }
        }
        InstPayload::Jump { destination } => write!(w, "{}", destination),
        InstPayload::Branch {
            then_dest,
            else_dest,
        } => {
            // Condition value first, then the two targets.
            for &operand in data.operands() {
                write!(w, "{}, ", operand)?;
            }
            write!(w, "{}, {}", then_dest, else_dest)
        }
        InstPayload::None if data.opcode() == Opcode::Phi => {
            // Render each operand with the block it flows in from.
            for (i, &operand) in data.operands().iter().enumerate() {
                if i > 0 {
                    write!(w, ", ")?;
                }
                write!(w, "{}:{}", operand, graph.phi_input_block(inst, i))?;
            }
            Ok(())
        }
        InstPayload::None => {
            // Arithmetic, comparison and return: the plain operand list.
            for (i, &operand) in data.operands().iter().enumerate() {
                if i > 0 {
                    write!(w, ", ")?;
                }
                write!(w, "{}", operand)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::{Graph, IrBuilder, Type};

    /// The factorial-style example: a counted loop with two phis.
    #[test]
    fn dump_counted_loop() {
        let mut graph = Graph::new();
        let mut builder = IrBuilder::new(&mut graph);

        let entry = builder.create_block();
        let head = builder.create_block();
        let body = builder.create_block();
        let exit = builder.create_block();

        builder.switch_to_block(entry);
        let n = builder.param(0);
        let one = builder.iconst(Type::I64, 1);
        let two = builder.iconst(Type::I64, 2);
        builder.jump(head);

        builder.switch_to_block(head);
        let acc = builder.phi(Type::U64);
        let i = builder.phi(Type::U32);
        let flag = builder.cmp(i, n);
        builder.ja(flag, exit, body);

        builder.switch_to_block(body);
        let next_acc = builder.mul(Type::U64, acc, i);
        let next_i = builder.add(Type::U32, i, one);
        builder.jump(head);

        builder.switch_to_block(exit);
        builder.ret(Type::U64, acc);
        drop(builder);

        graph.add_operand(acc, one);
        graph.add_operand(acc, next_acc);
        graph.add_operand(i, two);
        graph.add_operand(i, next_i);

        assert_eq!(
            graph.to_string(),
            "BB_0:\n\
             0. u32 param 0\n\
             1. i64 const 1\n\
             2. i64 const 2\n\
             3. void jmp BB_1\n\
             BB_1:\n\
             4. u64 phi v1:BB_0, v8:BB_2\n\
             5. u32 phi v2:BB_0, v9:BB_2\n\
             6. u8 cmp v5, v0\n\
             7. void ja v6, BB_3, BB_2\n\
             BB_2:\n\
             8. u64 mul v4, v5\n\
             9. u32 add v5, v1\n\
             10. void jmp BB_1\n\
             BB_3:\n\
             11. u64 ret v4\n"
        );
    }

    #[test]
    fn dump_unsigned_constant() {
        let mut graph = Graph::new();
        let mut builder = IrBuilder::new(&mut graph);
        let entry = builder.create_block();
        builder.switch_to_block(entry);
        builder.uconst(Type::U64, u64::MAX);
        builder.iconst(Type::I64, -1);
        drop(builder);

        assert_eq!(
            graph.to_string(),
            "BB_0:\n\
             0. u64 const 18446744073709551615\n\
             1. i64 const -1\n"
        );
    }
}
