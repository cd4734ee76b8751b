//! Representation of a single procedure as a control-flow graph of basic
//! blocks containing SSA-form instructions.

mod block;
mod builder;
mod entities;
mod graph;
mod instruction;
mod types;

pub use self::block::BlockData;
pub use self::builder::IrBuilder;
pub use self::entities::{Block, Inst};
pub use self::graph::{Graph, Insts};
pub use self::instruction::{InstData, InstPayload, Opcode};
pub use self::types::Type;
