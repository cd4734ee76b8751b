//! IR entity references.
//!
//! Both entity types are `u32` newtypes with a dense index space per
//! [`Graph`](super::Graph). The `Display` implementations match the textual
//! dump format: blocks render as `BB_7`, instructions as `v12` (an
//! instruction *is* the SSA value it defines, so instruction references
//! double as value references).

use crate::entity::entity_impl;

/// An opaque reference to a basic block in a procedure.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Block(u32);
entity_impl!(Block, "BB_");

/// An opaque reference to an instruction, which is also the SSA value the
/// instruction defines.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Inst(u32);
entity_impl!(Inst, "v");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;

    #[test]
    fn display() {
        assert_eq!(Block::new(0).to_string(), "BB_0");
        assert_eq!(Block::new(17).to_string(), "BB_17");
        assert_eq!(Inst::new(3).to_string(), "v3");
    }
}
