//! Property tests over generated control-flow graphs.
//!
//! The scenarios with known answers live next to the analyses; these tests
//! instead check the universal invariants that must hold for *any*
//! well-formed CFG: dominance is a reflexive partial order rooted at the
//! entry, the immediate-dominator relation forms a tree over the reachable
//! blocks, loop bodies contain their headers and tails, and recomputation
//! changes nothing.

use graphir::dominator_tree::DominatorTree;
use graphir::ir::{Block, Graph};
use graphir::loop_analysis::LoopAnalysis;
use graphir::traversal;
use proptest::prelude::*;

const MAX_BLOCKS: usize = 10;

/// Build a graph with `num_blocks` blocks and the in-range, deduplicated
/// subset of `raw_edges`.
fn build_graph(num_blocks: usize, raw_edges: &[(usize, usize)]) -> Graph {
    let mut graph = Graph::new();
    let blocks: Vec<Block> = (0..num_blocks).map(|_| graph.make_block()).collect();
    let mut seen = Vec::new();
    for &(from, to) in raw_edges {
        if from < num_blocks && to < num_blocks && !seen.contains(&(from, to)) {
            seen.push((from, to));
            graph.add_edge(blocks[from], blocks[to]);
        }
    }
    graph
}

fn arb_cfg() -> impl Strategy<Value = Graph> {
    (
        1..MAX_BLOCKS,
        prop::collection::vec((0..MAX_BLOCKS, 0..MAX_BLOCKS), 0..40),
    )
        .prop_map(|(num_blocks, raw_edges)| build_graph(num_blocks, &raw_edges))
}

proptest! {
    #[test]
    fn edge_lists_are_symmetric(graph in arb_cfg()) {
        for block in graph.blocks() {
            for &succ in graph.successors(block) {
                prop_assert!(graph.predecessors(succ).contains(&block));
            }
            for &pred in graph.predecessors(block) {
                prop_assert!(graph.successors(pred).contains(&block));
            }
        }
    }

    #[test]
    fn dominance_is_a_rooted_partial_order(graph in arb_cfg()) {
        let tree = DominatorTree::with_graph(&graph);
        let entry = graph.entry_block().unwrap();
        let reachable = traversal::preorder(&graph);

        // Reflexivity, everywhere.
        for block in graph.blocks() {
            prop_assert!(tree.dominates(block, block));
        }

        // The entry dominates every reachable block.
        for &block in &reachable {
            prop_assert!(tree.dominates(entry, block));
        }

        // Transitivity.
        for a in graph.blocks() {
            for b in graph.blocks() {
                for c in graph.blocks() {
                    if tree.dominates(a, b) && tree.dominates(b, c) {
                        prop_assert!(tree.dominates(a, c));
                    }
                }
            }
        }

        // Antisymmetry.
        for a in graph.blocks() {
            for b in graph.blocks() {
                if a != b && tree.dominates(a, b) {
                    prop_assert!(!tree.dominates(b, a));
                }
            }
        }
    }

    #[test]
    fn immediate_children_form_a_tree(graph in arb_cfg()) {
        let tree = DominatorTree::with_graph(&graph);
        let entry = graph.entry_block().unwrap();
        let reachable = traversal::preorder(&graph);

        // Every reachable block except the entry has exactly one parent in
        // the children lists; the entry and unreachable blocks have none.
        for block in graph.blocks() {
            let parents: Vec<Block> = graph
                .blocks()
                .filter(|&p| tree.immediate_children(p).contains(&block))
                .collect();
            if block != entry && reachable.contains(&block) {
                prop_assert_eq!(parents.len(), 1, "parents of {}: {:?}", block, parents);
                prop_assert!(tree.dominates(parents[0], block));
            } else {
                prop_assert_eq!(parents.len(), 0, "parents of {}: {:?}", block, parents);
            }
        }
    }

    #[test]
    fn recomputing_the_dominator_tree_is_idempotent(graph in arb_cfg()) {
        let mut tree = DominatorTree::with_graph(&graph);
        let before: Vec<Vec<Block>> = graph
            .blocks()
            .map(|b| tree.immediate_children(b).to_vec())
            .collect();
        tree.compute(&graph);
        let after: Vec<Vec<Block>> = graph
            .blocks()
            .map(|b| tree.immediate_children(b).to_vec())
            .collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn loops_contain_their_headers_and_tails(graph in arb_cfg()) {
        let analysis = LoopAnalysis::with_graph(&graph);
        for lp in analysis.loops() {
            prop_assert!(analysis.contains(lp, analysis.header(lp)));
            for &tail in analysis.back_edges(lp) {
                prop_assert!(analysis.contains(lp, tail));
            }
            prop_assert!(!analysis.back_edges(lp).is_empty());
        }
    }

    #[test]
    fn reducible_loop_headers_dominate_their_bodies(graph in arb_cfg()) {
        let tree = DominatorTree::with_graph(&graph);
        let mut analysis = LoopAnalysis::new();
        analysis.compute(&graph, &tree);
        for lp in analysis.loops() {
            if analysis.is_reducible(lp) {
                let header = analysis.header(lp);
                for block in analysis.blocks(lp) {
                    prop_assert!(
                        tree.dominates(header, block),
                        "{} does not dominate {}",
                        header,
                        block
                    );
                }
            }
        }
    }

    #[test]
    fn loop_nesting_is_consistent(graph in arb_cfg()) {
        let analysis = LoopAnalysis::with_graph(&graph);
        for lp in analysis.loops() {
            if let Some(parent) = analysis.parent(lp) {
                prop_assert!(analysis.sub_loops(parent).contains(&lp));
                prop_assert!(analysis.contains(parent, analysis.header(lp)));
            }
            for &sub in analysis.sub_loops(lp) {
                prop_assert_eq!(analysis.parent(sub), Some(lp));
            }
        }
    }

    #[test]
    fn a_cfg_without_back_edges_has_no_loops(graph in arb_cfg()) {
        if traversal::back_edges(&graph).is_empty() {
            let analysis = LoopAnalysis::with_graph(&graph);
            prop_assert_eq!(analysis.num_loops(), 0);
        }
    }
}
