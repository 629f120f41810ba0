//! The parse failure history tree and diagnostic selection.
//!
//! Every alternative the parser tries and abandons is recorded here. Nodes
//! are arena-allocated and linked by parent indices, so sibling alternatives
//! and nested causes all stay reachable after the parse fails.

use std::fmt;

use cranelift_entity::{PrimaryMap, entity_impl};

use crate::error::ParseError;

/// Reference to a recorded failure.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HistoryId(u32);
entity_impl!(HistoryId, "attempt");

/// One abandoned parse attempt.
#[derive(Clone)]
pub struct HistoryNode {
    pub error: ParseError,
    /// The enclosing failed attempt, once one exists.
    pub parent: Option<HistoryId>,
    /// The grammar production that was being tried.
    pub production: &'static str,
    /// Byte offset where the attempt failed.
    pub pos: usize,
}

/// All failures recorded during one parse, in attempt order.
#[derive(Default)]
pub struct History {
    nodes: PrimaryMap<HistoryId, HistoryNode>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, error: ParseError, production: &'static str) -> HistoryId {
        let pos = error.span.start;
        self.nodes.push(HistoryNode {
            error,
            parent: None,
            production,
            pos,
        })
    }

    pub fn set_parent(&mut self, child: HistoryId, parent: HistoryId) {
        self.nodes[child].parent = Some(parent);
    }

    pub fn get(&self, id: HistoryId) -> &HistoryNode {
        &self.nodes[id]
    }

    /// Every recorded failure, in the order the attempts were made.
    pub fn iterate(&self) -> impl Iterator<Item = &HistoryNode> {
        self.nodes.values()
    }

    /// The failure selected as the parse's diagnostic: deepest byte offset,
    /// ties broken by earliest attempt.
    pub fn deepest(&self) -> Option<&HistoryNode> {
        let mut best: Option<&HistoryNode> = None;
        for node in self.nodes.values() {
            match best {
                Some(b) if node.pos <= b.pos => {}
                _ => best = Some(node),
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for (id, node) in self.nodes.iter() {
            list.entry(&format_args!(
                "{id} {} at {}: {}",
                node.production, node.pos, node.error.message
            ));
        }
        list.finish()
    }
}
