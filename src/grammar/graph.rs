//! Production graphs and the compiled [`Grammar`].
//!
//! All symbol nodes of a grammar live in one arena (`Vec<SymbolData>`), and
//! adjacency is stored as index lists. Repetition creates cycles, which the
//! arena representation handles without ownership cycles.

use compact_str::CompactString;
use hashbrown::HashMap;
use smallvec::SmallVec;

/// Index of a symbol node in the grammar's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("node arena exceeds u32 indices"))
    }

    /// Position of this node in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a grammar rule.
///
/// Ids are assigned in declaration order and never reused or reordered after
/// compilation, so they double as a deterministic priority: when two rules
/// match a stack suffix of the same length, the lower id wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleId(u32);

impl RuleId {
    pub(crate) fn new(index: usize) -> Self {
        Self(u32::try_from(index).expect("rule table exceeds u32 indices"))
    }

    /// Position of this rule in the grammar (its declaration order).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a symbol node matches: one terminal character, or a reference to an
/// earlier rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// A terminal character, matched verbatim. Literal string terminals
    /// compile to a linear chain of these, one per character.
    Char(char),
    /// A reference to another rule; matched by a completed subtree of that
    /// rule.
    Rule(RuleId),
}

/// Arena slot for one symbol node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SymbolData {
    pub(crate) sym: Symbol,
    /// Predecessor nodes within the owning production.
    pub(crate) left: SmallVec<[NodeId; 2]>,
    /// Successor nodes within the owning production.
    pub(crate) right: SmallVec<[NodeId; 2]>,
    /// Whether this node is in its production's entry set.
    pub(crate) is_entry: bool,
    /// Whether this node is in its production's exit set.
    pub(crate) is_exit: bool,
}

impl SymbolData {
    pub(crate) fn new(sym: Symbol) -> Self {
        Self {
            sym,
            left: SmallVec::new(),
            right: SmallVec::new(),
            is_entry: false,
            is_exit: false,
        }
    }
}

/// One compiled rule: the entry and exit node sets of its production graph.
#[derive(Debug, Clone)]
pub struct Production {
    pub(crate) id: RuleId,
    pub(crate) name: lasso::Spur,
    pub(crate) entry: SmallVec<[NodeId; 4]>,
    pub(crate) exit: SmallVec<[NodeId; 4]>,
}

impl Production {
    /// This rule's id (equal to its declaration order).
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// Nodes a match of this rule may start at.
    #[must_use]
    pub fn entry(&self) -> &[NodeId] {
        &self.entry
    }

    /// Nodes a match of this rule may end at.
    #[must_use]
    pub fn exit(&self) -> &[NodeId] {
        &self.exit
    }
}

/// A compiled grammar: ordered productions plus a name lookup.
///
/// Built once by [`compile`](crate::grammar::compile), immutable afterward,
/// and safely shared by reference across any number of concurrent parses.
pub struct Grammar {
    pub(crate) nodes: Vec<SymbolData>,
    pub(crate) rules: Vec<Production>,
    pub(crate) by_name: HashMap<CompactString, RuleId, ahash::RandomState>,
    pub(crate) names: lasso::RodeoReader,
}

impl Grammar {
    /// Number of rules in this grammar.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the grammar has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All productions, in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &Production> {
        self.rules.iter()
    }

    /// The production for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this grammar.
    #[must_use]
    pub fn rule(&self, id: RuleId) -> &Production {
        &self.rules[id.index()]
    }

    /// Look up a rule id by name.
    #[must_use]
    pub fn rule_named(&self, name: &str) -> Option<RuleId> {
        self.by_name.get(name).copied()
    }

    /// The name a rule was declared with.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this grammar.
    #[must_use]
    pub fn rule_name(&self, id: RuleId) -> &str {
        self.names.resolve(&self.rules[id.index()].name)
    }

    /// Total number of symbol nodes across all productions.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, id: NodeId) -> &SymbolData {
        &self.nodes[id.index()]
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for rule in &self.rules {
            map.entry(&self.rule_name(rule.id), rule);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_indices() {
        assert_eq!(NodeId::new(7).index(), 7);
        assert_eq!(RuleId::new(0).index(), 0);
        assert!(RuleId::new(1) > RuleId::new(0));
    }

    #[test]
    fn symbols_compare_structurally() {
        assert_eq!(Symbol::Char('a'), Symbol::Char('a'));
        assert_ne!(Symbol::Char('a'), Symbol::Rule(RuleId::new(0)));
    }
}
