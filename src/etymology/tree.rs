use crate::core::types::{EntryId, LexiconEntry, RelationKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySummary {
    pub id: EntryId,
    pub headword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
}

impl From<LexiconEntry> for EntrySummary {
    fn from(entry: LexiconEntry) -> Self {
        Self { id: entry.id, headword: entry.headword, pronunciation: entry.pronunciation }
    }
}

/// An entry with its ancestors expanded recursively.
///
/// `relation_kind` and `position` describe the edge leading from the child
/// to this node; both are `None` at the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AncestryTree {
    pub entry: EntrySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_kind: Option<RelationKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    pub ancestors: Vec<AncestryTree>,
    /// Set when this node has ancestors that the depth limit cut off.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
    /// Set when this entry is expanded elsewhere in the same tree.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub shared: bool,
}

impl AncestryTree {
    pub fn leaf(
        entry: EntrySummary,
        relation_kind: Option<RelationKind>,
        position: Option<u32>,
    ) -> Self {
        Self {
            entry,
            relation_kind,
            position,
            ancestors: Vec::new(),
            truncated: false,
            shared: false,
        }
    }

    /// Depth of the deepest node; a lone root has depth 0.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.ancestors.iter().map(|a| (a, depth + 1)));
        }
        deepest
    }

    /// Ids of every node in the tree, root first, depth-first.
    pub fn ids(&self) -> Vec<EntryId> {
        let mut ids = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            ids.push(node.entry.id);
            stack.extend(node.ancestors.iter().rev());
        }
        ids
    }
}
