use std::{
    cmp::Reverse,
    collections::{BinaryHeap, VecDeque},
    fmt::Write,
};

use itertools::Itertools;

use crate::{config::MergePolicy, frequency::FrequencyTable, prefix_code_table::Codebook};

/// Index of a node inside a [`PrefixTree`].
pub type NodeId = usize;

/// Code given to the only leaf of a tree built from a single distinct symbol.
pub const SINGLE_SYMBOL_CODE: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf(u8),
    /// `primary` is the heavier child and sits on the `1` branch,
    /// `secondary` the lighter one on the `0` branch.
    Internal { primary: NodeId, secondary: NodeId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    label: Vec<u8>,
    weight: usize,
    kind: NodeKind,
    code: String,
}

impl TreeNode {
    fn leaf(symbol: u8, count: usize) -> Self {
        TreeNode {
            label: vec![symbol],
            weight: count,
            kind: NodeKind::Leaf(symbol),
            code: String::new(),
        }
    }

    /// Every symbol beneath this node, primary side first.
    pub fn label(&self) -> &[u8] {
        &self.label
    }

    pub fn weight(&self) -> usize {
        self.weight
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Empty for internal nodes.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }
}

/// Binary prefix tree stored as an arena. Parents own their children by index.
#[derive(Debug, Clone, Default)]
pub struct PrefixTree {
    nodes: Vec<TreeNode>,
    root: Option<NodeId>,
}

impl PrefixTree {
    pub fn new(table: &FrequencyTable, policy: MergePolicy) -> Self {
        let mut tree = PrefixTree {
            nodes: Vec::with_capacity(table.len() * 2),
            root: None,
        };
        let leaves = table
            .iter()
            .map(|(symbol, count)| tree.push(TreeNode::leaf(symbol, count)))
            .collect_vec();

        tree.root = match policy {
            MergePolicy::Legacy => tree.merge(Positional::from(leaves)),
            MergePolicy::MinRedundancy => {
                let weighted = leaves.into_iter().map(|id| (id, tree.nodes[id].weight));
                let lightest = Lightest::new(weighted);
                tree.merge(lightest)
            }
        };
        tree.assign_codes();
        tree
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.map(|id| &self.nodes[id])
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().filter(|node| node.is_leaf())
    }

    pub fn codebook(&self) -> Codebook {
        self.leaves()
            .filter_map(|node| match node.kind {
                NodeKind::Leaf(symbol) if !node.code.is_empty() => Some((symbol, node.code.clone())),
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, node: TreeNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn merge(&mut self, mut working_set: impl WorkingSet) -> Option<NodeId> {
        loop {
            match working_set.pop_pair()? {
                PopResult::TreesToMerge { first, second } => {
                    let parent = self.join(first, second);
                    working_set.insert(parent, self.nodes[parent].weight);
                }
                PopResult::Single(root) => return Some(root),
            }
        }
    }

    /// Ties go to `first`, which then becomes the primary child.
    fn join(&mut self, first: NodeId, second: NodeId) -> NodeId {
        let (primary, secondary) = if self.nodes[first].weight >= self.nodes[second].weight {
            (first, second)
        } else {
            (second, first)
        };
        let label = self.nodes[primary]
            .label
            .iter()
            .chain(self.nodes[secondary].label.iter())
            .copied()
            .collect_vec();
        let weight = self.nodes[primary].weight + self.nodes[secondary].weight;

        self.push(TreeNode {
            label,
            weight,
            kind: NodeKind::Internal { primary, secondary },
            code: String::new(),
        })
    }

    fn assign_codes(&mut self) {
        let Some(root) = self.root else {
            return;
        };

        if self.nodes[root].is_leaf() {
            self.nodes[root].code = SINGLE_SYMBOL_CODE.to_owned();
            return;
        }

        let mut pending = vec![(root, String::new())];
        while let Some((id, path)) = pending.pop() {
            match self.nodes[id].kind {
                NodeKind::Leaf(_) => self.nodes[id].code = path,
                NodeKind::Internal { primary, secondary } => {
                    pending.push((primary, format!("{path}1")));
                    pending.push((secondary, format!("{path}0")));
                }
            }
        }
    }

    /// Indented dump of the tree, secondary (`0`) branches first.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let Some(root) = self.root else {
            return out;
        };

        let mut pending = vec![(root, 0_usize, "root")];
        while let Some((id, depth, branch)) = pending.pop() {
            let node = &self.nodes[id];
            let indent = "  ".repeat(depth);
            let label = String::from_utf8_lossy(&node.label).escape_debug().to_string();
            match node.kind {
                NodeKind::Leaf(symbol) => {
                    let _ = writeln!(
                        out,
                        "{indent}{branch} leaf {symbol:#04x} \"{label}\" weight={} code={}",
                        node.weight, node.code
                    );
                }
                NodeKind::Internal { primary, secondary } => {
                    let _ = writeln!(out, "{indent}{branch} internal \"{label}\" weight={}", node.weight);
                    pending.push((primary, depth + 1, "1"));
                    pending.push((secondary, depth + 1, "0"));
                }
            }
        }
        out
    }
}

enum PopResult {
    TreesToMerge { first: NodeId, second: NodeId },
    Single(NodeId),
}

trait WorkingSet {
    fn pop_pair(&mut self) -> Option<PopResult>;
    fn insert(&mut self, id: NodeId, weight: usize);
}

/// Merges whatever sits at the front, regardless of weight.
struct Positional(VecDeque<NodeId>);

impl From<Vec<NodeId>> for Positional {
    fn from(leaves: Vec<NodeId>) -> Self {
        Positional(leaves.into())
    }
}

impl WorkingSet for Positional {
    fn pop_pair(&mut self) -> Option<PopResult> {
        let first = self.0.pop_front()?;
        let item_result = match self.0.pop_front() {
            Some(second) => PopResult::TreesToMerge { first, second },
            None => PopResult::Single(first),
        };
        Some(item_result)
    }

    fn insert(&mut self, id: NodeId, _weight: usize) {
        self.0.push_back(id);
    }
}

/// Min-heap on weight; equal weights pop in insertion order.
struct Lightest {
    heap: BinaryHeap<Reverse<(usize, usize, NodeId)>>,
    sequence: usize,
}

impl Lightest {
    fn new(nodes: impl IntoIterator<Item = (NodeId, usize)>) -> Self {
        let mut lightest = Lightest {
            heap: BinaryHeap::new(),
            sequence: 0,
        };
        for (id, weight) in nodes {
            lightest.insert(id, weight);
        }
        lightest
    }
}

impl WorkingSet for Lightest {
    fn pop_pair(&mut self) -> Option<PopResult> {
        let Reverse((_, _, first)) = self.heap.pop()?;
        let item_result = match self.heap.pop() {
            Some(Reverse((_, _, second))) => PopResult::TreesToMerge { first, second },
            None => PopResult::Single(first),
        };
        Some(item_result)
    }

    fn insert(&mut self, id: NodeId, weight: usize) {
        self.heap.push(Reverse((weight, self.sequence, id)));
        self.sequence += 1;
    }
}
