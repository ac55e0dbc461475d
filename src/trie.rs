// src/trie.rs
//! Prefix trie over symbol sequences, stored as an arena of nodes.
//! All walks use explicit stacks, so string length does not bound recursion.

use std::collections::HashMap;

use crate::alphabet::Symbol;
use crate::format::Mode;

pub type NodeId = usize;

pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, Default)]
struct Node {
    /// Insertion-ordered child links.
    children: Vec<(Symbol, NodeId)>,
}

#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<Node>,
    /// (parent, symbol) -> child, so lookups do not scan wide sibling lists.
    edges: HashMap<(NodeId, Symbol), NodeId>,
    mode:  Mode,
}

impl Trie {
    pub fn new(mode: Mode) -> Self {
        Trie {
            nodes: vec![Node::default()],
            edges: HashMap::new(),
            mode,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Walks or creates the path for `letters`. In variable-length mode the
    /// final node also receives an end-of-string child.
    pub fn insert(&mut self, letters: &[u32]) {
        let mut node = ROOT;
        for &letter in letters {
            node = self.child_or_insert(node, Symbol::Letter(letter));
        }
        if self.mode == Mode::Variable {
            self.child_or_insert(node, Symbol::EndOfString);
        }
    }

    fn child_or_insert(&mut self, node: NodeId, symbol: Symbol) -> NodeId {
        if let Some(child) = self.child(node, symbol) {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(Node::default());
        self.nodes[node].children.push((symbol, child));
        self.edges.insert((node, symbol), child);
        child
    }

    pub fn child(&self, node: NodeId, symbol: Symbol) -> Option<NodeId> {
        self.edges.get(&(node, symbol)).copied()
    }

    /// Letter children of `node`, in sibling order.
    pub fn letters(&self, node: NodeId) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        self.nodes[node]
            .children
            .iter()
            .filter_map(|&(s, id)| s.letter().map(|l| (l, id)))
    }

    /// Number of letter children. The end-of-string marker is not counted.
    pub fn fanout(&self, node: NodeId) -> usize {
        self.letters(node).count()
    }

    /// Whether the path to `node` is itself a complete string.
    pub fn terminates(&self, node: NodeId) -> bool {
        self.child(node, Symbol::EndOfString).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].children.is_empty()
    }

    /// Length of the longest stored string.
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(ROOT, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.letters(node).map(|(_, id)| (id, depth + 1)));
        }
        deepest
    }

    /// Sorts every node's children by symbol (letters by index, end marker last).
    pub fn sort_children(&mut self) {
        for node in &mut self.nodes {
            node.children.sort_by_key(|&(s, _)| s);
        }
    }

    /// Every symbol found at `depth` across all branches, left to right.
    pub fn leaves_at_depth(&self, depth: usize) -> Vec<Symbol> {
        let mut level = vec![ROOT];
        for _ in 0..depth {
            level = level
                .iter()
                .flat_map(|&n| self.letters(n).map(|(_, id)| id))
                .collect();
        }
        level
            .iter()
            .flat_map(|&n| self.nodes[n].children.iter().map(|&(s, _)| s))
            .collect()
    }

    /// Every level's symbols in one breadth-first pass: entry `d` equals
    /// [`leaves_at_depth(d)`](Self::leaves_at_depth). Trailing empty levels
    /// are omitted.
    pub fn levels(&self) -> Vec<Vec<Symbol>> {
        let mut levels = Vec::new();
        let mut frontier = vec![ROOT];
        while !frontier.is_empty() {
            let mut symbols = Vec::new();
            let mut next = Vec::new();
            for &n in &frontier {
                for &(s, id) in &self.nodes[n].children {
                    symbols.push(s);
                    if s.letter().is_some() {
                        next.push(id);
                    }
                }
            }
            if symbols.is_empty() {
                break;
            }
            levels.push(symbols);
            frontier = next;
        }
        levels
    }

    /// Fan-out of the root and of every letter node, in pre-order.
    pub fn fanout_counts(&self) -> Vec<u32> {
        let mut counts = vec![self.fanout(ROOT) as u32];
        counts.extend(self.preorder().map(|visit| self.fanout(visit.node) as u32));
        counts
    }

    /// Depth-first, pre-order walk over letter nodes, siblings in order.
    pub fn preorder(&self) -> Preorder<'_> {
        let mut stack: Vec<Visit> = self
            .letters(ROOT)
            .map(|(letter, node)| Visit { depth: 0, letter, node })
            .collect();
        stack.reverse();
        Preorder { trie: self, stack }
    }
}

/// One node reached by [`Trie::preorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Zero for children of the root.
    pub depth:  usize,
    pub letter: u32,
    pub node:   NodeId,
}

pub struct Preorder<'a> {
    trie:  &'a Trie,
    stack: Vec<Visit>,
}

impl Iterator for Preorder<'_> {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        let visit = self.stack.pop()?;
        let mark = self.stack.len();
        self.stack.extend(self.trie.letters(visit.node).map(|(letter, node)| Visit {
            depth: visit.depth + 1,
            letter,
            node,
        }));
        self.stack[mark..].reverse();
        Some(visit)
    }
}
