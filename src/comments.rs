use std::collections::HashSet;

use crate::models::CommentNode;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentTree {
    roots: Vec<CommentNode>,
}

#[derive(Debug, Clone, Copy)]
pub struct CommentRow<'a> {
    pub node: &'a CommentNode,
    pub depth: usize,
    pub descendant_count: usize,
}

impl CommentTree {
    pub fn new(roots: Vec<CommentNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[CommentNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn total(&self) -> usize {
        self.rows().len()
    }

    pub fn find(&self, id: &str) -> Option<&CommentNode> {
        self.rows()
            .into_iter()
            .find(|row| row.node.id == id)
            .map(|row| row.node)
    }

    /// Depth-first rows in reply order. Walks with an explicit stack so very
    /// deep threads do not grow the call stack.
    pub fn rows(&self) -> Vec<CommentRow<'_>> {
        let mut rows: Vec<CommentRow<'_>> = Vec::new();
        let mut stack: Vec<(&CommentNode, usize)> =
            self.roots.iter().rev().map(|node| (node, 0)).collect();
        let mut open: Vec<usize> = Vec::new();

        while let Some((node, depth)) = stack.pop() {
            while open.last().is_some_and(|&idx| rows[idx].depth >= depth) {
                open.pop();
            }
            for &ancestor in &open {
                rows[ancestor].descendant_count += 1;
            }
            open.push(rows.len());
            rows.push(CommentRow {
                node,
                depth,
                descendant_count: 0,
            });
            stack.extend(node.replies.iter().rev().map(|reply| (reply, depth + 1)));
        }
        rows
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VisibleComment<'a> {
    pub node: &'a CommentNode,
    pub depth: usize,
    pub collapsed: bool,
    pub hidden_replies: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CollapseState {
    collapsed: HashSet<String>,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        if self.collapsed.remove(id) {
            false
        } else {
            self.collapsed.insert(id.to_string());
            true
        }
    }

    pub fn is_collapsed(&self, id: &str) -> bool {
        self.collapsed.contains(id)
    }

    pub fn collapsed_count(&self) -> usize {
        self.collapsed.len()
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn visible<'a>(&self, tree: &'a CommentTree) -> Vec<VisibleComment<'a>> {
        let mut visible = Vec::new();
        let mut hidden_depths: Vec<usize> = Vec::new();

        for row in tree.rows() {
            while hidden_depths.last().is_some_and(|depth| *depth >= row.depth) {
                hidden_depths.pop();
            }
            if !hidden_depths.is_empty() {
                continue;
            }

            let collapsed = self.is_collapsed(&row.node.id);
            if collapsed {
                hidden_depths.push(row.depth);
            }
            visible.push(VisibleComment {
                node: row.node,
                depth: row.depth,
                collapsed,
                hidden_replies: if collapsed { row.descendant_count } else { 0 },
            });
        }
        visible
    }
}
