use std::collections::HashMap;

use crate::stable_id::StableId;

use super::TemplateNode;

/// An index from stable id to the position of a node inside a tree.
///
/// Positions are stored as the list of child indices leading from the root
/// to the node, so the index never borrows the tree. It has to be rebuilt
/// whenever nodes are added or removed.
#[derive(Debug, Default)]
pub struct NodeIndex {
    paths: HashMap<StableId, Vec<usize>>,
}

impl NodeIndex {
    pub fn build(root: &TemplateNode) -> Self {
        let mut index = NodeIndex::default();
        let mut path = Vec::new();
        index.insert_recursive(root, &mut path);
        index
    }

    fn insert_recursive(&mut self, node: &TemplateNode, path: &mut Vec<usize>) {
        // The first node claiming an id wins, matching `TemplateNode::find`.
        if !node.stable_id.is_none() && !self.paths.contains_key(&node.stable_id) {
            self.paths.insert(node.stable_id.clone(), path.clone());
        }

        for (i, child) in node.children.iter().enumerate() {
            path.push(i);
            self.insert_recursive(child, path);
            path.pop();
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.paths.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get<'a>(&self, root: &'a TemplateNode, id: &str) -> Option<&'a TemplateNode> {
        let path = self.paths.get(id)?;
        let mut node = root;

        for &i in path {
            node = node.children.get(i)?;
        }

        Some(node)
    }

    pub fn get_mut<'a>(&self, root: &'a mut TemplateNode, id: &str) -> Option<&'a mut TemplateNode> {
        let path = self.paths.get(id)?;
        let mut node = root;

        for &i in path {
            node = node.children.get_mut(i)?;
        }

        Some(node)
    }
}
