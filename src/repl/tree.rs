//! Menu tree navigation.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]; the parent
//! link is a plain index used for navigation and path names only.

use thiserror::Error;

use crate::ui::formatter::Formatter;

/// Label that moves the cursor to the parent node.
pub const UP_LABEL: &str = "..";
pub const HELP_LABEL: &str = "help";
pub const EXIT_LABEL: &str = "exit";

/// Separator of labels in a node's full name.
pub const PATH_SEPARATOR: char = '/';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("duplicate menu label '{label}' under '{parent}'")]
    DuplicateLabel { parent: String, label: String },

    #[error("menu node '{0}' is a leaf and cannot have children")]
    LeafParent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What happens when a leaf is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Read-only call of the method with this label.
    ConstantCall(String),
    /// Transaction to the method with this label.
    Transact(String),
    ListEvents(String),
    WatchEvents(String),
    /// Side-effect command looked up by the node's full name.
    Command,
    Up,
    Help,
    Exit,
}

impl Action {
    fn is_synthetic(&self) -> bool {
        matches!(self, Action::Up | Action::Help | Action::Exit)
    }
}

#[derive(Debug, Clone)]
pub struct MenuNode {
    pub label: String,
    pub description: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    action: Option<Action>,
}

impl MenuNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.action.is_some()
    }
}

/// Outcome of resolving one line of input at a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Leaf(NodeId),
    Subtree(NodeId),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct MenuTree {
    nodes: Vec<MenuNode>,
}

impl Default for MenuTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuTree {
    /// A tree holding only the root, which offers `help` and `exit`.
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: vec![MenuNode {
                label: String::new(),
                description: String::new(),
                parent: None,
                children: Vec::new(),
                action: None,
            }],
        };
        let root = tree.root();
        tree.push_synthetic(root, HELP_LABEL, "list commands", Action::Help);
        tree.push_synthetic(root, EXIT_LABEL, "exit the console", Action::Exit);
        tree
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &MenuNode {
        &self.nodes[id.0]
    }

    /// Add a branch under `parent`. The branch gets `..`, `help` and `exit`.
    pub fn add_branch(
        &mut self,
        parent: NodeId,
        label: &str,
        description: &str,
    ) -> Result<NodeId, MenuError> {
        let id = self.insert(parent, label, description, None)?;
        self.push_synthetic(id, UP_LABEL, "go up one level", Action::Up);
        self.push_synthetic(id, HELP_LABEL, "list commands", Action::Help);
        self.push_synthetic(id, EXIT_LABEL, "exit the console", Action::Exit);
        Ok(id)
    }

    /// Add a leaf bound to `action` under `parent`.
    pub fn add_leaf(
        &mut self,
        parent: NodeId,
        label: &str,
        description: &str,
        action: Action,
    ) -> Result<NodeId, MenuError> {
        self.insert(parent, label, description, Some(action))
    }

    /// Match `input` exactly against the children of `at`.
    ///
    /// `..` yields the parent subtree, or the root itself when `at` is the root.
    pub fn resolve(&self, at: NodeId, input: &str) -> Resolution {
        let input = input.trim();
        if input == UP_LABEL {
            return Resolution::Subtree(self.node(at).parent.unwrap_or(at));
        }

        match self
            .node(at)
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).label == input)
        {
            Some(child) if self.node(child).is_leaf() => Resolution::Leaf(child),
            Some(child) => Resolution::Subtree(child),
            None => Resolution::NotFound,
        }
    }

    /// Labels from the root down to `id`, joined by `/`.
    pub fn name(&self, id: NodeId) -> String {
        let mut labels = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if !node.label.is_empty() {
                labels.push(node.label.as_str());
            }
            current = node.parent;
        }
        labels.reverse();
        labels.join(&PATH_SEPARATOR.to_string())
    }

    /// Listing of the children of `id` with their descriptions.
    pub fn help(&self, id: NodeId) -> String {
        Formatter::format_listing(
            self.node(id)
                .children
                .iter()
                .map(|&child| self.node(child))
                .map(|node| (node.label.as_str(), node.description.as_str())),
        )
    }

    /// Completion candidates for input at `id`.
    pub fn completions(&self, id: NodeId) -> Vec<(String, String)> {
        self.node(id)
            .children
            .iter()
            .map(|&child| self.node(child))
            .map(|node| (node.label.clone(), node.description.clone()))
            .collect()
    }

    /// Every leaf bound to a real action, in depth-first order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            match &node.action {
                Some(action) if !action.is_synthetic() => found.push(id),
                Some(_) => {}
                None => stack.extend(node.children.iter().rev().copied()),
            }
        }
        found
    }

    /// Reorder the non-synthetic children of `id` by label.
    pub fn sort_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        let (mut real, synthetic): (Vec<NodeId>, Vec<NodeId>) = children
            .into_iter()
            .partition(|&child| !self.is_synthetic(child));
        real.sort_by(|a, b| self.node(*a).label.cmp(&self.node(*b).label));
        real.extend(synthetic);
        self.nodes[id.0].children = real;
    }

    fn is_synthetic(&self, id: NodeId) -> bool {
        self.node(id).action.as_ref().is_some_and(Action::is_synthetic)
    }

    fn insert(
        &mut self,
        parent: NodeId,
        label: &str,
        description: &str,
        action: Option<Action>,
    ) -> Result<NodeId, MenuError> {
        if self.node(parent).is_leaf() {
            return Err(MenuError::LeafParent(self.name(parent)));
        }
        if label == UP_LABEL
            || self
                .node(parent)
                .children
                .iter()
                .any(|&child| self.node(child).label == label)
        {
            return Err(MenuError::DuplicateLabel {
                parent: self.name(parent),
                label: label.to_string(),
            });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(MenuNode {
            label: label.to_string(),
            description: description.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            action,
        });

        // real children go before the synthetic tail
        let siblings = &self.nodes[parent.0].children;
        let position = siblings
            .iter()
            .position(|&child| {
                self.nodes[child.0]
                    .action
                    .as_ref()
                    .is_some_and(Action::is_synthetic)
            })
            .unwrap_or(siblings.len());
        self.nodes[parent.0].children.insert(position, id);
        Ok(id)
    }

    fn push_synthetic(&mut self, parent: NodeId, label: &str, description: &str, action: Action) {
        let id = NodeId(self.nodes.len());
        self.nodes.push(MenuNode {
            label: label.to_string(),
            description: description.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            action: Some(action),
        });
        self.nodes[parent.0].children.push(id);
    }
}
