//! Console menu layout.
//!
//! Builds the menu tree from a contract interface and names the
//! configuration commands that are looked up by their full path.

use super::tree::{Action, MenuError, MenuTree, NodeId};
use crate::schema::InterfaceSchema;

/// Commands dispatched by full menu path rather than by leaf action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerCommand {
    /// Load a private key file.
    Key,
    /// Select an account on a hardware wallet.
    Ledger,
    /// Describe the active signer.
    Show,
}

impl SignerCommand {
    pub const ALL: [SignerCommand; 3] = [
        SignerCommand::Key,
        SignerCommand::Ledger,
        SignerCommand::Show,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SignerCommand::Key => "key",
            SignerCommand::Ledger => "ledger",
            SignerCommand::Show => "show",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SignerCommand::Key => "sign with a private key file",
            SignerCommand::Ledger => "sign with a hardware wallet account",
            SignerCommand::Show => "show the current signer",
        }
    }

    /// Full menu path of the command.
    pub fn path(&self) -> String {
        format!("signer/{}", self.label())
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.path() == path)
    }
}

/// Build the console menu for `schema`.
///
/// ```text
/// constant/<view and pure methods>
/// transact/<other methods>
/// events/list/<events>
/// events/watch/<events>
/// signer/{key,ledger,show}
/// ```
pub fn build_tree(schema: &InterfaceSchema) -> Result<MenuTree, MenuError> {
    let mut tree = MenuTree::new();
    let root = tree.root();

    let constant = tree.add_branch(root, "constant", "call read-only methods")?;
    let transact = tree.add_branch(
        root,
        "transact",
        "send transactions to state-changing methods",
    )?;
    for method in schema.methods() {
        let (parent, action) = if method.is_constant() {
            (constant, Action::ConstantCall(method.label.clone()))
        } else {
            (transact, Action::Transact(method.label.clone()))
        };
        tree.add_leaf(parent, &method.label, &method.signature(), action)?;
    }

    let events = tree.add_branch(root, "events", "query contract events")?;
    let list = tree.add_branch(events, "list", "list past events")?;
    let watch = tree.add_branch(events, "watch", "watch new events until interrupted")?;
    for event in schema.events() {
        let signature = event.signature();
        tree.add_leaf(list, &event.label, &signature, Action::ListEvents(event.label.clone()))?;
        tree.add_leaf(watch, &event.label, &signature, Action::WatchEvents(event.label.clone()))?;
    }

    let signer = tree.add_branch(root, "signer", "configure transaction signing")?;
    for command in SignerCommand::ALL {
        tree.add_leaf(signer, command.label(), command.description(), Action::Command)?;
    }

    for branch in [constant, transact, list, watch, signer] {
        tree.sort_children(branch);
    }
    Ok(tree)
}

/// Find a node by its full name.
pub fn find_path(tree: &MenuTree, path: &str) -> Option<NodeId> {
    let mut current = tree.root();
    for label in path.split(super::tree::PATH_SEPARATOR).filter(|l| !l.is_empty()) {
        current = *tree
            .node(current)
            .children()
            .iter()
            .find(|&&child| tree.node(child).label == label)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::tree::{Resolution, EXIT_LABEL, HELP_LABEL, UP_LABEL};
    use std::collections::HashSet;

    const ABI: &str = r#"[
        {"type":"function","name":"transfer","stateMutability":"nonpayable",
         "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]},
        {"type":"function","name":"balanceOf","stateMutability":"view",
         "inputs":[{"name":"owner","type":"address"}],
         "outputs":[{"name":"","type":"uint256"}]},
        {"type":"function","name":"approve","stateMutability":"nonpayable",
         "inputs":[{"name":"spender","type":"address"},{"name":"amount","type":"uint256"}],
         "outputs":[{"name":"","type":"bool"}]},
        {"type":"event","name":"Transfer","anonymous":false,
         "inputs":[{"name":"from","type":"address","indexed":true},
                   {"name":"to","type":"address","indexed":true},
                   {"name":"value","type":"uint256","indexed":false}]}
    ]"#;

    fn tree() -> MenuTree {
        build_tree(&InterfaceSchema::from_json(ABI).unwrap()).unwrap()
    }

    fn labels(tree: &MenuTree, id: NodeId) -> Vec<String> {
        tree.node(id)
            .children()
            .iter()
            .map(|&c| tree.node(c).label.clone())
            .collect()
    }

    #[test]
    fn test_layout() {
        let tree = tree();
        assert_eq!(
            labels(&tree, tree.root()),
            vec!["constant", "transact", "events", "signer", "help", "exit"]
        );
        let transact = find_path(&tree, "transact").unwrap();
        assert_eq!(
            labels(&tree, transact),
            vec!["approve", "transfer", "..", "help", "exit"]
        );
        let key = find_path(&tree, "signer/key").unwrap();
        assert_eq!(tree.node(key).action(), Some(&Action::Command));
    }

    #[test]
    fn test_methods_routed_by_mutability() {
        let tree = tree();
        let balance = find_path(&tree, "constant/balanceOf").unwrap();
        assert_eq!(
            tree.node(balance).action(),
            Some(&Action::ConstantCall("balanceOf".into()))
        );
        assert!(find_path(&tree, "transact/balanceOf").is_none());
        assert!(find_path(&tree, "events/watch/Transfer").is_some());
    }

    #[test]
    fn test_leaf_paths_unique_and_synthetic_tail() {
        let tree = tree();
        let names: Vec<String> = tree.leaves().into_iter().map(|l| tree.name(l)).collect();
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());

        for branch in ["constant", "transact", "events", "events/list", "events/watch", "signer"] {
            let id = find_path(&tree, branch).unwrap();
            let children = labels(&tree, id);
            assert_eq!(
                &children[children.len() - 3..],
                &[UP_LABEL, HELP_LABEL, EXIT_LABEL]
            );
        }
    }

    #[test]
    fn test_up_from_nested_node() {
        let tree = tree();
        let list = find_path(&tree, "events/list").unwrap();
        let events = find_path(&tree, "events").unwrap();
        assert_eq!(tree.resolve(list, ".."), Resolution::Subtree(events));
    }

    #[test]
    fn test_signer_command_paths() {
        assert_eq!(SignerCommand::from_path("signer/ledger"), Some(SignerCommand::Ledger));
        assert_eq!(SignerCommand::from_path("signer/other"), None);
        let tree = tree();
        for command in SignerCommand::ALL {
            let id = find_path(&tree, &command.path()).unwrap();
            assert_eq!(tree.name(id), command.path());
        }
    }
}
