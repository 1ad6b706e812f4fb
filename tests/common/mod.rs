#![allow(dead_code)]

use roost::{Batch, BatchReport, Config, InstanceId, NodeId, NodeTree, Registry};
use serde_json::Value;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn node_tree() -> NodeTree {
    init_logging();
    NodeTree::new(Config::default(), Registry::with_builtins())
}

pub fn batch(value: Value) -> Batch {
    serde_json::from_value(value).expect("malformed test batch")
}

pub fn apply(tree: &mut NodeTree, value: Value) -> BatchReport {
    tree.apply_batch(batch(value)).expect("batch failed")
}

pub fn instance(tree: &NodeTree, id: &str) -> InstanceId {
    tree.node(&id.into())
        .unwrap_or_else(|| panic!("no node {}", id))
        .instance()
}

pub fn children(tree: &NodeTree, id: &str) -> Vec<String> {
    tree.children(&id.into())
        .iter()
        .map(|id| id.as_str().to_string())
        .collect()
}

pub fn sorted(ids: &[NodeId]) -> Vec<String> {
    let mut ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
    ids.sort();
    ids
}

/// Number of decorator nodes in the tree.
pub fn decorator_count(tree: &NodeTree) -> usize {
    tree.tree()
        .ids()
        .filter_map(|id| tree.node(id))
        .filter(|node| node.is_decorator())
        .count()
}

/// Checks that every live node is owned by exactly one parent, and nothing is left dirty.
pub fn assert_consistent(tree: &NodeTree) {
    let nodes = tree.tree();
    let root = match nodes.root() {
        Some(root) => root.clone(),
        None => return,
    };
    let live = nodes.descendants(&root);
    assert_eq!(live.len(), nodes.len(), "every node should be reachable from the root");
    for id in &live {
        let node = tree.node(id).unwrap();
        assert!(!node.is_dirty(), "{} left dirty", id);
        for child in node.children() {
            assert_eq!(nodes.owner(child), Some(id));
        }
    }
}
