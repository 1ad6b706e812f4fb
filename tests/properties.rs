mod common;

use common::*;
use proptest::prelude::*;
use roost::NodeTree;
use serde_json::{json, Map, Value};

const IDS: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];

fn row_of(ids: &[&str], margins: bool) -> Value {
    let mut updates = Map::new();
    for (i, id) in ids.iter().enumerate() {
        let mut state = json!({ "type": "Text", "text": id });
        if margins && i % 2 == 0 {
            state["margin"] = json!([0, 1]);
        }
        updates.insert(id.to_string(), state);
    }
    updates.insert("p".into(), json!({ "type": "Row", "children": ids }));
    json!({ "updates": updates, "newRootId": "p" })
}

fn initial(margins: bool) -> NodeTree {
    let mut tree = node_tree();
    apply(&mut tree, row_of(&IDS, margins));
    tree
}

proptest! {
    #[test]
    fn permuting_children_keeps_surviving_instances(
        order in proptest::sample::subsequence(IDS.to_vec(), 0..=IDS.len()).prop_shuffle(),
        margins in any::<bool>(),
    ) {
        let mut tree = initial(margins);
        let before: Vec<_> = IDS.iter().map(|id| instance(&tree, id)).collect();

        let report = apply(&mut tree, json!({ "updates": { "p": { "children": order.clone() } } }));
        prop_assert!(report.created.is_empty());

        let bases: Vec<String> = children(&tree, "p")
            .iter()
            .map(|id| id.split(':').next().unwrap_or_default().to_string())
            .collect();
        prop_assert_eq!(&bases, &order);

        for (id, instance_before) in IDS.iter().zip(&before) {
            if order.contains(id) {
                prop_assert_eq!(instance(&tree, id), *instance_before);
            } else {
                prop_assert!(!tree.tree().contains(&(*id).into()));
            }
        }
        assert_consistent(&tree);
    }

    #[test]
    fn repeating_a_batch_is_idempotent(
        order in proptest::sample::subsequence(IDS.to_vec(), 1..=IDS.len()).prop_shuffle(),
        margins in any::<bool>(),
    ) {
        let mut tree = node_tree();
        let batch = row_of(&order, margins);
        apply(&mut tree, batch.clone());
        let before: Vec<_> = order.iter().map(|id| (instance(&tree, id), tree.frame(&(*id).into()))).collect();

        let report = apply(&mut tree, batch);
        prop_assert!(report.created.is_empty() && report.destroyed.is_empty());
        prop_assert!(tree.layout_stats().visited().is_empty());
        let after: Vec<_> = order.iter().map(|id| (instance(&tree, id), tree.frame(&(*id).into()))).collect();
        prop_assert_eq!(before, after);
    }
}
