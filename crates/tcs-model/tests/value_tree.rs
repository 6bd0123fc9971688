//! Property tests for path-addressed writes into parameter trees.

use proptest::prelude::*;
use serde_json::{Value, json};
use tcs_model::{Path, Scalar, ValueNode};

fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["data", "id", "url", "code", "0"]).prop_map(str::to_string)
}

fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(key_strategy(), 1..4).prop_map(|keys| keys.join("."))
}

fn scalar_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        "[a-z${}_]{0,8}".prop_map(Scalar::Text),
        any::<i32>().prop_map(|n| Scalar::from(i64::from(n))),
        any::<bool>().prop_map(Scalar::Bool),
    ]
}

fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        "[a-z]{0,4}".prop_map(Value::String),
        any::<i16>().prop_map(|n| json!(n)),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec((key_strategy(), inner), 0..4)
            .prop_map(|pairs| Value::Object(pairs.into_iter().collect()))
    })
}

fn tree_strategy() -> impl Strategy<Value = ValueNode> {
    json_strategy().prop_map(|value| match value {
        Value::Object(_) => ValueNode::from_plain(&value),
        scalar => ValueNode::from_plain(&json!({ "url": scalar })),
    })
}

/// True when some proper prefix of `path` resolves to a Leaf.
fn crosses_leaf(tree: &ValueNode, path: &Path) -> bool {
    (1..path.len()).any(|len| {
        Path::from_segments(path.segments()[..len].iter().cloned())
            .and_then(|prefix| tree.get_at(&prefix).map(ValueNode::is_leaf))
            .unwrap_or(false)
    })
}

proptest! {
    #[test]
    fn set_then_get_returns_value(
        mut tree in tree_strategy(),
        path in path_strategy(),
        value in scalar_strategy(),
    ) {
        let parsed = Path::parse(&path).unwrap();
        let before = tree.clone();
        let blocked = tree.get_at(&parsed).is_some_and(ValueNode::is_branch)
            || crosses_leaf(&tree, &parsed);

        let applied = tree.set_value(&path, value.clone());

        if blocked {
            prop_assert!(!applied);
            prop_assert_eq!(&tree, &before);
        } else {
            prop_assert!(applied);
            prop_assert_eq!(&tree.leaf(&path).unwrap().value, &value);
        }
    }

    #[test]
    fn writes_leave_unrelated_leaves_alone(
        mut tree in tree_strategy(),
        path in path_strategy(),
        value in scalar_strategy(),
    ) {
        let before = tree.leaves()
            .into_iter()
            .map(|(p, leaf)| (p, leaf.clone()))
            .collect::<Vec<_>>();
        tree.set_value(&path, value);
        for (leaf_path, leaf) in before {
            if leaf_path.to_string() != path {
                prop_assert_eq!(tree.leaf_at(&leaf_path), Some(&leaf));
            }
        }
    }

    #[test]
    fn malformed_paths_are_ignored(mut tree in tree_strategy(), value in scalar_strategy()) {
        let before = tree.clone();
        for path in ["", ".", "data.", ".data", "data..id"] {
            prop_assert!(!tree.set_value(path, value.clone()));
            prop_assert!(tree.get(path).is_none());
        }
        prop_assert_eq!(tree, before);
    }
}

#[test]
fn serialize_is_plain_nested_value() {
    let mut tree = ValueNode::empty_branch();
    tree.set_value("rRsp.resultCode", "0");
    tree.set_value("rRsp.data.subscriberId", "");
    tree.set_value("timeout", 30_i64);
    assert_eq!(
        tree.to_plain(),
        json!({ "rRsp": { "resultCode": "0", "data": { "subscriberId": "" } }, "timeout": 30 })
    );
}

#[test]
fn dotted_keys_have_no_leaf_address() {
    let tree = ValueNode::from_plain(&json!({ "a.b": "x", "data": { "id": "1" } }));
    let paths: Vec<String> = tree.leaves().iter().map(|(path, _)| path.to_string()).collect();
    assert_eq!(paths, ["data.id"]);
    assert_eq!(tree.leaf_count(), 2);
    assert!(tree.get("a.b").is_none());
}
