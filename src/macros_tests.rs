#[cfg(test)]
mod tests {
    use crate::condition::{Entry, Node};
    use crate::tree;

    fn entries(node: Node) -> Vec<Entry> {
        match node {
            Node::Array(entries) => entries,
            other => panic!("expected an array, got {other:?}"),
        }
    }

    #[test]
    fn tree_keeps_positional_and_keyed_entries_in_order() {
        let got = entries(tree!(["and", "id" => 1, ["in", "status", [1, 2]]]));
        assert_eq!(got.len(), 3);
        assert!(matches!(&got[0], Entry { key: None, value: Node::Str(s) } if s == "and"));
        assert!(matches!(&got[1], Entry { key: Some(k), value: Node::Int(1) } if k == "id"));
        assert!(matches!(&got[2], Entry { key: None, value: Node::Array(inner) } if inner.len() == 3));
    }

    #[test]
    fn tree_keyed_nested_array() {
        let got = entries(tree!(["in", "n.id" => [1, 2, 3]]));
        assert!(matches!(
            &got[1],
            Entry { key: Some(k), value: Node::Array(items) } if k == "n.id" && items.len() == 3
        ));
    }

    #[test]
    fn tree_scalar_and_trailing_comma() {
        assert!(matches!(tree!("deleted"), Node::Str(s) if s == "deleted"));
        assert!(matches!(tree!(true), Node::Bool(true)));
        assert_eq!(entries(tree!(["id" => 1,])).len(), 1);
        assert!(entries(tree!([])).is_empty());
    }
}
