use std::collections::HashMap;

use crate::error::Result;
use crate::node::{Node, NodeId};
use crate::traverse::topological;

/**
 * Produces a deep structural copy of the DAG rooted at `root`, preserving
 * sharing: if two parents pointed at the same descendant in the source
 * graph, the corresponding two parents in the clone point at the same new
 * descendant (§4.6).
 *
 * Grounded on `searchspaces/partialplus.py::Node.clone`: topo-sort, then
 * walk in reverse (leaves first) rebuilding each node from its
 * already-cloned children, reusing this crate's own [`topological`] rather
 * than re-deriving the order.
 */
pub fn clone_graph(root: &Node) -> Result<Node> {
    let order: Vec<Node> = topological(root.clone()).collect::<Result<Vec<_>>>()?;
    let mut rebuilt: HashMap<NodeId, Node> = HashMap::new();

    for node in order.into_iter().rev() {
        let id = node.id();
        let new_node = if let Some(value) = node.literal_value() {
            Node::literal(value)
        } else {
            let func = node.func().expect("non-literal node must be an Apply");
            let args = node.args().iter().map(|c| rebuilt[&c.id()].clone()).collect();
            let kwargs = node
                .kwargs()
                .iter()
                .map(|(k, v)| (k.clone(), rebuilt[&v.id()].clone()))
                .collect();
            Node::apply(func, args, kwargs)
        };
        rebuilt.insert(id, new_node);
    }

    Ok(rebuilt[&root.id()].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::partial_args;
    use crate::builtins;
    use crate::lift::{as_graph, Liftable};
    use crate::value::Value;

    #[test]
    fn clone_preserves_sharing_without_sharing_identity() {
        let shared = partial_args(builtins::int_fn(), vec![5i64]);
        let root = as_graph(Liftable::List(vec![
            Liftable::Node(shared.clone()),
            Liftable::Node(shared.clone()),
        ]));

        let cloned = clone_graph(&root).unwrap();
        assert!(!cloned.is_same_node(&root));

        let cloned_args = cloned.args();
        assert!(cloned_args[0].is_same_node(&cloned_args[1]));
        assert!(!cloned_args[0].is_same_node(&shared));
    }

    #[test]
    fn clone_of_a_literal_is_a_distinct_but_equal_node() {
        let lit = Node::literal(Value::Int(42));
        let cloned = clone_graph(&lit).unwrap();
        assert!(!cloned.is_same_node(&lit));
        assert_eq!(cloned, lit);
    }
}
