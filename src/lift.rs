use indexmap::IndexMap;

use crate::func::{Builtin, Func};
use crate::node::Node;
use crate::value::Value;

/**
 * A host value that [`as_graph`] knows how to normalize into a [`Node`].
 *
 * The host language's `functools.partial` accepts anything and recurses on
 * `list`/`tuple`/`dict` at call time; Rust has no such dynamically-typed
 * catch-all, so this crate makes the lifter's input an explicit enum. A
 * `partial(...)` call already produces a `Node` directly (see `build.rs`),
 * so `Liftable::Node` covers rule 2 of the original five-rule procedure as
 * well as rule 1.
 */
pub enum Liftable {
    /**
     * Already a graph node; returned unchanged (`as_graph(n) is n`).
     */
    Node(Node),

    /**
     * A plain host value with no further structure to recurse into.
     */
    Scalar(Value),

    /**
     * A native ordered sequence lifted as `Apply(make_list, ...)`.
     */
    List(Vec<Liftable>),

    /**
     * A native ordered sequence lifted as `Apply(make_tuple, ...)`.
     */
    Tuple(Vec<Liftable>),

    /**
     * A native mapping, lifted as `Apply(apply_with_positional_list, ...)`
     * over `(key, value)` pair nodes. Keys are wrapped as literals, not
     * recursed into.
     */
    Map(Vec<(Value, Liftable)>),
}

impl From<Node> for Liftable {
    fn from(n: Node) -> Self {
        Liftable::Node(n)
    }
}

impl From<Value> for Liftable {
    fn from(v: Value) -> Self {
        Liftable::Scalar(v)
    }
}

impl From<i64> for Liftable {
    fn from(v: i64) -> Self {
        Liftable::Scalar(Value::Int(v))
    }
}

impl From<f64> for Liftable {
    fn from(v: f64) -> Self {
        Liftable::Scalar(Value::Float(v))
    }
}

impl From<bool> for Liftable {
    fn from(v: bool) -> Self {
        Liftable::Scalar(Value::Bool(v))
    }
}

impl From<&str> for Liftable {
    fn from(v: &str) -> Self {
        Liftable::Scalar(Value::Str(v.to_string()))
    }
}

impl From<String> for Liftable {
    fn from(v: String) -> Self {
        Liftable::Scalar(Value::Str(v))
    }
}

impl<T: Into<Liftable>> From<Vec<T>> for Liftable {
    /**
     * A bare `Vec` lifts as a host list, the more common of the two ordered
     * containers; use [`as_tuple`] to build the tuple variant explicitly.
     */
    fn from(items: Vec<T>) -> Self {
        Liftable::List(items.into_iter().map(Into::into).collect())
    }
}

/**
 * Builds the tuple variant of a lifted ordered sequence, since a plain
 * `Vec<T>` always lifts as a list (see the blanket `From` impl).
 */
pub fn as_tuple<T: Into<Liftable>>(items: Vec<T>) -> Liftable {
    Liftable::Tuple(items.into_iter().map(Into::into).collect())
}

/**
 * Builds the mapping variant of a lifted container from an ordered list of
 * key/value pairs.
 */
pub fn as_map<K: Into<Value>, V: Into<Liftable>>(pairs: Vec<(K, V)>) -> Liftable {
    Liftable::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
}

/**
 * Normalizes an arbitrary liftable host value into a [`Node`], per the
 * lifting rules of the node model: an existing node passes through
 * unchanged, lists/tuples become `make_list`/`make_tuple` applies, mappings
 * become `apply_with_positional_list` applies over pair nodes, and anything
 * else becomes a `Literal`.
 */
pub fn as_graph(p: impl Into<Liftable>) -> Node {
    match p.into() {
        Liftable::Node(n) => n,
        Liftable::Scalar(v) => Node::literal(v),
        Liftable::List(items) => {
            let args = items.into_iter().map(as_graph).collect();
            Node::apply(Func::Builtin(Builtin::MakeList), args, IndexMap::new())
        }
        Liftable::Tuple(items) => {
            let args = items.into_iter().map(as_graph).collect();
            Node::apply(Func::Builtin(Builtin::MakeTuple), args, IndexMap::new())
        }
        Liftable::Map(pairs) => {
            // First positional child stands in for the host's mapping
            // constructor; this crate's closed `Value::Map` shape makes
            // every mapping reconstruct the same way, so the placeholder
            // itself carries no information (see `Builtin::ApplyWithPositionalList`).
            let mut args = vec![Node::literal(Value::None)];
            for (k, v) in pairs {
                args.push(as_graph(as_tuple(vec![Liftable::Scalar(k), v.into()])));
            }
            Node::apply(Func::Builtin(Builtin::ApplyWithPositionalList), args, IndexMap::new())
        }
    }
}
