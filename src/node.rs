use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::func::Func;
use crate::value::Value;

/**
 * The identity token backing a [`Node`]: the address of its shared
 * allocation. Two `Node` handles produced by cloning the same `Node` compare
 * equal under `NodeId`; two separately constructed nodes with identical
 * contents do not. This is the key type for every identity-keyed container
 * in the crate (the evaluator's memoization cache, traversal `visited`
 * sets, the topological sort's `parents` index).
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/**
 * A node of the expression graph: either a [`Literal`](Repr::Literal) leaf or
 * a pending [`Apply`](Repr::Apply) call.
 *
 * `Node` is a cheap, `Clone`-able handle around a shared, interior-mutable
 * representation (`Rc<RefCell<Repr>>`). Cloning a `Node` does not copy the
 * graph; it creates another reference to the same allocation, which is
 * exactly the "ownership is shared" lifecycle the node model requires: a
 * node may be a child of multiple parents, and stays alive as long as any of
 * them (or an external holder) references it.
 *
 * `Node` is intentionally neither `Send` nor `Sync`: the engine is
 * single-threaded and synchronous by design, and `Rc`/`RefCell` make that a
 * compile-time property rather than a documented convention.
 */
#[derive(Clone)]
pub struct Node(Rc<RefCell<Repr>>);

pub(crate) enum Repr {
    Literal(Value),
    Apply(ApplyData),
}

pub(crate) struct ApplyData {
    pub func: Func,
    pub args: Vec<Node>,
    pub kwargs: IndexMap<String, Node>,
}

impl Node {
    /**
     * Wraps a host value as an immutable `Literal` node.
     */
    pub fn literal(value: Value) -> Node {
        Node(Rc::new(RefCell::new(Repr::Literal(value))))
    }

    /**
     * Builds a pending-call `Apply` node.
     */
    pub fn apply(func: Func, args: Vec<Node>, kwargs: IndexMap<String, Node>) -> Node {
        Node(Rc::new(RefCell::new(Repr::Apply(ApplyData {
            func,
            args,
            kwargs,
        }))))
    }

    /**
     * This node's identity token, for use as a key in identity-keyed
     * containers.
     */
    pub fn id(&self) -> NodeId {
        NodeId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    /**
     * Whether this node and `other` are the same allocation (same identity),
     * as opposed to merely holding equal values.
     */
    pub fn is_same_node(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_literal(&self) -> bool {
        matches!(&*self.0.borrow(), Repr::Literal(_))
    }

    pub fn is_apply(&self) -> bool {
        matches!(&*self.0.borrow(), Repr::Apply(_))
    }

    /**
     * The wrapped value, if this is a `Literal`; `None` for an `Apply`.
     */
    pub fn literal_value(&self) -> Option<Value> {
        match &*self.0.borrow() {
            Repr::Literal(v) => Some(v.clone()),
            Repr::Apply(_) => None,
        }
    }

    /**
     * This node's callable identity, if it is an `Apply`; `None` for a
     * `Literal`.
     */
    pub fn func(&self) -> Option<Func> {
        match &*self.0.borrow() {
            Repr::Literal(_) => None,
            Repr::Apply(a) => Some(a.func.clone()),
        }
    }

    /**
     * A copy of this node's positional children. Empty for a `Literal` (and
     * for an `Apply` with no positional children).
     */
    pub fn args(&self) -> Vec<Node> {
        match &*self.0.borrow() {
            Repr::Literal(_) => Vec::new(),
            Repr::Apply(a) => a.args.clone(),
        }
    }

    /**
     * A copy of this node's keyword children, in insertion order. Empty for
     * a `Literal`.
     */
    pub fn kwargs(&self) -> IndexMap<String, Node> {
        match &*self.0.borrow() {
            Repr::Literal(_) => IndexMap::new(),
            Repr::Apply(a) => a.kwargs.clone(),
        }
    }

    /**
     * Every child of this node: `args()` followed by `kwargs().values()`, in
     * mapping order. This is the enumeration order traversal uses.
     */
    pub fn children(&self) -> Vec<Node> {
        match &*self.0.borrow() {
            Repr::Literal(_) => Vec::new(),
            Repr::Apply(a) => a
                .args
                .iter()
                .cloned()
                .chain(a.kwargs.values().cloned())
                .collect(),
        }
    }

    /**
     * Appends a new positional child to this `Apply`'s `args`, mutating it
     * in place.
     *
     * # Panics
     * If called on a `Literal` node, which has no `args` to append to.
     */
    pub fn append_arg(&self, arg: Node) {
        match &mut *self.0.borrow_mut() {
            Repr::Literal(_) => panic!("append_arg called on a Literal node"),
            Repr::Apply(a) => a.args.push(arg),
        }
    }

    /**
     * Appends several positional children, in order.
     *
     * # Panics
     * If called on a `Literal` node.
     */
    pub fn extend_args(&self, args: impl IntoIterator<Item = Node>) {
        match &mut *self.0.borrow_mut() {
            Repr::Literal(_) => panic!("extend_args called on a Literal node"),
            Repr::Apply(a) => a.args.extend(args),
        }
    }

    /**
     * Inserts or overwrites a keyword child in place. Exposed primarily so
     * graphs (and tests) can introduce a keyword edge after construction —
     * the same mutation discipline the node model allows for `append_arg`,
     * with the same caveat that it invalidates prior traversal/eval results
     * and may introduce a cycle undetected until the next traversal.
     *
     * # Panics
     * If called on a `Literal` node.
     */
    pub fn set_kwarg(&self, name: impl Into<String>, value: Node) {
        match &mut *self.0.borrow_mut() {
            Repr::Literal(_) => panic!("set_kwarg called on a Literal node"),
            Repr::Apply(a) => {
                a.kwargs.insert(name.into(), value);
            }
        }
    }

    /**
     * Returns a *new* `Apply` node with the same `func`, whose `args` and
     * `kwargs` have every identity-equal occurrence of `old` replaced by
     * `new`. `self` is not mutated; children other than `old` are shared
     * (not recursively cloned) with the original.
     *
     * # Panics
     * If called on a `Literal` node.
     */
    pub fn replace_input(&self, old: &Node, new: &Node) -> Node {
        match &*self.0.borrow() {
            Repr::Literal(_) => panic!("replace_input called on a Literal node"),
            Repr::Apply(a) => {
                let replace = |n: &Node| -> Node {
                    if n.is_same_node(old) {
                        new.clone()
                    } else {
                        n.clone()
                    }
                };
                let args = a.args.iter().map(replace).collect();
                let kwargs = a.kwargs.iter().map(|(k, v)| (k.clone(), replace(v))).collect();
                Node::apply(a.func.clone(), args, kwargs)
            }
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.0.borrow() {
            Repr::Literal(v) => write!(f, "Literal({:?})", v),
            Repr::Apply(a) => write!(f, "Apply({}, {} args, {} kwargs)", a.func.name(), a.args.len(), a.kwargs.len()),
        }
    }
}

/**
 * The Literal-equality relation from the node model: `Literal(a) ==
 * Literal(b)` iff `a == b`; any comparison involving an `Apply` is `false`.
 * This is a plain, `bool`-returning relation — distinct from, and never
 * consulted by, the identity-keyed containers that use [`NodeId`] — so it
 * never needs to "lift `==` into a graph operation" the way the host
 * language's disabled `__eq__` override would have.
 */
impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        match (self.literal_value(), other.literal_value()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
