use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Shl, Shr, Sub};

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::func::{Builtin, Func};
use crate::lift::{as_graph, Liftable};
use crate::node::Node;
use crate::value::Value;
use crate::{builtins, value};

/**
 * Wraps a host value as an immutable `Literal` node, without going through
 * the rest of the lifter's container-recursion rules.
 */
pub fn literal(value: impl Into<Value>) -> Node {
    Node::literal(value.into())
}

/**
 * Builds a pending-call `Apply` node over `f` and its (recursively lifted)
 * positional and keyword arguments.
 *
 * This is the Rust rendition of the host's `functools.partial` workalike:
 * since Rust has no equivalent untyped "pending call" value distinct from a
 * graph node, `partial` constructs the `Apply` node directly rather than
 * producing an intermediate value for `as_graph` to later recognize (§4.1).
 */
pub fn partial(f: Func, args: Vec<Liftable>, kwargs: IndexMap<String, Liftable>) -> Node {
    let lifted_args = args.into_iter().map(as_graph).collect();
    let lifted_kwargs = kwargs.into_iter().map(|(k, v)| (k, as_graph(v))).collect();
    Node::apply(f, lifted_args, lifted_kwargs)
}

/**
 * [`partial`] with no keyword arguments, for the common case.
 */
pub fn partial_args(f: Func, args: Vec<impl Into<Liftable>>) -> Node {
    partial(f, args.into_iter().map(Into::into).collect(), IndexMap::new())
}

fn binary_dispatch(lhs: Node, rhs: Node, op: &'static str) -> Node {
    Node::apply(
        Func::Builtin(Builtin::BinaryOpDispatch),
        vec![lhs, rhs, Node::literal(Value::Str(op.to_string()))],
        IndexMap::new(),
    )
}

fn unary_dispatch(operand: Node, op: &'static str) -> Node {
    Node::apply(
        Func::Builtin(Builtin::UnaryOpDispatch),
        vec![operand, Node::literal(Value::Str(op.to_string()))],
        IndexMap::new(),
    )
}

fn conv1(operand: Node, f: Func) -> Node {
    Node::apply(f, vec![operand], IndexMap::new())
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $symbol:expr) => {
        impl $trait for Node {
            type Output = Node;
            fn $method(self, rhs: Node) -> Node {
                binary_dispatch(self, rhs, $symbol)
            }
        }
    };
}

impl_binary_op!(Add, add, "+");
impl_binary_op!(Sub, sub, "-");
impl_binary_op!(Mul, mul, "*");
impl_binary_op!(Div, div, "/");
impl_binary_op!(Rem, rem, "%");
impl_binary_op!(BitOr, bitor, "|");
impl_binary_op!(BitXor, bitxor, "^");
impl_binary_op!(BitAnd, bitand, "&");
impl_binary_op!(Shl, shl, "<<");
impl_binary_op!(Shr, shr, ">>");

impl Neg for Node {
    type Output = Node;
    fn neg(self) -> Node {
        unary_dispatch(self, "-")
    }
}

impl Not for Node {
    type Output = Node;
    fn not(self) -> Node {
        unary_dispatch(self, "~")
    }
}

impl Node {
    /**
     * Unary `+`. Rust has no `std::ops` trait for this, unlike `Neg`/`Not`
     * (§4.2, Rust rendition of the operator surface).
     */
    pub fn pos(self) -> Node {
        unary_dispatch(self, "+")
    }

    /**
     * `<`. `std::cmp::PartialOrd` hard-codes a `bool` return, so comparison
     * cannot be genuine operator overloading here; these are free methods
     * standing in for it (§4.2).
     */
    pub fn lt(self, rhs: Node) -> Node {
        binary_dispatch(self, rhs, "<")
    }

    /// `<=`, for the same reason as [`Node::lt`].
    pub fn le(self, rhs: Node) -> Node {
        binary_dispatch(self, rhs, "<=")
    }

    /// `>`, for the same reason as [`Node::lt`].
    pub fn gt(self, rhs: Node) -> Node {
        binary_dispatch(self, rhs, ">")
    }

    /// `>=`, for the same reason as [`Node::lt`].
    pub fn ge(self, rhs: Node) -> Node {
        binary_dispatch(self, rhs, ">=")
    }

    /**
     * `node[index]`. Cannot use `std::ops::Index` because that trait must
     * return a borrowed `&Self::Output`, and indexing here builds a fresh,
     * owned `Apply` node rather than referencing storage inside `self`
     * (§4.2).
     */
    pub fn get_item(self, index: impl Into<Liftable>) -> Node {
        let index_node = as_graph(index);
        Node::apply(Func::Builtin(Builtin::GetItem), vec![self, index_node], IndexMap::new())
    }

    /// `node[start:stop:step]`, built directly from a [`value::Slice`].
    pub fn slice(self, slice: value::Slice) -> Node {
        self.get_item(Value::Slice(slice))
    }

    pub fn abs(self) -> Node {
        conv1(self, builtins::abs_fn())
    }

    pub fn int(self) -> Node {
        conv1(self, builtins::int_fn())
    }

    pub fn float(self) -> Node {
        conv1(self, builtins::float_fn())
    }

    pub fn complex(self) -> Node {
        conv1(self, builtins::complex_fn())
    }

    pub fn oct(self) -> Node {
        conv1(self, builtins::oct_fn())
    }

    pub fn hex(self) -> Node {
        conv1(self, builtins::hex_fn())
    }

    pub fn pow(self, exponent: impl Into<Liftable>, modulo: Option<Node>) -> Node {
        let mut args = vec![self, as_graph(exponent)];
        if let Some(m) = modulo {
            args.push(m);
        }
        Node::apply(builtins::pow_fn(), args, IndexMap::new())
    }

    pub fn divmod(self, other: impl Into<Liftable>) -> Node {
        Node::apply(builtins::divmod_fn(), vec![self, as_graph(other)], IndexMap::new())
    }

    /**
     * Invoking an `Apply` directly is an error in the node model; this
     * method exists only to return [`Error::CalledDeferredNode`], standing
     * in for the host's overridden `__call__` (§7). Use [`crate::evaluate`]
     * instead.
     */
    pub fn call(&self, _args: &[Value]) -> Result<Value> {
        Err(Error::CalledDeferredNode)
    }
}

/// Whether `n` is a variable leaf created by [`variable`].
pub fn is_variable(n: &Node) -> bool {
    n.func().and_then(|f| f.as_builtin()) == Some(Builtin::VariableMarker)
}

/// Whether `n` is a `make_tuple` sequence node.
pub fn is_tuple_node(n: &Node) -> bool {
    n.func().and_then(|f| f.as_builtin()) == Some(Builtin::MakeTuple)
}

/// Whether `n` is a `make_list` sequence node.
pub fn is_list_node(n: &Node) -> bool {
    n.func().and_then(|f| f.as_builtin()) == Some(Builtin::MakeList)
}

/// Whether `n` is a `make_list` or `make_tuple` sequence node.
pub fn is_sequence_node(n: &Node) -> bool {
    is_tuple_node(n) || is_list_node(n)
}

/// Whether `n` is an `apply_with_positional_list` mapping node.
pub fn is_positional_list_node(n: &Node) -> bool {
    n.func().and_then(|f| f.as_builtin()) == Some(Builtin::ApplyWithPositionalList)
}

/**
 * The value-type tag of a [`variable`] leaf: either a scalar type or a
 * closed set of choices.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    Int,
    Float,
    Choices(Vec<Value>),
}

fn value_type_node(vt: &ValueType) -> Node {
    match vt {
        ValueType::Int => Node::literal(Value::Str("int".to_string())),
        ValueType::Float => Node::literal(Value::Str("float".to_string())),
        ValueType::Choices(values) => {
            let args = values.iter().cloned().map(Node::literal).collect();
            Node::apply(Func::Builtin(Builtin::MakeList), args, IndexMap::new())
        }
    }
}

/**
 * Fluent builder for a `variable()` leaf, grounded on the
 * `Compiler::with_circuit().plain_modulus_constraint(...).compile()` chain
 * the pack's frontend compiler uses for its own many-optional-knobs
 * construction (§4.2). Call [`variable`] to start one, then [`VariableSpec::build`]
 * to produce the `Node`.
 */
pub struct VariableSpec {
    name: String,
    value_type: ValueType,
    minimum: Option<Value>,
    maximum: Option<Value>,
    default: Option<Value>,
    log_scale: bool,
    distribution: Option<Func>,
    extra: IndexMap<String, Liftable>,
}

impl VariableSpec {
    fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            minimum: None,
            maximum: None,
            default: None,
            log_scale: false,
            distribution: None,
            extra: IndexMap::new(),
        }
    }

    pub fn minimum(mut self, v: impl Into<Value>) -> Self {
        self.minimum = Some(v.into());
        self
    }

    pub fn maximum(mut self, v: impl Into<Value>) -> Self {
        self.maximum = Some(v.into());
        self
    }

    pub fn default_value(mut self, v: impl Into<Value>) -> Self {
        self.default = Some(v.into());
        self
    }

    pub fn log_scale(mut self, v: bool) -> Self {
        self.log_scale = v;
        self
    }

    /// Registers an opaque prior-distribution callable reference. Never
    /// invoked by `evaluate` (§4.4 point 3: "the other keyword attributes
    /// are not evaluated").
    pub fn distribution(mut self, f: Func) -> Self {
        self.distribution = Some(f);
        self
    }

    /// Passes an arbitrary extension keyword through untouched.
    pub fn extra(mut self, name: impl Into<String>, value: impl Into<Liftable>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Node {
        let mut kwargs = IndexMap::new();
        kwargs.insert("name".to_string(), Node::literal(Value::Str(self.name)));
        kwargs.insert("value_type".to_string(), value_type_node(&self.value_type));
        if let Some(v) = self.minimum {
            kwargs.insert("minimum".to_string(), Node::literal(v));
        }
        if let Some(v) = self.maximum {
            kwargs.insert("maximum".to_string(), Node::literal(v));
        }
        if let Some(v) = self.default {
            kwargs.insert("default".to_string(), Node::literal(v));
        }
        kwargs.insert("log_scale".to_string(), Node::literal(Value::Bool(self.log_scale)));
        if let Some(f) = self.distribution {
            kwargs.insert("distribution".to_string(), Node::apply(f, vec![], IndexMap::new()));
        }
        for (k, v) in self.extra {
            kwargs.insert(k, as_graph(v));
        }
        Node::apply(Func::Builtin(Builtin::VariableMarker), vec![], kwargs)
    }
}

/**
 * Starts building a variable leaf, to be bound at `evaluate` time by `name`.
 */
pub fn variable(name: impl Into<String>, value_type: ValueType) -> VariableSpec {
    VariableSpec::new(name, value_type)
}
