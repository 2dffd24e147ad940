use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::value::Value;

use indexmap::IndexMap;

/**
 * The closed set of distinguished callable identities the lifter and
 * evaluator recognize by direct match rather than by pointer comparison on a
 * trait object.
 *
 * Recognizing these by a small enum (instead of, say, comparing
 * `Rc<dyn Callable>` pointers) keeps sequence/mapping/variable detection
 * exact rather than structural: a user-supplied `Host` callable that happens
 * to behave like `make_list` is never mistaken for it.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /**
     * Constructs a host list from its arguments, in order.
     */
    MakeList,

    /**
     * Constructs a host tuple from its arguments, in order.
     */
    MakeTuple,

    /**
     * Calls a wrapped constructor (the first argument, a `Literal`) with the
     * remaining arguments collected into a single positional list. Used to
     * rebuild a lifted mapping from its `(key, value)` pair nodes.
     */
    ApplyWithPositionalList,

    /**
     * Marks an `Apply` as a variable leaf; its attributes are carried as
     * keyword children.
     */
    VariableMarker,

    /**
     * Dispatches a binary arithmetic/bitwise/shift/comparison operator,
     * selected by a `Literal(op_symbol)` keyword/positional child.
     */
    BinaryOpDispatch,

    /**
     * Dispatches a unary arithmetic/bitwise operator, selected by a
     * `Literal(op_symbol)` child.
     */
    UnaryOpDispatch,

    /**
     * Indexes a container by a key/index/slice.
     */
    GetItem,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::MakeList => "make_list",
            Builtin::MakeTuple => "make_tuple",
            Builtin::ApplyWithPositionalList => "apply_with_positional_list",
            Builtin::VariableMarker => "variable_marker",
            Builtin::BinaryOpDispatch => "binary_op_dispatch",
            Builtin::UnaryOpDispatch => "unary_op_dispatch",
            Builtin::GetItem => "getitem",
        }
    }
}

/**
 * The parameter schema a [`Callable`] must declare, standing in for the
 * reflection Python's `__code__`/`co_varnames` would provide. The param
 * binder (`Apply::bind_args`) walks this instead of introspecting the
 * callable at runtime.
 */
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    /**
     * Ordered names of the callable's positional-or-keyword parameters.
     */
    pub positional: Vec<String>,

    /**
     * Name of the variadic-positional parameter (`*args`-equivalent), if any.
     */
    pub varargs: Option<String>,

    /**
     * Name of the variadic-keyword parameter (`**kwargs`-equivalent), if any.
     */
    pub varkwargs: Option<String>,

    /**
     * Default values for the trailing `defaults.len()` entries of
     * `positional`, right-aligned (mirrors Python's `__defaults__`).
     */
    pub defaults: Vec<Value>,
}

impl Signature {
    pub fn new(positional: Vec<&str>) -> Self {
        Self {
            positional: positional.into_iter().map(String::from).collect(),
            varargs: None,
            varkwargs: None,
            defaults: Vec::new(),
        }
    }

    pub fn with_varargs(mut self, name: &str) -> Self {
        self.varargs = Some(name.to_string());
        self
    }

    pub fn with_varkwargs(mut self, name: &str) -> Self {
        self.varkwargs = Some(name.to_string());
        self
    }

    pub fn with_defaults(mut self, defaults: Vec<Value>) -> Self {
        self.defaults = defaults;
        self
    }
}

/**
 * A user-supplied callable that an `Apply` node's `func` can wrap. Implement
 * this for the functions your graph applies; register its parameter schema
 * by hand via [`Callable::signature`] since Rust has no runtime introspection
 * into a closure's parameter list.
 */
pub trait Callable {
    /**
     * A human-readable name, used in error messages and `Debug` output.
     */
    fn name(&self) -> &str;

    /**
     * The parameter schema used by the param binder.
     */
    fn signature(&self) -> Signature;

    /**
     * Invokes this callable with already-evaluated arguments.
     */
    fn call(&self, args: &[Value], kwargs: &IndexMap<String, Value>) -> Result<Value>;
}

/**
 * An opaque callable identity carried by an `Apply` node: either one of the
 * engine's own distinguished [`Builtin`]s, or a user-registered [`Callable`].
 */
#[derive(Clone)]
pub enum Func {
    Builtin(Builtin),
    Host(Rc<dyn Callable>),
}

impl Func {
    pub fn name(&self) -> &str {
        match self {
            Func::Builtin(b) => b.name(),
            Func::Host(c) => c.name(),
        }
    }

    pub fn as_builtin(&self) -> Option<Builtin> {
        match self {
            Func::Builtin(b) => Some(*b),
            Func::Host(_) => None,
        }
    }

    pub fn host(callable: impl Callable + 'static) -> Self {
        Func::Host(Rc::new(callable))
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Func({})", self.name())
    }
}

/**
 * A [`Callable`] wrapping a plain Rust closure over already-evaluated
 * positional arguments, for the common case of a host builtin (`abs`, `int`,
 * `float`, ...) that ignores keyword arguments entirely and has no
 * meaningful parameter names to register beyond `*args`.
 */
pub struct NativeFn<F> {
    name: String,
    f: F,
}

impl<F> NativeFn<F>
where
    F: Fn(&[Value]) -> Result<Value>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Callable for NativeFn<F>
where
    F: Fn(&[Value]) -> Result<Value>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> Signature {
        Signature::new(vec![]).with_varargs("args")
    }

    fn call(&self, args: &[Value], _kwargs: &IndexMap<String, Value>) -> Result<Value> {
        (self.f)(args)
    }
}
