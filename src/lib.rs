#![deny(rustdoc::broken_intra_doc_links)]

//! A deferred-evaluation expression graph: host values are lifted into a DAG
//! of pending function applications with symbolic variable leaves, which can
//! be traversed, cloned, bound against bindings, and lazily evaluated with
//! memoization. Grounded on `searchspaces/partialplus.py`'s `partial`/`Node`
//! model, rendered with this crate's own node representation and traversal
//! in place of the original's generator-based recursion.

mod bind;
mod build;
mod builtins;
mod clone_graph;
mod error;
mod eval;
mod func;
mod lift;
mod node;
mod traverse;
mod value;

pub use bind::{ArgBinding, ArgBindings};
pub use build::{is_list_node, is_positional_list_node, is_sequence_node, is_tuple_node, is_variable};
pub use build::{literal, partial, partial_args};
pub use build::{variable, ValueType, VariableSpec};
pub use builtins::{abs_fn, complex_fn, divmod_fn, float_fn, hex_fn, int_fn, oct_fn, pow_fn};
pub use clone_graph::clone_graph;
pub use error::{Error, Result};
pub use eval::{evaluate, evaluate_with, Bindings, Instantiator};
pub use func::{Builtin, Callable, Func, NativeFn, Signature};
pub use lift::{as_graph, as_map, as_tuple, Liftable};
pub use node::{Node, NodeId};
pub use traverse::{depth_first, topological, DepthFirst, Topological};
pub use value::{Slice, Value};
