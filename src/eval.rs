use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::func::{Builtin, Func};
use crate::node::{Node, NodeId};
use crate::value::Value;

/**
 * Bindings supplied to `evaluate`/`evaluate_with`: a name to value map used
 * to resolve variable leaves.
 */
pub type Bindings = HashMap<String, Value>;

/**
 * A hook that replaces the direct invocation of an `Apply`'s `func` during
 * evaluation, so user code can intercept calls (logging, lazy object
 * construction, symbolic backends) without touching the evaluator itself
 * (§4.4).
 */
pub trait Instantiator {
    fn instantiate(&self, func: &Func, args: &[Value], kwargs: &IndexMap<String, Value>) -> Result<Value>;
}

struct DirectInstantiator;

impl Instantiator for DirectInstantiator {
    fn instantiate(&self, func: &Func, args: &[Value], kwargs: &IndexMap<String, Value>) -> Result<Value> {
        invoke(func, args, kwargs)
    }
}

/**
 * Evaluates `root` against `bindings`, invoking every `func` directly.
 */
pub fn evaluate(root: &Node, bindings: &Bindings) -> Result<Value> {
    evaluate_with(root, bindings, &DirectInstantiator)
}

/**
 * Evaluates `root` against `bindings`, routing every call through
 * `instantiator` instead of invoking `func` directly.
 */
pub fn evaluate_with(root: &Node, bindings: &Bindings, instantiator: &dyn Instantiator) -> Result<Value> {
    let mut cache: HashMap<NodeId, Value> = HashMap::new();
    eval_node(root, bindings, instantiator, &mut cache)
}

fn eval_node(node: &Node, bindings: &Bindings, instantiator: &dyn Instantiator, cache: &mut HashMap<NodeId, Value>) -> Result<Value> {
    let id = node.id();
    if let Some(v) = cache.get(&id) {
        return Ok(v.clone());
    }

    if let Some(value) = node.literal_value() {
        cache.insert(id, value.clone());
        return Ok(value);
    }

    let func = node.func().expect("non-literal node must be an Apply");
    let builtin = func.as_builtin();

    if builtin == Some(Builtin::GetItem) {
        if let Some(result) = eval_getitem_short_circuit(node, bindings, instantiator, cache)? {
            cache.insert(id, result.clone());
            return Ok(result);
        }
    }

    if builtin == Some(Builtin::VariableMarker) {
        let kwargs = node.kwargs();
        let name_node = kwargs
            .get("name")
            .expect("variable node is missing its 'name' keyword");
        let name_value = eval_node(name_node, bindings, instantiator, cache)?;
        let name = match name_value {
            Value::Str(s) => s,
            other => panic!("variable 'name' must be a string, got {:?}", other),
        };
        let value = bindings
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::UnboundVariable(name.clone()))?;
        cache.insert(id, value.clone());
        return Ok(value);
    }

    let args = node
        .args()
        .iter()
        .map(|a| eval_node(a, bindings, instantiator, cache))
        .collect::<Result<Vec<_>>>()?;
    let kwargs = node
        .kwargs()
        .iter()
        .map(|(k, v)| eval_node(v, bindings, instantiator, cache).map(|val| (k.clone(), val)))
        .collect::<Result<IndexMap<_, _>>>()?;

    let result = instantiator.instantiate(&func, &args, &kwargs)?;
    cache.insert(id, result.clone());
    Ok(result)
}

/**
 * Implements the lazy index short-circuit (§4.4 point 4): if `node` is
 * `Apply(getitem, container, index)` and `container` is a sequence
 * constructor, only `index` (and, transitively, the selected element(s) of
 * `container`) is evaluated. Returns `Ok(None)` when `node` does not match
 * this shape, so the caller falls through to the general-apply path.
 */
fn eval_getitem_short_circuit(
    node: &Node,
    bindings: &Bindings,
    instantiator: &dyn Instantiator,
    cache: &mut HashMap<NodeId, Value>,
) -> Result<Option<Value>> {
    let args = node.args();
    if args.len() != 2 {
        return Ok(None);
    }
    let container = &args[0];
    let index_node = &args[1];

    let container_builtin = match container.func().and_then(|f| f.as_builtin()) {
        Some(b @ Builtin::MakeList) | Some(b @ Builtin::MakeTuple) => b,
        _ => return Ok(None),
    };

    let index_value = eval_node(index_node, bindings, instantiator, cache)?;
    let container_args = container.args();

    if let Some(i) = index_value.as_index() {
        let idx = resolve_index(i, container_args.len());
        let elem = eval_node(&container_args[idx], bindings, instantiator, cache)?;
        return Ok(Some(elem));
    }

    if let Some(slice) = index_value.as_slice() {
        let selected: Vec<Value> = slice
            .selected_indices(container_args.len())
            .into_iter()
            .map(|i| eval_node(&container_args[i], bindings, instantiator, cache))
            .collect::<Result<_>>()?;
        let container_func = Func::Builtin(container_builtin);
        let rebuilt = instantiator.instantiate(&container_func, &selected, &IndexMap::new())?;
        return Ok(Some(rebuilt));
    }

    panic!("getitem index must evaluate to an integer or a slice, got {:?}", index_value)
}

fn resolve_index(i: i64, len: usize) -> usize {
    if i < 0 {
        (i + len as i64) as usize
    } else {
        i as usize
    }
}

/**
 * Executes one of the engine's closed set of distinguished identities
 * (§4.4, §9: "Use a small, closed set of sentinel constructor tags rather
 * than comparing function pointers") or a user-registered [`Callable`](crate::func::Callable).
 */
fn invoke(func: &Func, args: &[Value], kwargs: &IndexMap<String, Value>) -> Result<Value> {
    match func {
        Func::Host(c) => c.call(args, kwargs),
        Func::Builtin(Builtin::MakeList) => Ok(Value::List(args.to_vec())),
        Func::Builtin(Builtin::MakeTuple) => Ok(Value::Tuple(args.to_vec())),
        Func::Builtin(Builtin::ApplyWithPositionalList) => Ok(build_map(args)),
        Func::Builtin(Builtin::VariableMarker) => Ok(Value::None),
        Func::Builtin(Builtin::BinaryOpDispatch) => binary_op(args),
        Func::Builtin(Builtin::UnaryOpDispatch) => unary_op(args),
        Func::Builtin(Builtin::GetItem) => getitem(args),
    }
}

fn build_map(args: &[Value]) -> Value {
    // args[0] is the lifted constructor placeholder (§4.1 rule 4); this
    // crate's closed `Value::Map` shape reconstructs the same way
    // regardless of what the host's original constructor was.
    let pairs = args[1..]
        .iter()
        .map(|pair| match pair {
            Value::Tuple(kv) | Value::List(kv) if kv.len() == 2 => (kv[0].clone(), kv[1].clone()),
            other => panic!("expected a (key, value) pair, got {:?}", other),
        })
        .collect();
    Value::Map(pairs)
}

fn op_symbol(v: &Value) -> &str {
    match v {
        Value::Str(s) => s.as_str(),
        other => panic!("operator symbol must be a string, got {:?}", other),
    }
}

fn binary_op(args: &[Value]) -> Result<Value> {
    let (lhs, rhs, op) = match args {
        [a, b, op] => (a, b, op_symbol(op)),
        other => panic!("binary_op_dispatch expects (lhs, rhs, op), got {:?}", other),
    };
    Ok(match op {
        "<" => Value::Bool(compare(lhs, rhs) == std::cmp::Ordering::Less),
        "<=" => Value::Bool(compare(lhs, rhs) != std::cmp::Ordering::Greater),
        ">" => Value::Bool(compare(lhs, rhs) == std::cmp::Ordering::Greater),
        ">=" => Value::Bool(compare(lhs, rhs) != std::cmp::Ordering::Less),
        _ => numeric_binary(op, lhs, rhs),
    })
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    as_f64(a).partial_cmp(&as_f64(b)).expect("cannot compare non-numeric values")
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        other => panic!("expected a numeric value, got {:?}", other),
    }
}

fn numeric_binary(op: &str, lhs: &Value, rhs: &Value) -> Value {
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        let (a, b) = (*a, *b);
        return Value::Int(match op {
            "+" => a + b,
            "-" => a - b,
            "*" => a * b,
            "/" => a / b,
            "%" => a % b,
            "|" => a | b,
            "^" => a ^ b,
            "&" => a & b,
            "<<" => a << b,
            ">>" => a >> b,
            other => panic!("unrecognized binary operator {:?}", other),
        });
    }
    let (a, b) = (as_f64(lhs), as_f64(rhs));
    Value::Float(match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" => a / b,
        "%" => a % b,
        other => panic!("operator {:?} is not defined on floating-point operands", other),
    })
}

fn unary_op(args: &[Value]) -> Result<Value> {
    let (operand, op) = match args {
        [v, op] => (v, op_symbol(op)),
        other => panic!("unary_op_dispatch expects (operand, op), got {:?}", other),
    };
    Ok(match (operand, op) {
        (Value::Int(i), "-") => Value::Int(-i),
        (Value::Int(i), "+") => Value::Int(*i),
        (Value::Int(i), "~") => Value::Int(!i),
        (Value::Float(f), "-") => Value::Float(-f),
        (Value::Float(f), "+") => Value::Float(*f),
        other => panic!("unsupported unary operator application: {:?}", other),
    })
}

fn getitem(args: &[Value]) -> Result<Value> {
    let (container, index) = match args {
        [c, i] => (c, i),
        other => panic!("getitem expects (container, index), got {:?}", other),
    };
    match container {
        Value::List(items) | Value::Tuple(items) => {
            if let Some(i) = index.as_index() {
                Ok(items[resolve_index(i, items.len())].clone())
            } else if let Some(slice) = index.as_slice() {
                let selected = slice
                    .selected_indices(items.len())
                    .into_iter()
                    .map(|i| items[i].clone())
                    .collect();
                Ok(if matches!(container, Value::Tuple(_)) {
                    Value::Tuple(selected)
                } else {
                    Value::List(selected)
                })
            } else {
                panic!("getitem index must be an integer or slice, got {:?}", index)
            }
        }
        Value::Map(pairs) => pairs
            .iter()
            .find(|(k, _)| k == index)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| panic!("key {:?} not found in mapping", index)),
        other => panic!("cannot index into {:?}", other),
    }
}
