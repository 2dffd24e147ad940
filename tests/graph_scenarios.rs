use std::collections::HashMap;

use exprgraph::{
    as_graph, as_map, as_tuple, clone_graph, depth_first, evaluate, is_variable, partial_args,
    topological, variable, Builtin, Error, Func, Liftable, NativeFn, Node, ValueType, Value,
};

fn add_fn() -> Func {
    Func::host(NativeFn::new("add", |args: &[Value]| match args {
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a + b)),
        _ => panic!("add expects two ints"),
    }))
}

fn sub_fn() -> Func {
    Func::host(NativeFn::new("sub", |args: &[Value]| match args {
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a - b)),
        _ => panic!("sub expects two ints"),
    }))
}

fn mod_fn() -> Func {
    Func::host(NativeFn::new("mod", |args: &[Value]| match args {
        [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a.rem_euclid(*b))),
        _ => panic!("mod expects two ints"),
    }))
}

/**
 * A nested literal tuple containing a pending `add` call lifts and evaluates
 * element-by-element, with the float conversion producing a genuine `Float`.
 */
#[test]
fn nested_tuple_with_a_pending_call_evaluates_recursively() {
    let inner = as_tuple(vec![Liftable::Scalar(Value::Int(3)), partial_args(add_fn(), vec![2i64, 3]).into()]);
    let x = as_graph(as_tuple(vec![
        inner,
        partial_args(add_fn(), vec![5i64, 7]).into(),
        partial_args(exprgraph::float_fn(), vec![9i64]).into(),
    ]));

    let y = evaluate(&x, &HashMap::new()).unwrap();
    assert_eq!(
        y,
        Value::Tuple(vec![
            Value::Tuple(vec![Value::Int(3), Value::Int(5)]),
            Value::Int(12),
            Value::Float(9.0),
        ])
    );
}

/**
 * Same shape as the tuple scenario above, but with the outer and inner
 * sequences lifted as lists and a `sub` call in place of `add`.
 */
#[test]
fn nested_list_with_a_pending_call_evaluates_recursively() {
    let inner = as_tuple(vec![Liftable::Scalar(Value::Int(3)), partial_args(sub_fn(), vec![2i64, 3]).into()]);
    let x = as_graph(Liftable::List(vec![
        Liftable::Node(as_graph(inner)),
        partial_args(sub_fn(), vec![5i64, 7]).into(),
        partial_args(exprgraph::float_fn(), vec![9i64]).into(),
    ]));

    let y = evaluate(&x, &HashMap::new()).unwrap();
    assert_eq!(
        y,
        Value::List(vec![
            Value::Tuple(vec![Value::Int(3), Value::Int(-1)]),
            Value::Int(-2),
            Value::Float(9.0),
        ])
    );
}

/**
 * A mapping with pending-call values and a nested literal container,
 * evaluating to a `Value::Map` with each entry resolved independently.
 */
#[test]
fn mapping_with_pending_call_values_evaluates_each_entry() {
    let x = as_graph(as_map(vec![
        (Value::Int(5), partial_args(mod_fn(), vec![5i64, 3]).into()),
        (Value::Int(3), as_tuple(vec![7i64, 9])),
        (Value::Int(4), Liftable::List(vec![partial_args(mod_fn(), vec![9i64, 4]).into()])),
    ]));

    let y = evaluate(&x, &HashMap::new()).unwrap();
    match y {
        Value::Map(pairs) => {
            assert_eq!(pairs.len(), 3);
            assert_eq!(pairs[0], (Value::Int(5), Value::Int(2)));
            assert_eq!(pairs[1], (Value::Int(3), Value::Tuple(vec![Value::Int(7), Value::Int(9)])));
            assert_eq!(pairs[2], (Value::Int(4), Value::List(vec![Value::Int(1)])));
        }
        other => panic!("expected a Map, got {:?}", other),
    }
}

/**
 * The depth-first ordering from a diamond-shaped dependency graph: a
 * consumer is visited before either of its producers, but a shared
 * grandparent need only outrank one of its two parents (§8 scenario).
 */
#[test]
fn depth_first_traversal_orders_a_diamond_loosely() {
    let p1 = partial_args(exprgraph::float_fn(), vec![5.0]);
    let p2 = p1.clone() + Node::literal(Value::Float(0.5));
    let p3 = p1.clone() / p2.clone();
    let p4 = p2.clone() * p3.clone();
    let p5 = partial_args(exprgraph::int_fn(), vec![p4.clone()]);

    let order: Vec<Node> = depth_first(p5.clone()).collect::<exprgraph::Result<Vec<_>>>().unwrap();
    let index = |n: &Node| order.iter().position(|x| x.is_same_node(n)).unwrap();

    assert_eq!(index(&p5), 0);
    assert_eq!(index(&p4), 1);
    assert!(index(&p3) > index(&p4));
    assert!(index(&p2) > index(&p3) || index(&p2) > index(&p4));
    assert!(index(&p1) > index(&p2) || index(&p1) > index(&p3));
}

/**
 * The matching topological scenario: here the stricter guarantee holds,
 * every producer strictly outranks both of its consumers, down to the
 * `Literal` leaves.
 */
#[test]
fn topological_sort_orders_every_producer_after_both_consumers() {
    let p1 = partial_args(exprgraph::float_fn(), vec![5i64]);
    let p2 = p1.clone() + Node::literal(Value::Float(0.5));
    let p3 = p1.clone() / p2.clone();
    let p4 = p2.clone() * p3.clone();
    let p5 = partial_args(exprgraph::int_fn(), vec![p4.clone()]);

    let order: Vec<Node> = topological(p5.clone()).collect::<exprgraph::Result<Vec<_>>>().unwrap();
    let index = |n: &Node| order.iter().position(|x| x.is_same_node(n)).unwrap();

    assert_eq!(index(&p5), 0);
    assert_eq!(index(&p4), 1);
    assert!(index(&p1) > index(&p2) && index(&p1) > index(&p3));
    assert!(index(&p2) > index(&p3) && index(&p2) > index(&p4));

    let five = Node::literal(Value::Int(5));
    let half = Node::literal(Value::Float(0.5));
    assert!(order.iter().position(|x| x == &five).unwrap() > index(&p1));
    assert!(order.iter().position(|x| x == &half).unwrap() > index(&p2));
}

/**
 * Two identical host objects lifted into the same graph remain the same
 * node after evaluation, regardless of how deeply each occurrence is
 * nested (§8 scenario, sharing survives lifting and evaluation).
 */
#[test]
fn shared_object_identity_survives_lifting_and_evaluation() {
    struct Marker;
    impl exprgraph::Callable for Marker {
        fn name(&self) -> &str {
            "marker"
        }
        fn signature(&self) -> exprgraph::Signature {
            exprgraph::Signature::new(vec![])
        }
        fn call(&self, _args: &[Value], _kwargs: &indexmap::IndexMap<String, Value>) -> exprgraph::Result<Value> {
            Ok(Value::Str("a-fresh-object".to_string()))
        }
    }

    let p = partial_args::<Value>(Func::host(Marker), vec![]);
    let q = as_graph(Liftable::List(vec![
        Liftable::Node(p.clone()),
        Liftable::List(vec![Liftable::Scalar(Value::Int(0)), Liftable::Scalar(Value::Int(1)), Liftable::Node(p.clone())]),
        as_tuple(vec![as_tuple(vec![Liftable::Node(p)])]),
    ]));

    let r = evaluate(&q, &HashMap::new()).unwrap();
    match r {
        Value::List(items) => {
            let first = &items[0];
            let inner_list = &items[1];
            let inner_tuple = &items[2];
            let second = match inner_list {
                Value::List(inner) => &inner[2],
                other => panic!("expected a List, got {:?}", other),
            };
            let third = match inner_tuple {
                Value::Tuple(outer) => match &outer[0] {
                    Value::Tuple(inner) => &inner[0],
                    other => panic!("expected a Tuple, got {:?}", other),
                },
                other => panic!("expected a Tuple, got {:?}", other),
            };
            assert_eq!(first, second);
            assert_eq!(first, third);
        }
        other => panic!("expected a List, got {:?}", other),
    }
}

/**
 * A self-referencing keyword edge is a cycle whether or not it sits at the
 * traversal root, and is reported the same way from both traversal orders.
 */
#[test]
fn cycle_detection_agrees_across_both_traversal_orders() {
    let p1 = partial_args(exprgraph::float_fn(), vec![5i64]);
    let p2 = partial_args(exprgraph::int_fn(), vec![p1.clone()]);
    p1.set_kwarg("not_a_real_keyword", p2.clone());

    assert_eq!(depth_first(p2.clone()).collect::<exprgraph::Result<Vec<_>>>(), Err(Error::Cycle));
    assert_eq!(topological(p2).collect::<exprgraph::Result<Vec<_>>>(), Err(Error::Cycle));
}

/**
 * `clone_graph` produces a structurally identical, non-identical graph: the
 * clone evaluates to the same value but shares no node with the source.
 */
#[test]
fn cloned_graph_evaluates_the_same_but_shares_no_nodes() {
    let shared = partial_args(exprgraph::int_fn(), vec![5i64]);
    let root = as_graph(Liftable::List(vec![Liftable::Node(shared.clone()), Liftable::Node(shared.clone())]));

    let cloned = clone_graph(&root).unwrap();
    assert!(!cloned.is_same_node(&root));
    assert_eq!(evaluate(&cloned, &HashMap::new()).unwrap(), evaluate(&root, &HashMap::new()).unwrap());

    let cloned_children = cloned.args();
    assert!(cloned_children[0].is_same_node(&cloned_children[1]));
}

/**
 * A `variable` leaf participating in a larger expression resolves from
 * `evaluate`'s bindings exactly like any other leaf, and `is_variable`
 * distinguishes it from an ordinary `Apply`.
 */
#[test]
fn variable_leaf_resolves_within_a_larger_expression() {
    let lr = variable("lr", ValueType::Float).minimum(1e-4).maximum(1.0).log_scale(true).build();
    assert!(is_variable(&lr));

    let scaled = lr * Node::literal(Value::Float(2.0));
    let mut bindings = HashMap::new();
    bindings.insert("lr".to_string(), Value::Float(0.25));
    assert_eq!(evaluate(&scaled, &bindings).unwrap(), Value::Float(0.5));
}

/**
 * `getitem` via the fluent `.get_item` method evaluates without visiting
 * the sibling that was not selected, and the crate's own `Builtin::GetItem`
 * is recognizable from the outside.
 */
#[test]
fn get_item_short_circuits_through_the_public_api() {
    let boom = NativeFn::new("boom", |_: &[Value]| -> exprgraph::Result<Value> {
        panic!("unselected branch must not be evaluated")
    });
    let picked = as_graph(Liftable::List(vec![
        Liftable::Scalar(Value::Int(-1)),
        Liftable::Node(Node::apply(Func::host(boom), vec![], indexmap::IndexMap::new())),
    ]))
    .get_item(Value::Int(0));

    assert_eq!(picked.func().unwrap().as_builtin(), Some(Builtin::GetItem));
    assert_eq!(evaluate(&picked, &HashMap::new()).unwrap(), Value::Int(-1));
}
