use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::func::Func;
use crate::node::Node;

/**
 * What an `Apply`'s positional/keyword children resolved to for one
 * declared parameter of the callable's [`Signature`](crate::func::Signature).
 */
#[derive(Debug, Clone, PartialEq)]
pub enum ArgBinding {
    /**
     * A single positional-or-keyword parameter bound to one child node.
     */
    Single(Node),

    /**
     * The variadic-positional parameter's overflow, in order. Empty if
     * nothing overflowed.
     */
    Extra(Vec<Node>),

    /**
     * The variadic-keyword parameter's routed entries. Empty if nothing was
     * routed there.
     */
    ExtraKw(IndexMap<String, Node>),

    /**
     * A required parameter that received no binding (the `MissingArgument`
     * sentinel of the node model).
     */
    Missing,
}

/**
 * The result of [`Node::bind_args`]: a mapping from every one of the
 * callable's declared parameter names (and its variadic-positional/keyword
 * parameters, if any) to an [`ArgBinding`].
 */
#[derive(Debug, Clone, Default)]
pub struct ArgBindings(IndexMap<String, ArgBinding>);

impl ArgBindings {
    pub fn get(&self, name: &str) -> Option<&ArgBinding> {
        self.0.get(name)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ArgBinding> {
        self.0.iter()
    }
}

impl std::ops::Index<&str> for ArgBindings {
    type Output = ArgBinding;

    fn index(&self, name: &str) -> &ArgBinding {
        self.0.get(name).unwrap_or_else(|| panic!("no such parameter: {}", name))
    }
}

impl Node {
    /**
     * Computes the parameter-name-to-child-node mapping for this `Apply`,
     * mimicking the callable's own argument resolution (§4.5). The
     * callable's [`Signature`](crate::func::Signature) stands in for the
     * runtime reflection (`__code__`/`co_varnames`) the original relies on,
     * since an arbitrary Rust value has no such introspection available.
     *
     * # Panics
     * If called on a `Literal` node, or on an `Apply` whose `func` is one
     * of the engine's own [`Builtin`](crate::func::Builtin) identities
     * rather than a registered host callable.
     */
    pub fn bind_args(&self) -> Result<ArgBindings> {
        let func = self.func().expect("bind_args called on a non-Apply node");
        let callable = match &func {
            Func::Host(c) => c,
            Func::Builtin(_) => panic!("bind_args is only defined for registered host callables"),
        };
        let sig = callable.signature();
        let args = self.args();
        let kwargs = self.kwargs();

        let mut bindings: IndexMap<String, ArgBinding> = IndexMap::new();
        let n_positional = sig.positional.len();

        if args.len() > n_positional {
            match &sig.varargs {
                Some(name) => {
                    bindings.insert(name.clone(), ArgBinding::Extra(args[n_positional..].to_vec()));
                }
                None => return Err(Error::TooManyPositional),
            }
        } else if let Some(name) = &sig.varargs {
            bindings.insert(name.clone(), ArgBinding::Extra(Vec::new()));
        }

        for (name, node) in sig.positional.iter().zip(args.iter()) {
            bindings.insert(name.clone(), ArgBinding::Single(node.clone()));
        }

        if let Some(name) = &sig.varkwargs {
            bindings.entry(name.clone()).or_insert_with(|| ArgBinding::ExtraKw(IndexMap::new()));
        }

        let positional_set: HashSet<&str> = sig.positional.iter().map(String::as_str).collect();

        for (name, node) in kwargs.iter() {
            if positional_set.contains(name.as_str()) && !bindings.contains_key(name) {
                bindings.insert(name.clone(), ArgBinding::Single(node.clone()));
            } else if bindings.contains_key(name) && Some(name) != sig.varkwargs.as_ref() {
                return Err(Error::DuplicateArgument(name.clone()));
            } else if let Some(varkwargs) = &sig.varkwargs {
                match bindings.get_mut(varkwargs) {
                    Some(ArgBinding::ExtraKw(map)) => {
                        map.insert(name.clone(), node.clone());
                    }
                    _ => unreachable!("varkwargs slot always pre-populated as ExtraKw"),
                }
            } else {
                return Err(Error::UnrecognizedKeyword(name.clone()));
            }
        }

        let n_defaults = sig.defaults.len();
        let first_defaulted = n_positional.saturating_sub(n_defaults);
        for (i, name) in sig.positional.iter().enumerate().skip(first_defaulted) {
            if !bindings.contains_key(name) {
                let default = sig.defaults[i - first_defaulted].clone();
                bindings.insert(name.clone(), ArgBinding::Single(Node::literal(default)));
            }
        }

        for name in &sig.positional {
            bindings.entry(name.clone()).or_insert(ArgBinding::Missing);
        }

        Ok(ArgBindings(bindings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::partial_args;
    use crate::error::Error;
    use crate::func::{Callable, Signature};
    use crate::value::Value;

    struct Fixed(Signature);
    impl Callable for Fixed {
        fn name(&self) -> &str {
            "f"
        }
        fn signature(&self) -> Signature {
            self.0.clone()
        }
        fn call(&self, _args: &[Value], _kwargs: &IndexMap<String, Value>) -> Result<Value> {
            Ok(Value::None)
        }
    }

    fn f(sig: Signature) -> Func {
        Func::host(Fixed(sig))
    }

    #[test]
    fn positional_and_default_binding() {
        // def f(a, b=None)
        let sig = Signature::new(vec!["a", "b"]).with_defaults(vec![Value::None]);

        let p = partial_args(f(sig.clone()), vec![0i64, 1i64]);
        let bindings = p.bind_args().unwrap();
        assert_eq!(bindings["a"], ArgBinding::Single(Node::literal(Value::Int(0))));
        assert_eq!(bindings["b"], ArgBinding::Single(Node::literal(Value::Int(1))));

        let p = partial_args(f(sig.clone()), vec![0i64]);
        let bindings = p.bind_args().unwrap();
        assert_eq!(bindings["a"], ArgBinding::Single(Node::literal(Value::Int(0))));
        assert_eq!(bindings["b"], ArgBinding::Single(Node::literal(Value::None)));

        let mut kwargs = IndexMap::new();
        kwargs.insert("a".to_string(), 2i64.into());
        kwargs.insert("b".to_string(), 5i64.into());
        let p = crate::build::partial(f(sig), vec![], kwargs);
        let bindings = p.bind_args().unwrap();
        assert_eq!(bindings["a"], ArgBinding::Single(Node::literal(Value::Int(2))));
        assert_eq!(bindings["b"], ArgBinding::Single(Node::literal(Value::Int(5))));
    }

    #[test]
    fn varargs_collects_overflow() {
        // def f(a, *b)
        let sig = Signature::new(vec!["a"]).with_varargs("b");
        let p = partial_args(f(sig), vec![0i64, 1, 2, 3]);
        let bindings = p.bind_args().unwrap();
        assert_eq!(bindings["a"], ArgBinding::Single(Node::literal(Value::Int(0))));
        assert_eq!(
            bindings["b"],
            ArgBinding::Extra(vec![
                Node::literal(Value::Int(1)),
                Node::literal(Value::Int(2)),
                Node::literal(Value::Int(3)),
            ])
        );
    }

    #[test]
    fn varkwargs_routes_unrecognized_keywords() {
        // def f(a, **b)
        let sig = Signature::new(vec!["a"]).with_varkwargs("b");
        let mut kwargs = IndexMap::new();
        kwargs.insert("foo".to_string(), 1i64.into());
        kwargs.insert("bar".to_string(), 2i64.into());
        kwargs.insert("baz".to_string(), 3i64.into());
        let p = crate::build::partial(f(sig), vec![0i64.into()], kwargs);
        let bindings = p.bind_args().unwrap();
        assert_eq!(bindings["a"], ArgBinding::Single(Node::literal(Value::Int(0))));
        match &bindings["b"] {
            ArgBinding::ExtraKw(map) => {
                assert_eq!(map["foo"], Node::literal(Value::Int(1)));
                assert_eq!(map["bar"], Node::literal(Value::Int(2)));
                assert_eq!(map["baz"], Node::literal(Value::Int(3)));
            }
            other => panic!("expected ExtraKw, got {:?}", other),
        }
    }

    #[test]
    fn too_many_positional_without_varargs_fails() {
        let sig = Signature::new(vec!["a"]);
        let p = partial_args(f(sig), vec![0i64, 1]);
        assert_eq!(p.bind_args(), Err(Error::TooManyPositional));
    }

    #[test]
    fn duplicate_argument_fails() {
        let sig = Signature::new(vec!["a", "b"]);
        let mut kwargs = IndexMap::new();
        kwargs.insert("a".to_string(), 9i64.into());
        let p = crate::build::partial(f(sig), vec![0i64.into(), 1i64.into()], kwargs);
        assert_eq!(p.bind_args(), Err(Error::DuplicateArgument("a".to_string())));
    }

    #[test]
    fn unrecognized_keyword_without_varkwargs_fails() {
        let sig = Signature::new(vec!["a"]);
        let mut kwargs = IndexMap::new();
        kwargs.insert("nope".to_string(), 1i64.into());
        let p = crate::build::partial(f(sig), vec![0i64.into()], kwargs);
        assert_eq!(p.bind_args(), Err(Error::UnrecognizedKeyword("nope".to_string())));
    }

    #[test]
    fn missing_required_parameter_is_sentinel() {
        let sig = Signature::new(vec!["a", "b"]);
        let p = partial_args(f(sig), vec![0i64]);
        let bindings = p.bind_args().unwrap();
        assert_eq!(bindings["b"], ArgBinding::Missing);
    }
}
