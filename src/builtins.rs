//! Host callables standing in for the Python builtins (`int`, `float`,
//! `abs`, ...) that the node model's conversion operators dispatch to via
//! `Apply(host_builtin, operand, ...)` (spec §4.2). These are ordinary
//! [`Callable`] implementors, not part of the closed [`Builtin`](crate::func::Builtin)
//! set the evaluator matches by identity.

use crate::error::Result;
use crate::func::{Func, NativeFn};
use crate::value::Value;

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

fn as_i64(v: &Value) -> i64 {
    match v {
        Value::Int(i) => *i,
        Value::Float(f) => *f as i64,
        Value::Bool(b) => *b as i64,
        other => panic!("expected a numeric value, got {:?}", other),
    }
}

pub fn abs_fn() -> Func {
    Func::host(NativeFn::new("abs", |args: &[Value]| -> Result<Value> {
        match args {
            [Value::Int(i)] => Ok(Value::Int(i.abs())),
            [Value::Float(f)] => Ok(Value::Float(f.abs())),
            other => panic!("abs() expects one numeric argument, got {:?}", other),
        }
    }))
}

pub fn int_fn() -> Func {
    Func::host(NativeFn::new("int", |args: &[Value]| -> Result<Value> {
        match args {
            [v] => Ok(Value::Int(as_i64(v))),
            other => panic!("int() expects one argument, got {:?}", other),
        }
    }))
}

pub fn float_fn() -> Func {
    Func::host(NativeFn::new("float", |args: &[Value]| -> Result<Value> {
        match args {
            [v] => Ok(Value::Float(as_f64(v))),
            other => panic!("float() expects one argument, got {:?}", other),
        }
    }))
}

pub fn complex_fn() -> Func {
    Func::host(NativeFn::new("complex", |args: &[Value]| -> Result<Value> {
        match args {
            [re] => Ok(Value::Complex(as_f64(re), 0.0)),
            [re, im] => Ok(Value::Complex(as_f64(re), as_f64(im))),
            other => panic!("complex() expects one or two arguments, got {:?}", other),
        }
    }))
}

pub fn oct_fn() -> Func {
    Func::host(NativeFn::new("oct", |args: &[Value]| -> Result<Value> {
        match args {
            [v] => Ok(Value::Str(format!("0o{:o}", as_i64(v)))),
            other => panic!("oct() expects one argument, got {:?}", other),
        }
    }))
}

pub fn hex_fn() -> Func {
    Func::host(NativeFn::new("hex", |args: &[Value]| -> Result<Value> {
        match args {
            [v] => Ok(Value::Str(format!("0x{:x}", as_i64(v)))),
            other => panic!("hex() expects one argument, got {:?}", other),
        }
    }))
}

fn mod_pow(base: i64, exp: i64, modulo: i64) -> i64 {
    let mut base = base.rem_euclid(modulo);
    let mut exp = exp;
    let mut result = 1i64 % modulo;
    while exp > 0 {
        if exp & 1 == 1 {
            result = (result * base).rem_euclid(modulo);
        }
        base = (base * base).rem_euclid(modulo);
        exp >>= 1;
    }
    result
}

pub fn pow_fn() -> Func {
    Func::host(NativeFn::new("pow", |args: &[Value]| -> Result<Value> {
        match args {
            [base, exp] => Ok(Value::Float(as_f64(base).powf(as_f64(exp)))),
            [base, exp, modulo] => {
                Ok(Value::Int(mod_pow(as_i64(base), as_i64(exp), as_i64(modulo))))
            }
            other => panic!("pow() expects two or three arguments, got {:?}", other),
        }
    }))
}

pub fn divmod_fn() -> Func {
    Func::host(NativeFn::new("divmod", |args: &[Value]| -> Result<Value> {
        match args {
            [Value::Int(a), Value::Int(b)] => Ok(Value::Tuple(vec![
                Value::Int(a.div_euclid(*b)),
                Value::Int(a.rem_euclid(*b)),
            ])),
            [a, b] => {
                let (a, b) = (as_f64(a), as_f64(b));
                let quotient = (a / b).floor();
                Ok(Value::Tuple(vec![Value::Float(quotient), Value::Float(a - quotient * b)]))
            }
            other => panic!("divmod() expects two arguments, got {:?}", other),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn int_truncates_float() {
        let f = int_fn();
        let callable = match &f {
            Func::Host(c) => c,
            _ => unreachable!(),
        };
        assert_eq!(
            callable.call(&[Value::Float(3.7)], &IndexMap::new()).unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn divmod_matches_floor_division() {
        let f = divmod_fn();
        let callable = match &f {
            Func::Host(c) => c,
            _ => unreachable!(),
        };
        assert_eq!(
            callable.call(&[Value::Int(9), Value::Int(4)], &IndexMap::new()).unwrap(),
            Value::Tuple(vec![Value::Int(2), Value::Int(1)])
        );
    }
}
