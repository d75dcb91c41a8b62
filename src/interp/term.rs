use std::fmt;

use crate::interp::bits::Bitstring;
use crate::ir::constant::Constant;
use crate::ir::function::FunctionSymbol;
use crate::ir::types::TermType;

/// A runtime term.
#[derive(Debug, Clone)]
pub enum Term {
    Int(i64),
    Float(f64),
    Atom(String),
    Nil,
    Cons(Box<Term>, Box<Term>),
    Tuple(Vec<Term>),
    /// Pairs with unique keys, in insertion order.
    Map(Vec<(Term, Term)>),
    Bits(Bitstring),
    Closure {
        callee: FunctionSymbol,
        env: Vec<Term>,
    },
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.exact_eq(other)
    }
}

impl Term {
    pub fn atom(name: &str) -> Self {
        Term::Atom(name.to_owned())
    }

    pub fn boolean(b: bool) -> Self {
        Term::atom(if b { "true" } else { "false" })
    }

    pub fn binary(bytes: &[u8]) -> Self {
        Term::Bits(Bitstring::from_bytes(bytes))
    }

    /// A proper list of `items`.
    pub fn list(items: Vec<Term>) -> Self {
        items
            .into_iter()
            .rev()
            .fold(Term::Nil, |tail, head| Term::Cons(Box::new(head), Box::new(tail)))
    }

    pub fn tuple(items: Vec<Term>) -> Self {
        Term::Tuple(items)
    }

    /// Builds a map; later duplicate keys win.
    pub fn map(pairs: Vec<(Term, Term)>) -> Self {
        let mut map = Term::Map(Vec::new());
        for (k, v) in pairs {
            map.map_put(k, v);
        }
        map
    }

    pub fn from_constant(c: &Constant) -> Self {
        match c {
            Constant::Int(n) => Term::Int(*n),
            Constant::Float(x) => Term::Float(*x),
            Constant::Atom(a) => Term::Atom(a.clone()),
            Constant::Nil => Term::Nil,
            Constant::Tuple(elems) => Term::Tuple(elems.iter().map(Term::from_constant).collect()),
            Constant::List(items) => Term::list(items.iter().map(Term::from_constant).collect()),
            Constant::Binary(bytes) => Term::binary(bytes),
            Constant::Map(pairs) => Term::map(
                pairs
                    .iter()
                    .map(|(k, v)| (Term::from_constant(k), Term::from_constant(v)))
                    .collect(),
            ),
        }
    }

    /// Whether this term belongs to `ty`.
    pub fn has_type(&self, ty: TermType) -> bool {
        match (ty, self) {
            (TermType::Any, _) => true,
            (TermType::List, Term::Nil | Term::Cons(..)) => true,
            (TermType::Number, Term::Int(_) | Term::Float(_)) => true,
            (TermType::Integer, Term::Int(_)) => true,
            (TermType::Float, Term::Float(_)) => true,
            (TermType::Atom, Term::Atom(_)) => true,
            (TermType::Boolean, Term::Atom(a)) => a == "true" || a == "false",
            (TermType::Nil, Term::Nil) => true,
            (TermType::Cons, Term::Cons(..)) => true,
            (TermType::Tuple(n), Term::Tuple(elems)) => elems.len() == n as usize,
            (TermType::Map, Term::Map(_)) => true,
            (TermType::Closure, Term::Closure { .. }) => true,
            (TermType::Binary, Term::Bits(_)) => true,
            _ => false,
        }
    }

    /// Exact equality: integers never equal floats and maps compare as
    /// unordered sets of pairs.
    pub fn exact_eq(&self, other: &Term) -> bool {
        match (self, other) {
            (Term::Int(a), Term::Int(b)) => a == b,
            (Term::Float(a), Term::Float(b)) => a == b,
            (Term::Atom(a), Term::Atom(b)) => a == b,
            (Term::Nil, Term::Nil) => true,
            (Term::Cons(h1, t1), Term::Cons(h2, t2)) => h1.exact_eq(h2) && t1.exact_eq(t2),
            (Term::Tuple(a), Term::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.exact_eq(y))
            }
            (Term::Map(a), Term::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        b.iter().any(|(k2, v2)| k.exact_eq(k2) && v.exact_eq(v2))
                    })
            }
            (Term::Bits(a), Term::Bits(b)) => a == b,
            (
                Term::Closure { callee: c1, env: e1 },
                Term::Closure { callee: c2, env: e2 },
            ) => c1 == c2 && e1.len() == e2.len() && e1.iter().zip(e2).all(|(x, y)| x.exact_eq(y)),
            _ => false,
        }
    }

    pub fn map_get(&self, key: &Term) -> Option<&Term> {
        match self {
            Term::Map(pairs) => pairs.iter().find(|(k, _)| k.exact_eq(key)).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Inserts or overwrites `key`. No-op on non-maps.
    pub fn map_put(&mut self, key: Term, value: Term) {
        if let Term::Map(pairs) = self {
            match pairs.iter_mut().find(|(k, _)| k.exact_eq(&key)) {
                Some(slot) => slot.1 = value,
                None => pairs.push((key, value)),
            }
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Term]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Int(n) => write!(f, "{}", n),
            Term::Float(x) => write!(f, "{:?}", x),
            Term::Atom(a) => write!(f, "{}", a),
            Term::Nil => write!(f, "[]"),
            Term::Cons(head, tail) => {
                write!(f, "[{}", head)?;
                let mut rest = tail.as_ref();
                loop {
                    match rest {
                        Term::Nil => break,
                        Term::Cons(h, t) => {
                            write!(f, ", {}", h)?;
                            rest = t.as_ref();
                        }
                        improper => {
                            write!(f, " | {}", improper)?;
                            break;
                        }
                    }
                }
                write!(f, "]")
            }
            Term::Tuple(elems) => {
                write!(f, "{{")?;
                write_seq(f, elems)?;
                write!(f, "}}")
            }
            Term::Map(pairs) => {
                write!(f, "#{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "}}")
            }
            Term::Bits(bits) => write!(f, "{}", bits),
            Term::Closure { callee, env } => write!(f, "#Fun<{}>/{}", callee, env.len()),
        }
    }
}
