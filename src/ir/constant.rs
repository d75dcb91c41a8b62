use std::fmt;

use crate::ir::types::TermType;

/// A literal term known at compile time.
///
/// Constants appear as `Const` instruction payloads and as the attribute
/// table entries the front-end refers to by handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Atom(String),
    Nil,
    Tuple(Vec<Constant>),
    /// A proper list.
    List(Vec<Constant>),
    Binary(Vec<u8>),
    /// Key/value pairs with unique keys, in insertion order.
    Map(Vec<(Constant, Constant)>),
}

impl Constant {
    pub fn atom(name: impl Into<String>) -> Self {
        Constant::Atom(name.into())
    }

    /// The most precise static type of this literal.
    pub fn term_type(&self) -> TermType {
        match self {
            Constant::Int(_) => TermType::Integer,
            Constant::Float(_) => TermType::Float,
            Constant::Atom(a) if a == "true" || a == "false" => TermType::Boolean,
            Constant::Atom(_) => TermType::Atom,
            Constant::Nil => TermType::Nil,
            Constant::List(items) if items.is_empty() => TermType::Nil,
            Constant::List(_) => TermType::Cons,
            Constant::Tuple(elems) => TermType::Tuple(elems.len() as u32),
            Constant::Binary(_) => TermType::Binary,
            Constant::Map(_) => TermType::Map,
        }
    }

    /// Exact (`=:=`) equality: integers never equal floats, maps compare as
    /// unordered sets of pairs, and the empty list equals `Nil`.
    pub fn exact_eq(&self, other: &Constant) -> bool {
        match (self, other) {
            (Constant::Int(a), Constant::Int(b)) => a == b,
            (Constant::Float(a), Constant::Float(b)) => a == b,
            (Constant::Atom(a), Constant::Atom(b)) => a == b,
            (Constant::Nil, Constant::Nil) => true,
            (Constant::Nil, Constant::List(l)) | (Constant::List(l), Constant::Nil) => l.is_empty(),
            (Constant::Tuple(a), Constant::Tuple(b)) | (Constant::List(a), Constant::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.exact_eq(y))
            }
            (Constant::Binary(a), Constant::Binary(b)) => a == b,
            (Constant::Map(a), Constant::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        b.iter().any(|(k2, v2)| k.exact_eq(k2) && v.exact_eq(v2))
                    })
            }
            _ => false,
        }
    }

    /// Looks up `key` in a constant map. Returns `None` for non-maps.
    pub fn map_get(&self, key: &Constant) -> Option<&Constant> {
        match self {
            Constant::Map(pairs) => pairs.iter().find(|(k, _)| k.exact_eq(key)).map(|(_, v)| v),
            _ => None,
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Constant]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(n) => write!(f, "{}", n),
            Constant::Float(x) => write!(f, "{:?}", x),
            Constant::Atom(a) => write!(f, "'{}'", a),
            Constant::Nil => f.write_str("[]"),
            Constant::Tuple(elems) => {
                write!(f, "{{")?;
                write_seq(f, elems)?;
                write!(f, "}}")
            }
            Constant::List(items) => {
                write!(f, "[")?;
                write_seq(f, items)?;
                write!(f, "]")
            }
            Constant::Binary(bytes) => {
                write!(f, "<<")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", b)?;
                }
                write!(f, ">>")
            }
            Constant::Map(pairs) => {
                write!(f, "#{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}
