use std::fmt;

/// Runtime value model.
///
/// `Clone` is the copy semantics of the language: every store and every read
/// clones, and lists hold their elements inline, so two bindings never share
/// storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    List(Vec<Value>),
}

impl Value {
    pub(super) fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }
}

impl fmt::Display for Value {
    /// Canonical `print` form: decimal integers, `True`/`False`, and
    /// `[e1, e2]` with elements rendered recursively.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Boolean(true) => write!(f, "True"),
            Value::Boolean(false) => write!(f, "False"),
            Value::List(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
        }
    }
}
