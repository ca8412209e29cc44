//! Runtime values.
//!
//! The engine has a fixed, small value universe: null, booleans, two
//! numeric tiers (`i64`, `f64`), interned-independent strings, shared
//! lists and maps, host objects, type references, and user function
//! references. Containers and objects have reference semantics: cloning
//! a `Value` clones a handle, not the contents.

use mel_ir::Name;
use rustc_hash::FxHashMap;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

#[cfg(test)]
mod tests;

/// Shared mutable cell used by container values.
///
/// The engine is single-threaded per evaluation, so `Rc<RefCell>` is
/// sufficient; a fresh engine is built for every run.
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Shared(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Identity comparison: same cell, not equal contents.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({:?})", &*self.0.borrow())
    }
}

/// Index of a registered host type in the accessor's type table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeHandle(pub u32);

/// Backing storage of a host object: its runtime type plus a dynamic
/// slot bag for property values.
#[derive(Debug)]
pub struct ObjectData {
    pub ty: TypeHandle,
    pub slots: FxHashMap<Box<str>, Value>,
}

impl ObjectData {
    pub fn new(ty: TypeHandle) -> Self {
        ObjectData {
            ty,
            slots: FxHashMap::default(),
        }
    }
}

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Shared<Vec<Value>>),
    /// Insertion-ordered key/value pairs. Lookup is linear; dictionaries
    /// in scripts are small and iteration order matters for `@format`
    /// output and tests.
    Map(Shared<Vec<(Value, Value)>>),
    Object(Shared<ObjectData>),
    /// A resolved type reference, e.g. the result of `[List<Int32>]`.
    Type(TypeHandle),
    /// A script-declared function, referenced by name.
    Function(Name),
}

/// Runtime type tag, used for overload matching and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
    Object,
    Type,
    Function,
    /// Matches any argument in a method signature.
    Any,
}

impl ValueType {
    /// Whether an argument of this runtime type satisfies a parameter
    /// declared as `param`. `Any` accepts everything; a `Float`
    /// parameter also accepts `Int` (the widening tier); `Null` is
    /// accepted by every reference-shaped parameter.
    pub fn accepts(param: ValueType, arg: ValueType) -> bool {
        if param == arg || param == ValueType::Any {
            return true;
        }
        match (param, arg) {
            (ValueType::Float, ValueType::Int) => true,
            (
                ValueType::Str | ValueType::List | ValueType::Map | ValueType::Object,
                ValueType::Null,
            ) => true,
            _ => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Str => "string",
            ValueType::List => "list",
            ValueType::Map => "map",
            ValueType::Object => "object",
            ValueType::Type => "type",
            ValueType::Function => "function",
            ValueType::Any => "any",
        }
    }
}

impl Value {
    pub fn str(text: impl Into<Rc<str>>) -> Self {
        Value::Str(text.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Shared::new(items))
    }

    pub fn map(pairs: Vec<(Value, Value)>) -> Self {
        Value::Map(Shared::new(pairs))
    }

    pub fn object(data: ObjectData) -> Self {
        Value::Object(Shared::new(data))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Str(_) => ValueType::Str,
            Value::List(_) => ValueType::List,
            Value::Map(_) => ValueType::Map,
            Value::Object(_) => ValueType::Object,
            Value::Type(_) => ValueType::Type,
            Value::Function(_) => ValueType::Function,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view with int→float widening; `None` for non-numbers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => {
                // Lossy above 2^53, same as the host's double conversion.
                #[expect(clippy::cast_precision_loss, reason = "widening tier is f64")]
                Some(*n as f64)
            }
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Condition coercion for `if`/`while`/`for`/`?:` and the logical
    /// operators. Null is false, numbers compare against zero, any
    /// other non-bool type is a type error at the call site.
    pub fn as_condition(&self) -> Option<bool> {
        match self {
            Value::Null => Some(false),
            Value::Bool(b) => Some(*b),
            Value::Int(n) => Some(*n != 0),
            Value::Float(n) => Some(*n != 0.0),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Structural equality for scalars, strings, lists and maps;
    /// identity for objects; handle equality for types.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.ptr_eq(b) || *a.borrow() == *b.borrow(),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b) || *a.borrow() == *b.borrow(),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            // Numeric comparison crosses the int/float tiers. Int/Int
            // was handled above, so at least one side here is a float.
            (Value::Float(_) | Value::Int(_), Value::Float(_) | Value::Int(_)) => {
                self.as_float() == other.as_float()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{n:.1}")
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Object(data) => write!(f, "<object #{}>", data.borrow().ty.0),
            Value::Type(handle) => write!(f, "<type #{}>", handle.0),
            Value::Function(_) => write!(f, "<function>"),
        }
    }
}
