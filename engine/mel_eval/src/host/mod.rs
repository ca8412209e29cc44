//! The host accessor capability.
//!
//! Everything the engine knows about the embedding world goes through
//! `HostAccessor`: the ambient context value, property/field/item
//! access, method invocation, type resolution, construction and
//! conversion. The evaluator holds one accessor reference and never
//! touches host state any other way.
//!
//! `HostRegistry` is the crate's default implementation: a table of
//! registered type descriptors with a builtin catalogue reachable
//! through the implicit namespaces `System` and
//! `System.Collections.Generic`. It doubles as the test harness and a
//! usable embedding default.

use rustc_hash::FxHashMap;

use crate::dispatch::{pack_variadic, select_overload, Signature};
use crate::error::{
    arity_mismatch, index_out_of_bounds, key_not_found, no_such_member, no_such_type,
    EvalError, EvalResult,
};
use crate::value::{ObjectData, TypeHandle, Value, ValueType};

mod builtins;
#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;

/// The capability the embedding injects into the engine.
///
/// Member names arrive as plain strings; the engine resolves interned
/// names before crossing this boundary. Field access defaults to the
/// property path, which is what bag-like hosts want.
pub trait HostAccessor {
    /// The ambient current object, reachable as `@context` and as the
    /// target of bare member names.
    fn context(&self) -> Value;

    fn get_property(&self, target: &Value, name: &str) -> EvalResult;
    fn set_property(&self, target: &Value, name: &str, value: Value) -> Result<(), EvalError>;

    fn get_field(&self, target: &Value, name: &str) -> EvalResult {
        self.get_property(target, name)
    }
    fn set_field(&self, target: &Value, name: &str, value: Value) -> Result<(), EvalError> {
        self.set_property(target, name, value)
    }

    fn get_static_property(&self, ty: TypeHandle, name: &str) -> EvalResult;
    fn set_static_property(
        &self,
        ty: TypeHandle,
        name: &str,
        value: Value,
    ) -> Result<(), EvalError>;

    fn get_static_field(&self, ty: TypeHandle, name: &str) -> EvalResult {
        self.get_static_property(ty, name)
    }
    fn set_static_field(&self, ty: TypeHandle, name: &str, value: Value) -> Result<(), EvalError> {
        self.set_static_property(ty, name, value)
    }

    fn get_item(&self, target: &Value, args: &[Value]) -> EvalResult;
    fn set_item(&self, target: &Value, args: &[Value], value: Value) -> Result<(), EvalError>;

    fn invoke_method(&self, target: &Value, name: &str, args: Vec<Value>) -> EvalResult;
    fn invoke_static(&self, ty: TypeHandle, name: &str, args: Vec<Value>) -> EvalResult;

    /// Look for a conventional operator-overload method (`op_add`,
    /// `op_eq`, ...) on the target's runtime type. `None` means the
    /// type declares no such operator and dispatch should fall back.
    fn invoke_operator(&self, _name: &str, _target: &Value, _args: &[Value]) -> Option<EvalResult> {
        None
    }

    /// Resolve a source type reference. `arity` is the declared
    /// generic parameter count; zero for non-generic references.
    fn resolve_type(&self, name: &str, arity: u32) -> Result<TypeHandle, EvalError>;

    fn construct(&self, ty: TypeHandle, args: Vec<Value>) -> EvalResult;

    /// Coerce a value to a declared type; used by typed iterator
    /// blocks and exposed to script through conversion members.
    fn convert(&self, value: Value, ty: TypeHandle) -> EvalResult;

    /// Display name of a type, for diagnostics.
    fn type_name(&self, ty: TypeHandle) -> String;
}

type InstanceFn = fn(&HostRegistry, &Value, &[Value]) -> EvalResult;
type StaticFn = fn(&HostRegistry, &[Value]) -> EvalResult;

/// One callable entry of a descriptor's method table.
struct MethodDef<F> {
    name: &'static str,
    params: &'static [ValueType],
    variadic: bool,
    run: F,
}

impl<F> MethodDef<F> {
    fn signature(&self) -> Signature<'static> {
        Signature {
            params: self.params,
            variadic: self.variadic,
        }
    }
}

/// A declared instance property with host-side storage semantics.
struct PropertyDef {
    name: &'static str,
    get: fn(&HostRegistry, &Value) -> EvalResult,
}

/// A registered host type.
///
/// `full_name` carries the namespace and backtick-encoded generic
/// arity (`System.Collections.Generic.List`1`); `display` is the bare
/// name used in diagnostics.
pub struct TypeDescriptor {
    full_name: Box<str>,
    display: Box<str>,
    constructible: bool,
    methods: Vec<MethodDef<InstanceFn>>,
    statics: Vec<MethodDef<StaticFn>>,
    static_values: Vec<(&'static str, Value)>,
    properties: Vec<PropertyDef>,
}

impl TypeDescriptor {
    fn new(full_name: &str, display: &str) -> Self {
        TypeDescriptor {
            full_name: full_name.into(),
            display: display.into(),
            constructible: false,
            methods: Vec::new(),
            statics: Vec::new(),
            static_values: Vec::new(),
            properties: Vec::new(),
        }
    }
}

/// Handles of the types the engine itself needs to find.
#[derive(Clone, Copy, Debug)]
struct WellKnown {
    object: TypeHandle,
    boolean: TypeHandle,
    int32: TypeHandle,
    int64: TypeHandle,
    double: TypeHandle,
    string: TypeHandle,
    list: TypeHandle,
    dictionary: TypeHandle,
}

/// Default `HostAccessor`: a descriptor-table host with dynamic
/// property-bag objects and a small builtin catalogue.
pub struct HostRegistry {
    types: Vec<TypeDescriptor>,
    by_name: FxHashMap<Box<str>, TypeHandle>,
    namespaces: Vec<Box<str>>,
    well_known: WellKnown,
    context: Value,
}

impl HostRegistry {
    pub fn new() -> Self {
        let mut registry = HostRegistry {
            types: Vec::new(),
            by_name: FxHashMap::default(),
            namespaces: vec![
                "System".into(),
                "System.Collections.Generic".into(),
            ],
            // Placeholder handles, overwritten by install below.
            well_known: WellKnown {
                object: TypeHandle(0),
                boolean: TypeHandle(0),
                int32: TypeHandle(0),
                int64: TypeHandle(0),
                double: TypeHandle(0),
                string: TypeHandle(0),
                list: TypeHandle(0),
                dictionary: TypeHandle(0),
            },
            context: Value::Null,
        };
        registry.well_known = builtins::install(&mut registry);
        registry
    }

    pub fn with_context(context: Value) -> Self {
        let mut registry = HostRegistry::new();
        registry.context = context;
        registry
    }

    pub fn set_context(&mut self, context: Value) {
        self.context = context;
    }

    /// Register a type; later registrations shadow earlier ones with
    /// the same full name.
    fn register(&mut self, descriptor: TypeDescriptor) -> TypeHandle {
        let handle = TypeHandle(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        self.by_name
            .insert(descriptor.full_name.clone(), handle);
        self.types.push(descriptor);
        handle
    }

    fn descriptor(&self, handle: TypeHandle) -> Result<&TypeDescriptor, EvalError> {
        self.types
            .get(handle.0 as usize)
            .ok_or_else(|| no_such_type(&format!("#{}", handle.0)))
    }

    /// The descriptor backing a value's runtime type, when one exists.
    /// Scalars map onto their builtin catalogue entries.
    fn descriptor_for(&self, value: &Value) -> Option<TypeHandle> {
        match value {
            Value::Object(data) => Some(data.borrow().ty),
            Value::Bool(_) => Some(self.well_known.boolean),
            Value::Int(_) => Some(self.well_known.int64),
            Value::Float(_) => Some(self.well_known.double),
            Value::Str(_) => Some(self.well_known.string),
            Value::List(_) => Some(self.well_known.list),
            Value::Map(_) => Some(self.well_known.dictionary),
            _ => None,
        }
    }

    /// Display name of a type handle, for diagnostics.
    fn display_name(&self, ty: TypeHandle) -> String {
        self.descriptor(ty)
            .map_or_else(|_| format!("#{}", ty.0), |d| d.display.to_string())
    }

    fn display_of(&self, value: &Value) -> String {
        self.descriptor_for(value)
            .and_then(|h| self.descriptor(h).ok())
            .map_or_else(|| value.type_name().to_string(), |d| d.display.to_string())
    }

    fn invoke_from_table<F, R>(
        &self,
        table: &[MethodDef<F>],
        type_display: &str,
        name: &str,
        args: Vec<Value>,
        call: impl FnOnce(&MethodDef<F>, Vec<Value>) -> R,
    ) -> Result<R, EvalError> {
        let candidates: Vec<&MethodDef<F>> =
            table.iter().filter(|m| m.name == name).collect();
        if candidates.is_empty() {
            return Err(no_such_member(name, type_display));
        }
        let chosen = select_overload(
            name,
            type_display,
            candidates.iter().map(|m| m.signature()),
            &args,
        )?;
        let method = candidates[chosen];
        let args = if method.variadic {
            pack_variadic(method.params.len(), args)
        } else {
            args
        };
        Ok(call(method, args))
    }
}

impl Default for HostRegistry {
    fn default() -> Self {
        HostRegistry::new()
    }
}

impl HostAccessor for HostRegistry {
    fn context(&self) -> Value {
        self.context.clone()
    }

    fn get_property(&self, target: &Value, name: &str) -> EvalResult {
        if let Value::Type(handle) = target {
            return self.get_static_property(*handle, name);
        }
        if let Some(handle) = self.descriptor_for(target) {
            let descriptor = self.descriptor(handle)?;
            // Statically declared member first, then the dynamic bag.
            if let Some(prop) = descriptor.properties.iter().find(|p| p.name == name) {
                return (prop.get)(self, target);
            }
            if let Value::Object(data) = target {
                if let Some(value) = data.borrow().slots.get(name) {
                    return Ok(value.clone());
                }
            }
            return Err(no_such_member(name, &descriptor.display));
        }
        Err(no_such_member(name, target.type_name()))
    }

    fn set_property(&self, target: &Value, name: &str, value: Value) -> Result<(), EvalError> {
        match target {
            Value::Object(data) => {
                data.borrow_mut().slots.insert(name.into(), value);
                Ok(())
            }
            Value::Type(handle) => self.set_static_property(*handle, name, value),
            _ => Err(no_such_member(name, &self.display_of(target))),
        }
    }

    fn get_static_property(&self, ty: TypeHandle, name: &str) -> EvalResult {
        let descriptor = self.descriptor(ty)?;
        descriptor
            .static_values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| no_such_member(name, &descriptor.display))
    }

    fn set_static_property(
        &self,
        ty: TypeHandle,
        name: &str,
        _value: Value,
    ) -> Result<(), EvalError> {
        // The builtin catalogue's static slots are immutable.
        let descriptor = self.descriptor(ty)?;
        Err(no_such_member(name, &descriptor.display))
    }

    fn get_item(&self, target: &Value, args: &[Value]) -> EvalResult {
        match (target, args) {
            (Value::List(items), [Value::Int(index)]) => {
                let items = items.borrow();
                usize::try_from(*index)
                    .ok()
                    .and_then(|i| items.get(i))
                    .cloned()
                    .ok_or_else(|| index_out_of_bounds(*index, items.len()))
            }
            (Value::Str(text), [Value::Int(index)]) => {
                let chars: Vec<char> = text.chars().collect();
                usize::try_from(*index)
                    .ok()
                    .and_then(|i| chars.get(i))
                    .map(|c| Value::str(c.to_string()))
                    .ok_or_else(|| index_out_of_bounds(*index, chars.len()))
            }
            (Value::Map(pairs), [key]) => pairs
                .borrow()
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| key_not_found(key)),
            _ => Err(no_such_member("Item", &self.display_of(target))),
        }
    }

    fn set_item(&self, target: &Value, args: &[Value], value: Value) -> Result<(), EvalError> {
        match (target, args) {
            (Value::List(items), [Value::Int(index)]) => {
                let mut items = items.borrow_mut();
                let len = items.len();
                let slot = usize::try_from(*index)
                    .ok()
                    .and_then(|i| items.get_mut(i))
                    .ok_or_else(|| index_out_of_bounds(*index, len))?;
                *slot = value;
                Ok(())
            }
            (Value::Map(pairs), [key]) => {
                let mut pairs = pairs.borrow_mut();
                if let Some(pair) = pairs.iter_mut().find(|(k, _)| k == key) {
                    pair.1 = value;
                } else {
                    pairs.push((key.clone(), value));
                }
                Ok(())
            }
            _ => Err(no_such_member("Item", &self.display_of(target))),
        }
    }

    fn invoke_method(&self, target: &Value, name: &str, args: Vec<Value>) -> EvalResult {
        let Some(handle) = self.descriptor_for(target) else {
            return Err(no_such_member(name, target.type_name()));
        };
        let descriptor = self.descriptor(handle)?;
        self.invoke_from_table(&descriptor.methods, &descriptor.display, name, args, |m, args| {
            (m.run)(self, target, &args)
        })?
    }

    fn invoke_static(&self, ty: TypeHandle, name: &str, args: Vec<Value>) -> EvalResult {
        let descriptor = self.descriptor(ty)?;
        self.invoke_from_table(&descriptor.statics, &descriptor.display, name, args, |m, args| {
            (m.run)(self, &args)
        })?
    }

    fn invoke_operator(&self, name: &str, target: &Value, args: &[Value]) -> Option<EvalResult> {
        let Value::Object(data) = target else {
            return None;
        };
        let descriptor = self.descriptor(data.borrow().ty).ok()?;
        let candidates: Vec<&MethodDef<InstanceFn>> = descriptor
            .methods
            .iter()
            .filter(|m| m.name == name)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let chosen = match select_overload(
            name,
            &descriptor.display,
            candidates.iter().map(|m| m.signature()),
            args,
        ) {
            Ok(i) => i,
            Err(err) => return Some(Err(err)),
        };
        Some((candidates[chosen].run)(self, target, args))
    }

    fn resolve_type(&self, name: &str, arity: u32) -> Result<TypeHandle, EvalError> {
        let mangled = if arity > 0 {
            format!("{name}`{arity}")
        } else {
            name.to_string()
        };
        if let Some(handle) = self.by_name.get(mangled.as_str()) {
            return Ok(*handle);
        }
        for namespace in &self.namespaces {
            let qualified = format!("{namespace}.{mangled}");
            if let Some(handle) = self.by_name.get(qualified.as_str()) {
                return Ok(*handle);
            }
        }
        Err(no_such_type(name))
    }

    fn construct(&self, ty: TypeHandle, args: Vec<Value>) -> EvalResult {
        let descriptor = self.descriptor(ty)?;
        if !descriptor.constructible {
            return Err(no_such_member(".ctor", &descriptor.display));
        }
        if !args.is_empty() {
            return Err(arity_mismatch(&descriptor.display, 0, args.len()));
        }
        if ty == self.well_known.list {
            return Ok(Value::list(Vec::new()));
        }
        if ty == self.well_known.dictionary {
            return Ok(Value::map(Vec::new()));
        }
        Ok(Value::object(ObjectData::new(ty)))
    }

    fn convert(&self, value: Value, ty: TypeHandle) -> EvalResult {
        builtins::convert(self, value, ty)
    }

    fn type_name(&self, ty: TypeHandle) -> String {
        self.display_name(ty)
    }
}
