//! The registry's builtin type catalogue.
//!
//! A deliberately small slice of a BCL-shaped world: the numeric and
//! string primitives, `Object` as the dynamic property bag, the two
//! generic collections backing list and map values, and `Math`. Method
//! argument extraction is unchecked pattern access; overload selection
//! has already guaranteed the shapes.

use crate::error::{conversion_failed, EvalResult};
use crate::format::format_template;
use crate::value::{TypeHandle, Value, ValueType};

use super::{HostRegistry, MethodDef, PropertyDef, TypeDescriptor, WellKnown};

/// Signature-checked numeric argument (Float parameters accept Int).
fn float_arg(value: &Value) -> f64 {
    value.as_float().unwrap_or_default()
}

/// Signature-checked integer argument.
fn int_arg(value: &Value) -> i64 {
    if let Value::Int(n) = value {
        *n
    } else {
        0
    }
}

/// Signature-checked string argument.
fn str_arg(value: &Value) -> &str {
    if let Value::Str(s) = value {
        s
    } else {
        ""
    }
}

fn static_method(
    name: &'static str,
    params: &'static [ValueType],
    run: super::StaticFn,
) -> MethodDef<super::StaticFn> {
    MethodDef {
        name,
        params,
        variadic: false,
        run,
    }
}

fn instance_method(
    name: &'static str,
    params: &'static [ValueType],
    run: super::InstanceFn,
) -> MethodDef<super::InstanceFn> {
    MethodDef {
        name,
        params,
        variadic: false,
        run,
    }
}

/// Register the catalogue and report the handles the engine needs.
pub(super) fn install(registry: &mut HostRegistry) -> WellKnown {
    let object = {
        let mut desc = TypeDescriptor::new("System.Object", "Object");
        desc.constructible = true;
        registry.register(desc)
    };

    let boolean = {
        let mut desc = TypeDescriptor::new("System.Boolean", "Boolean");
        desc.statics.push(static_method(
            "Parse",
            &[ValueType::Str],
            |_, args| match str_arg(&args[0]) {
                "true" | "True" => Ok(Value::Bool(true)),
                "false" | "False" => Ok(Value::Bool(false)),
                _ => Err(conversion_failed(&args[0], "Boolean")),
            },
        ));
        registry.register(desc)
    };

    let int32 = {
        let mut desc = TypeDescriptor::new("System.Int32", "Int32");
        desc.static_values
            .push(("MaxValue", Value::Int(i64::from(i32::MAX))));
        desc.static_values
            .push(("MinValue", Value::Int(i64::from(i32::MIN))));
        desc.statics
            .push(static_method("Parse", &[ValueType::Str], |_, args| {
                str_arg(&args[0])
                    .trim()
                    .parse::<i32>()
                    .map(|n| Value::Int(i64::from(n)))
                    .map_err(|_| conversion_failed(&args[0], "Int32"))
            }));
        registry.register(desc)
    };

    let int64 = {
        let mut desc = TypeDescriptor::new("System.Int64", "Int64");
        desc.static_values.push(("MaxValue", Value::Int(i64::MAX)));
        desc.static_values.push(("MinValue", Value::Int(i64::MIN)));
        desc.statics
            .push(static_method("Parse", &[ValueType::Str], |_, args| {
                str_arg(&args[0])
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| conversion_failed(&args[0], "Int64"))
            }));
        registry.register(desc)
    };

    let double = {
        let mut desc = TypeDescriptor::new("System.Double", "Double");
        desc.static_values
            .push(("MaxValue", Value::Float(f64::MAX)));
        desc.static_values
            .push(("MinValue", Value::Float(f64::MIN)));
        desc.statics
            .push(static_method("Parse", &[ValueType::Str], |_, args| {
                str_arg(&args[0])
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| conversion_failed(&args[0], "Double"))
            }));
        registry.register(desc)
    };

    let string = {
        let mut desc = TypeDescriptor::new("System.String", "String");
        desc.properties.push(PropertyDef {
            name: "Length",
            get: |_, target| {
                Ok(Value::Int(i64::try_from(str_arg(target).chars().count()).unwrap_or(i64::MAX)))
            },
        });
        desc.methods.push(instance_method(
            "Contains",
            &[ValueType::Str],
            |_, target, args| Ok(Value::Bool(str_arg(target).contains(str_arg(&args[0])))),
        ));
        desc.methods.push(instance_method(
            "StartsWith",
            &[ValueType::Str],
            |_, target, args| Ok(Value::Bool(str_arg(target).starts_with(str_arg(&args[0])))),
        ));
        desc.methods.push(instance_method(
            "EndsWith",
            &[ValueType::Str],
            |_, target, args| Ok(Value::Bool(str_arg(target).ends_with(str_arg(&args[0])))),
        ));
        desc.methods
            .push(instance_method("ToUpper", &[], |_, target, _| {
                Ok(Value::str(str_arg(target).to_uppercase()))
            }));
        desc.methods
            .push(instance_method("ToLower", &[], |_, target, _| {
                Ok(Value::str(str_arg(target).to_lowercase()))
            }));
        desc.methods
            .push(instance_method("Trim", &[], |_, target, _| {
                Ok(Value::str(str_arg(target).trim()))
            }));
        desc.methods.push(instance_method(
            "Replace",
            &[ValueType::Str, ValueType::Str],
            |_, target, args| {
                Ok(Value::str(
                    str_arg(target).replace(str_arg(&args[0]), str_arg(&args[1])),
                ))
            },
        ));
        // Distinct arities; overload selection picks by count.
        desc.methods.push(instance_method(
            "Substring",
            &[ValueType::Int],
            |_, target, args| substring(str_arg(target), int_arg(&args[0]), None),
        ));
        desc.methods.push(instance_method(
            "Substring",
            &[ValueType::Int, ValueType::Int],
            |_, target, args| {
                substring(str_arg(target), int_arg(&args[0]), Some(int_arg(&args[1])))
            },
        ));
        desc.methods.push(instance_method(
            "IndexOf",
            &[ValueType::Str],
            |_, target, args| {
                let found = str_arg(target)
                    .find(str_arg(&args[0]))
                    .and_then(|byte| i64::try_from(byte).ok())
                    .unwrap_or(-1);
                Ok(Value::Int(found))
            },
        ));
        desc.statics.push(MethodDef {
            name: "Format",
            params: &[ValueType::Str, ValueType::Any],
            variadic: true,
            run: |_, args| {
                let Value::List(rest) = &args[1] else {
                    return Err(conversion_failed(&args[1], "argument list"));
                };
                format_template(str_arg(&args[0]), &rest.borrow()).map(Value::str)
            },
        });
        desc.statics.push(static_method(
            "Join",
            &[ValueType::Str, ValueType::List],
            |_, args| {
                let Value::List(items) = &args[1] else {
                    return Err(conversion_failed(&args[1], "List"));
                };
                let joined = items
                    .borrow()
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(str_arg(&args[0]));
                Ok(Value::str(joined))
            },
        ));
        desc.statics.push(static_method(
            "IsNullOrEmpty",
            &[ValueType::Any],
            |_, args| {
                let empty = match &args[0] {
                    Value::Null => true,
                    Value::Str(s) => s.is_empty(),
                    _ => false,
                };
                Ok(Value::Bool(empty))
            },
        ));
        registry.register(desc)
    };

    let list = {
        let mut desc =
            TypeDescriptor::new("System.Collections.Generic.List`1", "List");
        desc.constructible = true;
        desc.properties.push(PropertyDef {
            name: "Count",
            get: |_, target| match target {
                Value::List(items) => Ok(Value::Int(
                    i64::try_from(items.borrow().len()).unwrap_or(i64::MAX),
                )),
                _ => Ok(Value::Int(0)),
            },
        });
        desc.methods.push(instance_method(
            "Add",
            &[ValueType::Any],
            |_, target, args| {
                if let Value::List(items) = target {
                    items.borrow_mut().push(args[0].clone());
                }
                Ok(Value::Null)
            },
        ));
        desc.methods.push(instance_method(
            "Insert",
            &[ValueType::Int, ValueType::Any],
            |_, target, args| {
                if let Value::List(items) = target {
                    let mut items = items.borrow_mut();
                    let len = items.len();
                    let index = usize::try_from(int_arg(&args[0]))
                        .ok()
                        .filter(|&i| i <= len)
                        .ok_or_else(|| {
                            crate::error::index_out_of_bounds(int_arg(&args[0]), len)
                        })?;
                    items.insert(index, args[1].clone());
                }
                Ok(Value::Null)
            },
        ));
        desc.methods.push(instance_method(
            "RemoveAt",
            &[ValueType::Int],
            |_, target, args| {
                if let Value::List(items) = target {
                    let mut items = items.borrow_mut();
                    let len = items.len();
                    let index = usize::try_from(int_arg(&args[0]))
                        .ok()
                        .filter(|&i| i < len)
                        .ok_or_else(|| {
                            crate::error::index_out_of_bounds(int_arg(&args[0]), len)
                        })?;
                    items.remove(index);
                }
                Ok(Value::Null)
            },
        ));
        desc.methods.push(instance_method(
            "Remove",
            &[ValueType::Any],
            |_, target, args| {
                if let Value::List(items) = target {
                    let mut items = items.borrow_mut();
                    if let Some(pos) = items.iter().position(|v| v == &args[0]) {
                        items.remove(pos);
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            },
        ));
        desc.methods.push(instance_method(
            "Contains",
            &[ValueType::Any],
            |_, target, args| {
                if let Value::List(items) = target {
                    Ok(Value::Bool(items.borrow().contains(&args[0])))
                } else {
                    Ok(Value::Bool(false))
                }
            },
        ));
        desc.methods.push(instance_method(
            "IndexOf",
            &[ValueType::Any],
            |_, target, args| {
                let found = if let Value::List(items) = target {
                    items
                        .borrow()
                        .iter()
                        .position(|v| v == &args[0])
                        .and_then(|i| i64::try_from(i).ok())
                        .unwrap_or(-1)
                } else {
                    -1
                };
                Ok(Value::Int(found))
            },
        ));
        desc.methods
            .push(instance_method("Clear", &[], |_, target, _| {
                if let Value::List(items) = target {
                    items.borrow_mut().clear();
                }
                Ok(Value::Null)
            }));
        registry.register(desc)
    };

    let dictionary = {
        let mut desc = TypeDescriptor::new(
            "System.Collections.Generic.Dictionary`2",
            "Dictionary",
        );
        desc.constructible = true;
        desc.properties.push(PropertyDef {
            name: "Count",
            get: |_, target| match target {
                Value::Map(pairs) => Ok(Value::Int(
                    i64::try_from(pairs.borrow().len()).unwrap_or(i64::MAX),
                )),
                _ => Ok(Value::Int(0)),
            },
        });
        desc.methods.push(instance_method(
            "Add",
            &[ValueType::Any, ValueType::Any],
            |_, target, args| {
                if let Value::Map(pairs) = target {
                    pairs.borrow_mut().push((args[0].clone(), args[1].clone()));
                }
                Ok(Value::Null)
            },
        ));
        desc.methods.push(instance_method(
            "ContainsKey",
            &[ValueType::Any],
            |_, target, args| {
                let found = if let Value::Map(pairs) = target {
                    pairs.borrow().iter().any(|(k, _)| k == &args[0])
                } else {
                    false
                };
                Ok(Value::Bool(found))
            },
        ));
        desc.methods.push(instance_method(
            "Remove",
            &[ValueType::Any],
            |_, target, args| {
                if let Value::Map(pairs) = target {
                    let mut pairs = pairs.borrow_mut();
                    if let Some(pos) = pairs.iter().position(|(k, _)| k == &args[0]) {
                        pairs.remove(pos);
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            },
        ));
        desc.methods
            .push(instance_method("Clear", &[], |_, target, _| {
                if let Value::Map(pairs) = target {
                    pairs.borrow_mut().clear();
                }
                Ok(Value::Null)
            }));
        registry.register(desc)
    };

    {
        let mut desc = TypeDescriptor::new("System.Math", "Math");
        desc.static_values
            .push(("PI", Value::Float(std::f64::consts::PI)));
        desc.static_values
            .push(("E", Value::Float(std::f64::consts::E)));
        desc.statics
            .push(static_method("Abs", &[ValueType::Float], |_, args| {
                Ok(Value::Float(float_arg(&args[0]).abs()))
            }));
        desc.statics.push(static_method(
            "Min",
            &[ValueType::Float, ValueType::Float],
            |_, args| Ok(Value::Float(float_arg(&args[0]).min(float_arg(&args[1])))),
        ));
        desc.statics.push(static_method(
            "Max",
            &[ValueType::Float, ValueType::Float],
            |_, args| Ok(Value::Float(float_arg(&args[0]).max(float_arg(&args[1])))),
        ));
        desc.statics
            .push(static_method("Sqrt", &[ValueType::Float], |_, args| {
                Ok(Value::Float(float_arg(&args[0]).sqrt()))
            }));
        desc.statics.push(static_method(
            "Pow",
            &[ValueType::Float, ValueType::Float],
            |_, args| Ok(Value::Float(float_arg(&args[0]).powf(float_arg(&args[1])))),
        ));
        desc.statics
            .push(static_method("Floor", &[ValueType::Float], |_, args| {
                Ok(Value::Float(float_arg(&args[0]).floor()))
            }));
        desc.statics
            .push(static_method("Ceiling", &[ValueType::Float], |_, args| {
                Ok(Value::Float(float_arg(&args[0]).ceil()))
            }));
        desc.statics
            .push(static_method("Round", &[ValueType::Float], |_, args| {
                Ok(Value::Float(float_arg(&args[0]).round()))
            }));
        registry.register(desc);
    }

    WellKnown {
        object,
        boolean,
        int32,
        int64,
        double,
        string,
        list,
        dictionary,
    }
}

/// Character-indexed substring with the host's (start, length) shape.
fn substring(text: &str, start: i64, length: Option<i64>) -> EvalResult {
    let chars: Vec<char> = text.chars().collect();
    let start = usize::try_from(start)
        .ok()
        .filter(|&s| s <= chars.len())
        .ok_or_else(|| crate::error::index_out_of_bounds(start, chars.len()))?;
    let end = match length {
        Some(len) => usize::try_from(len)
            .ok()
            .and_then(|l| start.checked_add(l))
            .filter(|&e| e <= chars.len())
            .ok_or_else(|| crate::error::index_out_of_bounds(len, chars.len()))?,
        None => chars.len(),
    };
    Ok(Value::str(chars[start..end].iter().collect::<String>()))
}

/// Coerce `value` to the builtin type behind `ty`.
pub(super) fn convert(registry: &HostRegistry, value: Value, ty: TypeHandle) -> EvalResult {
    let wk = registry.well_known;
    if ty == wk.object {
        return Ok(value);
    }
    if ty == wk.int32 || ty == wk.int64 {
        let converted = match &value {
            Value::Int(n) => Some(*n),
            #[expect(
                clippy::cast_possible_truncation,
                reason = "truncation toward zero is the conversion semantics"
            )]
            Value::Float(n) if n.is_finite() => Some(n.trunc() as i64),
            Value::Str(s) => s.trim().parse::<i64>().ok(),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        };
        let in_range = |n: i64| {
            ty == wk.int64 || (i64::from(i32::MIN)..=i64::from(i32::MAX)).contains(&n)
        };
        return converted
            .filter(|&n| in_range(n))
            .map(Value::Int)
            .ok_or_else(|| conversion_failed(&value, &registry.display_name(ty)));
    }
    if ty == wk.double {
        let converted = match &value {
            Value::Int(_) | Value::Float(_) => value.as_float(),
            Value::Str(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        return converted
            .map(Value::Float)
            .ok_or_else(|| conversion_failed(&value, "Double"));
    }
    if ty == wk.string {
        return Ok(Value::str(value.to_string()));
    }
    if ty == wk.boolean {
        return value
            .as_condition()
            .map(Value::Bool)
            .ok_or_else(|| conversion_failed(&value, "Boolean"));
    }
    if ty == wk.list {
        return match value {
            v @ Value::List(_) => Ok(v),
            v => Err(conversion_failed(&v, "List")),
        };
    }
    if ty == wk.dictionary {
        return match value {
            v @ Value::Map(_) => Ok(v),
            v => Err(conversion_failed(&v, "Dictionary")),
        };
    }
    // User-registered types accept their own instances and null.
    match &value {
        Value::Null => Ok(Value::Null),
        Value::Object(data) if data.borrow().ty == ty => Ok(value),
        _ => Err(conversion_failed(&value, &registry.display_name(ty))),
    }
}
