//! Positional `{0}`-style template substitution.
//!
//! Shared by the `@format` pseudo-operator and `String.Format`.

use crate::error::{format_arg_missing, EvalError};
use crate::value::Value;

/// Substitute `{N}` placeholders with the display form of `args[N]`.
///
/// `{{` and `}}` escape literal braces. A placeholder with no matching
/// argument is an error; unused arguments are fine.
pub fn format_template(template: &str, args: &[Value]) -> Result<String, EvalError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut digits = String::new();
                while chars.peek().is_some_and(char::is_ascii_digit) {
                    // peek was a digit, so next() is Some.
                    if let Some(d) = chars.next() {
                        digits.push(d);
                    }
                }
                // Anything but `{digits}` passes through as literal text.
                if digits.is_empty() || chars.peek() != Some(&'}') {
                    out.push('{');
                    out.push_str(&digits);
                    continue;
                }
                chars.next();
                let index: usize = digits.parse().map_err(|_| format_arg_missing(usize::MAX))?;
                let arg = args.get(index).ok_or_else(|| format_arg_missing(index))?;
                out.push_str(&arg.to_string());
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::format_template;
    use crate::error::EvalErrorKind;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn substitutes_positionally() {
        let out = format_template("{0} + {1} = {2}", &[
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
        ])
        .unwrap();
        assert_eq!(out, "1 + 2 = 3");
    }

    #[test]
    fn arguments_may_repeat_and_go_unused() {
        let out = format_template("{0}{0}", &[Value::str("ab"), Value::Int(9)]).unwrap();
        assert_eq!(out, "abab");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let out = format_template("{{0}}", &[]).unwrap();
        assert_eq!(out, "{0}");
    }

    #[test]
    fn missing_argument_is_an_error() {
        let err = format_template("{1}", &[Value::Int(0)]).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::FormatArgMissing { index: 1 });
    }
}
