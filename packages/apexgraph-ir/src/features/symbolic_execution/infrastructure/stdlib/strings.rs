//! `String` instance and static methods

use once_cell::sync::Lazy;
use regex::Regex;

use super::{allocate_list, CallReceiver, MethodHandler, StandardCall};
use crate::features::symbolic_execution::domain::{ApexValue, Heap};
use crate::shared::utils::type_names as types;

/// Java-style `$1` group references; the regex crate wants `${1}`
static GROUP_REFERENCE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\$(\d+)").ok());

#[derive(Debug, Default, Clone, Copy)]
pub struct StringHandler;

/// Return type of a modeled instance method
fn return_type(method: &str) -> Option<&'static str> {
    let ty = match method {
        "trim" | "tolowercase" | "touppercase" | "substring" | "replace" | "replaceall" | "left"
        | "right" | "capitalize" | "escapesinglequotes" | "normalizespace" | "reverse" => {
            types::STRING
        }
        "contains" | "containsignorecase" | "startswith" | "endswith" | "equals"
        | "equalsignorecase" | "isblank" | "isnotblank" | "isempty" | "isnotempty" => types::BOOLEAN,
        "length" | "indexof" => types::INTEGER,
        "split" => return Some("List<String>"),
        _ => return None,
    };
    Some(ty)
}

impl MethodHandler for StringHandler {
    fn name(&self) -> &'static str {
        "StringHandler"
    }

    fn invoke(&self, call: &StandardCall<'_>, heap: &mut Heap) -> Option<ApexValue> {
        match call.receiver {
            CallReceiver::Type(_) if call.is_static_on(types::STRING) => static_method(call),
            CallReceiver::Value(receiver) if receiver.ty == types::STRING || receiver.ty == types::ID => {
                let ty = return_type(&call.method)?;
                let computed = receiver
                    .as_str()
                    .and_then(|s| instance_method(s, call, heap));
                Some(computed.unwrap_or_else(|| ApexValue::indeterminate(ty)))
            }
            _ => None,
        }
    }
}

fn static_method(call: &StandardCall<'_>) -> Option<ApexValue> {
    let arg = call.arg(0);
    let computed = match call.method.as_str() {
        "valueof" => arg.and_then(|a| a.display_text()).map(ApexValue::string),
        "isblank" => arg.and_then(|a| blank(a)).map(ApexValue::boolean),
        "isnotblank" => arg.and_then(|a| blank(a)).map(|b| ApexValue::boolean(!b)),
        "isempty" => arg.and_then(|a| empty(a)).map(ApexValue::boolean),
        "isnotempty" => arg.and_then(|a| empty(a)).map(|b| ApexValue::boolean(!b)),
        "escapesinglequotes" => arg
            .and_then(|a| a.as_str())
            .map(|s| ApexValue::string(escape_single_quotes(s))),
        "join" | "format" => None,
        _ => return None,
    };
    let ty = match call.method.as_str() {
        "isblank" | "isnotblank" | "isempty" | "isnotempty" => types::BOOLEAN,
        _ => types::STRING,
    };
    Some(computed.unwrap_or_else(|| ApexValue::indeterminate(ty)))
}

fn blank(value: &ApexValue) -> Option<bool> {
    if value.is_null() {
        return Some(true);
    }
    value.as_str().map(|s| s.trim().is_empty())
}

fn empty(value: &ApexValue) -> Option<bool> {
    if value.is_null() {
        return Some(true);
    }
    value.as_str().map(str::is_empty)
}

fn escape_single_quotes(s: &str) -> String {
    s.replace('\'', "\\'")
}

fn str_arg<'a>(call: &StandardCall<'a>, index: usize) -> Option<&'a str> {
    call.arg(index).and_then(|a| a.as_str())
}

fn int_arg(call: &StandardCall<'_>, index: usize) -> Option<i64> {
    call.arg(index).and_then(|a| a.as_i64())
}

fn instance_method(s: &str, call: &StandardCall<'_>, heap: &mut Heap) -> Option<ApexValue> {
    let chars: Vec<char> = s.chars().collect();
    let value = match call.method.as_str() {
        "trim" => ApexValue::string(s.trim()),
        "tolowercase" => ApexValue::string(s.to_lowercase()),
        "touppercase" => ApexValue::string(s.to_uppercase()),
        "normalizespace" => ApexValue::string(s.split_whitespace().collect::<Vec<_>>().join(" ")),
        "reverse" => ApexValue::string(chars.iter().rev().collect::<String>()),
        "capitalize" => {
            let mut out: String = chars.first().map(|c| c.to_uppercase().collect()).unwrap_or_default();
            out.extend(chars.iter().skip(1));
            ApexValue::string(out)
        }
        "escapesinglequotes" => ApexValue::string(escape_single_quotes(s)),
        "length" => ApexValue::integer(chars.len() as i64),
        "isblank" => ApexValue::boolean(s.trim().is_empty()),
        "isnotblank" => ApexValue::boolean(!s.trim().is_empty()),
        "isempty" => ApexValue::boolean(s.is_empty()),
        "isnotempty" => ApexValue::boolean(!s.is_empty()),
        "contains" => ApexValue::boolean(s.contains(str_arg(call, 0)?)),
        "containsignorecase" => {
            ApexValue::boolean(s.to_lowercase().contains(&str_arg(call, 0)?.to_lowercase()))
        }
        "startswith" => ApexValue::boolean(s.starts_with(str_arg(call, 0)?)),
        "endswith" => ApexValue::boolean(s.ends_with(str_arg(call, 0)?)),
        "equals" => match call.arg(0)? {
            other if other.is_null() => ApexValue::boolean(false),
            other => ApexValue::boolean(s == other.as_str()?),
        },
        "equalsignorecase" => ApexValue::boolean(s.eq_ignore_ascii_case(str_arg(call, 0)?)),
        "indexof" => {
            let needle = str_arg(call, 0)?;
            let index = s
                .find(needle)
                .map_or(-1, |byte| s[..byte].chars().count() as i64);
            ApexValue::integer(index)
        }
        "substring" => {
            let start = usize::try_from(int_arg(call, 0)?).ok()?;
            let end = match call.arity() {
                1 => chars.len(),
                _ => usize::try_from(int_arg(call, 1)?).ok()?,
            };
            if start > end || end > chars.len() {
                return None;
            }
            ApexValue::string(chars[start..end].iter().collect::<String>())
        }
        "left" => {
            let n = usize::try_from(int_arg(call, 0)?).unwrap_or(0).min(chars.len());
            ApexValue::string(chars[..n].iter().collect::<String>())
        }
        "right" => {
            let n = usize::try_from(int_arg(call, 0)?).unwrap_or(0).min(chars.len());
            ApexValue::string(chars[chars.len() - n..].iter().collect::<String>())
        }
        "replace" => ApexValue::string(s.replace(str_arg(call, 0)?, str_arg(call, 1)?)),
        "replaceall" => {
            let pattern = Regex::new(str_arg(call, 0)?).ok()?;
            let replacement = str_arg(call, 1)?;
            let replacement = match GROUP_REFERENCE.as_ref() {
                Some(groups) => groups.replace_all(replacement, "$${$1}").into_owned(),
                None => replacement.to_string(),
            };
            ApexValue::string(pattern.replace_all(s, replacement.as_str()).into_owned())
        }
        "split" => {
            let pattern = Regex::new(str_arg(call, 0)?).ok()?;
            let mut parts: Vec<&str> = pattern.split(s).collect();
            // trailing empty strings are dropped
            while parts.last().is_some_and(|p| p.is_empty()) {
                parts.pop();
            }
            let items = parts.into_iter().map(ApexValue::string).collect();
            allocate_list(heap, types::STRING, items, true)
        }
        _ => return None,
    };
    Some(value)
}
