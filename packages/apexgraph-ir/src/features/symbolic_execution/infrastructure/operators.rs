//! Operator folding on determinate operands
//!
//! Every function returns `None` when the result cannot be computed
//! statically; the caller substitutes an indeterminate value of the
//! expression's static type.

use crate::features::symbolic_execution::domain::{ApexValue, Literal, ValueKind};
use crate::shared::utils::type_names as types;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Integer(i32),
    Long(i64),
    Decimal(f64),
}

impl Number {
    fn of(value: &ApexValue) -> Option<Number> {
        match value.as_literal()? {
            Literal::Integer(i) => Some(Number::Integer(*i as i32)),
            Literal::Long(l) => Some(Number::Long(*l)),
            Literal::Decimal(d) => Some(Number::Decimal(*d)),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Number::Integer(_) => 0,
            Number::Long(_) => 1,
            Number::Decimal(_) => 2,
        }
    }

    fn as_i64(&self) -> i64 {
        match *self {
            Number::Integer(i) => i as i64,
            Number::Long(l) => l,
            Number::Decimal(d) => d as i64,
        }
    }

    fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(i) => i as f64,
            Number::Long(l) => l as f64,
            Number::Decimal(d) => d,
        }
    }

    fn into_value(self) -> ApexValue {
        match self {
            Number::Integer(i) => ApexValue::integer(i as i64),
            Number::Long(l) => ApexValue::literal(Literal::Long(l)),
            Number::Decimal(d) => ApexValue::literal(Literal::Decimal(d)),
        }
    }
}

fn arithmetic(op: &str, left: Number, right: Number) -> Option<Number> {
    let rank = left.rank().max(right.rank());
    match rank {
        0 => {
            let (a, b) = (left.as_i64() as i32, right.as_i64() as i32);
            let result = match op {
                "+" => a.wrapping_add(b),
                "-" => a.wrapping_sub(b),
                "*" => a.wrapping_mul(b),
                "/" => a.checked_div(b)?,
                "%" => a.checked_rem(b)?,
                _ => return None,
            };
            Some(Number::Integer(result))
        }
        1 => {
            let (a, b) = (left.as_i64(), right.as_i64());
            let result = match op {
                "+" => a.wrapping_add(b),
                "-" => a.wrapping_sub(b),
                "*" => a.wrapping_mul(b),
                "/" => a.checked_div(b)?,
                "%" => a.checked_rem(b)?,
                _ => return None,
            };
            Some(Number::Long(result))
        }
        _ => {
            let (a, b) = (left.as_f64(), right.as_f64());
            if matches!(op, "/" | "%") && b == 0.0 {
                return None;
            }
            let result = match op {
                "+" => a + b,
                "-" => a - b,
                "*" => a * b,
                "/" => a / b,
                "%" => a % b,
                _ => return None,
            };
            Some(Number::Decimal(result))
        }
    }
}

/// `+ - * / %`; `+` concatenates when either side is a String
pub fn binary(op: &str, left: &ApexValue, right: &ApexValue) -> Option<ApexValue> {
    if op == "+" && (left.ty == types::STRING || right.ty == types::STRING) {
        let joined = format!("{}{}", left.display_text()?, right.display_text()?);
        return Some(ApexValue::string(joined));
    }
    let result = arithmetic(op, Number::of(left)?, Number::of(right)?)?;
    Some(result.into_value())
}

/// Value equality as `==` sees it; `None` when unknown
pub fn equals(left: &ApexValue, right: &ApexValue) -> Option<bool> {
    match (&left.kind, &right.kind) {
        (ValueKind::Determinate(a), ValueKind::Determinate(b)) => literal_equals(a, b),
        // an allocated object or a schema token is never null
        (ValueKind::Determinate(Literal::Null), ValueKind::Reference(_) | ValueKind::Schema(_))
        | (ValueKind::Reference(_) | ValueKind::Schema(_), ValueKind::Determinate(Literal::Null)) => {
            Some(false)
        }
        (ValueKind::Reference(a), ValueKind::Reference(b)) if a == b => Some(true),
        (ValueKind::Schema(a), ValueKind::Schema(b)) if a.is_resolved() && b.is_resolved() => {
            Some(a.kind == b.kind && eq_names(&a.object, &b.object) && eq_names(&a.field, &b.field))
        }
        _ => None,
    }
}

fn eq_names(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

fn literal_equals(a: &Literal, b: &Literal) -> Option<bool> {
    let equal = match (a, b) {
        (Literal::Null, Literal::Null) => true,
        (Literal::Null, _) | (_, Literal::Null) => false,
        // String equality is case-insensitive in Apex
        (Literal::String(x), Literal::String(y)) => x.eq_ignore_ascii_case(y),
        (Literal::Enum(x), Literal::Enum(y)) => x.eq_ignore_ascii_case(y),
        (Literal::Boolean(x), Literal::Boolean(y)) => x == y,
        (Literal::Decimal(_), _) | (_, Literal::Decimal(_)) => {
            numeric(a)? == numeric(b)?
        }
        (Literal::Integer(x) | Literal::Long(x), Literal::Integer(y) | Literal::Long(y)) => x == y,
        _ => return None,
    };
    Some(equal)
}

fn numeric(l: &Literal) -> Option<f64> {
    match l {
        Literal::Integer(i) | Literal::Long(i) => Some(*i as f64),
        Literal::Decimal(d) => Some(*d),
        _ => None,
    }
}

/// Comparison and equality operators of a `BooleanExpression`
pub fn compare(op: &str, left: &ApexValue, right: &ApexValue) -> Option<ApexValue> {
    let result = match op {
        "==" | "===" => equals(left, right)?,
        "!=" | "!==" => !equals(left, right)?,
        "<" | ">" | "<=" | ">=" => {
            let ordering = match (left.as_literal()?, right.as_literal()?) {
                (Literal::String(a), Literal::String(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
                (a, b) => numeric(a)?.partial_cmp(&numeric(b)?)?,
            };
            match op {
                "<" => ordering.is_lt(),
                ">" => ordering.is_gt(),
                "<=" => ordering.is_le(),
                _ => ordering.is_ge(),
            }
        }
        _ => return None,
    };
    Some(ApexValue::boolean(result))
}

/// `&&` / `||` given the left operand; `Some` when it decides the result
pub fn short_circuit(op: &str, left: &ApexValue) -> Option<ApexValue> {
    match (op, left.as_bool()?) {
        ("&&", false) => Some(ApexValue::boolean(false)),
        ("||", true) => Some(ApexValue::boolean(true)),
        _ => None,
    }
}

/// `&&` / `||` once the left operand did not decide
pub fn logical(op: &str, left: &ApexValue, right: &ApexValue) -> Option<ApexValue> {
    if let Some(decided) = short_circuit(op, left) {
        return Some(decided);
    }
    let r = right.as_bool()?;
    match op {
        "&&" | "||" if left.as_bool().is_some() => Some(ApexValue::boolean(r)),
        // unknown left side still decided by a dominant right side
        "&&" if !r => Some(ApexValue::boolean(false)),
        "||" if r => Some(ApexValue::boolean(true)),
        _ => None,
    }
}

/// `! - +` applied to a determinate operand
pub fn prefix(op: &str, operand: &ApexValue) -> Option<ApexValue> {
    match op {
        "!" => operand.as_bool().map(|b| ApexValue::boolean(!b)),
        "-" => arithmetic("-", Number::Integer(0), Number::of(operand)?).map(Number::into_value),
        "+" => Number::of(operand).map(|n| n.into_value()),
        _ => None,
    }
}

/// Operand after `++` / `--`
pub fn step(op: &str, operand: &ApexValue) -> Option<ApexValue> {
    let delta = match op {
        "++" => "+",
        "--" => "-",
        _ => return None,
    };
    let value = Number::of(operand)?;
    let one = match value {
        Number::Integer(_) => Number::Integer(1),
        Number::Long(_) => Number::Long(1),
        Number::Decimal(_) => Number::Decimal(1.0),
    };
    arithmetic(delta, value, one).map(Number::into_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::symbolic_execution::domain::HeapRef;

    #[test]
    fn test_concatenation_and_promotion() {
        let s = binary("+", &ApexValue::string("id="), &ApexValue::integer(4)).unwrap();
        assert_eq!(s.as_str(), Some("id=4"));
        let null = binary("+", &ApexValue::string("x"), &ApexValue::null()).unwrap();
        assert_eq!(null.as_str(), Some("xnull"));

        let long = binary("*", &ApexValue::integer(3), &ApexValue::literal(Literal::Long(5))).unwrap();
        assert_eq!(long.ty, "Long");
        assert_eq!(long.as_i64(), Some(15));
        assert_eq!(binary("/", &ApexValue::integer(7), &ApexValue::integer(2)).and_then(|v| v.as_i64()), Some(3));
        assert!(binary("/", &ApexValue::integer(1), &ApexValue::integer(0)).is_none());
        assert!(binary("+", &ApexValue::integer(1), &ApexValue::indeterminate("Integer")).is_none());
    }

    #[test]
    fn test_equality_rules() {
        assert_eq!(equals(&ApexValue::string("ABC"), &ApexValue::string("abc")), Some(true));
        assert_eq!(equals(&ApexValue::integer(2), &ApexValue::literal(Literal::Decimal(2.0))), Some(true));
        let account = ApexValue::reference("Account", HeapRef(0));
        assert_eq!(equals(&account, &ApexValue::null()), Some(false));
        assert_eq!(equals(&ApexValue::indeterminate("String"), &ApexValue::null()), None);
        assert_eq!(
            compare("<", &ApexValue::integer(1), &ApexValue::integer(2)).and_then(|v| v.as_bool()),
            Some(true)
        );
    }

    #[test]
    fn test_logical_folding() {
        let unknown = ApexValue::indeterminate("Boolean");
        assert_eq!(short_circuit("&&", &ApexValue::boolean(false)).and_then(|v| v.as_bool()), Some(false));
        assert!(short_circuit("&&", &unknown).is_none());
        assert_eq!(logical("||", &unknown, &ApexValue::boolean(true)).and_then(|v| v.as_bool()), Some(true));
        assert!(logical("&&", &unknown, &ApexValue::boolean(true)).is_none());
        assert_eq!(prefix("!", &ApexValue::boolean(true)).and_then(|v| v.as_bool()), Some(false));
        assert_eq!(prefix("-", &ApexValue::integer(5)).and_then(|v| v.as_i64()), Some(-5));
        assert_eq!(step("++", &ApexValue::integer(i32::MAX as i64)).and_then(|v| v.as_i64()), Some(i32::MIN as i64));
    }
}
