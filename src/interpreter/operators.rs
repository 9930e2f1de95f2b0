use crate::interpreter::value::{values_equal, Value};

/// Evaluate an infix operator over two values. Logical operators are
/// handled by the evaluator before reaching this point, as they
/// short-circuit without looking at the right operand.
pub fn infix(operator: &str, left: &Value, right: &Value) -> Result<Value, String> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => integer_infix(operator, *l, *r),
        (Value::Float(l), Value::Float(r)) => float_infix(operator, *l, *r),
        // Integers are promoted to floats when mixed with them.
        (Value::Float(l), Value::Integer(r)) => float_infix(operator, *l, *r as f64),
        (Value::Integer(l), Value::Float(r)) => float_infix(operator, *l as f64, *r),
        (Value::Str(l), Value::Str(r)) => string_infix(operator, l, r),
        // Atoms behave as strings.
        (Value::Atom(l), Value::Atom(r)) => string_infix(operator, l, r),
        (Value::Atom(l), Value::Str(r)) => string_infix(operator, l, r),
        (Value::Str(l), Value::Atom(r)) => string_infix(operator, l, r),
        (Value::Boolean(l), Value::Boolean(r)) => boolean_infix(operator, *l, *r),
        (Value::Array(_), Value::Array(_)) => array_infix(operator, left, right),
        (Value::Dictionary(_), Value::Dictionary(_)) => dictionary_infix(operator, left, right),
        (Value::Nil, _) | (_, Value::Nil) => nil_infix(operator, left, right),
        _ if left.type_name() != right.type_name() => Err(format!(
            "Cannot run expression with types '{}' and '{}'",
            left.type_name(),
            right.type_name()
        )),
        _ => Err(format!(
            "Unknown operator {} for types '{}' and '{}'",
            operator,
            left.type_name(),
            right.type_name()
        )),
    }
}

/// Evaluate a prefix operator. `!` is handled by the evaluator, as it
/// works off general truthiness.
pub fn prefix(operator: &str, value: &Value) -> Result<Value, String> {
    match operator {
        "-" => match value {
            Value::Integer(v) => Ok(Value::Integer(-v)),
            Value::Float(v) => Ok(Value::Float(-v)),
            _ => Err("Minus prefix can be applied to Integers and Floats only".to_string()),
        },
        "~" => match value {
            Value::Integer(v) => Ok(Value::Integer(!v)),
            _ => Err("Bitwise NOT prefix can be applied to Integers only".to_string()),
        },
        _ => Err("Unsupported prefix operator".to_string()),
    }
}

fn integer_infix(operator: &str, left: i64, right: i64) -> Result<Value, String> {
    match operator {
        "+" => Ok(Value::Integer(left + right)),
        "-" => Ok(Value::Integer(left - right)),
        "*" => Ok(Value::Integer(left * right)),
        "/" => {
            if right == 0 {
                return Err("Division by 0".to_string());
            }

            let value = left as f64 / right as f64;
            // A whole result stays an Integer. Otherwise it's a Float.
            if value.trunc() == value {
                Ok(Value::Integer(value as i64))
            } else {
                Ok(Value::Float(value))
            }
        }
        "%" => {
            if right == 0 {
                return Err("Modulo by 0".to_string());
            }
            Ok(Value::Integer(left % right))
        }
        "**" => Ok(Value::Integer((left as f64).powf(right as f64) as i64)),
        "<" => Ok(Value::Boolean(left < right)),
        "<=" => Ok(Value::Boolean(left <= right)),
        ">" => Ok(Value::Boolean(left > right)),
        ">=" => Ok(Value::Boolean(left >= right)),
        "<<" => {
            // Shift needs two positive integers.
            if left < 0 || right < 0 {
                return Err("Bitwise shift requires two unsigned Integers".to_string());
            }
            Ok(Value::Integer(shift_left(left as u64, right as u64)))
        }
        ">>" => {
            if left < 0 || right < 0 {
                return Err("Bitwise shift requires two unsigned Integers".to_string());
            }
            Ok(Value::Integer(shift_right(left as u64, right as u64)))
        }
        "&" => Ok(Value::Integer(left & right)),
        "|" => Ok(Value::Integer(left | right)),
        "==" => Ok(Value::Boolean(left == right)),
        "!=" => Ok(Value::Boolean(left != right)),
        ".." => Ok(integer_range(left, right)),
        _ => Err(format!("Unsupported Integer operator '{}'", operator)),
    }
}

fn shift_left(left: u64, right: u64) -> i64 {
    if right >= u64::BITS as u64 {
        0
    } else {
        (left << right) as i64
    }
}

fn shift_right(left: u64, right: u64) -> i64 {
    if right >= u64::BITS as u64 {
        0
    } else {
        (left >> right) as i64
    }
}

fn float_infix(operator: &str, left: f64, right: f64) -> Result<Value, String> {
    match operator {
        "+" => Ok(Value::Float(left + right)),
        "-" => Ok(Value::Float(left - right)),
        "*" => Ok(Value::Float(left * right)),
        "/" => {
            if right == 0.0 {
                return Err("Division by 0".to_string());
            }
            Ok(Value::Float(left / right))
        }
        "%" => Ok(Value::Float(left % right)),
        "**" => Ok(Value::Float(left.powf(right))),
        "<" => Ok(Value::Boolean(left < right)),
        "<=" => Ok(Value::Boolean(left <= right)),
        ">" => Ok(Value::Boolean(left > right)),
        ">=" => Ok(Value::Boolean(left >= right)),
        "==" => Ok(Value::Boolean(left == right)),
        "!=" => Ok(Value::Boolean(left != right)),
        _ => Err(format!("Unsupported Float operator '{}'", operator)),
    }
}

fn string_infix(operator: &str, left: &str, right: &str) -> Result<Value, String> {
    match operator {
        // Concat two strings.
        "+" => Ok(Value::string(format!("{}{}", left, right))),
        // Order compares by length.
        "<" => Ok(Value::Boolean(count(left) < count(right))),
        "<=" => Ok(Value::Boolean(count(left) <= count(right))),
        ">" => Ok(Value::Boolean(count(left) > count(right))),
        ">=" => Ok(Value::Boolean(count(left) >= count(right))),
        "==" => Ok(Value::Boolean(left == right)),
        "!=" => Ok(Value::Boolean(left != right)),
        // Range between two characters.
        ".." => string_range(left, right),
        _ => Err(format!("Unsupported String operator '{}'", operator)),
    }
}

fn count(text: &str) -> usize {
    text.chars().count()
}

fn boolean_infix(operator: &str, left: bool, right: bool) -> Result<Value, String> {
    match operator {
        "&&" => Ok(Value::Boolean(left && right)),
        "||" => Ok(Value::Boolean(left || right)),
        "==" => Ok(Value::Boolean(left == right)),
        "!=" => Ok(Value::Boolean(left != right)),
        _ => Err(format!("Unsupported Boolean operator '{}'", operator)),
    }
}

fn array_infix(operator: &str, left: &Value, right: &Value) -> Result<Value, String> {
    let (left, right) = match (left, right) {
        (Value::Array(left), Value::Array(right)) => (left.borrow(), right.borrow()),
        _ => unreachable!(),
    };

    match operator {
        // Combine two arrays into a new one.
        "+" => {
            let mut elements = left.clone();
            elements.extend(right.iter().cloned());
            Ok(Value::array(elements))
        }
        "==" => Ok(Value::Boolean(arrays_equal(&left, &right))),
        "!=" => Ok(Value::Boolean(!arrays_equal(&left, &right))),
        "<" => Ok(Value::Boolean(left.len() < right.len())),
        ">" => Ok(Value::Boolean(left.len() > right.len())),
        _ => Err(format!("Unsupported Array operator '{}'", operator)),
    }
}

fn dictionary_infix(operator: &str, left: &Value, right: &Value) -> Result<Value, String> {
    let (left, right) = match (left, right) {
        (Value::Dictionary(left), Value::Dictionary(right)) => (left.borrow(), right.borrow()),
        _ => unreachable!(),
    };

    match operator {
        // Merge into a new dictionary. The left side wins on conflict.
        "+" => {
            let mut pairs = left.clone();
            for (key, value) in right.iter() {
                let key_inspect = key.inspect();
                if !pairs.iter().any(|(k, _)| k.inspect() == key_inspect) {
                    pairs.push((key.clone(), value.clone()));
                }
            }
            Ok(Value::dictionary(pairs))
        }
        "==" => Ok(Value::Boolean(dictionaries_equal(&left, &right))),
        "!=" => Ok(Value::Boolean(!dictionaries_equal(&left, &right))),
        "<" => Ok(Value::Boolean(left.len() < right.len())),
        ">" => Ok(Value::Boolean(left.len() > right.len())),
        _ => Err(format!("Unsupported Dictionary operator '{}'", operator)),
    }
}

fn nil_infix(operator: &str, left: &Value, right: &Value) -> Result<Value, String> {
    let both_nil = matches!(left, Value::Nil) && matches!(right, Value::Nil);

    match operator {
        "==" => Ok(Value::Boolean(both_nil)),
        "!=" => Ok(Value::Boolean(!both_nil)),
        _ => Err(format!("Unsupported Nil operator '{}'", operator)),
    }
}

/// Arrays compare by length and elementwise type and inspected form.
pub fn arrays_equal(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right.iter())
            .all(|(l, r)| values_equal(l, r))
}

/// Dictionaries compare as multisets of inspected key/value pairs.
pub fn dictionaries_equal(left: &[(Value, Value)], right: &[(Value, Value)]) -> bool {
    left.len() == right.len()
        && left.iter().all(|(lk, lv)| {
            right
                .iter()
                .any(|(rk, rv)| lk.inspect() == rk.inspect() && lv.inspect() == rv.inspect())
        })
}

// An inclusive range between two integers, in either direction.
fn integer_range(left: i64, right: i64) -> Value {
    let elements: Vec<Value> = if left < right {
        (left..=right).map(Value::Integer).collect()
    } else {
        (right..=left).rev().map(Value::Integer).collect()
    };

    Value::array(elements)
}

// A range between two single-character strings, over 0-9a-z in
// either direction.
fn string_range(left: &str, right: &str) -> Result<Value, String> {
    const ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

    if count(left) != 1 || count(right) != 1 {
        return Err("Range operator expects 2 single character strings".to_string());
    }

    let left = left.to_lowercase().chars().next().unwrap();
    let right = right.to_lowercase().chars().next().unwrap();

    let elements: Vec<Value> = if left < right {
        ALPHABET
            .chars()
            .filter(|&c| c >= left && c <= right)
            .map(|c| Value::string(c.to_string()))
            .collect()
    } else {
        ALPHABET
            .chars()
            .rev()
            .filter(|&c| c <= left && c >= right)
            .map(|c| Value::string(c.to_string()))
            .collect()
    };

    Ok(Value::array(elements))
}
