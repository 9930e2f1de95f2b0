use crate::interpreter::library::LibraryResult;
use crate::interpreter::value::Value;
use crate::interpreter::Interpreter;

// Type.of(Any) -> String
pub fn of(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Type.of expects exactly 1 argument".into());
    }

    Ok(Value::string(args[0].type_name()))
}

// Type.toString(Any) -> String
pub fn to_string(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Type.toString expects exactly 1 argument".into());
    }

    match &args[0] {
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) => {
            Ok(Value::string(args[0].inspect()))
        }
        Value::Str(_) => Ok(args[0].clone()),
        other => Err(format!("Type.toString can't convert '{}' to String", other.type_name()).into()),
    }
}

// Type.toInt(Any) -> Integer
pub fn to_int(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Type.toInt expects exactly 1 argument".into());
    }

    match &args[0] {
        Value::Str(text) => match text.trim().parse::<i64>() {
            Ok(value) => Ok(Value::Integer(value)),
            Err(_) => Err(format!("Type.toInt can't convert '{}' to Integer", text).into()),
        },
        Value::Float(value) => Ok(Value::Integer(*value as i64)),
        Value::Boolean(value) => Ok(Value::Integer(i64::from(*value))),
        Value::Integer(_) => Ok(args[0].clone()),
        other => Err(format!("Type.toInt can't convert '{}' to Integer", other.type_name()).into()),
    }
}

// Type.toFloat(Any) -> Float
pub fn to_float(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Type.toFloat expects exactly 1 argument".into());
    }

    match &args[0] {
        Value::Str(text) => match text.trim().parse::<f64>() {
            Ok(value) => Ok(Value::Float(value)),
            Err(_) => Err(format!("Type.toFloat can't convert '{}' to Float", text).into()),
        },
        Value::Integer(value) => Ok(Value::Float(*value as f64)),
        Value::Boolean(value) => Ok(Value::Float(f64::from(u8::from(*value)))),
        Value::Float(_) => Ok(args[0].clone()),
        other => Err(format!("Type.toFloat can't convert '{}' to Float", other.type_name()).into()),
    }
}

// Type.toArray(Any) -> Array
pub fn to_array(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Type.toArray expects exactly 1 argument".into());
    }

    match &args[0] {
        Value::Str(text) => Ok(Value::array(
            text.chars()
                .map(|c| Value::string(c.to_string()))
                .collect(),
        )),
        Value::Integer(_) | Value::Float(_) => Ok(Value::array(vec![args[0].clone()])),
        Value::Array(_) => Ok(args[0].clone()),
        other => Err(format!("Type.toArray can't convert '{}' to Array", other.type_name()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> Interpreter {
        Interpreter::new()
    }

    #[test]
    fn of_returns_type_labels() {
        assert_eq!(of(&mut runner(), &[Value::Integer(1)]).unwrap().inspect(), "\"Integer\"");
        assert_eq!(of(&mut runner(), &[Value::Nil]).unwrap().inspect(), "\"Nil\"");
        assert_eq!(
            of(&mut runner(), &[Value::array(vec![])]).unwrap().inspect(),
            "\"Array\""
        );
    }

    #[test]
    fn conversions_to_string() {
        assert_eq!(
            to_string(&mut runner(), &[Value::Integer(42)]).unwrap().inspect(),
            "\"42\""
        );
        assert_eq!(
            to_string(&mut runner(), &[Value::Float(2.5)]).unwrap().inspect(),
            "\"2.5\""
        );
        assert_eq!(
            to_string(&mut runner(), &[Value::Boolean(true)]).unwrap().inspect(),
            "\"true\""
        );
        assert!(to_string(&mut runner(), &[Value::Nil]).is_err());
    }

    #[test]
    fn conversions_to_int() {
        assert_eq!(
            to_int(&mut runner(), &[Value::string("12")]).unwrap().inspect(),
            "12"
        );
        assert_eq!(
            to_int(&mut runner(), &[Value::Float(3.9)]).unwrap().inspect(),
            "3"
        );
        assert_eq!(
            to_int(&mut runner(), &[Value::Boolean(true)]).unwrap().inspect(),
            "1"
        );
        assert!(to_int(&mut runner(), &[Value::string("twelve")]).is_err());
    }

    #[test]
    fn conversions_to_float() {
        assert_eq!(
            to_float(&mut runner(), &[Value::string("1.5")]).unwrap().inspect(),
            "1.5"
        );
        assert_eq!(
            to_float(&mut runner(), &[Value::Integer(2)]).unwrap().inspect(),
            "2.0"
        );
    }

    #[test]
    fn conversions_to_array() {
        assert_eq!(
            to_array(&mut runner(), &[Value::string("abc")]).unwrap().inspect(),
            "[\"a\", \"b\", \"c\"]"
        );
        assert_eq!(
            to_array(&mut runner(), &[Value::Integer(1)]).unwrap().inspect(),
            "[1]"
        );
        assert!(to_array(&mut runner(), &[Value::Nil]).is_err());
    }
}
