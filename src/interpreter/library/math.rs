use rand::Rng;

use crate::interpreter::library::LibraryResult;
use crate::interpreter::value::Value;
use crate::interpreter::Interpreter;

// Math.pi() -> Float
pub fn pi(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if !args.is_empty() {
        return Err("Math.pi doesn't expect arguments".into());
    }

    Ok(Value::Float(std::f64::consts::PI))
}

// Math.ceil(Float) -> Integer
pub fn ceil(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Math.ceil expects exactly 1 argument".into());
    }

    match &args[0] {
        Value::Float(value) => Ok(Value::Integer(value.ceil() as i64)),
        _ => Err("Math.ceil expects a Float".into()),
    }
}

// Math.floor(Float) -> Integer
pub fn floor(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Math.floor expects exactly 1 argument".into());
    }

    match &args[0] {
        Value::Float(value) => Ok(Value::Integer(value.floor() as i64)),
        _ => Err("Math.floor expects a Float".into()),
    }
}

// Math.max(Float | Integer, Float | Integer) -> Float | Integer
pub fn max(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("Math.max expects exactly 2 arguments".into());
    }

    match (&args[0], &args[1]) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(*a.max(b))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a.max(*b))),
        (a, b) => Err(format!(
            "Math.max can't compare '{}' with '{}'",
            a.type_name(),
            b.type_name()
        )
        .into()),
    }
}

// Math.min(Float | Integer, Float | Integer) -> Float | Integer
pub fn min(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("Math.min expects exactly 2 arguments".into());
    }

    match (&args[0], &args[1]) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(*a.min(b))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a.min(*b))),
        (a, b) => Err(format!(
            "Math.min can't compare '{}' with '{}'",
            a.type_name(),
            b.type_name()
        )
        .into()),
    }
}

// Math.random(min Integer, max Integer) -> Integer
// Draws from the interpreter's RNG, in [min, max).
pub fn random(interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("Math.random expects exactly 2 arguments".into());
    }

    let (min, max) = match (&args[0], &args[1]) {
        (Value::Integer(min), Value::Integer(max)) => (*min, *max),
        _ => return Err("Math.random expects min and max as Integers".into()),
    };

    if max < min {
        return Err("Max should be higher than min".into());
    }

    if max == min {
        return Ok(Value::Integer(min));
    }

    Ok(Value::Integer(interpreter.rng.random_range(min..max)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> Interpreter {
        Interpreter::new()
    }

    #[test]
    fn pi_is_a_float_constant() {
        let value = pi(&mut runner(), &[]).unwrap();
        match value {
            Value::Float(v) => assert!((v - std::f64::consts::PI).abs() < f64::EPSILON),
            other => panic!("expected a Float, got {:?}", other),
        }
        assert!(pi(&mut runner(), &[Value::Integer(1)]).is_err());
    }

    #[test]
    fn ceil_and_floor_round_floats() {
        assert_eq!(ceil(&mut runner(), &[Value::Float(1.2)]).unwrap().inspect(), "2");
        assert_eq!(floor(&mut runner(), &[Value::Float(1.8)]).unwrap().inspect(), "1");
        assert!(ceil(&mut runner(), &[Value::Integer(1)]).is_err());
        assert!(floor(&mut runner(), &[]).is_err());
    }

    #[test]
    fn max_and_min_keep_the_operand_type() {
        let args = [Value::Integer(3), Value::Integer(7)];
        assert_eq!(max(&mut runner(), &args).unwrap().inspect(), "7");
        assert_eq!(min(&mut runner(), &args).unwrap().inspect(), "3");

        let args = [Value::Float(1.5), Value::Float(0.5)];
        assert_eq!(max(&mut runner(), &args).unwrap().inspect(), "1.5");
        assert_eq!(min(&mut runner(), &args).unwrap().inspect(), "0.5");

        let args = [Value::Integer(1), Value::Float(2.0)];
        assert!(max(&mut runner(), &args).is_err());
    }

    #[test]
    fn random_stays_in_range() {
        let mut interpreter = runner();
        for _ in 0..50 {
            let value = random(&mut interpreter, &[Value::Integer(2), Value::Integer(5)]).unwrap();
            match value {
                Value::Integer(v) => assert!((2..5).contains(&v), "out of range: {}", v),
                other => panic!("expected an Integer, got {:?}", other),
            }
        }

        assert_eq!(
            random(&mut interpreter, &[Value::Integer(4), Value::Integer(4)])
                .unwrap()
                .inspect(),
            "4"
        );
        assert!(random(&mut interpreter, &[Value::Integer(5), Value::Integer(1)]).is_err());
    }
}
