use crate::interpreter::library::LibraryResult;
use crate::interpreter::value::Value;
use crate::interpreter::Interpreter;

// Keys are compared by their inspected form, the same rule dictionary
// subscripts use. An Integer 1 and a Float 1.0 are distinct keys.

// Dict.size(Dictionary) -> Integer
pub fn size(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Dict.size expects exactly 1 argument".into());
    }

    match &args[0] {
        Value::Dictionary(pairs) => Ok(Value::Integer(pairs.borrow().len() as i64)),
        _ => Err("Dict.size expects a Dictionary".into()),
    }
}

// Dict.has(Dictionary, key Any) -> Boolean
pub fn has(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("Dict.has expects exactly 2 arguments".into());
    }

    match &args[0] {
        Value::Dictionary(pairs) => {
            let key = args[1].inspect();
            let found = pairs.borrow().iter().any(|(k, _)| k.inspect() == key);
            Ok(Value::Boolean(found))
        }
        _ => Err("Dict.has expects a Dictionary".into()),
    }
}

// Dict.insert(Dictionary, key Any, value Any) -> Dictionary
// Writes into the shared dictionary, visible through every alias.
// An existing key is overwritten in place.
pub fn insert(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 3 {
        return Err("Dict.insert expects exactly 3 arguments".into());
    }

    match &args[0] {
        Value::Dictionary(pairs) => {
            let key = args[1].inspect();
            let mut pairs = pairs.borrow_mut();

            match pairs.iter_mut().find(|(k, _)| k.inspect() == key) {
                Some(pair) => pair.1 = args[2].clone(),
                None => pairs.push((args[1].clone(), args[2].clone())),
            }

            drop(pairs);
            Ok(args[0].clone())
        }
        _ => Err("Dict.insert expects a Dictionary".into()),
    }
}

// Dict.update(Dictionary, key Any, value Any) -> Dictionary
// Like Dict.insert, but the key must already exist.
pub fn update(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 3 {
        return Err("Dict.update expects exactly 3 arguments".into());
    }

    match &args[0] {
        Value::Dictionary(pairs) => {
            let key = args[1].inspect();
            let mut pairs = pairs.borrow_mut();

            match pairs.iter_mut().find(|(k, _)| k.inspect() == key) {
                Some(pair) => {
                    pair.1 = args[2].clone();
                    drop(pairs);
                    Ok(args[0].clone())
                }
                None => Err(format!(
                    "Dict.update didn't find key '{}' in the Dictionary",
                    args[1].inspect()
                )
                .into()),
            }
        }
        _ => Err("Dict.update expects a Dictionary".into()),
    }
}

// Dict.delete(Dictionary, key Any) -> Dictionary
pub fn delete(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("Dict.delete expects exactly 2 arguments".into());
    }

    match &args[0] {
        Value::Dictionary(pairs) => {
            let key = args[1].inspect();
            pairs.borrow_mut().retain(|(k, _)| k.inspect() != key);
            Ok(args[0].clone())
        }
        _ => Err("Dict.delete expects a Dictionary".into()),
    }
}

// Dict.empty?(Dictionary) -> Boolean
pub fn empty(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Dict.empty? expects exactly 1 argument".into());
    }

    match &args[0] {
        Value::Dictionary(pairs) => Ok(Value::Boolean(pairs.borrow().is_empty())),
        _ => Err("Dict.empty? expects a Dictionary".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> Interpreter {
        Interpreter::new()
    }

    fn sample() -> Value {
        Value::dictionary(vec![
            (Value::string("a"), Value::Integer(1)),
            (Value::string("b"), Value::Integer(2)),
        ])
    }

    #[test]
    fn size_and_empty() {
        assert_eq!(size(&mut runner(), &[sample()]).unwrap().inspect(), "2");
        assert_eq!(
            empty(&mut runner(), &[sample()]).unwrap().inspect(),
            "false"
        );
        assert_eq!(
            empty(&mut runner(), &[Value::dictionary(vec![])]).unwrap().inspect(),
            "true"
        );
        assert!(size(&mut runner(), &[Value::Integer(1)]).is_err());
    }

    #[test]
    fn has_compares_keys_by_inspect() {
        let dict = Value::dictionary(vec![(Value::Integer(1), Value::string("one"))]);
        assert_eq!(
            has(&mut runner(), &[dict.clone(), Value::Integer(1)]).unwrap().inspect(),
            "true"
        );
        // A Float key is a different key than an Integer one.
        assert_eq!(
            has(&mut runner(), &[dict, Value::Float(1.0)]).unwrap().inspect(),
            "false"
        );
    }

    #[test]
    fn insert_mutates_the_shared_dictionary() {
        let dict = sample();
        let alias = dict.clone();

        insert(
            &mut runner(),
            &[dict.clone(), Value::string("c"), Value::Integer(3)],
        )
        .unwrap();
        insert(
            &mut runner(),
            &[dict, Value::string("a"), Value::Integer(10)],
        )
        .unwrap();

        assert_eq!(alias.inspect(), "[\"a\":10, \"b\":2, \"c\":3]");
    }

    #[test]
    fn update_requires_an_existing_key() {
        let dict = sample();
        update(
            &mut runner(),
            &[dict.clone(), Value::string("b"), Value::Integer(20)],
        )
        .unwrap();
        assert_eq!(dict.inspect(), "[\"a\":1, \"b\":20]");

        assert!(update(
            &mut runner(),
            &[dict, Value::string("zz"), Value::Integer(0)]
        )
        .is_err());
    }

    #[test]
    fn delete_removes_by_key() {
        let dict = sample();
        delete(&mut runner(), &[dict.clone(), Value::string("a")]).unwrap();
        assert_eq!(dict.inspect(), "[\"b\":2]");

        // Deleting a missing key is a no-op.
        delete(&mut runner(), &[dict.clone(), Value::string("zz")]).unwrap();
        assert_eq!(dict.inspect(), "[\"b\":2]");
    }
}
