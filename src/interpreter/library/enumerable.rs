use rand::Rng;

use crate::interpreter::library::{enumerable_elements, LibraryError, LibraryResult};
use crate::interpreter::value::{values_equal, Value};
use crate::interpreter::Interpreter;

// Enum.size(Array | String) -> Integer
pub fn size(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Enum.size expects exactly 1 argument".into());
    }

    match enumerable_elements(&args[0]) {
        Some(elements) => Ok(Value::Integer(elements.len() as i64)),
        None => Err("Enum.size expects an Array or String".into()),
    }
}

// Enum.reverse(Array | String) -> Array
pub fn reverse(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Enum.reverse expects exactly 1 argument".into());
    }

    match enumerable_elements(&args[0]) {
        Some(mut elements) => {
            elements.reverse();
            Ok(Value::array(elements))
        }
        None => Err("Enum.reverse expects an Array or String".into()),
    }
}

// Enum.first(Array | String) -> Any
pub fn first(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Enum.first expects exactly 1 argument".into());
    }

    match enumerable_elements(&args[0]) {
        Some(elements) => match elements.first() {
            Some(element) => Ok(element.clone()),
            None => Err("Enum.first expects a non-empty array or string".into()),
        },
        None => Err("Enum.first expects an Array or String".into()),
    }
}

// Enum.last(Array | String) -> Any
pub fn last(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Enum.last expects exactly 1 argument".into());
    }

    match enumerable_elements(&args[0]) {
        Some(elements) => match elements.last() {
            Some(element) => Ok(element.clone()),
            None => Err("Enum.last expects a non-empty array or string".into()),
        },
        None => Err("Enum.last expects an Array or String".into()),
    }
}

// Enum.insert(Array, element Any) -> Array
// Pushes into the shared array, visible through every alias.
pub fn insert(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("Enum.insert expects exactly 2 arguments".into());
    }

    match &args[0] {
        Value::Array(elements) => {
            elements.borrow_mut().push(args[1].clone());
            Ok(args[0].clone())
        }
        _ => Err("Enum.insert expects an Array".into()),
    }
}

// Enum.delete(Array, index Integer) -> Array
pub fn delete(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("Enum.delete expects exactly 2 arguments".into());
    }

    let index = match &args[1] {
        Value::Integer(index) => *index,
        _ => return Err("Enum.delete expects an Integer index".into()),
    };

    match &args[0] {
        Value::Array(elements) => {
            let elements = elements.borrow();
            if index < 0 || index as usize >= elements.len() {
                return Err("Index supplied to Enum.delete doesn't exist in the Array".into());
            }

            let mut remaining = elements.clone();
            remaining.remove(index as usize);
            Ok(Value::array(remaining))
        }
        _ => Err("Enum.delete expects an Array".into()),
    }
}

// Enum.map(Array | String, fn Function(element)) -> Array
pub fn map(interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("Enum.map expects exactly 2 arguments".into());
    }

    let elements = match enumerable_elements(&args[0]) {
        Some(elements) => elements,
        None => return Err("Enum.map expects an Array or String".into()),
    };

    let function = match &args[1] {
        Value::Function(function) => function.clone(),
        _ => return Err("Enum.map expects a Function".into()),
    };

    if function.parameters.len() != 1 {
        return Err("Enum.map expects a function with exactly 1 parameter".into());
    }

    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        match interpreter.call_function(&function, &[element]) {
            Some(result) => out.push(result),
            None => return Err(LibraryError::Reported),
        }
    }

    Ok(Value::array(out))
}

// Enum.filter(Array | String, fn Function(element)) -> Array
pub fn filter(interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("Enum.filter expects exactly 2 arguments".into());
    }

    let elements = match enumerable_elements(&args[0]) {
        Some(elements) => elements,
        None => return Err("Enum.filter expects an Array or String".into()),
    };

    let function = match &args[1] {
        Value::Function(function) => function.clone(),
        _ => return Err("Enum.filter expects a Function".into()),
    };

    if function.parameters.len() != 1 {
        return Err("Enum.filter expects a function with exactly 1 parameter".into());
    }

    let mut out = Vec::new();
    for element in elements {
        match interpreter.call_function(&function, std::slice::from_ref(&element)) {
            Some(Value::Boolean(true)) => out.push(element),
            Some(_) => {}
            None => return Err(LibraryError::Reported),
        }
    }

    Ok(Value::array(out))
}

// Enum.reduce(Array | String, start Any, fn Function(element, accumulator)) -> Any
pub fn reduce(interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 3 {
        return Err("Enum.reduce expects exactly 3 arguments".into());
    }

    let elements = match enumerable_elements(&args[0]) {
        Some(elements) => elements,
        None => return Err("Enum.reduce expects an Array or String".into()),
    };

    let function = match &args[2] {
        Value::Function(function) => function.clone(),
        _ => return Err("Enum.reduce expects a Function".into()),
    };

    if function.parameters.len() != 2 {
        return Err("Enum.reduce expects a function with exactly 2 parameters".into());
    }

    let mut accumulator = args[1].clone();
    for element in elements {
        match interpreter.call_function(&function, &[element, accumulator]) {
            Some(result) => accumulator = result,
            None => return Err(LibraryError::Reported),
        }
    }

    Ok(accumulator)
}

// Enum.find(Array | String, fn Function(element)) -> Any
// The first element the function returns true for, or nil.
pub fn find(interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("Enum.find expects exactly 2 arguments".into());
    }

    let elements = match enumerable_elements(&args[0]) {
        Some(elements) => elements,
        None => return Err("Enum.find expects an Array or String".into()),
    };

    let function = match &args[1] {
        Value::Function(function) => function.clone(),
        _ => return Err("Enum.find expects a Function".into()),
    };

    if function.parameters.len() != 1 {
        return Err("Enum.find expects a function with exactly 1 parameter".into());
    }

    for element in elements {
        match interpreter.call_function(&function, std::slice::from_ref(&element)) {
            Some(Value::Boolean(true)) => return Ok(element),
            Some(_) => {}
            None => return Err(LibraryError::Reported),
        }
    }

    Ok(Value::Nil)
}

// Enum.contains?(Array | String, search Any) -> Boolean
pub fn contains(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("Enum.contains? expects exactly 2 arguments".into());
    }

    let elements = match enumerable_elements(&args[0]) {
        Some(elements) => elements,
        None => return Err("Enum.contains? expects an Array or String".into()),
    };

    let found = elements.iter().any(|element| values_equal(element, &args[1]));

    Ok(Value::Boolean(found))
}

// Enum.unique(Array | String) -> Array
pub fn unique(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Enum.unique expects exactly 1 argument".into());
    }

    let elements = match enumerable_elements(&args[0]) {
        Some(elements) => elements,
        None => return Err("Enum.unique expects an Array or String".into()),
    };

    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for element in elements {
        if seen.insert(element.inspect()) {
            out.push(element);
        }
    }

    Ok(Value::array(out))
}

// Enum.empty?(Array | String) -> Boolean
pub fn empty(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Enum.empty? expects exactly 1 argument".into());
    }

    match enumerable_elements(&args[0]) {
        Some(elements) => Ok(Value::Boolean(elements.is_empty())),
        None => Err("Enum.empty? expects an Array or String".into()),
    }
}

// Enum.random(Array | String) -> Any
pub fn random(interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("Enum.random expects exactly 1 argument".into());
    }

    let elements = match enumerable_elements(&args[0]) {
        Some(elements) => elements,
        None => return Err("Enum.random expects an Array or String".into()),
    };

    if elements.is_empty() {
        return Err("Random value can't be retrieved from an empty enumerable".into());
    }

    let index = interpreter.rng.random_range(0..elements.len());
    Ok(elements[index].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> Interpreter {
        Interpreter::new()
    }

    fn ints(values: &[i64]) -> Value {
        Value::array(values.iter().copied().map(Value::Integer).collect())
    }

    #[test]
    fn size_counts_elements_and_scalars() {
        assert_eq!(size(&mut runner(), &[ints(&[1, 2, 3])]).unwrap().inspect(), "3");
        assert_eq!(size(&mut runner(), &[Value::string("héllo")]).unwrap().inspect(), "5");
        assert!(size(&mut runner(), &[Value::Integer(1)]).is_err());
    }

    #[test]
    fn reverse_and_bounds() {
        assert_eq!(
            reverse(&mut runner(), &[ints(&[1, 2, 3])]).unwrap().inspect(),
            "[3, 2, 1]"
        );
        assert_eq!(
            reverse(&mut runner(), &[Value::string("ab")]).unwrap().inspect(),
            "[\"b\", \"a\"]"
        );
        assert_eq!(first(&mut runner(), &[ints(&[7, 8])]).unwrap().inspect(), "7");
        assert_eq!(last(&mut runner(), &[ints(&[7, 8])]).unwrap().inspect(), "8");
        assert!(first(&mut runner(), &[ints(&[])]).is_err());
    }

    #[test]
    fn insert_mutates_the_shared_array() {
        let array = ints(&[1]);
        let alias = array.clone();

        insert(&mut runner(), &[array, Value::Integer(2)]).unwrap();

        assert_eq!(alias.inspect(), "[1, 2]");
    }

    #[test]
    fn delete_returns_a_new_array() {
        let array = ints(&[1, 2, 3]);
        let result = delete(&mut runner(), &[array.clone(), Value::Integer(1)]).unwrap();

        assert_eq!(result.inspect(), "[1, 3]");
        assert_eq!(array.inspect(), "[1, 2, 3]");
        assert!(delete(&mut runner(), &[array, Value::Integer(9)]).is_err());
    }

    #[test]
    fn contains_compares_by_type_and_inspect() {
        let array = ints(&[1, 2]);
        assert_eq!(
            contains(&mut runner(), &[array.clone(), Value::Integer(2)]).unwrap().inspect(),
            "true"
        );
        assert_eq!(
            contains(&mut runner(), &[array.clone(), Value::Float(2.0)]).unwrap().inspect(),
            "false"
        );
        assert_eq!(
            contains(&mut runner(), &[array, Value::Integer(5)]).unwrap().inspect(),
            "false"
        );
    }

    #[test]
    fn unique_keeps_the_first_occurrence() {
        let array = ints(&[1, 2, 1, 3, 2]);
        assert_eq!(unique(&mut runner(), &[array]).unwrap().inspect(), "[1, 2, 3]");
    }

    #[test]
    fn empty_checks() {
        assert_eq!(empty(&mut runner(), &[ints(&[])]).unwrap().inspect(), "true");
        assert_eq!(empty(&mut runner(), &[ints(&[1])]).unwrap().inspect(), "false");
        assert_eq!(
            empty(&mut runner(), &[Value::string("")]).unwrap().inspect(),
            "true"
        );
    }

    #[test]
    fn random_picks_an_element() {
        let mut interpreter = runner();
        let array = ints(&[4, 5, 6]);
        for _ in 0..20 {
            let value = random(&mut interpreter, std::slice::from_ref(&array)).unwrap();
            match value {
                Value::Integer(v) => assert!((4..=6).contains(&v)),
                other => panic!("expected an Integer, got {:?}", other),
            }
        }
        assert!(random(&mut interpreter, &[ints(&[])]).is_err());
    }
}
