use regex::Regex;

use crate::interpreter::library::LibraryResult;
use crate::interpreter::value::Value;
use crate::interpreter::Interpreter;

// Lengths and positions count Unicode scalars, in agreement with the
// subscript semantics. String.countBytes is the one byte-level view.

fn expect_string<'a>(value: &'a Value, message: &str) -> Result<&'a str, String> {
    match value {
        Value::Str(text) => Ok(text),
        _ => Err(message.to_string()),
    }
}

// String.count(String) -> Integer
pub fn count(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("String.count expects exactly 1 argument".into());
    }

    let text = expect_string(&args[0], "String.count expects a String")?;
    Ok(Value::Integer(text.chars().count() as i64))
}

// String.countBytes(String) -> Integer
pub fn count_bytes(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("String.countBytes expects exactly 1 argument".into());
    }

    let text = expect_string(&args[0], "String.countBytes expects a String")?;
    Ok(Value::Integer(text.len() as i64))
}

// String.lower(String) -> String
pub fn lower(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("String.lower expects exactly 1 argument".into());
    }

    let text = expect_string(&args[0], "String.lower expects a String")?;
    Ok(Value::string(text.to_lowercase()))
}

// String.upper(String) -> String
pub fn upper(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("String.upper expects exactly 1 argument".into());
    }

    let text = expect_string(&args[0], "String.upper expects a String")?;
    Ok(Value::string(text.to_uppercase()))
}

// String.capitalize(String) -> String
// Uppercases the first character of every word.
pub fn capitalize(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("String.capitalize expects exactly 1 argument".into());
    }

    let text = expect_string(&args[0], "String.capitalize expects a String")?;

    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }

    Ok(Value::string(out))
}

// String.trim(String, subset String) -> String
pub fn trim(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("String.trim expects exactly 2 arguments".into());
    }

    let text = expect_string(&args[0], "String.trim expects a String")?;
    let subset = expect_string(&args[1], "String.trim expects a String as subset")?;

    Ok(Value::string(
        text.trim_matches(|c| subset.contains(c)).to_string(),
    ))
}

// String.trimLeft(String, subset String) -> String
pub fn trim_left(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("String.trimLeft expects exactly 2 arguments".into());
    }

    let text = expect_string(&args[0], "String.trimLeft expects a String")?;
    let subset = expect_string(&args[1], "String.trimLeft expects a String as subset")?;

    Ok(Value::string(
        text.trim_start_matches(|c| subset.contains(c)).to_string(),
    ))
}

// String.trimRight(String, subset String) -> String
pub fn trim_right(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("String.trimRight expects exactly 2 arguments".into());
    }

    let text = expect_string(&args[0], "String.trimRight expects a String")?;
    let subset = expect_string(&args[1], "String.trimRight expects a String as subset")?;

    Ok(Value::string(
        text.trim_end_matches(|c| subset.contains(c)).to_string(),
    ))
}

// String.replace(String, search String, replace String) -> String
pub fn replace(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 3 {
        return Err("String.replace expects exactly 3 arguments".into());
    }

    let text = expect_string(&args[0], "String.replace expects a String")?;
    let search = expect_string(&args[1], "String.replace expects a String as the search")?;
    let replacement = expect_string(&args[2], "String.replace expects a String as the replace")?;

    Ok(Value::string(text.replace(search, replacement)))
}

// String.join(Array, glue String) -> String
pub fn join(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("String.join expects exactly 2 arguments".into());
    }

    let elements = match &args[0] {
        Value::Array(elements) => elements.borrow(),
        _ => return Err("String.join expects an Array".into()),
    };
    let glue = expect_string(&args[1], "String.join expects a String as the glue")?;

    let mut parts = Vec::with_capacity(elements.len());
    for element in elements.iter() {
        match element {
            Value::Str(text) => parts.push(text.to_string()),
            _ => return Err("String.join expects an Array of Strings".into()),
        }
    }

    Ok(Value::string(parts.join(glue)))
}

// String.split(String, separator String) -> Array
pub fn split(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("String.split expects exactly 2 arguments".into());
    }

    let text = expect_string(&args[0], "String.split expects a String")?;
    let separator = expect_string(&args[1], "String.split expects a String as the separator")?;

    let parts: Vec<Value> = text
        .split(separator)
        .map(|part| Value::string(part.to_string()))
        .collect();

    Ok(Value::array(parts))
}

// String.contains?(String, search String) -> Boolean
pub fn contains(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("String.contains? expects exactly 2 arguments".into());
    }

    let text = expect_string(&args[0], "String.contains? expects a String")?;
    let search = expect_string(&args[1], "String.contains? expects a String as search")?;

    Ok(Value::Boolean(text.contains(search)))
}

// String.reverse(String) -> String
pub fn reverse(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("String.reverse expects exactly 1 argument".into());
    }

    let text = expect_string(&args[0], "String.reverse expects a String")?;
    Ok(Value::string(text.chars().rev().collect::<String>()))
}

// String.slice(String, start Integer, length Integer) -> String
pub fn slice(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 3 {
        return Err("String.slice expects exactly 3 arguments".into());
    }

    let text = expect_string(&args[0], "String.slice expects a String")?;
    let start = match &args[1] {
        Value::Integer(start) => *start,
        _ => return Err("String.slice expects an Integer as start".into()),
    };
    let length = match &args[2] {
        Value::Integer(length) => *length,
        _ => return Err("String.slice expects an Integer as length".into()),
    };

    let total = text.chars().count() as i64;
    if start < 0 || length < 0 || start + length > total {
        return Err("Length out of bounds".into());
    }

    let out: String = text
        .chars()
        .skip(start as usize)
        .take(length as usize)
        .collect();

    Ok(Value::string(out))
}

// String.match?(String, regex String) -> Boolean
pub fn matches(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("String.match? expects exactly 2 arguments".into());
    }

    let text = expect_string(&args[0], "String.match? expects a String")?;
    let pattern = expect_string(&args[1], "String.match? expects a String regex")?;

    match Regex::new(pattern) {
        Ok(regex) => Ok(Value::Boolean(regex.is_match(text))),
        Err(_) => Err("Check the syntax of the regular expression".into()),
    }
}

// String.starts?(String, prefix String) -> Boolean
pub fn starts(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("String.starts? expects exactly 2 arguments".into());
    }

    let text = expect_string(&args[0], "String.starts? expects a String")?;
    let prefix = expect_string(&args[1], "String.starts? expects a String as prefix")?;

    Ok(Value::Boolean(text.starts_with(prefix)))
}

// String.ends?(String, suffix String) -> Boolean
pub fn ends(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 2 {
        return Err("String.ends? expects exactly 2 arguments".into());
    }

    let text = expect_string(&args[0], "String.ends? expects a String")?;
    let suffix = expect_string(&args[1], "String.ends? expects a String as suffix")?;

    Ok(Value::Boolean(text.ends_with(suffix)))
}

// String.first(String) -> String
pub fn first(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("String.first expects exactly 1 argument".into());
    }

    let text = expect_string(&args[0], "String.first expects a String")?;

    match text.chars().next() {
        Some(c) => Ok(Value::string(c.to_string())),
        None => Ok(Value::string("")),
    }
}

// String.last(String) -> String
pub fn last(_interpreter: &mut Interpreter, args: &[Value]) -> LibraryResult {
    if args.len() != 1 {
        return Err("String.last expects exactly 1 argument".into());
    }

    let text = expect_string(&args[0], "String.last expects a String")?;

    match text.chars().last() {
        Some(c) => Ok(Value::string(c.to_string())),
        None => Ok(Value::string("")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> Interpreter {
        Interpreter::new()
    }

    fn s(text: &str) -> Value {
        Value::string(text)
    }

    #[test]
    fn count_agrees_with_scalar_indexing() {
        assert_eq!(count(&mut runner(), &[s("héllo")]).unwrap().inspect(), "5");
        assert_eq!(
            count_bytes(&mut runner(), &[s("héllo")]).unwrap().inspect(),
            "6"
        );
    }

    #[test]
    fn case_changes() {
        assert_eq!(lower(&mut runner(), &[s("AbC")]).unwrap().inspect(), "\"abc\"");
        assert_eq!(upper(&mut runner(), &[s("AbC")]).unwrap().inspect(), "\"ABC\"");
        assert_eq!(
            capitalize(&mut runner(), &[s("hello big world")]).unwrap().inspect(),
            "\"Hello Big World\""
        );
    }

    #[test]
    fn trims_remove_subset_characters() {
        assert_eq!(
            trim(&mut runner(), &[s("xxabcxx"), s("x")]).unwrap().inspect(),
            "\"abc\""
        );
        assert_eq!(
            trim_left(&mut runner(), &[s("xxabcxx"), s("x")]).unwrap().inspect(),
            "\"abcxx\""
        );
        assert_eq!(
            trim_right(&mut runner(), &[s("xxabcxx"), s("x")]).unwrap().inspect(),
            "\"xxabc\""
        );
    }

    #[test]
    fn replace_join_split() {
        assert_eq!(
            replace(&mut runner(), &[s("a-b-c"), s("-"), s("+")]).unwrap().inspect(),
            "\"a+b+c\""
        );
        let array = Value::array(vec![s("a"), s("b"), s("c")]);
        assert_eq!(
            join(&mut runner(), &[array, s(", ")]).unwrap().inspect(),
            "\"a, b, c\""
        );
        assert_eq!(
            split(&mut runner(), &[s("a,b,c"), s(",")]).unwrap().inspect(),
            "[\"a\", \"b\", \"c\"]"
        );
        let mixed = Value::array(vec![s("a"), Value::Integer(1)]);
        assert!(join(&mut runner(), &[mixed, s("")]).is_err());
    }

    #[test]
    fn predicates() {
        assert_eq!(
            contains(&mut runner(), &[s("hello"), s("ell")]).unwrap().inspect(),
            "true"
        );
        assert_eq!(
            starts(&mut runner(), &[s("hello"), s("he")]).unwrap().inspect(),
            "true"
        );
        assert_eq!(
            ends(&mut runner(), &[s("hello"), s("lo")]).unwrap().inspect(),
            "true"
        );
        assert_eq!(
            ends(&mut runner(), &[s("hello"), s("he")]).unwrap().inspect(),
            "false"
        );
    }

    #[test]
    fn reverse_slice_first_last() {
        assert_eq!(
            reverse(&mut runner(), &[s("abc")]).unwrap().inspect(),
            "\"cba\""
        );
        assert_eq!(
            slice(&mut runner(), &[s("hello"), Value::Integer(1), Value::Integer(3)])
                .unwrap()
                .inspect(),
            "\"ell\""
        );
        assert!(slice(
            &mut runner(),
            &[s("hello"), Value::Integer(3), Value::Integer(9)]
        )
        .is_err());
        assert_eq!(first(&mut runner(), &[s("abc")]).unwrap().inspect(), "\"a\"");
        assert_eq!(last(&mut runner(), &[s("abc")]).unwrap().inspect(), "\"c\"");
        assert_eq!(first(&mut runner(), &[s("")]).unwrap().inspect(), "\"\"");
    }

    #[test]
    fn regex_matching() {
        assert_eq!(
            matches(&mut runner(), &[s("hello42"), s("[0-9]+")]).unwrap().inspect(),
            "true"
        );
        assert_eq!(
            matches(&mut runner(), &[s("hello"), s("^[0-9]+$")]).unwrap().inspect(),
            "false"
        );
        assert!(matches(&mut runner(), &[s("hello"), s("(")]).is_err());
    }
}
