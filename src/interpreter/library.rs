pub mod dict;
pub mod enumerable;
pub mod io;
pub mod math;
pub mod string;
pub mod types;

use std::collections::HashMap;

use crate::interpreter::value::Value;
use crate::interpreter::Interpreter;

/// Failure of a native function.
///
/// `Reported` means the error already went through the reporter (a user
/// callback failed mid-call); the caller should bail without adding a
/// second diagnostic.
#[derive(Debug)]
pub enum LibraryError {
    Message(String),
    Reported,
}

impl From<String> for LibraryError {
    fn from(message: String) -> Self {
        LibraryError::Message(message)
    }
}

impl From<&str> for LibraryError {
    fn from(message: &str) -> Self {
        LibraryError::Message(message.to_string())
    }
}

pub type LibraryResult = Result<Value, LibraryError>;

/// A native function: receives the interpreter (for callbacks and the
/// RNG) and the already evaluated arguments.
pub type LibraryFn = fn(&mut Interpreter, &[Value]) -> LibraryResult;

/// The standard library: a pre-registered map of dotted names to
/// native functions.
pub struct Library {
    store: HashMap<&'static str, LibraryFn>,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    pub fn new() -> Library {
        let mut store: HashMap<&'static str, LibraryFn> = HashMap::new();

        store.insert("Math.pi", math::pi as LibraryFn);
        store.insert("Math.ceil", math::ceil);
        store.insert("Math.floor", math::floor);
        store.insert("Math.max", math::max);
        store.insert("Math.min", math::min);
        store.insert("Math.random", math::random);

        store.insert("Type.of", types::of);
        store.insert("Type.toString", types::to_string);
        store.insert("Type.toInt", types::to_int);
        store.insert("Type.toFloat", types::to_float);
        store.insert("Type.toArray", types::to_array);

        store.insert("Enum.size", enumerable::size);
        store.insert("Enum.reverse", enumerable::reverse);
        store.insert("Enum.first", enumerable::first);
        store.insert("Enum.last", enumerable::last);
        store.insert("Enum.insert", enumerable::insert);
        store.insert("Enum.delete", enumerable::delete);
        store.insert("Enum.map", enumerable::map);
        store.insert("Enum.filter", enumerable::filter);
        store.insert("Enum.reduce", enumerable::reduce);
        store.insert("Enum.find", enumerable::find);
        store.insert("Enum.contains?", enumerable::contains);
        store.insert("Enum.unique", enumerable::unique);
        store.insert("Enum.empty?", enumerable::empty);
        store.insert("Enum.random", enumerable::random);

        store.insert("Dict.size", dict::size);
        store.insert("Dict.has", dict::has);
        store.insert("Dict.insert", dict::insert);
        store.insert("Dict.update", dict::update);
        store.insert("Dict.delete", dict::delete);
        store.insert("Dict.empty?", dict::empty);

        store.insert("String.count", string::count);
        store.insert("String.countBytes", string::count_bytes);
        store.insert("String.lower", string::lower);
        store.insert("String.upper", string::upper);
        store.insert("String.capitalize", string::capitalize);
        store.insert("String.trim", string::trim);
        store.insert("String.trimLeft", string::trim_left);
        store.insert("String.trimRight", string::trim_right);
        store.insert("String.replace", string::replace);
        store.insert("String.join", string::join);
        store.insert("String.split", string::split);
        store.insert("String.contains?", string::contains);
        store.insert("String.reverse", string::reverse);
        store.insert("String.slice", string::slice);
        store.insert("String.match?", string::matches);
        store.insert("String.starts?", string::starts);
        store.insert("String.ends?", string::ends);
        store.insert("String.first", string::first);
        store.insert("String.last", string::last);

        store.insert("IO.puts", io::puts);
        store.insert("IO.write", io::write);

        Library { store }
    }

    /// Look up a function by its dotted name.
    pub fn get(&self, function: &str) -> Option<LibraryFn> {
        self.store.get(function).copied()
    }
}

// The elements of an Array, or a String broken into one-character
// strings. Used by the Enum functions, which accept both.
pub(crate) fn enumerable_elements(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(elements) => Some(elements.borrow().clone()),
        Value::Str(text) => Some(
            text.chars()
                .map(|c| Value::string(c.to_string()))
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_the_documented_surface() {
        let library = Library::new();

        for name in [
            "Math.pi",
            "Math.random",
            "Type.of",
            "Type.toArray",
            "Enum.map",
            "Enum.reduce",
            "Enum.contains?",
            "Dict.size",
            "Dict.empty?",
            "String.count",
            "String.match?",
            "IO.puts",
            "IO.write",
        ] {
            assert!(library.get(name).is_some(), "missing {}", name);
        }

        assert!(library.get("Math.unknown").is_none());
        assert!(library.get("pi").is_none());
    }
}
