pub mod library;
pub mod operators;
pub mod scope;
pub mod value;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::interpreter::library::{Library, LibraryError};
use crate::interpreter::scope::Scope;
use crate::interpreter::value::{values_equal, FunctionValue, ModuleValue, Value};
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::Lexer;
use crate::parser::ast::{
    Block, Expression, ExpressionKind, Program, Statement, StatementKind, SwitchCase,
};
use crate::parser::Parser;
use crate::reader::Reader;
use crate::reporter::{self, Stage};

/// Tree-walking evaluator.
///
/// `eval_*` return `None` when an error was reported; blocks observe it
/// and short-circuit, so one failure doesn't cascade into more
/// diagnostics. `Value::Nil` is an ordinary value and flows through.
pub struct Interpreter {
    // Declared modules by name.
    modules: HashMap<String, Rc<ModuleValue>>,
    // Scope of each module body, evaluated on first access.
    module_cache: HashMap<String, Rc<Scope>>,
    // Parsed programs by canonical imported path.
    import_cache: HashMap<PathBuf, Rc<Program>>,
    // Names bound by let. First binding wins across scopes.
    immutables: HashSet<String>,
    library: Library,
    rng: StdRng,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter {
            modules: HashMap::new(),
            module_cache: HashMap::new(),
            import_cache: HashMap::new(),
            immutables: HashSet::new(),
            library: Library::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Run a program statement by statement, returning the last value.
    pub fn interpret(&mut self, program: &Program, scope: &Rc<Scope>) -> Option<Value> {
        let mut result = Some(Value::Nil);

        for statement in &program.statements {
            result = self.eval_statement(statement, scope);
        }

        result
    }

    fn eval_statement(&mut self, statement: &Statement, scope: &Rc<Scope>) -> Option<Value> {
        match &statement.kind {
            StatementKind::Let { name, value } => {
                let object = self.eval_expression(value, scope)?;

                if scope.has_local(name) {
                    self.report_error(
                        &statement.token,
                        format!("Identifier '{}' already declared", name),
                    );
                    return None;
                }

                scope.write(name.clone(), object.clone());
                self.immutables.insert(name.clone());

                Some(object)
            }
            StatementKind::Var { name, value } => {
                let object = self.eval_expression(value, scope)?;

                if scope.has_local(name) {
                    self.report_error(
                        &statement.token,
                        format!("Identifier '{}' already declared", name),
                    );
                    return None;
                }

                scope.write(name.clone(), object.clone());

                Some(object)
            }
            StatementKind::Return { value } => {
                let object = match value {
                    Some(value) => self.eval_expression(value, scope)?,
                    None => Value::Nil,
                };

                Some(Value::Return(Box::new(object)))
            }
            StatementKind::Break => Some(Value::Break),
            StatementKind::Continue => Some(Value::Continue),
            StatementKind::Expression(expression) => self.eval_expression(expression, scope),
        }
    }

    // A block runs its statements in order and short-circuits on a
    // signal value, which the enclosing construct unwraps.
    fn eval_block(&mut self, block: &Block, scope: &Rc<Scope>) -> Option<Value> {
        let mut result = Value::Nil;

        for statement in &block.statements {
            result = self.eval_statement(statement, scope)?;

            if result.is_signal() {
                return Some(result);
            }
        }

        Some(result)
    }

    fn eval_expression(&mut self, expression: &Expression, scope: &Rc<Scope>) -> Option<Value> {
        match &expression.kind {
            ExpressionKind::Integer(value) => Some(Value::Integer(*value)),
            ExpressionKind::Float(value) => Some(Value::Float(*value)),
            ExpressionKind::Str(value) => Some(Value::Str(Rc::clone(value))),
            ExpressionKind::Atom(name) => Some(Value::Atom(Rc::clone(name))),
            ExpressionKind::Boolean(value) => Some(Value::Boolean(*value)),
            ExpressionKind::Nil => Some(Value::Nil),
            ExpressionKind::Placeholder => Some(Value::Placeholder),
            ExpressionKind::Identifier(name) => match scope.read(name) {
                Some(value) => Some(value),
                None => {
                    self.report_error(
                        &expression.token,
                        format!("Identifier '{}' not found in current scope", name),
                    );
                    None
                }
            },
            ExpressionKind::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expression(element, scope)?);
                }
                Some(Value::array(values))
            }
            ExpressionKind::Dictionary(pairs) => {
                let mut values = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let key = self.eval_expression(key, scope)?;
                    let value = self.eval_expression(value, scope)?;
                    values.push((key, value));
                }
                Some(Value::dictionary(values))
            }
            ExpressionKind::List(_) => {
                self.report_error(&expression.token, "Unexpected expression list");
                None
            }
            ExpressionKind::Subscript { target, index } => {
                self.eval_subscript(expression, target, index, scope)
            }
            ExpressionKind::Assign { target, value } => {
                self.eval_assign(expression, target, value, scope)
            }
            ExpressionKind::Prefix { operator, right } => {
                self.eval_prefix(expression, operator, right, scope)
            }
            ExpressionKind::Infix {
                operator,
                left,
                right,
            } => self.eval_infix(expression, operator, left, right, scope),
            ExpressionKind::If {
                condition,
                then,
                otherwise,
            } => {
                let condition = self.eval_expression(condition, scope)?;

                if condition.is_truthy() {
                    self.eval_block(then, &scope.child())
                } else if let Some(otherwise) = otherwise {
                    self.eval_block(otherwise, &scope.child())
                } else {
                    Some(Value::Nil)
                }
            }
            ExpressionKind::Switch {
                control,
                cases,
                default,
            } => self.eval_switch(control.as_deref(), cases, default.as_ref(), scope),
            ExpressionKind::For {
                arguments,
                enumerable,
                body,
            } => self.eval_for(expression, arguments, enumerable, body, scope),
            ExpressionKind::Function { parameters, body } => {
                Some(Value::Function(Rc::new(FunctionValue {
                    parameters: parameters.clone(),
                    body: Rc::clone(body),
                    scope: Rc::clone(scope),
                })))
            }
            ExpressionKind::FunctionCall {
                function,
                arguments,
            } => self.eval_function_call(expression, function, arguments, None, scope),
            ExpressionKind::Module { name, body } => {
                if self.modules.contains_key(name) {
                    self.report_error(&expression.token, format!("Module '{}' redeclared", name));
                    return None;
                }

                self.modules.insert(
                    name.clone(),
                    Rc::new(ModuleValue {
                        name: name.clone(),
                        body: Rc::clone(body),
                    }),
                );

                Some(Value::Nil)
            }
            ExpressionKind::ModuleAccess { object, member } => {
                self.eval_module_access(expression, object, member)
            }
            ExpressionKind::Pipe { left, right } => self.eval_pipe(expression, left, right, scope),
            ExpressionKind::Import { file } => self.eval_import(expression, file, scope),
        }
    }

    fn eval_prefix(
        &mut self,
        expression: &Expression,
        operator: &Token,
        right: &Expression,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        let value = self.eval_expression(right, scope)?;

        // ! works off general truthiness; the rest are typed.
        if operator.kind == TokenKind::Bang {
            return Some(Value::Boolean(!value.is_truthy()));
        }

        match operators::prefix(&operator.lexeme, &value) {
            Ok(value) => Some(value),
            Err(message) => {
                self.report_error(&expression.token, message);
                None
            }
        }
    }

    fn eval_infix(
        &mut self,
        expression: &Expression,
        operator: &Token,
        left: &Expression,
        right: &Expression,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        let left_value = self.eval_expression(left, scope)?;

        // Logical operators short-circuit on the left operand's
        // truthiness and never reach the typed operator table.
        match operator.kind {
            TokenKind::And => {
                if !left_value.is_truthy() {
                    return Some(Value::Boolean(false));
                }
                let right_value = self.eval_expression(right, scope)?;
                return Some(Value::Boolean(right_value.is_truthy()));
            }
            TokenKind::Or => {
                if left_value.is_truthy() {
                    return Some(Value::Boolean(true));
                }
                let right_value = self.eval_expression(right, scope)?;
                return Some(Value::Boolean(right_value.is_truthy()));
            }
            _ => {}
        }

        let right_value = self.eval_expression(right, scope)?;

        match operators::infix(&operator.lexeme, &left_value, &right_value) {
            Ok(value) => Some(value),
            Err(message) => {
                self.report_error(&expression.token, message);
                None
            }
        }
    }

    fn eval_assign(
        &mut self,
        expression: &Expression,
        target: &Expression,
        value: &Expression,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        match &target.kind {
            ExpressionKind::Identifier(name) => {
                if scope.read(name).is_none() {
                    self.report_error(
                        &expression.token,
                        format!("Identifier '{}' not found in current scope", name),
                    );
                    return None;
                }

                // Rebinding a let name is refused. Container mutation
                // through subscripts stays allowed.
                if self.immutables.contains(name) {
                    self.report_error(
                        &expression.token,
                        format!("Identifier '{}' is immutable", name),
                    );
                    return None;
                }

                let object = self.eval_expression(value, scope)?;
                scope.update(name, object.clone());

                Some(object)
            }
            ExpressionKind::Subscript { target, index } => {
                let container = self.eval_expression(target, scope)?;
                let index = self.eval_expression(index, scope)?;
                let object = self.eval_expression(value, scope)?;

                self.assign_subscript(expression, target, container, index, object, scope)
            }
            _ => {
                self.report_error(
                    &expression.token,
                    "Assignment operator expects an identifier",
                );
                None
            }
        }
    }

    fn assign_subscript(
        &mut self,
        expression: &Expression,
        target: &Expression,
        container: Value,
        index: Value,
        object: Value,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        match (&container, &index) {
            (Value::Array(elements), Value::Integer(idx)) => {
                let length = elements.borrow().len();
                match check_array_bounds(length, *idx) {
                    Ok(position) => {
                        elements.borrow_mut()[position] = object;
                        Some(container.clone())
                    }
                    Err(message) => {
                        self.report_error(&expression.token, message);
                        None
                    }
                }
            }
            // A placeholder index appends.
            (Value::Array(elements), Value::Placeholder) => {
                elements.borrow_mut().push(object);
                Some(container.clone())
            }
            (Value::Dictionary(pairs), _) => {
                let key = index.inspect();
                let mut pairs = pairs.borrow_mut();

                match pairs.iter_mut().find(|(k, _)| k.inspect() == key) {
                    Some(pair) => pair.1 = object,
                    // No matching key, so the write is an insert.
                    None => pairs.push((index, object)),
                }

                drop(pairs);
                Some(container.clone())
            }
            (Value::Str(text), Value::Integer(idx)) => {
                let replacement = match &object {
                    Value::Str(replacement) => replacement,
                    _ => {
                        self.report_error(&expression.token, "Subscript assignment not recognised");
                        return None;
                    }
                };

                let position = match check_string_bounds(text.chars().count(), *idx) {
                    Ok(position) => position,
                    Err(message) => {
                        self.report_error(&expression.token, message);
                        return None;
                    }
                };

                // Strings are immutable values, so the rebuilt string is
                // written back through the variable binding.
                let rebuilt: String = text
                    .chars()
                    .enumerate()
                    .map(|(i, c)| {
                        if i == position {
                            replacement.to_string()
                        } else {
                            c.to_string()
                        }
                    })
                    .collect();
                let rebuilt = Value::string(rebuilt);

                match &target.kind {
                    ExpressionKind::Identifier(name) => {
                        scope.update(name, rebuilt.clone());
                        Some(rebuilt)
                    }
                    _ => {
                        self.report_error(&expression.token, "Subscript assignment not recognised");
                        None
                    }
                }
            }
            _ => {
                self.report_error(&expression.token, "Subscript assignment not recognised");
                None
            }
        }
    }

    fn eval_subscript(
        &mut self,
        expression: &Expression,
        target: &Expression,
        index: &Expression,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        let left = self.eval_expression(target, scope)?;
        let index = self.eval_expression(index, scope)?;

        match (&left, &index) {
            (Value::Array(elements), Value::Integer(idx)) => {
                let elements = elements.borrow();
                match check_array_bounds(elements.len(), *idx) {
                    Ok(position) => Some(elements[position].clone()),
                    // Out of range reads produce nil.
                    Err(_) => Some(Value::Nil),
                }
            }
            (Value::Dictionary(pairs), _) => {
                let key = index.inspect();
                let found = pairs
                    .borrow()
                    .iter()
                    .find(|(k, _)| k.inspect() == key)
                    .map(|(_, v)| v.clone());
                Some(found.unwrap_or(Value::Nil))
            }
            (Value::Str(text), Value::Integer(idx)) => {
                match check_string_bounds(text.chars().count(), *idx) {
                    Ok(position) => {
                        let c = text.chars().nth(position)?;
                        Some(Value::string(c.to_string()))
                    }
                    Err(message) => {
                        self.report_error(&expression.token, message);
                        None
                    }
                }
            }
            _ => {
                self.report_error(
                    &expression.token,
                    format!(
                        "Subscript on '{}' not supported with literal '{}'",
                        left.type_name(),
                        index.type_name()
                    ),
                );
                None
            }
        }
    }

    fn eval_switch(
        &mut self,
        control: Option<&Expression>,
        cases: &[SwitchCase],
        default: Option<&Rc<Block>>,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        // When the control expression is missing, the switch acts as a
        // structured if/else with a true control.
        let control = match control {
            Some(control) => self.eval_expression(control, scope)?,
            None => Value::Boolean(true),
        };

        for case in cases {
            let mut matched = 0;

            for (position, value) in case.values.iter().enumerate() {
                let parameter = self.eval_expression(value, scope)?;

                if parameter.type_name() == control.type_name() {
                    // Same type and same exact value.
                    if parameter.inspect() == control.inspect() {
                        return self.eval_block(&case.body, &scope.child());
                    }
                } else if let (Value::Atom(atom), Value::Str(text)) = (&parameter, &control) {
                    // A string switch can have atom cases.
                    if atom.as_ref() == text.as_ref() {
                        return self.eval_block(&case.body, &scope.child());
                    }
                } else if let Value::Array(elements) = &control {
                    let elements = elements.borrow();

                    // The case needs as many values as the array has
                    // elements.
                    if case.values.len() != elements.len() {
                        break;
                    }

                    // An element matches its peer by type and value, or
                    // through a placeholder.
                    if values_equal(&parameter, &elements[position])
                        || matches!(parameter, Value::Placeholder)
                    {
                        matched += 1;
                        if matched == elements.len() {
                            drop(elements);
                            return self.eval_block(&case.body, &scope.child());
                        }
                    }
                } else {
                    self.report_error(
                        &case.token,
                        format!(
                            "Type '{}' can't be used in a Switch case with control type '{}'",
                            parameter.type_name(),
                            control.type_name()
                        ),
                    );
                    return None;
                }
            }
        }

        // The default runs only if no case won.
        if let Some(default) = default {
            return self.eval_block(default, &scope.child());
        }

        Some(Value::Nil)
    }

    fn eval_for(
        &mut self,
        expression: &Expression,
        arguments: &[String],
        enumerable: &Expression,
        body: &Rc<Block>,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        let enumerable = self.eval_expression(enumerable, scope)?;

        match &enumerable {
            Value::Array(elements) => {
                let elements = elements.borrow().clone();
                self.run_for_array(expression, arguments, &elements, body, scope)
            }
            Value::Dictionary(pairs) => {
                let pairs = pairs.borrow().clone();
                self.run_for_dictionary(expression, arguments, &pairs, body, scope)
            }
            // Strings and atoms iterate as one-character strings.
            Value::Str(text) => {
                let elements = string_elements(text);
                self.run_for_array(expression, arguments, &elements, body, scope)
            }
            Value::Atom(name) => {
                let elements = string_elements(name);
                self.run_for_array(expression, arguments, &elements, body, scope)
            }
            other => {
                self.report_error(
                    &expression.token,
                    format!("Type {} is not an enumerable", other.type_name()),
                );
                None
            }
        }
    }

    fn run_for_array(
        &mut self,
        expression: &Expression,
        arguments: &[String],
        elements: &[Value],
        body: &Rc<Block>,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        let mut out = Vec::new();

        for (index, element) in elements.iter().enumerate() {
            let iteration = scope.child();

            // One argument receives the value; two receive the index
            // and the value.
            match arguments.len() {
                1 => iteration.write(arguments[0].clone(), element.clone()),
                2 => {
                    iteration.write(arguments[0].clone(), Value::Integer(index as i64));
                    iteration.write(arguments[1].clone(), element.clone());
                }
                _ => {
                    self.report_error(
                        &expression.token,
                        "A FOR loop with an Array expects at most 2 arguments",
                    );
                    return None;
                }
            }

            let result = self.eval_block(body, &iteration)?;

            match result {
                Value::Break => break,
                Value::Continue => continue,
                Value::Return(_) => return Some(result),
                other => out.push(other),
            }
        }

        Some(Value::array(out))
    }

    fn run_for_dictionary(
        &mut self,
        expression: &Expression,
        arguments: &[String],
        pairs: &[(Value, Value)],
        body: &Rc<Block>,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        let mut out = Vec::new();

        for (key, value) in pairs {
            let iteration = scope.child();

            // One argument receives the value; two receive the key
            // and the value.
            match arguments.len() {
                1 => iteration.write(arguments[0].clone(), value.clone()),
                2 => {
                    iteration.write(arguments[0].clone(), key.clone());
                    iteration.write(arguments[1].clone(), value.clone());
                }
                _ => {
                    self.report_error(
                        &expression.token,
                        "A FOR loop with a Dictionary expects at most 2 arguments",
                    );
                    return None;
                }
            }

            let result = self.eval_block(body, &iteration)?;

            match result {
                Value::Break => break,
                Value::Continue => continue,
                Value::Return(_) => return Some(result),
                other => out.push(other),
            }
        }

        Some(Value::array(out))
    }

    fn eval_function_call(
        &mut self,
        expression: &Expression,
        callee: &Expression,
        arguments: &[Expression],
        leading: Option<Value>,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        // Standard library functions use the same dot notation as
        // module access, and take precedence over user modules.
        if let ExpressionKind::ModuleAccess { object, member } = &callee.kind {
            let key = format!("{}.{}", object, member);
            if let Some(function) = self.library.get(&key) {
                let mut args = Vec::with_capacity(arguments.len() + 1);
                if let Some(leading) = leading {
                    args.push(leading);
                }
                for argument in arguments {
                    args.push(self.eval_expression(argument, scope)?);
                }

                return match function(self, &args) {
                    Ok(value) => Some(value),
                    Err(LibraryError::Message(message)) => {
                        self.report_error(&expression.token, message);
                        None
                    }
                    Err(LibraryError::Reported) => None,
                };
            }
        }

        let callee_value = self.eval_expression(callee, scope)?;

        let function = match callee_value {
            Value::Function(function) => function,
            _ => {
                self.report_error(&expression.token, "Trying to call a non-function");
                return None;
            }
        };

        // Arity is exact.
        let supplied = arguments.len() + usize::from(leading.is_some());
        if supplied > function.parameters.len() {
            self.report_error(&expression.token, "Too many arguments in function call");
            return None;
        }
        if supplied < function.parameters.len() {
            self.report_error(&expression.token, "Too few arguments in function call");
            return None;
        }

        let mut args = Vec::with_capacity(supplied);
        if let Some(leading) = leading {
            args.push(leading);
        }
        for argument in arguments {
            args.push(self.eval_expression(argument, scope)?);
        }

        self.call_function(&function, &args)
    }

    /// Call a function value with already evaluated arguments.
    ///
    /// The body runs in a fresh child of the captured scope, so per-call
    /// bindings never leak between calls while closures keep seeing
    /// their definition environment.
    pub(crate) fn call_function(
        &mut self,
        function: &FunctionValue,
        args: &[Value],
    ) -> Option<Value> {
        let scope = function.scope.child();

        for (parameter, argument) in function.parameters.iter().zip(args) {
            scope.write(parameter.to_string(), argument.clone());
        }

        let result = self.eval_block(&function.body, &scope)?;

        Some(unwrap_return(result))
    }

    // a |> f(b, c) evaluates as f(a, b, c).
    fn eval_pipe(
        &mut self,
        expression: &Expression,
        left: &Expression,
        right: &Expression,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        match &right.kind {
            ExpressionKind::FunctionCall {
                function,
                arguments,
            } => {
                let leading = self.eval_expression(left, scope)?;
                self.eval_function_call(right, function, arguments, Some(leading), scope)
            }
            _ => {
                self.report_error(
                    &expression.token,
                    "Pipe operator expects a function call on the right side",
                );
                None
            }
        }
    }

    fn eval_module_access(
        &mut self,
        expression: &Expression,
        object: &str,
        member: &str,
    ) -> Option<Value> {
        let module = match self.modules.get(object) {
            Some(module) => Rc::clone(module),
            None => {
                self.report_error(
                    &expression.token,
                    format!("Member '{}' in Module '{}' not found", member, object),
                );
                return None;
            }
        };

        // The module body is evaluated once, on first access, and its
        // scope cached.
        let module_scope = match self.module_cache.get(object) {
            Some(cached) => Rc::clone(cached),
            None => {
                let fresh = Scope::new();
                for statement in &module.body.statements {
                    self.eval_statement(statement, &fresh);
                }
                self.module_cache
                    .insert(object.to_string(), Rc::clone(&fresh));
                fresh
            }
        };

        for statement in &module.body.statements {
            match &statement.kind {
                StatementKind::Let { name, value } => {
                    if name != member {
                        continue;
                    }

                    return match &value.kind {
                        // A member function is bound to the cached
                        // module scope.
                        ExpressionKind::Function { parameters, body } => {
                            Some(Value::Function(Rc::new(FunctionValue {
                                parameters: parameters.clone(),
                                body: Rc::clone(body),
                                scope: module_scope,
                            })))
                        }
                        // Anything else is a constant, interpreted in
                        // the module scope.
                        _ => self.eval_expression(value, &module_scope),
                    };
                }
                _ => {
                    self.report_error(
                        &expression.token,
                        "Only LET statements are accepted as Module members",
                    );
                    return None;
                }
            }
        }

        self.report_error(
            &expression.token,
            format!("Member '{}' in Module '{}' not found", member, object),
        );
        None
    }

    // import "filename" reads, lexes and parses the file, then runs it
    // in the caller's scope. Parsed programs are cached by path.
    fn eval_import(
        &mut self,
        expression: &Expression,
        file: &str,
        scope: &Rc<Scope>,
    ) -> Option<Value> {
        let filename = prepare_import_filename(file);
        let canonical = std::fs::canonicalize(&filename).unwrap_or_else(|_| filename.clone());

        if let Some(cached) = self.import_cache.get(&canonical) {
            let program = Rc::clone(cached);
            return self.interpret(&program, scope);
        }

        let source = match std::fs::read_to_string(&filename) {
            Ok(source) => source,
            Err(_) => {
                self.report_error(
                    &expression.token,
                    format!("Couldn't read imported file '{}'", file),
                );
                return None;
            }
        };

        let mut parser = Parser::new(Lexer::new(Reader::new(&source)));
        let program = Rc::new(parser.parse());
        if reporter::has_errors() {
            return None;
        }

        self.import_cache.insert(canonical, Rc::clone(&program));

        self.interpret(&program, scope)
    }

    fn report_error(&self, token: &Token, message: impl Into<String>) {
        reporter::error(Stage::Runtime, token.location, message);
    }
}

fn unwrap_return(value: Value) -> Value {
    match value {
        Value::Return(inner) => *inner,
        other => other,
    }
}

fn string_elements(text: &str) -> Vec<Value> {
    text.chars().map(|c| Value::string(c.to_string())).collect()
}

// Negative indices count from the end.
fn check_array_bounds(length: usize, index: i64) -> Result<usize, String> {
    let original = index;
    let index = if index < 0 { length as i64 + index } else { index };

    if index < 0 || index >= length as i64 {
        return Err(format!("Array index '{}' out of bounds", original));
    }

    Ok(index as usize)
}

fn check_string_bounds(length: usize, index: i64) -> Result<usize, String> {
    let original = index;
    let index = if index < 0 { length as i64 + index } else { index };

    if index < 0 || index >= length as i64 {
        return Err(format!("String index '{}' out of bounds", original));
    }

    Ok(index as usize)
}

fn prepare_import_filename(file: &str) -> PathBuf {
    // Add the default extension when the path has none.
    if Path::new(file).extension().is_none() {
        PathBuf::from(format!("{}.ari", file))
    } else {
        PathBuf::from(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> Value {
        reporter::clear();
        let mut parser = Parser::new(Lexer::new(Reader::new(input)));
        let program = parser.parse();
        assert!(
            !reporter::has_errors(),
            "parse errors for {:?}: {:?}",
            input,
            reporter::errors()
        );

        let mut interpreter = Interpreter::new();
        let result = interpreter.interpret(&program, &Scope::new());
        assert!(
            !reporter::has_errors(),
            "runtime errors for {:?}: {:?}",
            input,
            reporter::errors()
        );

        result.expect("expected a value")
    }

    fn eval_error(input: &str) -> String {
        reporter::clear();
        let mut parser = Parser::new(Lexer::new(Reader::new(input)));
        let program = parser.parse();
        assert!(
            !reporter::has_errors(),
            "unexpected parse errors: {:?}",
            reporter::errors()
        );

        let mut interpreter = Interpreter::new();
        interpreter.interpret(&program, &Scope::new());
        assert!(
            reporter::has_errors(),
            "expected a runtime error for {:?}",
            input
        );

        let errors = reporter::errors();
        let message = errors.join("; ");
        reporter::clear();
        message
    }

    #[test]
    fn integers() {
        for (input, expected) in [
            ("10", "10"),
            ("1234567", "1234567"),
            ("1 + 1", "2"),
            ("-10", "-10"),
            ("-10 + 10", "0"),
            ("5 * 2", "10"),
            ("5 * (2 + 2)", "20"),
            ("2 ** 8", "256"),
            ("5 % 2", "1"),
            ("0xff + 0b1 + 0o10", "264"),
        ] {
            assert_eq!(eval(input).inspect(), expected, "for {:?}", input);
        }
    }

    #[test]
    fn floats() {
        for (input, expected) in [
            ("10.0", "10.0"),
            ("10.0 + 1.5", "11.5"),
            ("1 - 0.5", "0.5"),
            ("4.5 * 2", "9.0"),
            ("-5.2", "-5.2"),
            ("9.0 / 3", "3.0"),
        ] {
            assert_eq!(eval(input).inspect(), expected, "for {:?}", input);
        }
    }

    #[test]
    fn integer_division_narrows_when_whole() {
        assert_eq!(eval("10 / 2").inspect(), "5");
        assert_eq!(eval("5 / 2").inspect(), "2.5");
        assert!(eval_error("1 / 0").contains("Division by 0"));
    }

    #[test]
    fn booleans() {
        for (input, expected) in [
            ("true", "true"),
            ("!false", "true"),
            ("1 == 1", "true"),
            ("1 != 2", "true"),
            ("5 > 1", "true"),
            ("10 > 100", "false"),
            ("(1 < 2) == (2 > 1)", "true"),
            ("5.3 > 5.2", "true"),
            ("\"four\" > \"one\"", "true"),
            ("\"hello\" == \"world\"", "false"),
            ("[1, 2] == [3, 4]", "false"),
            ("[1, 2] == [1, 2]", "true"),
            ("[\"a\": \"b\"] == [\"a\": \"b\"]", "true"),
            ("true && true", "true"),
            ("true && false", "false"),
            ("false || true", "true"),
            ("false || false", "false"),
            ("nil == nil", "true"),
            ("nil == 1", "false"),
            ("nil != 1", "true"),
        ] {
            assert_eq!(eval(input).inspect(), expected, "for {:?}", input);
        }
    }

    #[test]
    fn logical_operators_use_truthiness() {
        assert_eq!(eval("0 && true").inspect(), "false");
        assert_eq!(eval("1 && \"x\"").inspect(), "true");
        assert_eq!(eval("\"\" || 5").inspect(), "true");
        assert_eq!(eval("nil || 0").inspect(), "false");
    }

    #[test]
    fn short_circuit_skips_the_right_side() {
        // The right side would report an unknown identifier if it ran.
        assert_eq!(eval("false && missing").inspect(), "false");
        assert_eq!(eval("true || missing").inspect(), "true");
    }

    #[test]
    fn strings_and_atoms() {
        assert_eq!(eval("\"hello\"").inspect(), "\"hello\"");
        assert_eq!(
            eval("\"hello\" + \" \" + \"world\"").inspect(),
            "\"hello world\""
        );
        assert_eq!(eval(":ok").inspect(), ":ok");
        assert_eq!(eval(":ok == \"ok\"").inspect(), "true");
        assert_eq!(eval(":a + :b").inspect(), "\"ab\"");
    }

    #[test]
    fn ranges() {
        assert_eq!(eval("1..5").inspect(), "[1, 2, 3, 4, 5]");
        assert_eq!(eval("5..1").inspect(), "[5, 4, 3, 2, 1]");
        assert_eq!(eval("\"a\" .. \"c\"").inspect(), "[\"a\", \"b\", \"c\"]");
        assert_eq!(eval("\"c\" .. \"a\"").inspect(), "[\"c\", \"b\", \"a\"]");
    }

    #[test]
    fn let_bindings_and_shadowing() {
        assert_eq!(eval("let x = 10\nx").inspect(), "10");
        assert_eq!(eval("var y = 1\ny = y + 1\ny").inspect(), "2");
        // An inner block may shadow an outer binding.
        assert_eq!(
            eval("let x = 1\nif true then let x = 2\nx end").inspect(),
            "2"
        );
        assert!(eval_error("let x = 1\nlet x = 2").contains("already declared"));
    }

    #[test]
    fn let_bindings_are_immutable() {
        let message = eval_error("let x = 1\nx = 2");
        assert!(message.contains("Identifier 'x' is immutable"), "{}", message);
        assert!(eval_error("ghost = 1").contains("not found in current scope"));
    }

    #[test]
    fn if_expressions() {
        assert_eq!(eval("if 5 > 2 then 10 end").inspect(), "10");
        assert_eq!(eval("if 5 < 2 then 10 else 15 end").inspect(), "15");
        assert_eq!(eval("if false then 10 end").inspect(), "nil");
        assert_eq!(
            eval("let x = 10\nif x > 5 then \"big\" else \"small\" end").inspect(),
            "\"big\""
        );
        assert_eq!(eval("5 > 2 ? 10 : 20").inspect(), "10");
    }

    #[test]
    fn truthiness_in_conditions() {
        assert_eq!(eval("if \"\" then 1 else 2 end").inspect(), "2");
        assert_eq!(eval("if 0 then 1 else 2 end").inspect(), "2");
        assert_eq!(eval("if [] then 1 else 2 end").inspect(), "2");
        assert_eq!(eval("if :atom then 1 else 2 end").inspect(), "1");
        assert_eq!(eval("if nil then 1 else 2 end").inspect(), "2");
    }

    #[test]
    fn switch_expressions() {
        for (input, expected) in [
            ("switch 1 do case 1 then 10 case 2 then 20 end", "10"),
            ("switch 2 do case 1 then 10 case 2 then 20 end", "20"),
            ("switch 3 do case 1 then 10 default then 20 end", "20"),
            ("switch do case 1 == 1 then 10 end", "10"),
            (
                "switch 2 do case 1 then \"a\" case 2, 3 then \"b\" default then \"c\" end",
                "\"b\"",
            ),
            ("switch \"go\" do case :go then 1 default then 2 end", "1"),
            (
                "switch [1, 2] do case 1, 2 then \"both\" default then \"no\" end",
                "\"both\"",
            ),
            (
                "switch [1, 2] do case 1, _ then \"wild\" default then \"no\" end",
                "\"wild\"",
            ),
            (
                "switch [1, 2] do case 1 then \"short\" default then \"no\" end",
                "\"no\"",
            ),
        ] {
            assert_eq!(eval(input).inspect(), expected, "for {:?}", input);
        }
    }

    #[test]
    fn switch_rejects_mismatched_case_types() {
        let message = eval_error("switch 1 do case \"x\" then 2 end");
        assert!(
            message.contains("can't be used in a Switch case with control type 'Integer'"),
            "{}",
            message
        );
    }

    #[test]
    fn for_loops_collect_results() {
        assert_eq!(
            eval("for x in [1, 2, 3] do x * 2 end").inspect(),
            "[2, 4, 6]"
        );
        assert_eq!(
            eval("for i, x in [\"a\", \"b\"] do i end").inspect(),
            "[0, 1]"
        );
        assert_eq!(
            eval("for c in \"abc\" do c end").inspect(),
            "[\"a\", \"b\", \"c\"]"
        );
        assert_eq!(
            eval("for k, v in [\"a\": 1, \"b\": 2] do k end").inspect(),
            "[\"a\", \"b\"]"
        );
        assert_eq!(eval("for x in 1..3 do x end").inspect(), "[1, 2, 3]");
    }

    #[test]
    fn for_loops_handle_signals() {
        assert_eq!(
            eval("for x in [1, 2, 3, 4] do if x > 2 then break end\nx end").inspect(),
            "[1, 2]"
        );
        assert_eq!(
            eval("for x in [1, 2, 3] do if x == 2 then continue end\nx end").inspect(),
            "[1, 3]"
        );
        assert_eq!(
            eval("let f = fn do for x in [1, 2, 3] do return x end end\nf()").inspect(),
            "1"
        );
    }

    #[test]
    fn for_loop_argument_arity_is_checked() {
        let message = eval_error("for a, b, c in [1] do a end");
        assert!(message.contains("at most 2 arguments"), "{}", message);
        assert!(eval_error("for x in 5 do x end").contains("is not an enumerable"));
    }

    #[test]
    fn functions_and_calls() {
        assert_eq!(eval("let inc = fn n do n + 1 end\ninc(41)").inspect(), "42");
        assert_eq!(eval("let sq = x -> x * x\nsq(9)").inspect(), "81");
        assert_eq!(eval("let add = (a, b) -> a + b\nadd(1, 2)").inspect(), "3");
        assert_eq!(
            eval("let f = fn x do return x * 2\nx end\nf(10)").inspect(),
            "20"
        );
    }

    #[test]
    fn call_arity_is_exact() {
        assert!(eval_error("let f = fn x do x end\nf()").contains("Too few arguments"));
        assert!(eval_error("let f = fn x do x end\nf(1, 2)").contains("Too many arguments"));
        assert!(eval_error("let x = 1\nx()").contains("Trying to call a non-function"));
    }

    #[test]
    fn calls_do_not_leak_bindings() {
        let input = "let f = fn do var local = 1\nlocal end\nf()\nf()\nf()";
        assert_eq!(eval(input).inspect(), "1");
    }

    #[test]
    fn closures_capture_their_definition_site() {
        let input =
            "let mk = fn do var c = 0\nfn do c = c + 1\nc end end\nlet n = mk()\nn()\nn()\nn()";
        assert_eq!(eval(input).inspect(), "3");
    }

    #[test]
    fn pipes_prepend_the_left_value() {
        assert_eq!(
            eval("[1, 2, 3] |> Enum.map(x -> x * x) |> Enum.reduce(0, (x, a) -> a + x)").inspect(),
            "14"
        );
        assert_eq!(eval("\"hello\" |> String.upper()").inspect(), "\"HELLO\"");
        assert!(eval_error("1 |> 2").contains("Pipe operator expects a function call"));
    }

    #[test]
    fn array_subscripts() {
        assert_eq!(eval("[1, 2, 3][0]").inspect(), "1");
        assert_eq!(eval("[1, 2, 3][-1]").inspect(), "3");
        assert_eq!(eval("[1, 2, 3][5]").inspect(), "nil");
        assert_eq!(eval("\"hello\"[1]").inspect(), "\"e\"");
        assert_eq!(eval("\"hello\"[-1]").inspect(), "\"o\"");
        assert!(eval_error("true[0]").contains("Subscript on 'Boolean' not supported"));
    }

    #[test]
    fn dictionary_subscripts_use_inspect_keys() {
        assert_eq!(eval("[\"a\": 1][\"a\"]").inspect(), "1");
        assert_eq!(eval("[\"a\": 1][\"b\"]").inspect(), "nil");
        assert_eq!(eval("[1: \"int\"][1]").inspect(), "\"int\"");
        // Integer and Float keys are distinct.
        assert_eq!(eval("[1: \"int\"][1.0]").inspect(), "nil");
    }

    #[test]
    fn subscript_writes() {
        assert_eq!(eval("var a = [1, 2]\na[0] = 9\na").inspect(), "[9, 2]");
        assert_eq!(
            eval("var a = [1]\na[] = 2\na[_] = 3\na").inspect(),
            "[1, 2, 3]"
        );
        assert_eq!(eval("var a = [1, 2]\na[-1] = 5\na").inspect(), "[1, 5]");
        assert_eq!(
            eval("var d = [\"a\": 1]\nd[\"a\"] = 2\nd[\"b\"] = 3\nd").inspect(),
            "[\"a\":2, \"b\":3]"
        );
        assert_eq!(eval("var s = \"cat\"\ns[0] = \"b\"\ns").inspect(), "\"bat\"");
        assert!(eval_error("var a = [1]\na[5] = 2").contains("out of bounds"));
        assert!(eval_error("var s = \"abc\"\ns[9] = \"x\"").contains("out of bounds"));
    }

    #[test]
    fn subscript_writes_through_let_containers() {
        let input = "let d = [\"a\": 1, \"b\": 2]\nd[\"a\"] = 10\nd[\"c\"] = 3\nDict.size(d)";
        assert_eq!(eval(input).inspect(), "3");
        let input = "let d = [\"a\": 1]\nd[\"a\"] = 10\nd[\"a\"]";
        assert_eq!(eval(input).inspect(), "10");
    }

    #[test]
    fn aliases_observe_container_mutation() {
        let input = "let a = [1]\nlet b = a\nb[] = 2\na";
        assert_eq!(eval(input).inspect(), "[1, 2]");
    }

    #[test]
    fn modules_are_lazy_namespaces() {
        let input =
            "module Sample do let num = 10\nlet half = fn x do x / 2 end end\nSample.half(Sample.num)";
        assert_eq!(eval(input).inspect(), "5");
    }

    #[test]
    fn module_members_must_be_let() {
        let message = eval_error("module M do var a = 1 end\nM.a");
        assert!(
            message.contains("Only LET statements are accepted as Module members"),
            "{}",
            message
        );
    }

    #[test]
    fn module_errors() {
        assert!(eval_error("module M do let a = 1 end\nM.b")
            .contains("Member 'b' in Module 'M' not found"));
        assert!(eval_error("Ghost.member").contains("Member 'member' in Module 'Ghost' not found"));
        assert!(eval_error("module M do let a = 1 end\nmodule M do let b = 2 end")
            .contains("Module 'M' redeclared"));
    }

    #[test]
    fn module_state_is_cached_between_accesses() {
        let input = "module Counter do let base = [1]\nlet bump = fn do base[] = 0\nEnum.size(base) end end\nCounter.bump()\nCounter.bump()";
        assert_eq!(eval(input).inspect(), "3");
    }

    #[test]
    fn library_calls_dispatch_before_modules() {
        assert_eq!(eval("Math.max(3, 7)").inspect(), "7");
        assert_eq!(eval("Type.of(1.5)").inspect(), "\"Float\"");
        assert_eq!(eval("Enum.size([1, 2, 3])").inspect(), "3");
        assert!(eval_error("Math.ceil(1)").contains("Math.ceil expects a Float"));
    }

    #[test]
    fn blocks_short_circuit_after_an_error() {
        // Only the division failure is reported; the function body stops.
        let message = eval_error("let f = fn do 1 / 0\nIO.puts(\"never\")\n9 end\nf()");
        assert_eq!(message, "Runtime Error [Line 1]: Division by 0");
    }

    #[test]
    fn negation_round_trips() {
        for input in ["1 + 2 * 3", "2 ** 5", "7 % 3", "1..4 |> Enum.size()"] {
            let through = format!("-({}) + ({})", input, input);
            assert_eq!(eval(&through).inspect(), "0", "for {:?}", input);
        }
    }

    #[test]
    fn missing_import_reports() {
        let message = eval_error("import \"no/such/file\"");
        assert!(
            message.contains("Couldn't read imported file 'no/such/file'"),
            "{}",
            message
        );
    }

    #[test]
    fn imports_run_in_the_caller_scope() {
        let dir = std::env::temp_dir().join(format!("aria-import-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("shared.ari");
        std::fs::write(&path, "let shared = 41\n").unwrap();

        let input = format!("import \"{}\"\nshared + 1", path.display());
        assert_eq!(eval(&input).inspect(), "42");

        std::fs::remove_dir_all(&dir).ok();
    }
}
