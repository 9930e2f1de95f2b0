use std::fmt;
use std::rc::Rc;

use crate::lexer::token::Token;

/// Root node of a parsed source file or REPL line.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A statement, carrying the token it started on for error reporting.
#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub token: Token,
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    Let { name: String, value: Expression },
    Var { name: String, value: Expression },
    Return { value: Option<Expression> },
    Break,
    Continue,
    Expression(Expression),
}

/// A block of statements, as found in if/switch/for/fn/module bodies.
#[derive(Debug, Clone)]
pub struct Block {
    pub token: Token,
    pub statements: Vec<Statement>,
}

/// An expression, carrying the token it started on.
#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub token: Token,
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Integer(i64),
    Float(f64),
    Str(Rc<str>),
    Atom(Rc<str>),
    Boolean(bool),
    Nil,
    Placeholder,
    Identifier(String),
    Array(Vec<Expression>),
    Dictionary(Vec<(Expression, Expression)>),
    Subscript {
        target: Box<Expression>,
        index: Box<Expression>,
    },
    Assign {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Prefix {
        operator: Token,
        right: Box<Expression>,
    },
    Infix {
        operator: Token,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        then: Rc<Block>,
        otherwise: Option<Rc<Block>>,
    },
    Switch {
        control: Option<Box<Expression>>,
        cases: Vec<SwitchCase>,
        default: Option<Rc<Block>>,
    },
    For {
        arguments: Vec<String>,
        enumerable: Box<Expression>,
        body: Rc<Block>,
    },
    Function {
        parameters: Vec<Rc<str>>,
        body: Rc<Block>,
    },
    FunctionCall {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Module {
        name: String,
        body: Rc<Block>,
    },
    ModuleAccess {
        object: String,
        member: String,
    },
    Pipe {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Import {
        file: Rc<str>,
    },
    // A parenthesized expression list; only meaningful as arrow-function
    // parameters and rejected everywhere else.
    List(Vec<Expression>),
}

/// One case of a switch expression.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub token: Token,
    pub values: Vec<Expression>,
    pub body: Rc<Block>,
}

fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            StatementKind::Let { name, value } => write!(f, "let {} = {}", name, value),
            StatementKind::Var { name, value } => write!(f, "var {} = {}", name, value),
            StatementKind::Return { value: Some(value) } => write!(f, "return {}", value),
            StatementKind::Return { value: None } => write!(f, "return"),
            StatementKind::Break => write!(f, "break"),
            StatementKind::Continue => write!(f, "continue"),
            StatementKind::Expression(expression) => write!(f, "{}", expression),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl fmt::Display for SwitchCase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "case {} then {}", join(&self.values, ", "), self.body)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ExpressionKind::Integer(_) | ExpressionKind::Float(_) => {
                write!(f, "{}", self.token.lexeme)
            }
            ExpressionKind::Str(value) => write!(f, "\"{}\"", value),
            ExpressionKind::Atom(name) => write!(f, ":{}", name),
            ExpressionKind::Boolean(value) => write!(f, "{}", value),
            ExpressionKind::Nil => write!(f, "nil"),
            ExpressionKind::Placeholder => Ok(()),
            ExpressionKind::Identifier(name) => write!(f, "{}", name),
            ExpressionKind::Array(elements) => write!(f, "Array({})", join(elements, ", ")),
            ExpressionKind::Dictionary(pairs) => {
                let pairs: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
                write!(f, "[{}]", pairs.join(", "))
            }
            ExpressionKind::Subscript { target, index } => write!(f, "{}[{}]", target, index),
            ExpressionKind::Assign { target, value } => write!(f, "{} = {}", target, value),
            ExpressionKind::Prefix { operator, right } => {
                write!(f, "({}{})", operator.lexeme, right)
            }
            ExpressionKind::Infix {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator.lexeme, right),
            ExpressionKind::If {
                condition,
                then,
                otherwise,
            } => {
                write!(f, "if {} then {}", condition, then)?;
                if let Some(otherwise) = otherwise {
                    write!(f, " else {}", otherwise)?;
                }
                Ok(())
            }
            ExpressionKind::Switch {
                control,
                cases,
                default,
            } => {
                write!(f, "switch ")?;
                if let Some(control) = control {
                    write!(f, "{}", control)?;
                }
                write!(f, " -> {}", join(cases, "; "))?;
                if let Some(default) = default {
                    write!(f, "; default {}", default)?;
                }
                Ok(())
            }
            ExpressionKind::For {
                arguments,
                enumerable,
                body,
            } => write!(
                f,
                "for ({} in {}) -> {}",
                arguments.join(", "),
                enumerable,
                body
            ),
            ExpressionKind::Function { parameters, body } => {
                write!(f, "fn ({}) -> {}", parameters.join(", "), body)
            }
            ExpressionKind::FunctionCall {
                function,
                arguments,
            } => write!(f, "{}({})", function, join(arguments, ", ")),
            ExpressionKind::Module { name, body } => write!(f, "Module {} {{ {} }}", name, body),
            ExpressionKind::ModuleAccess { object, member } => {
                write!(f, "{}->{}", object, member)
            }
            ExpressionKind::Pipe { left, right } => write!(f, "{} |> {}", left, right),
            ExpressionKind::Import { .. } => Ok(()),
            ExpressionKind::List(elements) => write!(f, "({})", join(elements, ", ")),
        }
    }
}
