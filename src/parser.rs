pub mod ast;
pub mod precedence;

use std::rc::Rc;

use crate::lexer::token::{Token, TokenKind};
use crate::lexer::Lexer;
use crate::parser::ast::{
    Block, Expression, ExpressionKind, Program, Statement, StatementKind, SwitchCase,
};
use crate::reporter::{self, Stage};

/// Pratt parser over the lexer's token stream.
///
/// Keeps a current and a peek token and dispatches on them through prefix
/// and infix handlers. Errors go to the reporter and the parser synchronizes
/// to the next statement starter, so one bad statement doesn't swamp the
/// output with consequences.
pub struct Parser {
    lexer: Lexer,
    token: Token,
    peek_token: Token,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Parser {
            lexer,
            token: Token::default(),
            peek_token: Token::default(),
        };

        // The first advance only sets the peek token. The second
        // sets both the current and peek correctly.
        parser.advance();
        parser.advance();

        parser
    }

    /// Parse tokens into a program.
    pub fn parse(&mut self) -> Program {
        let mut program = Program::default();

        while !self.matches(&[TokenKind::Eof]) {
            if let Some(statement) = self.parse_statement() {
                program.statements.push(statement);
            }
            self.advance();
        }

        program
    }

    fn advance(&mut self) {
        self.token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn matches(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.token.kind)
    }

    fn peek_matches(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek_token.kind)
    }

    fn precedence(&self) -> u8 {
        precedence::of(self.token.kind)
    }

    fn peek_precedence(&self) -> u8 {
        precedence::of(self.peek_token.kind)
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.token.kind {
            TokenKind::Let => self.parse_binding(false),
            TokenKind::Var => self.parse_binding(true),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => Some(Statement {
                kind: StatementKind::Break,
                token: self.token.clone(),
            }),
            TokenKind::Continue => Some(Statement {
                kind: StatementKind::Continue,
                token: self.token.clone(),
            }),
            // Comments and newlines are dropped.
            TokenKind::Comment | TokenKind::Newline => None,
            _ => self.parse_expression_statement(),
        }
    }

    // let IDENT = EXPRESSION | var IDENT = EXPRESSION
    fn parse_binding(&mut self, mutable: bool) -> Option<Statement> {
        let token = self.token.clone();
        let keyword = if mutable { "VAR" } else { "LET" };

        if !self.peek_matches(&[TokenKind::Identifier]) {
            self.report_error(format!("{} statement expects an identifier", keyword));
            return None;
        }

        self.advance();
        let name = self.token.lexeme.clone();

        if !self.peek_matches(&[TokenKind::Assign]) {
            self.report_error(format!("Missing assignment in {} statement", keyword));
            return None;
        }

        self.advance();
        self.advance();
        let value = self.parse_expression(precedence::LOWEST)?;

        let kind = if mutable {
            StatementKind::Var { name, value }
        } else {
            StatementKind::Let { name, value }
        };

        Some(Statement { kind, token })
    }

    // return [EXPRESSION]
    fn parse_return(&mut self) -> Option<Statement> {
        let token = self.token.clone();
        self.advance();
        let value = self.parse_expression(precedence::LOWEST);

        Some(Statement {
            kind: StatementKind::Return { value },
            token,
        })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.token.clone();
        let expression = self.parse_expression(precedence::LOWEST)?;

        Some(Statement {
            kind: StatementKind::Expression(expression),
            token,
        })
    }

    // Tokens that end an expression without being part of one.
    fn ignored_as_expression(&self) -> bool {
        self.matches(&[
            TokenKind::Newline,
            TokenKind::Eof,
            TokenKind::RBrack,
            TokenKind::Do,
        ])
    }

    fn parse_expression(&mut self, precedence: u8) -> Option<Expression> {
        if self.ignored_as_expression() {
            return None;
        }

        let mut left = self.parse_prefix_dispatch()?;

        // Run the infix handlers until the next token has
        // a higher precedence.
        while precedence < self.peek_precedence() {
            if !has_infix(self.peek_token.kind) {
                return Some(left);
            }

            self.advance();
            left = self.parse_infix_dispatch(left)?;
        }

        Some(left)
    }

    fn parse_prefix_dispatch(&mut self) -> Option<Expression> {
        match self.token.kind {
            TokenKind::Module => self.parse_module(),
            TokenKind::If => self.parse_if(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::For => self.parse_for(),
            TokenKind::Function => self.parse_function(),
            TokenKind::Import => self.parse_import(),
            TokenKind::LBrack => self.parse_array_or_dictionary(),
            TokenKind::Identifier => Some(Expression {
                kind: ExpressionKind::Identifier(self.token.lexeme.clone()),
                token: self.token.clone(),
            }),
            TokenKind::Integer => self.parse_integer(),
            TokenKind::Float => self.parse_float(),
            TokenKind::Str => Some(Expression {
                kind: ExpressionKind::Str(Rc::from(self.token.lexeme.as_str())),
                token: self.token.clone(),
            }),
            TokenKind::Boolean => Some(Expression {
                kind: ExpressionKind::Boolean(self.token.lexeme == "true"),
                token: self.token.clone(),
            }),
            TokenKind::Nil => Some(Expression {
                kind: ExpressionKind::Nil,
                token: self.token.clone(),
            }),
            TokenKind::Colon => self.parse_atom(),
            TokenKind::Underscore => Some(Expression {
                kind: ExpressionKind::Placeholder,
                token: self.token.clone(),
            }),
            TokenKind::Bang | TokenKind::BitNot | TokenKind::Minus => self.parse_prefix(),
            TokenKind::LParen => self.parse_group(),
            _ => {
                self.report_error(format!("Unexpected expression '{}'", self.token.lexeme));
                None
            }
        }
    }

    fn parse_infix_dispatch(&mut self, left: Expression) -> Option<Expression> {
        match self.token.kind {
            TokenKind::Dot => self.parse_module_access(left),
            TokenKind::LParen => self.parse_function_call(left),
            TokenKind::LBrack => self.parse_subscript(left),
            TokenKind::Pipe => self.parse_pipe(left),
            TokenKind::Question => self.parse_ternary(left),
            TokenKind::Arrow => self.parse_arrow_function(left),
            TokenKind::Assign
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::StarAssign
            | TokenKind::SlashAssign => self.parse_assign(left),
            _ => self.parse_infix(left),
        }
    }

    // Integer literal in decimal, hex, octal or binary notation.
    fn parse_integer(&mut self) -> Option<Expression> {
        let token = self.token.clone();
        let lexeme = self.token.lexeme.clone();

        let parsed = if let Some(digits) = lexeme.strip_prefix("0b") {
            i64::from_str_radix(digits, 2)
        } else if let Some(digits) = lexeme.strip_prefix("0x") {
            i64::from_str_radix(digits, 16)
        } else if let Some(digits) = lexeme.strip_prefix("0o") {
            i64::from_str_radix(digits, 8)
        } else {
            lexeme.parse::<i64>()
        };

        match parsed {
            Ok(value) => Some(Expression {
                kind: ExpressionKind::Integer(value),
                token,
            }),
            Err(_) => {
                self.report_error(format!("Couldn't parse {} as Integer", lexeme));
                None
            }
        }
    }

    // Floating point literal, scientific notation included.
    fn parse_float(&mut self) -> Option<Expression> {
        let token = self.token.clone();

        match self.token.lexeme.parse::<f64>() {
            Ok(value) => Some(Expression {
                kind: ExpressionKind::Float(value),
                token,
            }),
            Err(_) => {
                let lexeme = self.token.lexeme.clone();
                self.report_error(format!("Couldn't parse {} as Float", lexeme));
                None
            }
        }
    }

    // :IDENT
    fn parse_atom(&mut self) -> Option<Expression> {
        let token = self.token.clone();

        if !self.peek_matches(&[TokenKind::Identifier]) {
            self.report_error("Expecting an identifier after ':' in Atom");
            return None;
        }

        self.advance();

        Some(Expression {
            kind: ExpressionKind::Atom(Rc::from(self.token.lexeme.as_str())),
            token,
        })
    }

    // module IDENT BODY
    fn parse_module(&mut self) -> Option<Expression> {
        let token = self.token.clone();

        if !self.peek_matches(&[TokenKind::Identifier]) {
            self.report_error("Expecting an identifier as MODULE name");
            return None;
        }

        self.advance();
        let name = self.token.lexeme.clone();

        // Ignore the optional DO.
        if self.peek_matches(&[TokenKind::Do]) {
            self.advance();
        }

        let body = self.parse_block_body();

        if !self.matches(&[TokenKind::End]) {
            self.report_error("Missing END closing statement in MODULE");
            return None;
        }

        Some(Expression {
            kind: ExpressionKind::Module {
                name,
                body: Rc::new(body),
            },
            token,
        })
    }

    // IDENT.IDENT
    fn parse_module_access(&mut self, left: Expression) -> Option<Expression> {
        let token = self.token.clone();

        let object = match left.kind {
            ExpressionKind::Identifier(name) => name,
            _ => {
                let lexeme = left.token.lexeme.clone();
                self.report_error(format!("Cannot use '{}' as MODULE caller", lexeme));
                return None;
            }
        };

        if !self.peek_matches(&[TokenKind::Identifier]) {
            self.report_error("Expecting an identifier as MODULE member");
            return None;
        }

        self.advance();

        Some(Expression {
            kind: ExpressionKind::ModuleAccess {
                object,
                member: self.token.lexeme.clone(),
            },
            token,
        })
    }

    // if CONDITION then THEN else ELSE end
    fn parse_if(&mut self) -> Option<Expression> {
        let token = self.token.clone();
        self.advance();

        let condition = match self.parse_expression(precedence::LOWEST) {
            Some(condition) => condition,
            None => {
                self.report_error("Missing condition expression in IF");
                return None;
            }
        };

        self.advance();

        // Remove the optional THEN or DO.
        if self.matches(&[TokenKind::Then, TokenKind::Do]) {
            self.advance();
        }

        let mut then = Block {
            token: self.token.clone(),
            statements: Vec::new(),
        };

        // Parse the THEN block until an ELSE or END token. Doesn't use
        // parse_block_body() as any other block does, as it needs to
        // check for ELSE too.
        while !self.matches(&[TokenKind::End, TokenKind::Else, TokenKind::Eof]) {
            if let Some(statement) = self.parse_statement() {
                then.statements.push(statement);
            }
            self.advance();
        }

        if then.statements.is_empty() {
            self.report_error("Empty body in IF");
            return None;
        }

        // Parse the optional ELSE block.
        let mut otherwise = None;
        if self.matches(&[TokenKind::Else]) {
            let body = self.parse_block_body();

            if body.statements.is_empty() {
                self.report_error("Empty ELSE body in IF");
                return None;
            }

            otherwise = Some(Rc::new(body));
        }

        if !self.matches(&[TokenKind::End]) {
            self.report_error("Missing END closing statement in IF");
            return None;
        }

        Some(Expression {
            kind: ExpressionKind::If {
                condition: Box::new(condition),
                then: Rc::new(then),
                otherwise,
            },
            token,
        })
    }

    // switch [EXPRESSION] do case EXPRESSIONS BLOCK default BLOCK end
    fn parse_switch(&mut self) -> Option<Expression> {
        let token = self.token.clone();
        self.advance();

        // A missing control expression is allowed; the switch then
        // behaves as if the control were `true`.
        let control = self.parse_expression(precedence::LOWEST);
        if control.is_some() {
            self.advance();
        }

        if !self.matches(&[TokenKind::Do, TokenKind::Newline]) {
            self.report_error("Missing DO statement in inline SWITCH");
            return None;
        }

        self.advance();

        let mut cases: Vec<SwitchCase> = Vec::new();
        let mut default = None;

        while !self.matches(&[TokenKind::End, TokenKind::Eof]) {
            match self.token.kind {
                TokenKind::Case => {
                    let case_token = self.token.clone();

                    // A case can have more than one value to compare to.
                    self.advance();
                    let values = self.parse_delimited(
                        TokenKind::Comma,
                        &[TokenKind::Newline, TokenKind::Then],
                        "then",
                    );

                    if values.is_empty() {
                        self.report_error("Missing expression in SWITCH CASE");
                        break;
                    }

                    let body = self.parse_switch_case_block();

                    cases.push(SwitchCase {
                        token: case_token,
                        values,
                        body: Rc::new(body),
                    });
                }
                TokenKind::Default => {
                    // Anything except a THEN or a NEWLINE means there are
                    // parameters, which the default case can't have.
                    if !self.peek_matches(&[TokenKind::Then, TokenKind::Newline]) {
                        self.report_error("DEFAULT case in SWITCH can't have parameters");
                        return None;
                    }

                    self.advance();

                    let body = self.parse_switch_case_block();

                    if body.statements.is_empty() {
                        self.report_error("Missing DEFAULT case body in SWITCH");
                        return None;
                    }

                    default = Some(Rc::new(body));
                }
                _ => {}
            }

            self.advance();
        }

        if !self.matches(&[TokenKind::End]) {
            self.report_error("Missing END closing statement in SWITCH");
            return None;
        }

        Some(Expression {
            kind: ExpressionKind::Switch {
                control: control.map(Box::new),
                cases,
                default,
            },
            token,
        })
    }

    // The body of a case or default case, ending on the next
    // CASE, DEFAULT or END token.
    fn parse_switch_case_block(&mut self) -> Block {
        let mut block = Block {
            token: self.token.clone(),
            statements: Vec::new(),
        };

        while !self.peek_matches(&[
            TokenKind::Case,
            TokenKind::Default,
            TokenKind::End,
            TokenKind::Eof,
        ]) {
            self.advance();
            if let Some(statement) = self.parse_statement() {
                block.statements.push(statement);
            }
        }

        block
    }

    // for IDENT1, IDENT2 in ENUMERABLE STATEMENTS end
    fn parse_for(&mut self) -> Option<Expression> {
        let token = self.token.clone();
        let mut arguments = Vec::new();

        self.advance();

        // An immediate DO or NEWLINE token means there is
        // no expression after FOR.
        if self.matches(&[TokenKind::Newline, TokenKind::Do]) {
            self.report_error("Missing expression in FOR loop");
            return None;
        }

        // Get the arguments until an IN token.
        while !self.matches(&[TokenKind::In, TokenKind::Eof]) {
            match self.token.kind {
                // Ignore commas.
                TokenKind::Comma => {}
                TokenKind::Do | TokenKind::Newline => {
                    self.report_error("IN statement missing in FOR loop");
                    return None;
                }
                TokenKind::Identifier => arguments.push(self.token.lexeme.clone()),
                _ => {
                    let lexeme = self.token.lexeme.clone();
                    self.report_error(format!(
                        "Unexpected token '{}' in FOR loop arguments",
                        lexeme
                    ));
                    return None;
                }
            }

            self.advance();
        }

        if arguments.is_empty() {
            self.report_error("Missing arguments in FOR loop");
            return None;
        }

        // Move past the IN token.
        if self.matches(&[TokenKind::In]) {
            self.advance();
        }

        let enumerable = match self.parse_expression(precedence::LOWEST) {
            Some(enumerable) => enumerable,
            None => {
                self.report_error("Missing enumerable in FOR loop");
                return None;
            }
        };

        // Remove the optional DO token.
        if self.peek_matches(&[TokenKind::Do]) {
            self.advance();
        }

        let body = self.parse_block_body();

        if body.statements.is_empty() {
            self.report_error("Empty body in FOR loop");
            return None;
        }

        if !self.matches(&[TokenKind::End]) {
            self.report_error("Missing END closing statement in FOR loop");
            return None;
        }

        Some(Expression {
            kind: ExpressionKind::For {
                arguments,
                enumerable: Box::new(enumerable),
                body: Rc::new(body),
            },
            token,
        })
    }

    // fn (PARAM1, PARAM2) [-> TYPE] BODY end
    fn parse_function(&mut self) -> Option<Expression> {
        let token = self.token.clone();
        let mut parameters: Vec<Rc<str>> = Vec::new();
        self.advance();

        // Find parameters until a DO or NEWLINE token.
        while !self.matches(&[TokenKind::Do, TokenKind::Newline]) {
            match self.token.kind {
                // Ignore commas. Parentheses are optional in a
                // function definition, so they're ignored too.
                TokenKind::Comma | TokenKind::LParen | TokenKind::RParen => {}
                // EOF reached. Something's wrong with the syntax.
                TokenKind::Eof => {
                    self.report_error("Missing body in function");
                    return None;
                }
                TokenKind::Identifier => parameters.push(Rc::from(self.token.lexeme.as_str())),
                // A return type annotation, parsed and ignored.
                TokenKind::Arrow => {
                    self.advance();
                    if !self.matches(&[TokenKind::Identifier]) {
                        self.report_error("Expecting a type name after '->' in function");
                        return None;
                    }
                }
                _ => {
                    let lexeme = self.token.lexeme.clone();
                    self.report_error(format!(
                        "Unexpected token '{}' as function parameter",
                        lexeme
                    ));
                    return None;
                }
            }

            self.advance();
        }

        let body = self.parse_block_body();

        if body.statements.is_empty() {
            self.report_error("Empty body in function");
            return None;
        }

        if !self.matches(&[TokenKind::End]) {
            self.report_error("Missing END statement in function");
            return None;
        }

        Some(Expression {
            kind: ExpressionKind::Function {
                parameters,
                body: Rc::new(body),
            },
            token,
        })
    }

    // CALLEE(ARG1, ARG2)
    fn parse_function_call(&mut self, function: Expression) -> Option<Expression> {
        let token = self.token.clone();
        self.advance();

        let arguments = self.parse_delimited(TokenKind::Comma, &[TokenKind::RParen], ")");

        Some(Expression {
            kind: ExpressionKind::FunctionCall {
                function: Box::new(function),
                arguments,
            },
            token,
        })
    }

    // import STRING
    fn parse_import(&mut self) -> Option<Expression> {
        let token = self.token.clone();
        self.advance();
        let file = self.parse_expression(precedence::LOWEST);

        // Import needs a string as the filename to be imported.
        match file {
            Some(Expression {
                kind: ExpressionKind::Str(file),
                ..
            }) => Some(Expression {
                kind: ExpressionKind::Import { file },
                token,
            }),
            _ => {
                self.report_error("IMPORT expects a string as filename");
                None
            }
        }
    }

    // Find out if it's an array or a dictionary.
    fn parse_array_or_dictionary(&mut self) -> Option<Expression> {
        let token = self.token.clone();
        self.advance();

        // An immediately closed separator makes an empty dictionary:
        // [:] or [=>].
        if self.matches(&[TokenKind::Colon, TokenKind::FatArrow])
            && self.peek_matches(&[TokenKind::RBrack])
        {
            self.advance();
            return Some(Expression {
                kind: ExpressionKind::Dictionary(Vec::new()),
                token,
            });
        }

        // A separator after the first key means it's a dictionary.
        // Otherwise, it's an array.
        if self.peek_matches(&[TokenKind::Colon, TokenKind::FatArrow]) {
            return self.parse_dictionary(token);
        }

        self.parse_array(token)
    }

    // [EXPR1, EXPR2]
    fn parse_array(&mut self, token: Token) -> Option<Expression> {
        let elements = self.parse_delimited(TokenKind::Comma, &[TokenKind::RBrack], "]");

        Some(Expression {
            kind: ExpressionKind::Array(elements),
            token,
        })
    }

    // [KEY1: VALUE1, KEY2 => VALUE2]
    fn parse_dictionary(&mut self, token: Token) -> Option<Expression> {
        let mut pairs = Vec::new();

        while !self.matches(&[TokenKind::RBrack]) {
            match self.token.kind {
                TokenKind::Newline | TokenKind::Eof => {
                    self.report_error("Missing closing ']' in Dictionary");
                    return None;
                }
                // Ignore the pair and list separators.
                TokenKind::Colon | TokenKind::FatArrow | TokenKind::Comma => {}
                _ if self.peek_matches(&[TokenKind::Colon, TokenKind::FatArrow]) => {
                    let key = self.parse_expression(precedence::LOWEST)?;
                    // Move past the key and the separator.
                    self.advance();
                    self.advance();

                    let value = match self.parse_expression(precedence::LOWEST) {
                        Some(value) => value,
                        None => {
                            self.report_error(format!(
                                "Found key '{}' in Dictionary but no value",
                                key
                            ));
                            return None;
                        }
                    };

                    pairs.push((key, value));
                }
                _ => {
                    self.report_error("Dictionary pair expects a ':' after the key");
                    return None;
                }
            }

            self.advance();
        }

        Some(Expression {
            kind: ExpressionKind::Dictionary(pairs),
            token,
        })
    }

    // TARGET[INDEX], TARGET[] or TARGET[_]
    fn parse_subscript(&mut self, left: Expression) -> Option<Expression> {
        let token = self.token.clone();
        self.advance();

        // An empty subscript is a placeholder index; writes append.
        if self.matches(&[TokenKind::RBrack]) {
            return Some(Expression {
                kind: ExpressionKind::Subscript {
                    target: Box::new(left),
                    index: Box::new(Expression {
                        kind: ExpressionKind::Placeholder,
                        token: token.clone(),
                    }),
                },
                token,
            });
        }

        let index = self.parse_expression(precedence::LOWEST)?;

        if !self.peek_matches(&[TokenKind::RBrack]) {
            self.report_error("Missing closing ] in subscript expression");
            return None;
        }

        self.advance();

        Some(Expression {
            kind: ExpressionKind::Subscript {
                target: Box::new(left),
                index: Box::new(index),
            },
            token,
        })
    }

    // LEFT |> RIGHT
    fn parse_pipe(&mut self, left: Expression) -> Option<Expression> {
        let token = self.token.clone();
        let precedence = self.precedence();
        self.advance();
        let right = self.parse_expression(precedence)?;

        Some(Expression {
            kind: ExpressionKind::Pipe {
                left: Box::new(left),
                right: Box::new(right),
            },
            token,
        })
    }

    // CONDITION ? THEN : ELSE, desugared into an if expression.
    fn parse_ternary(&mut self, condition: Expression) -> Option<Expression> {
        let token = self.token.clone();
        self.advance();
        let then = self.parse_expression(precedence::TERNARY)?;

        if !self.peek_matches(&[TokenKind::Colon]) {
            self.report_error("Missing ':' in ternary expression");
            return None;
        }

        self.advance();
        self.advance();
        // One level lower, so chained ternaries nest to the right.
        let otherwise = self.parse_expression(precedence::TERNARY - 1)?;

        Some(Expression {
            kind: ExpressionKind::If {
                condition: Box::new(condition),
                then: Rc::new(single_expression_block(then)),
                otherwise: Some(Rc::new(single_expression_block(otherwise))),
            },
            token,
        })
    }

    // PARAMS -> EXPRESSION, desugared into a function literal.
    fn parse_arrow_function(&mut self, left: Expression) -> Option<Expression> {
        let token = self.token.clone();

        let mut parameters: Vec<Rc<str>> = Vec::new();
        let candidates = match left.kind {
            ExpressionKind::List(elements) => elements,
            _ => vec![left],
        };
        for candidate in candidates {
            match candidate.kind {
                ExpressionKind::Identifier(name) => parameters.push(Rc::from(name.as_str())),
                _ => {
                    self.report_error("Arrow function expects identifier parameters");
                    return None;
                }
            }
        }

        self.advance();
        // One level lower, so chained arrows nest to the right.
        let body = self.parse_expression(precedence::ARROW - 1)?;

        Some(Expression {
            kind: ExpressionKind::Function {
                parameters,
                body: Rc::new(single_expression_block(body)),
            },
            token,
        })
    }

    // IDENT = EXPRESSION and the compound forms += -= *= /=, which
    // desugar to IDENT = IDENT <op> EXPRESSION.
    fn parse_assign(&mut self, target: Expression) -> Option<Expression> {
        let token = self.token.clone();

        if !valid_assignment_target(&target) {
            self.report_error("Assignment operator expects an identifier");
            return None;
        }

        self.advance();
        // One level lower, so chained assignments nest to the right.
        let value = self.parse_expression(precedence::ASSIGN - 1)?;

        let value = match binary_of_compound(&token) {
            Some(operator) => Expression {
                kind: ExpressionKind::Infix {
                    operator,
                    left: Box::new(target.clone()),
                    right: Box::new(value),
                },
                token: token.clone(),
            },
            None => value,
        };

        Some(Expression {
            kind: ExpressionKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            token,
        })
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        let token = self.token.clone();
        self.advance();
        let right = self.parse_expression(precedence::PREFIX)?;

        Some(Expression {
            kind: ExpressionKind::Prefix {
                operator: token.clone(),
                right: Box::new(right),
            },
            token,
        })
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        let token = self.token.clone();
        let mut precedence = self.precedence();

        // Logical operators take the right operand one level lower,
        // so chains keep short-circuiting left to right.
        if self.matches(&[TokenKind::And, TokenKind::Or]) {
            precedence -= 1;
        }

        self.advance();
        let right = self.parse_expression(precedence)?;

        Some(Expression {
            kind: ExpressionKind::Infix {
                operator: token.clone(),
                left: Box::new(left),
                right: Box::new(right),
            },
            token,
        })
    }

    // (EXPRESSION) or (EXPR1, EXPR2) before an arrow.
    fn parse_group(&mut self) -> Option<Expression> {
        let token = self.token.clone();
        self.advance();

        // () can only be an empty arrow-function parameter list.
        if self.matches(&[TokenKind::RParen]) {
            return Some(Expression {
                kind: ExpressionKind::List(Vec::new()),
                token,
            });
        }

        let first = self.parse_expression(precedence::LOWEST)?;

        if self.peek_matches(&[TokenKind::Comma]) {
            let mut elements = vec![first];

            while self.peek_matches(&[TokenKind::Comma]) {
                self.advance();
                self.advance();
                elements.push(self.parse_expression(precedence::LOWEST)?);
            }

            if !self.peek_matches(&[TokenKind::RParen]) {
                self.report_error("Missing closing ')' for grouped expression");
                return None;
            }

            self.advance();

            return Some(Expression {
                kind: ExpressionKind::List(elements),
                token,
            });
        }

        if !self.peek_matches(&[TokenKind::RParen]) {
            self.report_error("Missing closing ')' for grouped expression");
            return None;
        }

        self.advance();

        Some(first)
    }

    // A delimited list of expressions, ending on any of the end tokens.
    fn parse_delimited(
        &mut self,
        delimiter: TokenKind,
        end: &[TokenKind],
        closing: &str,
    ) -> Vec<Expression> {
        let mut list = Vec::new();

        while !self.matches(end) {
            match self.token.kind {
                kind if kind == delimiter => {}
                TokenKind::Newline | TokenKind::Eof => {
                    self.report_error(format!("Missing closing '{}' in parameter list", closing));
                    return list;
                }
                _ => match self.parse_expression(precedence::LOWEST) {
                    Some(element) => list.push(element),
                    None => {
                        let lexeme = self.token.lexeme.clone();
                        self.report_error(format!("Unexpected '{}' in expression list", lexeme));
                        return list;
                    }
                },
            }

            self.advance();
        }

        list
    }

    // Statements in a block, ending on an END or EOF token.
    fn parse_block_body(&mut self) -> Block {
        let mut block = Block {
            token: self.token.clone(),
            statements: Vec::new(),
        };

        self.advance();

        while !self.matches(&[TokenKind::End, TokenKind::Eof]) {
            if let Some(statement) = self.parse_statement() {
                block.statements.push(statement);
            }

            self.advance();
        }

        block
    }

    // Report an error in the current location and synchronize tokens.
    fn report_error(&mut self, message: impl Into<String>) {
        reporter::error(Stage::Parse, self.token.location, message);
        self.synchronize();
    }

    // Move the cursor up to the next statement starter, to prevent
    // error reporting from showing unneeded consequences.
    fn synchronize(&mut self) {
        loop {
            if self.matches(&[TokenKind::Eof, TokenKind::Newline]) {
                return;
            }

            if self.peek_matches(&[
                TokenKind::Let,
                TokenKind::Var,
                TokenKind::If,
                TokenKind::Switch,
                TokenKind::For,
                TokenKind::Function,
                TokenKind::Case,
                TokenKind::Default,
                TokenKind::Return,
                TokenKind::Module,
            ]) {
                return;
            }

            self.advance();
        }
    }
}

// Tokens that extend an expression when found in infix position.
fn has_infix(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Dot
            | TokenKind::LParen
            | TokenKind::LBrack
            | TokenKind::Pipe
            | TokenKind::Question
            | TokenKind::Arrow
            | TokenKind::Assign
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::StarAssign
            | TokenKind::SlashAssign
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Slash
            | TokenKind::Asterisk
            | TokenKind::Modulo
            | TokenKind::Power
            | TokenKind::Eq
            | TokenKind::UnEq
            | TokenKind::Lt
            | TokenKind::Lte
            | TokenKind::Gt
            | TokenKind::Gte
            | TokenKind::Or
            | TokenKind::And
            | TokenKind::BitAnd
            | TokenKind::BitOr
            | TokenKind::ShiftLeft
            | TokenKind::ShiftRight
            | TokenKind::Range
    )
}

// An assignment target is an identifier or a subscript whose innermost
// target is an identifier.
fn valid_assignment_target(target: &Expression) -> bool {
    match &target.kind {
        ExpressionKind::Identifier(_) => true,
        ExpressionKind::Subscript { target, .. } => valid_assignment_target(target),
        _ => false,
    }
}

// The binary operator a compound assignment desugars through.
fn binary_of_compound(token: &Token) -> Option<Token> {
    let (kind, lexeme) = match token.kind {
        TokenKind::PlusAssign => (TokenKind::Plus, "+"),
        TokenKind::MinusAssign => (TokenKind::Minus, "-"),
        TokenKind::StarAssign => (TokenKind::Asterisk, "*"),
        TokenKind::SlashAssign => (TokenKind::Slash, "/"),
        _ => return None,
    };

    Some(Token::new(kind, lexeme, token.location))
}

fn single_expression_block(expression: Expression) -> Block {
    let token = expression.token.clone();
    Block {
        token: token.clone(),
        statements: vec![Statement {
            kind: StatementKind::Expression(expression),
            token,
        }],
    }
}
