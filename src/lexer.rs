pub mod token;

use crate::lexer::token::{keyword, Location, Token, TokenKind};
use crate::reader::Reader;
use crate::reporter::{self, Stage};

/// Turns the source reader into a stream of tokens, one per `next_token`.
/// Errors are routed through the reporter; the lexer keeps going so the
/// parser can synchronize instead of giving up on the first bad character.
pub struct Lexer {
    reader: Reader,
    char: char,
    row: usize,
    col: usize,
    rewinded: bool,
}

impl Lexer {
    pub fn new(reader: Reader) -> Self {
        let mut lexer = Lexer {
            reader,
            char: '\0',
            row: 1,
            col: 1,
            rewinded: false,
        };

        // Move to the first character.
        lexer.advance();

        lexer
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Token {
        self.consume_whitespace();

        let tok = match self.char {
            '\0' => self.make_token(TokenKind::Eof, ""),
            '=' => match self.peek() {
                '=' => {
                    self.advance();
                    self.make_token(TokenKind::Eq, "==")
                }
                '>' => {
                    self.advance();
                    self.make_token(TokenKind::FatArrow, "=>")
                }
                _ => self.make_token(TokenKind::Assign, "="),
            },
            '>' => match self.peek() {
                '=' => {
                    self.advance();
                    self.make_token(TokenKind::Gte, ">=")
                }
                '>' => {
                    self.advance();
                    self.make_token(TokenKind::ShiftRight, ">>")
                }
                _ => self.make_token(TokenKind::Gt, ">"),
            },
            '<' => match self.peek() {
                '=' => {
                    self.advance();
                    self.make_token(TokenKind::Lte, "<=")
                }
                '<' => {
                    self.advance();
                    self.make_token(TokenKind::ShiftLeft, "<<")
                }
                _ => self.make_token(TokenKind::Lt, "<"),
            },
            '+' => match self.peek() {
                '=' => {
                    self.advance();
                    self.make_token(TokenKind::PlusAssign, "+=")
                }
                _ => self.make_token(TokenKind::Plus, "+"),
            },
            '-' => match self.peek() {
                '>' => {
                    self.advance();
                    self.make_token(TokenKind::Arrow, "->")
                }
                '=' => {
                    self.advance();
                    self.make_token(TokenKind::MinusAssign, "-=")
                }
                _ => self.make_token(TokenKind::Minus, "-"),
            },
            '*' => match self.peek() {
                '*' => {
                    self.advance();
                    self.make_token(TokenKind::Power, "**")
                }
                '=' => {
                    self.advance();
                    self.make_token(TokenKind::StarAssign, "*=")
                }
                _ => self.make_token(TokenKind::Asterisk, "*"),
            },
            '/' => match self.peek() {
                '/' => {
                    self.advance();
                    self.consume_comment()
                }
                '*' => {
                    self.advance();
                    self.consume_multiline_comment()
                }
                '=' => {
                    self.advance();
                    self.make_token(TokenKind::SlashAssign, "/=")
                }
                _ => self.make_token(TokenKind::Slash, "/"),
            },
            '%' => self.make_token(TokenKind::Modulo, "%"),
            ',' => self.make_token(TokenKind::Comma, ","),
            '.' => match self.peek() {
                '.' => {
                    self.advance();
                    match self.peek() {
                        '.' => {
                            self.advance();
                            self.make_token(TokenKind::Ellipsis, "...")
                        }
                        _ => self.make_token(TokenKind::Range, ".."),
                    }
                }
                _ => self.make_token(TokenKind::Dot, "."),
            },
            '|' => match self.peek() {
                '|' => {
                    self.advance();
                    self.make_token(TokenKind::Or, "||")
                }
                '>' => {
                    self.advance();
                    self.make_token(TokenKind::Pipe, "|>")
                }
                _ => self.make_token(TokenKind::BitOr, "|"),
            },
            '&' => match self.peek() {
                '&' => {
                    self.advance();
                    self.make_token(TokenKind::And, "&&")
                }
                _ => self.make_token(TokenKind::BitAnd, "&"),
            },
            '~' => self.make_token(TokenKind::BitNot, "~"),
            '!' => match self.peek() {
                '=' => {
                    self.advance();
                    self.make_token(TokenKind::UnEq, "!=")
                }
                _ => self.make_token(TokenKind::Bang, "!"),
            },
            '(' => self.make_token(TokenKind::LParen, "("),
            ')' => self.make_token(TokenKind::RParen, ")"),
            '[' => self.make_token(TokenKind::LBrack, "["),
            ']' => self.make_token(TokenKind::RBrack, "]"),
            '?' => self.make_token(TokenKind::Question, "?"),
            ':' => self.make_token(TokenKind::Colon, ":"),
            '_' if !is_name(self.peek()) => self.make_token(TokenKind::Underscore, "_"),
            '\n' => self.make_token(TokenKind::Newline, "\\n"),
            '"' => self.consume_string(),
            '0' if self.peek() == 'x' => self.consume_special_integer(is_hex),
            '0' if self.peek() == 'o' => self.consume_special_integer(is_octal),
            '0' if self.peek() == 'b' => self.consume_special_integer(is_binary),
            c if is_number(c) => self.consume_numeric(),
            c if is_name(c) => self.consume_ident(),
            c => {
                self.report_error(format!("Unidentified character '{}'", c));
                self.make_token(TokenKind::Comment, "")
            }
        };

        self.advance();

        tok
    }

    // Move the cursor ahead. The location stays put right after a rewind,
    // as it already accounts for the scalar once.
    fn advance(&mut self) {
        let rn = self.reader.advance();

        if !self.rewinded {
            self.move_location();
        }
        self.rewinded = false;
        self.char = rn;
    }

    fn peek(&self) -> char {
        self.reader.peek()
    }

    fn rewind(&mut self) {
        self.reader.unread();
        self.rewinded = true;
    }

    // Move the row and column cursor past the current character.
    fn move_location(&mut self) {
        match self.char {
            '\n' => {
                self.row += 1;
                self.col = 2;
            }
            _ => self.col += 1,
        }
    }

    fn make_token(&self, kind: TokenKind, lexeme: impl Into<String>) -> Token {
        Token::new(
            kind,
            lexeme,
            Location {
                row: self.row,
                col: self.col,
            },
        )
    }

    fn consume_whitespace(&mut self) {
        while self.char == ' ' || self.char == '\t' || self.char == '\r' {
            self.advance();
        }
    }

    // Read a string literal, decoding escape sequences.
    fn consume_string(&mut self) -> Token {
        let mut out = String::new();

        // Move past the opening double quote.
        self.advance();

        loop {
            match self.char {
                '\\' => {
                    self.advance();
                    match self.char {
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'a' => out.push('\x07'),
                        'b' => out.push('\x08'),
                        'f' => out.push('\x0C'),
                        'v' => out.push('\x0B'),
                        c => self.report_error(format!("Invalid escape character '{}'", c)),
                    }
                }
                '\0' => {
                    // String should be closed before the end of file.
                    self.report_error("Unterminated string");
                    break;
                }
                '"' => break,
                c => out.push(c),
            }

            self.advance();
        }

        self.make_token(TokenKind::Str, out)
    }

    // Read a numeric literal: integer, float or scientific notation.
    fn consume_numeric(&mut self) -> Token {
        let mut out = String::new();
        out.push(self.char);
        let mut float_found = false;
        let mut scientific_found = false;

        loop {
            self.advance();

            match self.char {
                c if is_number(c) => out.push(c),
                // Thousands separator is ignored.
                '_' => {}
                '.' if is_number(self.peek()) => {
                    float_found = true;
                    out.push('.');
                }
                'e' if is_number(self.peek()) || self.peek() == '-' => {
                    // Numbers in scientific notation are treated as
                    // floats for ease of use.
                    float_found = true;
                    scientific_found = true;
                    out.push('e');
                }
                '-' if scientific_found => out.push('-'),
                // Two dots make the range operator, not a float.
                '.' if self.peek() == '.' => {
                    self.rewind();
                    break;
                }
                // Don't rewind on EOF.
                '\0' => break,
                _ => {
                    self.rewind();
                    break;
                }
            }
        }

        if float_found {
            self.make_token(TokenKind::Float, out)
        } else {
            self.make_token(TokenKind::Integer, out)
        }
    }

    // Read a binary, octal or hexadecimal literal.
    fn consume_special_integer(&mut self, valid: fn(char) -> bool) -> Token {
        let mut out = String::new();

        out.push(self.char);
        out.push(self.peek());
        // Move past the 'x', 'b' or 'o'.
        self.advance();

        while valid(self.peek()) {
            out.push(self.peek());
            self.advance();
        }

        // A starter like '0x' without other characters is not
        // enough to make up an Integer.
        if out.len() == 2 {
            self.report_error(format!("Literal sequence '{}' started but not continued", out));
        }

        self.make_token(TokenKind::Integer, out)
    }

    // Read a single line comment.
    fn consume_comment(&mut self) -> Token {
        let mut out = String::new();

        self.advance();

        loop {
            match self.char {
                // Comment ends on a line break, which stays in the
                // stream as a statement terminator.
                '\n' => {
                    self.rewind();
                    break;
                }
                '\0' => break,
                c => out.push(c),
            }

            self.advance();
        }

        self.make_token(TokenKind::Comment, out)
    }

    // Read a multiline comment.
    fn consume_multiline_comment(&mut self) -> Token {
        let mut out = String::new();

        loop {
            self.advance();
            match self.char {
                '*' if self.peek() == '/' => {
                    self.advance();
                    break;
                }
                // EOF and yet no comment terminator.
                '\0' => {
                    self.report_error("Unterminated multiline comment");
                    break;
                }
                c => out.push(c),
            }
        }

        self.make_token(TokenKind::Comment, out)
    }

    // Read an identifier or keyword.
    fn consume_ident(&mut self) -> Token {
        let mut out = String::new();
        out.push(self.char);

        // Read until a non-name character is found.
        while is_name(self.peek()) {
            self.advance();
            out.push(self.char);
        }

        // Check the keyword table for a known keyword.
        // Otherwise call it an Identifier.
        match keyword(&out) {
            Some(kind) => self.make_token(kind, out),
            None => self.make_token(TokenKind::Identifier, out),
        }
    }

    fn report_error(&self, message: impl Into<String>) {
        reporter::error(
            Stage::Parse,
            Location {
                row: self.row,
                col: self.col,
            },
            message,
        );
    }
}

// Characters that make up a valid identifier or keyword.
fn is_name(char: char) -> bool {
    char.is_ascii_alphanumeric() || char == '_' || char == '!' || char == '?'
}

fn is_number(char: char) -> bool {
    char.is_ascii_digit()
}

fn is_hex(char: char) -> bool {
    char.is_ascii_hexdigit()
}

fn is_octal(char: char) -> bool {
    ('0'..='7').contains(&char)
}

fn is_binary(char: char) -> bool {
    char == '0' || char == '1'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter;

    fn lex_kinds(input: &str) -> Vec<(TokenKind, String)> {
        reporter::clear();
        let mut lexer = Lexer::new(Reader::new(input));
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token();
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push((tok.kind, tok.lexeme));
        }
        assert!(!reporter::has_errors(), "unexpected lex errors: {:?}", reporter::errors());
        out
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex_kinds(input).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("1 + 2 * 3 % 1 / (5 + 2) ** 2 + 1..5"),
            vec![
                Integer, Plus, Integer, Asterisk, Integer, Modulo, Integer, Slash, LParen,
                Integer, Plus, Integer, RParen, Power, Integer, Plus, Integer, Range, Integer
            ]
        );
        assert_eq!(
            kinds("true && false || 0 >= 1 < 5 && !true"),
            vec![Boolean, And, Boolean, Or, Integer, Gte, Integer, Lt, Integer, And, Bang, Boolean]
        );
        assert_eq!(
            kinds("10 & 5 >> 1 | 0 << ~1"),
            vec![Integer, BitAnd, Integer, ShiftRight, Integer, BitOr, Integer, ShiftLeft, BitNot, Integer]
        );
        assert_eq!(
            kinds("a |> f(b) -> c => d ? e : _"),
            vec![
                Identifier, Pipe, Identifier, LParen, Identifier, RParen, Arrow, Identifier,
                FatArrow, Identifier, Question, Identifier, Colon, Underscore
            ]
        );
        assert_eq!(
            kinds("a += 1 b -= 2 c *= 3 d /= 4"),
            vec![
                Identifier, PlusAssign, Integer, Identifier, MinusAssign, Integer,
                Identifier, StarAssign, Integer, Identifier, SlashAssign, Integer
            ]
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            lex_kinds(r#"1 5_000 true 5.20 3.4e-2 false "yes" 0xff 0o27 0b101"#),
            vec![
                (TokenKind::Integer, "1".into()),
                (TokenKind::Integer, "5000".into()),
                (TokenKind::Boolean, "true".into()),
                (TokenKind::Float, "5.20".into()),
                (TokenKind::Float, "3.4e-2".into()),
                (TokenKind::Boolean, "false".into()),
                (TokenKind::Str, "yes".into()),
                (TokenKind::Integer, "0xff".into()),
                (TokenKind::Integer, "0o27".into()),
                (TokenKind::Integer, "0b101".into()),
            ]
        );
    }

    #[test]
    fn string_escapes_are_decoded() {
        assert_eq!(
            lex_kinds(r#""a\nb\t\"c\"""#),
            vec![(TokenKind::Str, "a\nb\t\"c\"".into())]
        );
    }

    #[test]
    fn range_after_digits_is_not_a_float() {
        use TokenKind::*;
        assert_eq!(kinds("1..5"), vec![Integer, Range, Integer]);
        assert_eq!(kinds("a..b"), vec![Identifier, Range, Identifier]);
        assert_eq!(kinds("a...b"), vec![Identifier, Ellipsis, Identifier]);
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("let var fn do end if else for in return then switch case default break continue module import nil"),
            vec![
                Let, Var, Function, Do, End, If, Else, For, In, Return, Then, Switch, Case,
                Default, Break, Continue, Module, Import, Nil
            ]
        );
        assert_eq!(
            lex_kinds("contains? empty! _private lets"),
            vec![
                (Identifier, "contains?".into()),
                (Identifier, "empty!".into()),
                (Identifier, "_private".into()),
                (Identifier, "lets".into()),
            ]
        );
    }

    #[test]
    fn comments_and_newlines() {
        use TokenKind::*;
        assert_eq!(
            kinds("1 // note\n2"),
            vec![Integer, Comment, Newline, Integer]
        );
        assert_eq!(kinds("1 /* a\nb */ 2"), vec![Integer, Comment, Integer]);
    }

    #[test]
    fn newline_tracks_location() {
        reporter::clear();
        let mut lexer = Lexer::new(Reader::new("a\nb"));
        assert_eq!(lexer.next_token().location.row, 1);
        assert_eq!(lexer.next_token().kind, TokenKind::Newline);
        assert_eq!(lexer.next_token().location.row, 2);
    }

    #[test]
    fn reports_bad_literals() {
        reporter::clear();
        let mut lexer = Lexer::new(Reader::new("0x"));
        lexer.next_token();
        assert!(reporter::has_errors());
        assert!(reporter::errors()[0].contains("'0x' started but not continued"));
        reporter::clear();

        let mut lexer = Lexer::new(Reader::new("\"open"));
        lexer.next_token();
        assert!(reporter::has_errors());
        assert!(reporter::errors()[0].contains("Unterminated string"));
        reporter::clear();

        let mut lexer = Lexer::new(Reader::new("@"));
        lexer.next_token();
        assert!(reporter::has_errors());
        assert!(reporter::errors()[0].contains("Unidentified character '@'"));
        reporter::clear();
    }
}
