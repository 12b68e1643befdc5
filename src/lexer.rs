use crate::element::Operator;
use crate::error::LexError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Eof,
    Text(String),
    TagOpen,  // {$
    TagClose, // $}
    TagName(String),
    Variable(String),
    Function(String),
    Operator(Operator),
    Integer(i64),
    Double(f64),
    String(String),
}

impl Token {
    /// Short description used in parser diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Token::Eof => "end of input".to_string(),
            Token::Text(_) => "text".to_string(),
            Token::TagOpen => "`{$`".to_string(),
            Token::TagClose => "`$}`".to_string(),
            Token::TagName(name) => format!("tag name `{name}`"),
            Token::Variable(name) => format!("variable `{name}`"),
            Token::Function(name) => format!("function `@{name}`"),
            Token::Operator(op) => format!("operator `{op}`"),
            Token::Integer(value) => format!("number {value}"),
            Token::Double(value) => format!("number {value}"),
            Token::String(value) => format!("string {value:?}"),
        }
    }
}

/// Which lexical grammar the next token is read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerMode {
    Text,
    Tag,
}

/// Mode-driven tokenizer. The caller switches [`LexerMode`] between tokens.
#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    cursor: usize,
    line: usize,
    mode: LexerMode,
    current: Option<Token>,
    expect_tag_name: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            cursor: 0,
            line: 1,
            mode: LexerMode::Text,
            current: None,
            expect_tag_name: false,
        }
    }

    pub fn mode(&self) -> LexerMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: LexerMode) {
        self.mode = mode;
    }

    /// Line of the cursor (1-based).
    pub fn line(&self) -> usize {
        self.line
    }

    /// The most recently produced token, without advancing.
    pub fn current_token(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if self.current == Some(Token::Eof) {
            return Err(LexError::Exhausted);
        }
        let token = match self.mode {
            LexerMode::Text => self.lex_text()?,
            LexerMode::Tag => self.lex_tag()?,
        };
        self.current = Some(token.clone());
        Ok(token)
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.cursor..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.remaining().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn lex_text(&mut self) -> Result<Token, LexError> {
        if self.remaining().is_empty() {
            return Ok(Token::Eof);
        }
        if self.remaining().starts_with("{$") {
            self.cursor += 2;
            self.expect_tag_name = true;
            return Ok(Token::TagOpen);
        }

        let mut text = String::new();
        while let Some(c) = self.peek() {
            match c {
                '{' if self.peek_second() == Some('$') => break,
                '{' => return Err(LexError::BraceWithoutDollar),
                '\\' => {
                    self.bump();
                    match self.bump() {
                        Some(escaped @ ('\\' | '{' | '}')) => text.push(escaped),
                        Some(other) => return Err(LexError::InvalidEscape(other)),
                        None => return Err(LexError::TrailingBackslash),
                    }
                }
                _ => {
                    self.bump();
                    text.push(c);
                }
            }
        }
        Ok(Token::Text(text))
    }

    fn lex_tag(&mut self) -> Result<Token, LexError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        let Some(first) = self.peek() else {
            return Err(LexError::UnclosedTag);
        };

        let expect_tag_name = std::mem::take(&mut self.expect_tag_name);
        if expect_tag_name {
            if first == '=' {
                self.bump();
                return Ok(Token::TagName("=".to_string()));
            }
            if first.is_alphabetic() {
                return Ok(Token::TagName(self.read_word().to_lowercase()));
            }
        }

        match first {
            '$' => {
                self.bump();
                if self.peek() == Some('}') {
                    self.bump();
                    Ok(Token::TagClose)
                } else {
                    Err(LexError::DollarWithoutBrace)
                }
            }
            '"' => self.read_string(),
            '@' => {
                self.bump();
                match self.peek() {
                    Some(c) if c.is_alphabetic() => Ok(Token::Function(self.read_word())),
                    _ => Err(LexError::IllegalCharacter('@')),
                }
            }
            '-' if self.peek_second().is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() => Ok(Token::Variable(self.read_word())),
            c => match Operator::from_symbol(c) {
                Some(op) => {
                    self.bump();
                    Ok(Token::Operator(op))
                }
                None => Err(LexError::IllegalCharacter(c)),
            },
        }
    }

    /// Letter followed by letters, digits or underscores.
    fn read_word(&mut self) -> String {
        let word: String = self
            .remaining()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        self.cursor += word.len();
        word
    }

    fn read_string(&mut self) -> Result<Token, LexError> {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Token::String(value)),
                Some('\\') => match self.bump() {
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(other) => return Err(LexError::InvalidEscape(other)),
                    None => return Err(LexError::UnterminatedString),
                },
                Some(c) => value.push(c),
                None => return Err(LexError::UnterminatedString),
            }
        }
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let rest = self.remaining().as_bytes();
        let mut len = 0;
        if rest.first() == Some(&b'-') {
            len += 1;
        }
        len += count_digits(&rest[len..]);

        let mut is_double = false;
        if rest.get(len) == Some(&b'.') && rest.get(len + 1).is_some_and(u8::is_ascii_digit) {
            is_double = true;
            len += 1 + count_digits(&rest[len + 1..]);
        }
        if matches!(rest.get(len), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(rest.get(len + 1), Some(b'+' | b'-')));
            if rest.get(len + 1 + sign).is_some_and(u8::is_ascii_digit) {
                is_double = true;
                len += 1 + sign + count_digits(&rest[len + 1 + sign..]);
            }
        }

        let literal = &self.remaining()[..len];
        self.cursor += len;
        if is_double {
            match literal.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Token::Double(value)),
                _ => Err(LexError::NumberOutOfRange(literal.to_string())),
            }
        } else {
            literal
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| LexError::NumberOutOfRange(literal.to_string()))
        }
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
