use tracing::{debug, trace};

use crate::ast::{ForLoop, Node};
use crate::element::Element;
use crate::error::{LexError, ParseError};
use crate::lexer::{Lexer, LexerMode, Token};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Open containers; the document sits at the bottom.
    stack: Vec<Node>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            stack: vec![Node::Document(Vec::new())],
        }
    }

    /// Parses the whole input into a [`Node::Document`].
    pub fn parse(mut self) -> Result<Node, ParseError> {
        loop {
            match self.next()? {
                Token::Eof => break,
                Token::Text(text) => self.append(Node::Text(text)),
                Token::TagOpen => {
                    self.lexer.set_mode(LexerMode::Tag);
                    self.parse_tag()?;
                    self.lexer.set_mode(LexerMode::Text);
                }
                other => {
                    return Err(ParseError::TagNotClosed {
                        line: self.lexer.line(),
                        found: other.describe(),
                    })
                }
            }
        }

        if self.stack.len() != 1 {
            return Err(ParseError::UnclosedFor {
                line: self.lexer.line(),
                open: self.stack.len() - 1,
            });
        }
        let document = self.stack.pop().unwrap_or(Node::Document(Vec::new()));
        debug!(nodes = document.children().len(), "parsed document");
        Ok(document)
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        self.lexer.next_token().map_err(|source| self.lex_error(source))
    }

    fn lex_error(&self, source: LexError) -> ParseError {
        ParseError::Lex {
            line: self.lexer.line(),
            source,
        }
    }

    fn append(&mut self, node: Node) {
        if let Some(children) = self.stack.last_mut().and_then(Node::children_mut) {
            children.push(node);
        }
    }

    fn parse_tag(&mut self) -> Result<(), ParseError> {
        let line = self.lexer.line();
        let name = match self.next()? {
            Token::TagName(name) => name,
            other => {
                return Err(ParseError::MissingTagName {
                    line,
                    found: other.describe(),
                })
            }
        };
        trace!(tag = %name, line, "tag");

        match name.as_str() {
            "=" => {
                let elements = self.parse_elements()?;
                self.append(Node::Echo(elements));
            }
            "for" => {
                let for_loop = self.parse_for()?;
                self.stack.push(Node::ForLoop(for_loop));
            }
            "end" => {
                self.expect_tag_close()?;
                if self.stack.len() < 2 {
                    return Err(ParseError::UnmatchedEnd { line });
                }
                if let Some(closed) = self.stack.pop() {
                    self.append(closed);
                }
            }
            _ => return Err(ParseError::UnknownTag { line, name }),
        }
        Ok(())
    }

    /// Elements up to and including the closing `$}`.
    fn parse_elements(&mut self) -> Result<Vec<Element>, ParseError> {
        let mut elements = Vec::new();
        loop {
            let element = match self.next()? {
                Token::TagClose => return Ok(elements),
                Token::String(value) => Element::StringConst(value),
                Token::Integer(value) => Element::IntegerConst(value),
                Token::Double(value) => Element::DoubleConst(value),
                Token::Variable(name) => Element::Variable(name),
                Token::Function(name) => Element::Function(name),
                Token::Operator(op) => Element::Operator(op),
                other => {
                    return Err(ParseError::TagNotClosed {
                        line: self.lexer.line(),
                        found: other.describe(),
                    })
                }
            };
            elements.push(element);
        }
    }

    fn parse_for(&mut self) -> Result<ForLoop, ParseError> {
        let line = self.lexer.line();
        let variable = match self.next()? {
            Token::Variable(name) => name,
            other => {
                return Err(ParseError::ForVariable {
                    line,
                    found: other.describe(),
                })
            }
        };

        let mut arguments = self.parse_elements()?.into_iter();
        let count = arguments.len();
        if !(2..=3).contains(&count) {
            return Err(ParseError::ForArity { line, count });
        }
        for argument in arguments.as_slice() {
            if matches!(argument, Element::Function(_) | Element::Operator(_)) {
                return Err(ParseError::ForElement {
                    line,
                    found: argument.describe(),
                });
            }
        }

        match (arguments.next(), arguments.next()) {
            (Some(start), Some(end)) => Ok(ForLoop {
                variable,
                start,
                end,
                step: arguments.next(),
                children: Vec::new(),
            }),
            _ => Err(ParseError::ForArity { line, count }),
        }
    }

    fn expect_tag_close(&mut self) -> Result<(), ParseError> {
        match self.next()? {
            Token::TagClose => Ok(()),
            other => Err(ParseError::TagNotClosed {
                line: self.lexer.line(),
                found: other.describe(),
            }),
        }
    }
}

/// Parses `input` into a document tree.
pub fn parse(input: &str) -> Result<Node, ParseError> {
    Parser::new(input).parse()
}
