use crate::{lexer::Lexer, SyntaxKind, SyntaxNode};
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};
use std::iter::Peekable;

/// Delimiter sizing commands. A bracket after them is a delimiter, never an
/// optional argument (`\left[ x \right)`).
const DELIMITER_COMMANDS: &[&str] = &[
    "\\left", "\\right", "\\middle", "\\big", "\\Big", "\\bigg", "\\Bigg", "\\bigl", "\\bigr",
    "\\Bigl", "\\Bigr", "\\biggl", "\\biggr", "\\Biggl", "\\Biggr",
];

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

pub struct Parser<'a> {
    lexer: Peekable<Lexer<'a>>,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
    current_offset: TextSize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input).peekable(),
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            current_offset: TextSize::from(0),
        }
    }

    pub fn parse(mut self) -> ParseResult {
        self.builder.start_node(SyntaxKind::Root.into());
        while self.peek() != SyntaxKind::Eof {
            self.parse_element();
        }
        self.builder.finish_node();
        ParseResult {
            green_node: self.builder.finish(),
            errors: self.errors,
        }
    }

    fn peek(&mut self) -> SyntaxKind {
        self.lexer
            .peek()
            .map(|(k, _)| *k)
            .unwrap_or(SyntaxKind::Eof)
    }

    fn peek_text(&mut self) -> &str {
        self.lexer.peek().map(|(_, t)| *t).unwrap_or("")
    }

    fn bump(&mut self) {
        if let Some((kind, text)) = self.lexer.next() {
            self.builder.token(kind.into(), text);
            let len = TextSize::of(text);
            self.current_offset += len;
        }
    }

    fn error(&mut self, message: String) {
        let start = self.current_offset;
        let text = self.peek_text();
        let len = TextSize::of(text);
        let range = TextRange::at(start, len);
        self.errors.push(SyntaxError { message, range });
    }

    fn parse_element(&mut self) {
        match self.peek() {
            SyntaxKind::Command => self.parse_command_or_environment(),
            SyntaxKind::LBrace => self.parse_group(SyntaxKind::Group),
            SyntaxKind::RBrace => {
                self.error("Unmatched '}'".into());
                self.builder.start_node(SyntaxKind::Error.into());
                self.bump();
                self.builder.finish_node();
            }
            SyntaxKind::Eof => {}
            _ => self.bump(),
        }
    }

    /// Parses `{ ... }` as either a free-standing [`SyntaxKind::Group`] or a
    /// [`SyntaxKind::RequiredParam`] of the preceding command.
    fn parse_group(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
        self.bump(); // Consume '{'

        while self.peek() != SyntaxKind::Eof && self.peek() != SyntaxKind::RBrace {
            self.parse_element();
        }

        if self.peek() == SyntaxKind::RBrace {
            self.bump(); // Consume '}'
        } else {
            self.error("Expected '}'".into());
        }
        self.builder.finish_node();
    }

    fn parse_optional_param(&mut self) {
        self.builder.start_node(SyntaxKind::OptionalParam.into());
        self.bump(); // Consume '['

        loop {
            match self.peek() {
                SyntaxKind::RBracket => {
                    self.bump();
                    break;
                }
                SyntaxKind::Eof | SyntaxKind::RBrace => {
                    self.error("Expected ']'".into());
                    break;
                }
                SyntaxKind::Whitespace if is_paragraph_break(self.peek_text()) => {
                    self.error("Expected ']' before paragraph break".into());
                    break;
                }
                SyntaxKind::Command if matches!(self.peek_text(), "\\begin" | "\\end") => {
                    self.error("Expected ']'".into());
                    break;
                }
                _ => self.parse_element(),
            }
        }

        self.builder.finish_node();
    }

    /// Consumes the bracket and brace groups glued to a command token.
    fn parse_parameters(&mut self, allow_optional: bool) {
        loop {
            match self.peek() {
                SyntaxKind::LBrace => self.parse_group(SyntaxKind::RequiredParam),
                SyntaxKind::LBracket if allow_optional => self.parse_optional_param(),
                _ => break,
            }
        }
    }

    fn parse_command_or_environment(&mut self) {
        match self.peek_text() {
            "\\begin" => self.parse_environment(),
            "\\end" => {
                self.error("Unmatched \\end".into());
                self.builder.start_node(SyntaxKind::End.into());
                self.bump();
                self.parse_parameters(false);
                self.builder.finish_node();
            }
            _ => self.parse_command(),
        }
    }

    fn parse_command(&mut self) {
        let allow_optional = !DELIMITER_COMMANDS.contains(&self.peek_text());
        self.builder.start_node(SyntaxKind::GenericCommand.into());
        self.bump(); // Consume the command token
        self.parse_parameters(allow_optional);
        self.builder.finish_node();
    }

    fn parse_environment(&mut self) {
        self.builder.start_node(SyntaxKind::Environment.into());

        self.builder.start_node(SyntaxKind::Begin.into());
        self.bump(); // Consume \begin
        if self.peek() != SyntaxKind::LBrace {
            self.error("Expected '{' after \\begin".into());
        }
        self.parse_parameters(true);
        self.builder.finish_node();

        // Parse content until \end
        loop {
            match self.peek() {
                SyntaxKind::Eof => {
                    self.error("Unclosed environment, expected \\end".into());
                    break;
                }
                SyntaxKind::Command if self.peek_text() == "\\end" => {
                    self.builder.start_node(SyntaxKind::End.into());
                    self.bump(); // Consume \end
                    if self.peek() == SyntaxKind::LBrace {
                        self.parse_group(SyntaxKind::RequiredParam);
                    } else {
                        self.error("Expected '{' after \\end".into());
                    }
                    self.builder.finish_node();
                    break;
                }
                SyntaxKind::RBrace => {
                    self.error("Unmatched '}' inside environment".into());
                    self.builder.start_node(SyntaxKind::Error.into());
                    self.bump();
                    self.builder.finish_node();
                }
                _ => self.parse_element(),
            }
        }

        self.builder.finish_node();
    }
}

fn is_paragraph_break(whitespace: &str) -> bool {
    whitespace.matches('\n').count() >= 2
}

pub struct ParseResult {
    pub green_node: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl ParseResult {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green_node.clone())
    }
}

pub fn parse(input: &str) -> ParseResult {
    Parser::new(input).parse()
}
