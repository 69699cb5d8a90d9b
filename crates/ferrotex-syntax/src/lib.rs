//! # FerroTeX Syntax
//!
//! Fault-tolerant, lossless LaTeX parser built on [`rowan`].
//!
//! The tree keeps every byte of the input (whitespace and comments included), so
//! offsets taken from it can be mapped back onto the source without adjustment.
//! Commands are parsed generically: a command token followed by the bracket and
//! brace groups glued to it. Environments get their own node so that
//! `\begin{..}` / `\end{..}` never show up as ordinary command usages.
//!
//! ```
//! use ferrotex_syntax::{ast, parse, SyntaxKind};
//! use rowan::ast::AstNode;
//!
//! let result = parse(r"\sqrt[3]{8}");
//! let root = result.syntax();
//! let node = root.descendants().find(|n| n.kind() == SyntaxKind::GenericCommand).unwrap();
//! let command = ast::Command::cast(node).unwrap();
//!
//! assert_eq!(command.name().as_deref(), Some(r"\sqrt"));
//! assert_eq!(command.optional_parameters().count(), 1);
//! assert_eq!(command.required_parameters().count(), 1);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;

#[cfg(test)]
mod coverage_tests;

pub use parser::{parse, ParseResult, SyntaxError};
use rowan::Language;
pub use rowan::{TextRange, TextSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // Tokens
    LBrace = 0,
    RBrace,
    LBracket,
    RBracket,
    Command, // \section, \item, \newcommand*
    Dollar,
    Whitespace,
    Comment, // % ...
    Text,    // Regular text
    Error,   // Lexer error

    // Composite Nodes
    Root,
    Group,          // { ... } not attached to a command
    GenericCommand, // \cmd[opt]{req}
    RequiredParam,  // {...} attached to a command
    OptionalParam,  // [...] attached to a command
    Environment,    // \begin{...} ... \end{...}
    Begin,          // \begin{name}...
    End,            // \end{name}

    // Technical
    Eof,
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FerroTexLanguage {}

impl Language for FerroTexLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::Eof as u16);
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<FerroTexLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<FerroTexLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<FerroTexLanguage>;
