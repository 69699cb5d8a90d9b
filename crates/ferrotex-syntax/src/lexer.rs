//! Tokenizer for LaTeX source.
//!
//! Tokens are `(SyntaxKind, &str)` pairs borrowing from the input, and the
//! concatenation of all token texts is the input itself. Nothing is an error
//! at this level: unknown characters end up in `Text` runs.
//!
//! ```
//! use ferrotex_syntax::lexer::Lexer;
//! use ferrotex_syntax::SyntaxKind;
//!
//! let tokens: Vec<_> = Lexer::new(r"\cref*{fig:a} % see").collect();
//! assert_eq!(tokens[0], (SyntaxKind::Command, r"\cref*"));
//! assert_eq!(tokens[1], (SyntaxKind::LBrace, "{"));
//! assert_eq!(tokens[2], (SyntaxKind::Text, "fig:a"));
//! assert_eq!(tokens.last(), Some(&(SyntaxKind::Comment, "% see")));
//! ```

use crate::SyntaxKind;

pub struct Lexer<'a> {
    input: &'a str,
    /// Byte offset of the next unread character.
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// The next token, or `(SyntaxKind::Eof, "")` once the input is used up.
    pub fn next_token(&mut self) -> (SyntaxKind, &'a str) {
        let start = self.position;
        let Some(c) = self.bump() else {
            return (SyntaxKind::Eof, "");
        };

        let kind = match c {
            '\\' => self.control_sequence(),
            '{' => SyntaxKind::LBrace,
            '}' => SyntaxKind::RBrace,
            '[' => SyntaxKind::LBracket,
            ']' => SyntaxKind::RBracket,
            '$' => SyntaxKind::Dollar,
            '%' => {
                self.eat_while(|c| c != '\n' && c != '\r');
                SyntaxKind::Comment
            }
            c if c.is_whitespace() => {
                self.eat_while(char::is_whitespace);
                SyntaxKind::Whitespace
            }
            _ => {
                self.eat_while(|c| !ends_text(c));
                SyntaxKind::Text
            }
        };
        (kind, &self.input[start..self.position])
    }

    /// Rest of a command after its backslash. A control word (`\section`,
    /// `\@ifundefined`) takes one trailing star into the token, so starred
    /// forms such as `\section*` or `\newcommand*` are a single command. A
    /// control symbol (`\%`, `\\`, `\[`) is the backslash plus one character.
    fn control_sequence(&mut self) -> SyntaxKind {
        match self.peek() {
            Some(c) if is_command_letter(c) => {
                self.eat_while(is_command_letter);
                if self.peek() == Some('*') {
                    self.bump();
                }
            }
            Some(_) => {
                self.bump();
            }
            None => {}
        }
        SyntaxKind::Command
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while self.peek().is_some_and(&mut predicate) {
            self.bump();
        }
    }
}

/// Letters of a control word. `@` is included so that package internals such
/// as `\@ifundefined` lex as a single command.
fn is_command_letter(c: char) -> bool {
    c.is_alphabetic() || c == '@'
}

fn ends_text(c: char) -> bool {
    matches!(c, '\\' | '{' | '}' | '[' | ']' | '%' | '$') || c.is_whitespace()
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (SyntaxKind, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            (SyntaxKind::Eof, _) => None,
            token => Some(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SyntaxKind::*;

    fn tokenize(input: &str) -> Vec<(SyntaxKind, &str)> {
        Lexer::new(input).collect()
    }

    #[test]
    fn test_command_with_argument_and_comment() {
        assert_eq!(
            tokenize(r"\usepackage{graphicx} % figures"),
            vec![
                (Command, "\\usepackage"),
                (LBrace, "{"),
                (Text, "graphicx"),
                (RBrace, "}"),
                (Whitespace, " "),
                (Comment, "% figures"),
            ]
        );
    }

    #[test]
    fn test_tokens_cover_the_input() {
        let input = "\\section*{Résumé}\r\n% a\n\\[x\\] 50\\% [opt] $y$\\";
        let joined: String = tokenize(input).into_iter().map(|(_, text)| text).collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn test_control_symbols() {
        assert_eq!(
            tokenize(r"50\%\\*"),
            vec![(Text, "50"), (Command, "\\%"), (Command, "\\\\"), (Text, "*")]
        );
    }

    #[test]
    fn test_starred_and_internal_commands() {
        assert_eq!(
            tokenize(r"\newcommand*{\@foo}\includegraphics**"),
            vec![
                (Command, "\\newcommand*"),
                (LBrace, "{"),
                (Command, "\\@foo"),
                (RBrace, "}"),
                (Command, "\\includegraphics*"),
                (Text, "*"),
            ]
        );
    }

    #[test]
    fn test_lone_backslash_at_end() {
        assert_eq!(tokenize("a\\"), vec![(Text, "a"), (Command, "\\")]);
    }

    #[test]
    fn test_whitespace_and_empty_input() {
        assert!(tokenize("").is_empty());
        assert_eq!(tokenize("  \n\t "), vec![(Whitespace, "  \n\t ")]);
    }

    #[test]
    fn test_comment_stops_at_carriage_return() {
        assert_eq!(tokenize("% a\rb")[0], (Comment, "% a"));
    }

    #[test]
    fn test_text_runs() {
        assert_eq!(
            tokenize("@#*&^ a$b$[c]"),
            vec![
                (Text, "@#*&^"),
                (Whitespace, " "),
                (Text, "a"),
                (Dollar, "$"),
                (Text, "b"),
                (Dollar, "$"),
                (LBracket, "["),
                (Text, "c"),
                (RBracket, "]"),
            ]
        );
    }

    #[test]
    fn test_multi_byte_characters() {
        assert_eq!(
            tokenize(r"Émilie \ü"),
            vec![(Text, "Émilie"), (Whitespace, " "), (Command, "\\ü")]
        );
    }
}
