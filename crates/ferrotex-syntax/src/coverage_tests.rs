use crate::ast::{Command, Environment};
use crate::lexer::Lexer;
use crate::parser::parse;
use crate::SyntaxKind;
use rowan::ast::AstNode;

fn commands(input: &str) -> Vec<Command> {
    parse(input)
        .syntax()
        .descendants()
        .filter_map(Command::cast)
        .collect()
}

#[test]
fn test_lexer_brackets_and_math() {
    let input = r"\[ E = mc^2 \]";
    let mut lexer = Lexer::new(input);
    // \[ is a control symbol, not an optional argument
    let (k1, t1) = lexer.next_token();
    assert_eq!(k1, SyntaxKind::Command);
    assert_eq!(t1, "\\[");

    lexer.next_token(); // space

    let (k2, t2) = lexer.next_token();
    assert_eq!(k2, SyntaxKind::Text);
    assert_eq!(t2, "E");
}

#[test]
fn test_lexer_eof() {
    let mut lexer = Lexer::new("");
    assert_eq!(lexer.next_token(), (SyntaxKind::Eof, ""));
}

#[test]
fn test_lexer_math_dollar() {
    let kinds: Vec<_> = Lexer::new("$$").map(|(k, _)| k).collect();
    assert_eq!(kinds, vec![SyntaxKind::Dollar, SyntaxKind::Dollar]);
}

#[test]
fn test_parser_unclosed_environment() {
    let res = parse(r"\begin{document} Hello");
    assert_eq!(res.errors[0].message, "Unclosed environment, expected \\end");
}

#[test]
fn test_parser_missing_brace_after_begin() {
    let res = parse(r"\begin document}");
    assert!(res.errors[0].message.contains("Expected '{'"));
}

#[test]
fn test_parser_missing_brace_after_end() {
    let res = parse(r"\begin{a}\end a}");
    assert!(res.errors[0].message.contains("Expected '{'"));
}

#[test]
fn test_parser_unmatched_rbrace_in_env() {
    let res = parse(r"\begin{a} } \end{a}");
    assert_eq!(res.errors[0].message, "Unmatched '}' inside environment");
}

#[test]
fn test_parser_optional_stops_at_closing_brace() {
    let res = parse(r"\addbibresource[backend=biber}{refs.bib}");
    assert_eq!(res.errors[0].message, "Expected ']'");
}

#[test]
fn test_parser_optional_stops_at_end() {
    let input = r"\begin{a}\item[x \end{a}";
    let res = parse(input);
    assert_eq!(res.errors.len(), 1);
    let root = res.syntax();
    let env = root.children().find_map(Environment::cast).unwrap();
    assert!(env.end().is_some());
}

#[test]
fn test_commands_are_collected_in_source_order() {
    let names: Vec<_> = commands(r"\a{\b}\c[\d]")
        .iter()
        .filter_map(Command::name)
        .collect();
    assert_eq!(names, vec!["\\a", "\\b", "\\c", "\\d"]);
}

#[test]
fn test_begin_and_end_are_not_commands() {
    let input = r"\begin{figure}\centering\end{figure}";
    let names: Vec<_> = commands(input).iter().filter_map(Command::name).collect();
    assert_eq!(names, vec!["\\centering"]);
}

#[test]
fn test_begin_takes_extra_arguments() {
    let input = r"\begin{tabular}{ll} a & b \end{tabular}";
    let root = parse(input).syntax();
    let env = root.children().find_map(Environment::cast).unwrap();
    let params = env
        .begin()
        .unwrap()
        .children()
        .filter(|n| n.kind() == SyntaxKind::RequiredParam)
        .count();
    assert_eq!(params, 2);
    assert_eq!(env.name().unwrap().0, "tabular");
}

#[test]
fn test_deeply_nested_structure() {
    let res = parse(r"\begin{a}\begin{b}\begin{c}\end{c}\end{b}\end{a}");
    assert!(res.errors.is_empty());
}

#[test]
fn test_verbatim_like_environments() {
    // Verbatim content is parsed like any other content; only panic freedom matters.
    let _res = parse(r"\begin{verbatim} \end{verbatim} $ % & { } ");
}

#[test]
fn test_tree_is_lossless() {
    let input = "\\documentclass[a4paper]{article}\n% c\n\\usepackage{a,b}\n\\begin{document}\n\\sqrt[3]{8} }\n";
    let root = parse(input).syntax();
    assert_eq!(root.to_string(), input);
}
