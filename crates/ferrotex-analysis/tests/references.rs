use expect_test::expect;
use ferrotex_analysis::{AliasRegistry, Document, FileSet, ReferenceResolver, SymbolicReference};
use ferrotex_package::SchemaRegistry;

/// One line per command usage of `document` that has references.
fn render(set: &FileSet, document: usize, aliases: &AliasRegistry) -> String {
    let registry = SchemaRegistry::builtin();
    let resolver = ReferenceResolver::new(&registry, aliases, set);
    let doc = set.document(document).unwrap();
    let mut out = String::new();
    for usage in &doc.commands {
        let references = resolver.resolve(usage).unwrap();
        if references.is_empty() {
            continue;
        }
        let targets: Vec<String> = references
            .iter()
            .map(|reference| match reference {
                SymbolicReference::DefinitionLookup { command } => {
                    format!("definition {}", command)
                }
                SymbolicReference::File {
                    default_extension, ..
                } => format!(
                    "file {} (.{})",
                    reference.target(usage, &doc.text).unwrap_or_default(),
                    default_extension
                ),
                _ => format!(
                    "{} {}",
                    reference.kind(),
                    reference.target(usage, &doc.text).unwrap_or_default()
                ),
            })
            .collect();
        out.push_str(&format!("{}: {}\n", usage.name, targets.join(", ")));
    }
    out
}

#[test]
fn test_project_references() {
    let set = FileSet::from_documents([
        Document::parse(
            "main.tex",
            "\\documentclass{article}
\\input{macros}
\\usepackage{graphicx, cleveref}
\\begin{document}
\\section{Intro}\\label{sec:intro}
See \\cref{sec:intro,fig:plot} and \\figref{fig:plot}.
\\includegraphics[width=\\linewidth]{plots/overview}
\\bibliography{refs, extra}
\\url{https://example.org}
\\highlight{x}
\\end{document}
",
        ),
        Document::parse(
            "macros.tex",
            "\\newcommand{\\figref}[1]{Figure~\\ref{#1}}\n\\newcommand{\\highlight}[1]{\\textbf{#1}}",
        ),
    ]);
    let aliases = AliasRegistry::new();

    expect![[r#"
        \documentclass: file article (.cls)
        \input: file macros (.tex)
        \usepackage: file graphicx (.sty), file cleveref (.sty)
        \cref: label sec:intro, label fig:plot
        \figref: label fig:plot
        \includegraphics: file plots/overview (.pdf)
        \bibliography: file refs (.bib), file extra (.bib)
        \url: url https://example.org
        \highlight: definition \highlight
    "#]]
    .assert_eq(&render(&set, 0, &aliases));

    assert!(aliases.aliases("\\ref").contains("\\figref"));
    assert!(!aliases.aliases("\\ref").contains("\\highlight"));
}
