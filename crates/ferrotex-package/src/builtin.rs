//! Built-in knowledge about common LaTeX commands, environments and packages.

use crate::{
    Argument, ArgumentSchema, EnvironmentSchema, Package, PackageGraph, RequiredArgument,
    SchemaRegistry,
};
use once_cell::sync::Lazy;

pub static BUILTIN_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    let mut registry = SchemaRegistry::new();
    for schema in command_schemas() {
        if let Err(err) = registry.register_command(schema) {
            log::error!("Skipping built-in command schema: {}", err);
        }
    }
    for environment in environment_schemas() {
        registry.register_environment(environment);
    }
    registry
});

pub static BUILTIN_GRAPH: Lazy<PackageGraph> = Lazy::new(|| {
    let mut graph = PackageGraph::new();
    for (loader, loaded) in LOADS {
        for package in *loaded {
            graph.add_load(loader, package);
        }
    }
    for group in CONFLICTS {
        graph.add_conflict(group.iter().copied());
    }
    graph
});

/// `loader -> packages it loads`.
const LOADS: &[(&str, &[&str])] = &[
    ("amssymb", &["amsfonts"]),
    ("mathtools", &["amsmath"]),
    ("graphicx", &["graphics"]),
    ("xcolor", &["color"]),
    ("tikz", &["pgf"]),
    ("pgf", &["graphicx", "xcolor"]),
    ("hyperref", &["url", "nameref"]),
    ("subcaption", &["caption"]),
    ("glossaries-extra", &["glossaries"]),
];

const CONFLICTS: &[&[&str]] = &[&["biblatex", "natbib"], &["subfig", "subcaption"]];

const IMAGE_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "eps", "svg"];

fn kernel() -> Option<Package> {
    Some(Package::DEFAULT)
}

fn package(name: &str) -> Option<Package> {
    Some(Package::new(name))
}

fn text(name: &str) -> Argument {
    RequiredArgument::text(name).into()
}

fn optional(name: &str) -> Argument {
    Argument::optional(name)
}

fn files(name: &str, extensions: &[&str]) -> Argument {
    RequiredArgument::file(name, extensions).into()
}

fn file(name: &str, extensions: &[&str]) -> Argument {
    RequiredArgument::file(name, extensions).single().into()
}

fn command(name: &str, dependency: Option<Package>, arguments: Vec<Argument>) -> ArgumentSchema {
    ArgumentSchema::new(name, dependency, arguments)
}

#[rustfmt::skip]
fn command_schemas() -> Vec<ArgumentSchema> {
    let mut schemas = vec![
        // Kernel
        command("sqrt", kernel(), vec![optional("root"), text("radicand")]),
        command("frac", kernel(), vec![text("numerator"), text("denominator")]),
        command("textbf", kernel(), vec![text("text")]),
        command("emph", kernel(), vec![text("text")]),
        command("section", kernel(), vec![optional("short"), text("title")]),
        command("label", kernel(), vec![text("key")]),
        command("cite", kernel(), vec![optional("extra"), text("keys")]),
        command("index", kernel(), vec![text("entry")]),
        command("makeindex", kernel(), vec![optional("options")]),
        command("printindex", package("makeidx"), vec![]),
        command("printindex", package("imakeidx"), vec![optional("options")]),
        command("documentclass", kernel(), vec![optional("options"), file("class", &["cls"])]),
        command("usepackage", kernel(), vec![optional("options"), files("packages", &["sty"])]),
        command("RequirePackage", kernel(), vec![optional("options"), files("packages", &["sty"])]),
        command("input", kernel(), vec![file("file", &["tex"])]),
        command("include", kernel(), vec![file("file", &["tex"])]),
        command("includeonly", kernel(), vec![files("files", &["tex"])]),
        command("bibliography", kernel(), vec![files("files", &["bib"])]),
        command("bibliographystyle", kernel(), vec![file("style", &["bst"])]),
        command("subfile", package("subfiles"), vec![file("file", &["tex"])]),
        // Graphics and colour
        command("includegraphics", package("graphicx"), vec![optional("options"), file("imagefile", IMAGE_EXTENSIONS)]),
        command("graphicspath", package("graphicx"), vec![text("paths")]),
        command("textcolor", package("xcolor"), vec![text("color"), text("text")]),
        command("textcolor", package("color"), vec![text("color"), text("text")]),
        command("color", package("xcolor"), vec![text("color")]),
        command("color", package("color"), vec![text("color")]),
        command("definecolor", package("xcolor"), vec![text("name"), text("model"), text("spec")]),
        command("tikz", package("tikz"), vec![]),
        command("usetikzlibrary", package("tikz"), vec![text("libraries")]),
        command("pgfmathsetmacro", package("pgf"), vec![text("macro"), text("expression")]),
        // Mathematics
        command("text", package("amsmath"), vec![text("text")]),
        command("eqref", package("amsmath"), vec![text("key")]),
        command("DeclareMathOperator", package("amsmath"), vec![text("command"), text("operator")]),
        command("DeclarePairedDelimiter", package("mathtools"), vec![text("command"), text("left"), text("right")]),
        command("mathbb", package("amssymb"), vec![text("letters")]),
        command("mathfrak", package("amssymb"), vec![text("letters")]),
        command("checkmark", package("amssymb"), vec![]),
        command("qedhere", package("amsthm"), vec![]),
        command("SI", package("siunitx"), vec![optional("options"), text("number"), text("unit")]),
        command("si", package("siunitx"), vec![optional("options"), text("unit")]),
        // Bibliography
        command("citep", package("natbib"), vec![optional("pre"), optional("post"), text("keys")]),
        command("citet", package("natbib"), vec![optional("pre"), optional("post"), text("keys")]),
        command("parencite", package("biblatex"), vec![optional("pre"), optional("post"), text("keys")]),
        command("textcite", package("biblatex"), vec![optional("pre"), optional("post"), text("keys")]),
        command("autocite", package("biblatex"), vec![optional("pre"), optional("post"), text("keys")]),
        command("printbibliography", package("biblatex"), vec![optional("options")]),
        command("addbibresource", package("biblatex"), vec![optional("options"), file("resource", &["bib"])]),
        // References and links
        command("ref", kernel(), vec![text("key")]),
        command("pageref", kernel(), vec![text("key")]),
        command("nameref", package("nameref"), vec![text("key")]),
        command("autoref", package("hyperref"), vec![text("key")]),
        command("Autoref", package("hyperref"), vec![text("key")]),
        command("fullref", package("hyperref"), vec![text("key")]),
        command("vref", package("varioref"), vec![text("key")]),
        command("cref", package("cleveref"), vec![text("keys")]),
        command("Cref", package("cleveref"), vec![text("keys")]),
        command("labelcref", package("cleveref"), vec![text("keys")]),
        command("cpageref", package("cleveref"), vec![text("keys")]),
        command("url", package("url"), vec![text("url")]),
        command("url", package("hyperref"), vec![text("url")]),
        command("href", package("hyperref"), vec![text("url"), text("text")]),
        command("hypersetup", package("hyperref"), vec![text("options")]),
        // Listings and tables
        command("lstinputlisting", package("listings"), vec![optional("options"), file("file", &["tex", "txt", "py", "c", "java"])]),
        command("inputminted", package("minted"), vec![optional("options"), text("language"), file("file", &["tex", "txt", "py", "c", "java"])]),
        command("toprule", package("booktabs"), vec![]),
        command("midrule", package("booktabs"), vec![]),
        command("bottomrule", package("booktabs"), vec![]),
        command("subcaption", package("subcaption"), vec![optional("short"), text("caption")]),
        command("subfloat", package("subfig"), vec![optional("caption")]),
        // Glossaries and miscellany
        command("makeglossaries", package("glossaries"), vec![]),
        command("gls", package("glossaries"), vec![text("label")]),
        command("newglossaryentry", package("glossaries"), vec![text("label"), text("definition")]),
        command("todo", package("todonotes"), vec![optional("options"), text("text")]),
        command("hl", package("soul"), vec![text("text")]),
        command("lipsum", package("lipsum"), vec![optional("paragraphs")]),
    ];

    schemas.extend(definition_schemas());
    schemas
}

/// Definition commands are kernel commands that must never ask for an import.
fn definition_schemas() -> Vec<ArgumentSchema> {
    [
        "newcommand",
        "newcommand*",
        "renewcommand",
        "renewcommand*",
        "providecommand",
        "providecommand*",
        "newif",
        "NewDocumentCommand",
        "RenewDocumentCommand",
        "ProvideDocumentCommand",
        "DeclareDocumentCommand",
        "def",
        "let",
        "newenvironment",
        "renewenvironment",
        "newtheorem",
        "NewDocumentEnvironment",
    ]
    .into_iter()
    .map(|name| command(name, kernel(), vec![text("name")]))
    .collect()
}

fn environment_schemas() -> Vec<EnvironmentSchema> {
    const KERNEL: &[&str] = &[
        "document",
        "itemize",
        "enumerate",
        "description",
        "figure",
        "table",
        "tabular",
        "center",
        "verbatim",
        "equation",
        "quote",
        "abstract",
        "thebibliography",
    ];
    const PACKAGED: &[(&str, &str)] = &[
        ("align", "amsmath"),
        ("align*", "amsmath"),
        ("gather", "amsmath"),
        ("multline", "amsmath"),
        ("equation*", "amsmath"),
        ("pmatrix", "amsmath"),
        ("bmatrix", "amsmath"),
        ("cases", "amsmath"),
        ("proof", "amsthm"),
        ("tikzpicture", "tikz"),
        ("lstlisting", "listings"),
        ("minted", "minted"),
        ("subfigure", "subcaption"),
        ("longtable", "longtable"),
        ("tabularx", "tabularx"),
        ("algorithm", "algorithm"),
        ("algorithmic", "algorithmic"),
        ("refsection", "biblatex"),
    ];

    KERNEL
        .iter()
        .map(|name| EnvironmentSchema::new(*name, kernel()))
        .chain(
            PACKAGED
                .iter()
                .map(|(name, dependency)| EnvironmentSchema::new(*name, package(dependency))),
        )
        .collect()
}
