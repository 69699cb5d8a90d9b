//! Which index and glossary programs a document needs to be compiled.

use std::fmt;

use ferrotex_package::commands::{GLOSSARY_PACKAGES, INDEX_PACKAGES};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::error::AnalysisError;
use crate::file_set::FileSet;
use crate::options::optional_parameter_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexProgram {
    Makeindex,
    Xindy,
    Truexindy,
    Makeglossaries,
    MakeglossariesLite,
    Bib2gls,
}

impl IndexProgram {
    pub fn executable(&self) -> &'static str {
        match self {
            IndexProgram::Makeindex => "makeindex",
            IndexProgram::Xindy => "texindy",
            IndexProgram::Truexindy => "xindy",
            IndexProgram::Makeglossaries => "makeglossaries",
            IndexProgram::MakeglossariesLite => "makeglossaries-lite",
            IndexProgram::Bib2gls => "bib2gls",
        }
    }
}

impl fmt::Display for IndexProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexProgram::Makeindex => "makeindex",
            IndexProgram::Xindy => "xindy",
            IndexProgram::Truexindy => "truexindy",
            IndexProgram::Makeglossaries => "makeglossaries",
            IndexProgram::MakeglossariesLite => "makeglossaries-lite",
            IndexProgram::Bib2gls => "bib2gls",
        };
        f.write_str(name)
    }
}

/// The index programs to run for the project, in the order they were
/// detected. `makeglossaries` is a Perl script, so the lite variant is
/// chosen when Perl is not available.
pub fn default_index_programs(
    file_set: &FileSet,
    perl_available: bool,
) -> Result<IndexSet<IndexProgram>, AnalysisError> {
    file_set.root()?;

    let included = file_set.included_packages();
    let package_options = index_package_options(file_set);
    let makeindex_options = makeindex_options(file_set);

    let mut programs = IndexSet::new();
    if INDEX_PACKAGES.iter().any(|name| included.contains(*name)) {
        programs.insert(if package_options.contains("xindy") {
            IndexProgram::Xindy
        } else {
            IndexProgram::Makeindex
        });
    }

    if included.contains("glossaries") {
        programs.insert(if perl_available {
            IndexProgram::Makeglossaries
        } else {
            IndexProgram::MakeglossariesLite
        });
    } else if included.contains("glossaries-extra") && package_options.contains("record") {
        programs.insert(IndexProgram::Bib2gls);
    }

    // imakeidx lets \makeindex pick the program, as a flag or as program=...
    let requested = |name: &str| {
        makeindex_options.contains_key(name)
            || makeindex_options.get("program").is_some_and(|program| program == name)
    };
    if requested("makeindex") {
        programs.insert(IndexProgram::Makeindex);
    } else if requested("xindy") || requested("texindy") {
        programs.insert(IndexProgram::Xindy);
    } else if requested("truexindy") {
        programs.insert(IndexProgram::Truexindy);
    }

    log::debug!("Index programs: {:?}", programs);
    Ok(programs)
}

/// Option keys given to index and glossary package imports.
fn index_package_options(file_set: &FileSet) -> IndexSet<String> {
    file_set
        .package_imports()
        .into_iter()
        .filter(|import| {
            INDEX_PACKAGES.contains(&import.name.as_str())
                || GLOSSARY_PACKAGES.contains(&import.name.as_str())
        })
        .flat_map(|import| import.options.into_keys())
        .collect()
}

/// Options of every `\makeindex`, later ones overriding earlier ones.
fn makeindex_options(file_set: &FileSet) -> IndexMap<String, String> {
    let mut options = IndexMap::new();
    for (_, usage) in file_set.commands() {
        if usage.name == "\\makeindex" {
            options.extend(optional_parameter_map(usage.optional_parameters()));
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn programs(text: &str, perl: bool) -> Vec<IndexProgram> {
        let set = FileSet::single("main.tex", text);
        default_index_programs(&set, perl).unwrap().into_iter().collect()
    }

    #[test]
    fn test_no_index() {
        assert!(programs("\\usepackage{amsmath}", true).is_empty());
    }

    #[test]
    fn test_index_package() {
        assert_eq!(
            programs("\\usepackage{makeidx}\n\\makeindex", true),
            vec![IndexProgram::Makeindex]
        );
        assert_eq!(
            programs("\\usepackage[xindy]{imakeidx}", true),
            vec![IndexProgram::Xindy]
        );
    }

    #[test]
    fn test_glossaries_depend_on_perl() {
        assert_eq!(
            programs("\\usepackage{glossaries}", true),
            vec![IndexProgram::Makeglossaries]
        );
        assert_eq!(
            programs("\\usepackage{glossaries}", false),
            vec![IndexProgram::MakeglossariesLite]
        );
    }

    #[test]
    fn test_glossaries_extra_with_record() {
        assert_eq!(
            programs("\\usepackage[xindy,record]{glossaries-extra}", true),
            vec![IndexProgram::Bib2gls]
        );
        assert!(programs("\\usepackage{glossaries-extra}", true).is_empty());
    }

    #[test]
    fn test_makeindex_options_override() {
        assert_eq!(
            programs("\\usepackage{imakeidx}\n\\makeindex[truexindy]", true),
            vec![IndexProgram::Makeindex, IndexProgram::Truexindy]
        );
        assert_eq!(
            programs("\\usepackage{imakeidx}\n\\makeindex[program=texindy]", true),
            vec![IndexProgram::Makeindex, IndexProgram::Xindy]
        );
        assert_eq!(
            programs("\\usepackage[xindy]{imakeidx}\n\\makeindex[makeindex]", true),
            vec![IndexProgram::Xindy, IndexProgram::Makeindex]
        );
    }

    #[test]
    fn test_index_and_glossary() {
        assert_eq!(
            programs("\\usepackage{makeidx}\n\\usepackage{glossaries}", false),
            vec![IndexProgram::Makeindex, IndexProgram::MakeglossariesLite]
        );
    }

    #[test]
    fn test_main_file_missing() {
        assert_eq!(
            default_index_programs(&FileSet::new(), true),
            Err(AnalysisError::MainFileMissing)
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(IndexProgram::MakeglossariesLite.to_string(), "makeglossaries-lite");
        assert_eq!(IndexProgram::Xindy.executable(), "texindy");
        assert_eq!(
            serde_json::to_string(&IndexProgram::MakeglossariesLite).unwrap(),
            "\"makeglossaries-lite\""
        );
    }
}
