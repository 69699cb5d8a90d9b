use crate::{PackageIndex, PackageMetadata};
use anyhow::{bail, Context};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// \newcommand{\foo}, \renewcommand*\foo, \DeclareRobustCommand{\foo}, \NewDocumentCommand{\foo}
static COMMAND_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\(?:(?:re)?newcommand|providecommand|DeclareRobustCommand|(?:New|Renew|Provide|Declare)DocumentCommand)\*?\s*\{?\s*\\([a-zA-Z@]+)",
    )
    .expect("command definition pattern is valid")
});

// \def\foo, \edef\foo, \gdef\foo, \xdef\foo
static DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\[egx]?def\s*\\([a-zA-Z@]+)").expect("def pattern is valid")
});

static ENVIRONMENT_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:(?:re)?newenvironment|(?:New|Renew|Provide|Declare)DocumentEnvironment)\*?\s*\{([a-zA-Z*]+)\}")
        .expect("environment definition pattern is valid")
});

// \RequirePackage[opts]{a,b}
static REQUIRE_PACKAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\RequirePackage\s*(?:\[[^\]]*\])?\s*\{([^}]*)\}")
        .expect("require package pattern is valid")
});

pub struct PackageScanner {
    tex_root: Option<PathBuf>,
}

impl Default for PackageScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageScanner {
    pub fn new() -> Self {
        Self {
            tex_root: Self::find_tex_root(),
        }
    }

    /// Scans the given directory instead of the detected distribution.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            tex_root: Some(root.into()),
        }
    }

    pub fn tex_root(&self) -> Option<&Path> {
        self.tex_root.as_deref()
    }

    /// Attempts to find the TeX distribution root.
    fn find_tex_root() -> Option<PathBuf> {
        let candidates = [
            "/usr/local/texlive/2025/texmf-dist/tex/latex",
            "/usr/local/texlive/2024/texmf-dist/tex/latex",
            "/usr/local/texlive/2023/texmf-dist/tex/latex",
            "/usr/share/texlive/texmf-dist/tex/latex",
        ];

        for path in candidates {
            let p = Path::new(path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
        }

        // Fallback: try kpsewhich
        if let Ok(output) = std::process::Command::new("kpsewhich")
            .args(["-var-value", "TEXMFDIST"])
            .output()
        {
            if output.status.success() {
                let texmf = String::from_utf8_lossy(&output.stdout).trim().to_string();
                let latex_path = PathBuf::from(&texmf).join("tex/latex");
                if latex_path.exists() {
                    return Some(latex_path);
                }
            }
        }

        None
    }

    /// Indexes every `.sty` file below the TeX root.
    pub fn scan(&self) -> anyhow::Result<PackageIndex> {
        let Some(root) = &self.tex_root else {
            bail!("TeX distribution not found, nothing to scan");
        };
        if !root.is_dir() {
            bail!("TeX root {} is not a directory", root.display());
        }

        log::info!("Scanning packages in: {:?}", root);
        let mut index = PackageIndex::new();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension() != Some(OsStr::new("sty")) {
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            match read_lossy(path) {
                Ok(content) => {
                    index.insert(stem.to_string_lossy().to_string(), parse_content(&content));
                }
                Err(err) => log::warn!("{:#}", err),
            }
        }
        log::info!("Indexed {} packages", index.packages.len());
        Ok(index)
    }
}

/// Style files are not guaranteed to be UTF-8.
fn read_lossy(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Extracts defined commands and environments and required packages from the
/// source of a `.sty` file.
pub fn parse_content(content: &str) -> PackageMetadata {
    let mut metadata = PackageMetadata::default();

    let commands = COMMAND_DEFINITION
        .captures_iter(content)
        .chain(DEF.captures_iter(content))
        .filter_map(|cap| cap.get(1));
    for cmd in commands {
        push_unique(&mut metadata.commands, cmd.as_str());
    }

    for cap in ENVIRONMENT_DEFINITION.captures_iter(content) {
        if let Some(env) = cap.get(1) {
            push_unique(&mut metadata.environments, env.as_str());
        }
    }

    for cap in REQUIRE_PACKAGE.captures_iter(content) {
        let Some(list) = cap.get(1) else { continue };
        for name in list.as_str().split(',').map(str::trim) {
            if !name.is_empty() {
                push_unique(&mut metadata.requires, name);
            }
        }
    }

    metadata
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content() {
        let content = r#"
            \newcommand{\foo}{bar}
            \renewcommand*{\baz}[1]{qux}
            \def\@internal{x}
            \DeclareRobustCommand\robust{y}
            \newenvironment{myenv}{start}{end}
            \newenvironment{starenv*}{start}{end}
            \newcommand{\foo}{again}
        "#;

        let metadata = parse_content(content);

        assert_eq!(metadata.commands, vec!["foo", "baz", "robust", "@internal"]);
        assert_eq!(metadata.environments, vec!["myenv", "starenv*"]);
    }

    #[test]
    fn test_parse_require_package() {
        let content = r"
            \RequirePackage{amsmath}
            \RequirePackage[dvipsnames]{xcolor, graphicx}
            \RequirePackage{amsmath}
        ";
        let metadata = parse_content(content);
        assert_eq!(metadata.requires, vec!["amsmath", "xcolor", "graphicx"]);
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("mypkg");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join("mypkg.sty"),
            "\\RequirePackage{xcolor}\n\\newcommand{\\myhighlight}[1]{#1}\n",
        )
        .unwrap();
        fs::write(nested.join("README.md"), "\\newcommand{\\ignored}{}").unwrap();
        // Latin-1 bytes must not abort the scan.
        fs::write(dir.path().join("latin.sty"), b"\\newcommand{\\caf\xe9}{}\n").unwrap();

        let index = PackageScanner::with_root(dir.path()).scan().unwrap();
        assert_eq!(index.packages.len(), 2);
        let mypkg = index.get("mypkg").unwrap();
        assert_eq!(mypkg.commands, vec!["myhighlight"]);
        assert_eq!(mypkg.requires, vec!["xcolor"]);
        assert_eq!(index.get("latin").unwrap().commands, vec!["caf"]);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let scanner = PackageScanner::with_root("/definitely/not/a/tex/root");
        assert!(scanner.scan().is_err());
    }
}
