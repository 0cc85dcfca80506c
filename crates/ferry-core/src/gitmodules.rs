//! `.gitmodules` reader.

use std::path::Path;

use crate::error::PackError;

/// One `[submodule "<name>"]` section with both `path` and `url` set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gitmodule {
    pub name: String,
    pub path: String,
    pub url: String,
}

/// Parse `.gitmodules` text.
///
/// Follows git-config rules where they matter here: section and key names are
/// case-insensitive, and an unquoted `#` or `;` starts a comment. Sections
/// missing `path` or `url` are skipped and other keys are ignored. Any other
/// line that is not a header, a `key = value` pair or blank is an error.
pub fn parse_gitmodules(text: &str) -> Result<Vec<Gitmodule>, PackError> {
    let mut modules = Vec::new();
    let mut current: Option<(String, Option<String>, Option<String>)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            let header = line
                .strip_prefix('[')
                .and_then(|l| l.strip_suffix(']'))
                .ok_or_else(|| malformed(idx, raw))?;
            finish(&mut modules, current.take());
            current = Some((section_name(header), None, None));
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| malformed(idx, raw))?;
        let (_, path, url) = current.as_mut().ok_or_else(|| PackError::Gitmodules {
            message: format!("line {}: key outside of a section", idx + 1),
        })?;
        let value = value.trim().trim_matches('"').to_string();
        match key.trim().to_ascii_lowercase().as_str() {
            "path" => *path = Some(value),
            "url" => *url = Some(value),
            _ => {}
        }
    }
    finish(&mut modules, current);
    Ok(modules)
}

/// Read `<worktree>/.gitmodules`; a missing file means no submodules.
pub fn read_gitmodules(worktree: &Path) -> Result<Vec<Gitmodule>, PackError> {
    let file = worktree.join(".gitmodules");
    match std::fs::read_to_string(&file) {
        Ok(text) => parse_gitmodules(&text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(PackError::Io { path: file, source: e }),
    }
}

/// Text before the first `#` or `;` outside double quotes.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            '#' | ';' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

fn section_name(header: &str) -> String {
    // submodule "vendor/lib"; the section keyword is case-insensitive
    let header = header.trim();
    let rest = match header.get(..9) {
        Some(kw) if kw.eq_ignore_ascii_case("submodule") => &header[9..],
        _ => header,
    };
    rest.trim().trim_matches('"').to_string()
}

fn finish(
    modules: &mut Vec<Gitmodule>,
    section: Option<(String, Option<String>, Option<String>)>,
) {
    if let Some((name, Some(path), Some(url))) = section {
        if !path.is_empty() && !url.is_empty() {
            modules.push(Gitmodule { name, path, url });
        }
    }
}

fn malformed(idx: usize, raw: &str) -> PackError {
    PackError::Gitmodules {
        message: format!("line {}: cannot parse '{}'", idx + 1, raw.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_and_skips_incomplete_ones() {
        let text = r#"
# comment
[submodule "vendor/lib"]
	path = vendor/lib
	url = https://git.example.com/team/lib.git
	branch = main
[submodule "docs"]
	path = docs
[submodule "tools"]
	url = ../tools.git
	path = "tools"
"#;
        let modules = parse_gitmodules(text).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name, "vendor/lib");
        assert_eq!(modules[0].url, "https://git.example.com/team/lib.git");
        assert_eq!(modules[1].path, "tools");
        assert_eq!(modules[1].url, "../tools.git");
    }

    #[test]
    fn keys_are_case_insensitive_and_trailing_comments_dropped() {
        let text = r#"
[Submodule "lib"] ; vendored
	Path = vendor/lib
	URL = https://git.example.com/team/lib.git # mirror of upstream
[submodule "quoted"]
	path = quoted
	url = "https://git.example.com/team/a#b.git" ; kept inside quotes
"#;
        let modules = parse_gitmodules(text).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name, "lib");
        assert_eq!(modules[0].path, "vendor/lib");
        assert_eq!(modules[0].url, "https://git.example.com/team/lib.git");
        assert_eq!(modules[1].url, "https://git.example.com/team/a#b.git");
    }

    #[test]
    fn rejects_garbage_lines() {
        let err = parse_gitmodules("[submodule \"a\"]\n  this is not ini\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");

        assert!(parse_gitmodules("path = a\n").is_err());
        assert!(parse_gitmodules("[submodule \"a\"\n").is_err());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_gitmodules(dir.path()).unwrap().is_empty());
    }
}
