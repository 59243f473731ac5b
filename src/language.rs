//! Language tokens and the editor syntax modes they select.
//!
//! The language token travels to the backend verbatim; only the editor mode is
//! derived from it, so unknown tokens fall back to the scripting mode locally.

pub const DEFAULT_LANGUAGE: &str = "python";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntaxMode {
    #[default]
    Python,
    CCpp,
}

impl SyntaxMode {
    pub fn for_language(token: &str) -> Self {
        match token {
            "cpp" => SyntaxMode::CCpp,
            _ => SyntaxMode::Python,
        }
    }

    pub fn mode_id(self) -> &'static str {
        match self {
            SyntaxMode::Python => "ace/mode/python",
            SyntaxMode::CCpp => "ace/mode/c_cpp",
        }
    }

    pub fn all() -> &'static [SyntaxMode] {
        &[SyntaxMode::Python, SyntaxMode::CCpp]
    }
}

/// Options offered by the language picker: `(token, display name)`.
pub fn language_options() -> &'static [(&'static str, &'static str)] {
    &[("python", "Python"), ("cpp", "C++")]
}

/// Guess a language token from a source file name.
pub fn language_for_path(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())?;
    match ext.as_str() {
        "py" => Some("python"),
        "cpp" | "cc" | "cxx" | "hpp" | "h" => Some("cpp"),
        _ => None,
    }
}
