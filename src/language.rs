//! Recognized source languages and the extension table.

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A language recognized by file extension.
///
/// Declaration order is the order languages appear in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Cpp,
    Go,
    Ruby,
    Php,
    CSharp,
}

/// Extension (lowercase, without dot) to language.
static LANGUAGE_BY_EXTENSION: phf::Map<&'static str, Language> = phf_map! {
    "py" => Language::Python,
    "js" => Language::JavaScript,
    "jsx" => Language::JavaScript,
    "ts" => Language::TypeScript,
    "tsx" => Language::TypeScript,
    "java" => Language::Java,
    "cpp" => Language::Cpp,
    "cc" => Language::Cpp,
    "cxx" => Language::Cpp,
    "c" => Language::Cpp,
    "h" => Language::Cpp,
    "hpp" => Language::Cpp,
    "go" => Language::Go,
    "rb" => Language::Ruby,
    "php" => Language::Php,
    "cs" => Language::CSharp,
};

impl Language {
    /// All languages in report order.
    pub const ALL: [Language; 9] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::Cpp,
        Language::Go,
        Language::Ruby,
        Language::Php,
        Language::CSharp,
    ];

    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Java => "Java",
            Language::Cpp => "C/C++",
            Language::Go => "Go",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::CSharp => "C#",
        }
    }

    /// File extensions (without dot) that map to this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py"],
            Language::JavaScript => &["js", "jsx"],
            Language::TypeScript => &["ts", "tsx"],
            Language::Java => &["java"],
            Language::Cpp => &["cpp", "cc", "cxx", "c", "h", "hpp"],
            Language::Go => &["go"],
            Language::Ruby => &["rb"],
            Language::Php => &["php"],
            Language::CSharp => &["cs"],
        }
    }

    /// Determine the language from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        LANGUAGE_BY_EXTENSION
            .get(ext.to_ascii_lowercase().as_str())
            .copied()
    }

    /// Determine the language of a path from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Lowercased extension of a path, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Check whether a path has any recognized source extension.
pub fn is_recognized(path: &Path) -> bool {
    Language::from_path(path).is_some()
}
