//! Content type detection and per-type separator presets.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Paragraph, line, sentence, word, then single characters.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", " ", ""];

const MARKDOWN_SEPARATORS: &[&str] = &[
    "\n# ", "\n## ", "\n### ", "\n#### ", "\n```\n", "\n---\n", "\n\n", "\n", ". ", " ", "",
];

const HTML_SEPARATORS: &[&str] = &[
    "<body", "<div", "<p", "<br", "<li", "<h1", "<h2", "<h3", "<table", "<tr", "\n\n", "\n", " ",
    "",
];

/// Content type detected for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentType {
    /// Plain text
    Text,

    /// Markdown document
    Markdown,

    /// Source code
    Code { language: Language },

    /// HTML document
    Html,

    /// Unknown/unsupported format
    Unknown,
}

impl ContentType {
    /// Separator preset for this content type, most specific first.
    /// Every preset ends with the empty separator.
    pub fn separators(&self) -> &'static [&'static str] {
        match self {
            ContentType::Markdown => MARKDOWN_SEPARATORS,
            ContentType::Html => HTML_SEPARATORS,
            ContentType::Code { language } => language.separators(),
            ContentType::Text | ContentType::Unknown => DEFAULT_SEPARATORS,
        }
    }
}

/// Programming language detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    TypeScript,
    JavaScript,
    Python,
    Go,
    C,
    Cpp,
    Java,
    Ruby,
    Php,
    Unknown,
}

impl Language {
    /// Declaration keywords at line starts come before blank lines.
    pub fn separators(&self) -> &'static [&'static str] {
        match self {
            Language::Rust => &[
                "\nfn ", "\npub fn ", "\nimpl ", "\nstruct ", "\nenum ", "\ntrait ", "\nmod ",
                "\nconst ", "\nlet ", "\nif ", "\nwhile ", "\nfor ", "\nloop ", "\nmatch ",
                "\n\n", "\n", " ", "",
            ],
            Language::Python => &["\nclass ", "\ndef ", "\n\tdef ", "\n    def ", "\n\n", "\n", " ", ""],
            Language::JavaScript => &[
                "\nfunction ", "\nconst ", "\nlet ", "\nvar ", "\nclass ", "\nif ", "\nfor ",
                "\nwhile ", "\nswitch ", "\ncase ", "\ndefault ", "\n\n", "\n", " ", "",
            ],
            Language::TypeScript => &[
                "\nenum ", "\ninterface ", "\nnamespace ", "\ntype ", "\nclass ", "\nfunction ",
                "\nconst ", "\nlet ", "\nvar ", "\nif ", "\nfor ", "\nwhile ", "\nswitch ",
                "\ncase ", "\ndefault ", "\n\n", "\n", " ", "",
            ],
            Language::Go => &[
                "\nfunc ", "\nvar ", "\nconst ", "\ntype ", "\nif ", "\nfor ", "\nswitch ",
                "\ncase ", "\n\n", "\n", " ", "",
            ],
            Language::C | Language::Cpp => &[
                "\nclass ", "\nvoid ", "\nint ", "\nfloat ", "\ndouble ", "\nif ", "\nfor ",
                "\nwhile ", "\nswitch ", "\ncase ", "\n\n", "\n", " ", "",
            ],
            Language::Java => &[
                "\nclass ", "\npublic ", "\nprotected ", "\nprivate ", "\nstatic ", "\nif ",
                "\nfor ", "\nwhile ", "\nswitch ", "\ncase ", "\n\n", "\n", " ", "",
            ],
            Language::Ruby => &[
                "\ndef ", "\nclass ", "\nmodule ", "\nif ", "\nunless ", "\nwhile ", "\nfor ",
                "\ndo ", "\nbegin ", "\nrescue ", "\n\n", "\n", " ", "",
            ],
            Language::Php => &[
                "\nfunction ", "\nclass ", "\nif ", "\nforeach ", "\nwhile ", "\ndo ",
                "\nswitch ", "\ncase ", "\n\n", "\n", " ", "",
            ],
            Language::Unknown => DEFAULT_SEPARATORS,
        }
    }
}

/// Detect content type from file path and text content.
pub fn detect_content_type(path: Option<&Path>, text: &str) -> ContentType {
    // 1. Extension-based detection
    if let Some(ext) = path.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
        let code = |language| ContentType::Code { language };
        match ext.to_lowercase().as_str() {
            "rs" => return code(Language::Rust),
            "ts" | "tsx" => return code(Language::TypeScript),
            "js" | "jsx" | "mjs" => return code(Language::JavaScript),
            "py" => return code(Language::Python),
            "go" => return code(Language::Go),
            "c" | "h" => return code(Language::C),
            "cpp" | "cc" | "cxx" | "hpp" => return code(Language::Cpp),
            "java" => return code(Language::Java),
            "rb" => return code(Language::Ruby),
            "php" => return code(Language::Php),
            "md" | "markdown" => return ContentType::Markdown,
            "html" | "htm" => return ContentType::Html,
            "txt" => return ContentType::Text,
            _ => {}
        }
    }

    // 2. Heuristic analysis
    detect_from_content(text)
}

fn detect_from_content(text: &str) -> ContentType {
    let trimmed = text.trim_start();

    if trimmed.is_empty() {
        return ContentType::Unknown;
    }

    let head = trimmed.get(..trimmed.len().min(64)).unwrap_or(trimmed).to_lowercase();
    if head.starts_with("<!doctype html") || head.starts_with("<html") {
        return ContentType::Html;
    }

    if code_line_count(text) >= 2 {
        return ContentType::Code {
            language: detect_language_from_content(text),
        };
    }

    if contains_markdown_patterns(text) {
        return ContentType::Markdown;
    }

    ContentType::Text
}

/// Count lines that open with a declaration keyword.
fn code_line_count(text: &str) -> usize {
    const CODE_PREFIXES: &[&str] = &[
        "fn ", "pub fn ", "impl ", "use ", "func ", "package ", "def ", "class ", "import ",
        "function ", "const ", "let ", "var ", "#include ", "public class ",
    ];

    text.lines()
        .take(200)
        .filter(|line| {
            let line = line.trim_start();
            CODE_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
        })
        .count()
}

fn contains_markdown_patterns(text: &str) -> bool {
    let mut markdown_score = 0;

    for line in text.lines().take(20) {
        let line = line.trim_start();
        // Headers
        if line.starts_with('#') {
            markdown_score += 2;
        }
        // Lists
        if line.starts_with("- ") || line.starts_with("* ") {
            markdown_score += 1;
        }
        // Links
        if line.contains('[') && line.contains("](") {
            markdown_score += 2;
        }
        // Code fences
        if line.starts_with("```") {
            markdown_score += 2;
        }
    }

    markdown_score >= 3
}

fn detect_language_from_content(text: &str) -> Language {
    if text.contains("fn ") && (text.contains("impl ") || text.contains("pub ") || text.contains("let ")) {
        return Language::Rust;
    }

    if text.contains("func ") && text.contains("package ") {
        return Language::Go;
    }

    if text.contains("def ") && (text.contains("import ") || text.contains("self")) {
        return Language::Python;
    }

    if text.contains("interface ") || text.contains(": string") || text.contains(": number") {
        return Language::TypeScript;
    }

    if text.contains("function ") || text.contains("const ") || text.contains("=> {") {
        return Language::JavaScript;
    }

    Language::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_rust_from_extension() {
        let result = detect_content_type(Some(Path::new("lib.rs")), "");
        assert_eq!(result, ContentType::Code { language: Language::Rust });
    }

    #[test]
    fn test_detect_markdown_from_extension() {
        let result = detect_content_type(Some(Path::new("README.MD")), "");
        assert_eq!(result, ContentType::Markdown);
    }

    #[test]
    fn test_detect_markdown_from_content() {
        let text = "# Hello\n\nThis is a [link](url)\n\n- Item 1\n- Item 2";
        assert_eq!(detect_content_type(None, text), ContentType::Markdown);
    }

    #[test]
    fn test_detect_code_from_content() {
        let text = "use std::io;\n\nfn main() {\n    let x = 1;\n}";
        let result = detect_content_type(None, text);
        assert_eq!(result, ContentType::Code { language: Language::Rust });
    }

    #[test]
    fn test_prose_with_keywords_stays_text() {
        let text = "Let me tell you about the class I took. It was fun to use the tools.";
        assert_eq!(detect_content_type(None, text), ContentType::Text);
    }

    #[test]
    fn test_detect_html_from_content() {
        let text = "  <!DOCTYPE html>\n<html><body><p>Hi</p></body></html>";
        assert_eq!(detect_content_type(None, text), ContentType::Html);
    }

    #[test]
    fn test_empty_text_is_unknown() {
        assert_eq!(detect_content_type(None, "   \n"), ContentType::Unknown);
    }

    #[test]
    fn test_every_preset_ends_with_empty_separator() {
        let languages = [
            Language::Rust,
            Language::TypeScript,
            Language::JavaScript,
            Language::Python,
            Language::Go,
            Language::C,
            Language::Cpp,
            Language::Java,
            Language::Ruby,
            Language::Php,
            Language::Unknown,
        ];
        let mut types = vec![
            ContentType::Text,
            ContentType::Markdown,
            ContentType::Html,
            ContentType::Unknown,
        ];
        types.extend(languages.into_iter().map(|language| ContentType::Code { language }));

        for content_type in types {
            assert_eq!(content_type.separators().last(), Some(&""), "{:?}", content_type);
        }
    }

    #[test]
    fn test_content_type_serialization() {
        let json = serde_json::to_value(ContentType::Code {
            language: Language::Python,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "code", "language": "python"}));
    }
}
