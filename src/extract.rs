//! Structural snippet extraction: parse a source file with tree-sitter
//! and emit one candidate snippet per function/class definition, in
//! pre-order traversal order.

use anyhow::{anyhow, Result};

use crate::models::CandidateSnippet;

/// Languages with tree-sitter grammar support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Rust,
    JavaScript,
    TypeScript,
    Tsx,
    Unknown,
}

impl Language {
    /// Map a file path to a Language via its extension.
    pub fn from_path(path: &str) -> Self {
        let ext = path.rsplit('.').next().unwrap_or_default().to_lowercase();
        match ext.as_str() {
            "py" => Language::Python,
            "rs" => Language::Rust,
            "js" | "jsx" => Language::JavaScript,
            "ts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            _ => Language::Unknown,
        }
    }

    /// Return the tree-sitter Language for this variant, or None if unsupported.
    fn tree_sitter_language(&self) -> Option<tree_sitter::Language> {
        match self {
            Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
            Language::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
            Language::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
            Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            Language::Tsx => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
            Language::Unknown => None,
        }
    }

    /// Construct label for a node kind that yields a snippet, used in
    /// the generated description.
    fn construct_label(&self, kind: &str) -> Option<&'static str> {
        match (self, kind) {
            (Language::Python, "function_definition") => Some("function"),
            (Language::Python, "class_definition") => Some("class"),
            (Language::Rust, "function_item") => Some("function"),
            (Language::Rust, "struct_item") => Some("struct"),
            (
                Language::JavaScript | Language::TypeScript | Language::Tsx,
                "function_declaration",
            ) => Some("function"),
            (Language::JavaScript | Language::TypeScript | Language::Tsx, "class_declaration") => {
                Some("class")
            }
            _ => None,
        }
    }
}

/// True when the snippet extractor understands the file's language.
pub fn is_supported(path: &str) -> bool {
    Language::from_path(path) != Language::Unknown
}

/// Parse `source` and emit one candidate snippet for every function and
/// class definition, walking the tree in pre-order. Each snippet's text
/// is the exact source span of its node; tags hold the lower-cased
/// identifier; the description names the construct.
///
/// Malformed source is an error the caller is expected to log and skip;
/// one bad file never aborts a whole extraction batch. Snippets are not
/// deduplicated across files.
pub fn extract_snippets(source: &str, file_path: &str) -> Result<Vec<CandidateSnippet>> {
    let language = Language::from_path(file_path);
    let ts_language = language
        .tree_sitter_language()
        .ok_or_else(|| anyhow!("Unsupported language for {file_path}"))?;

    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&ts_language)
        .map_err(|e| anyhow!("Failed to load grammar for {file_path}: {e}"))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow!("Parse failed for {file_path}"))?;

    if tree.root_node().has_error() {
        return Err(anyhow!("Syntax errors in {file_path}"));
    }

    let mut snippets = Vec::new();
    visit(tree.root_node(), source, file_path, language, &mut snippets);
    Ok(snippets)
}

fn visit(
    node: tree_sitter::Node,
    source: &str,
    file_path: &str,
    language: Language,
    out: &mut Vec<CandidateSnippet>,
) {
    if let Some(label) = language.construct_label(node.kind()) {
        let name = node
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(source.as_bytes()).ok());
        if let Some(name) = name {
            out.push(CandidateSnippet {
                text: source[node.byte_range()].to_string(),
                file_path: file_path.to_string(),
                tags: vec![name.to_lowercase()],
                description: format!("A {label} that defines {name}"),
            });
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, source, file_path, language, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path("src/app.py"), Language::Python);
        assert_eq!(Language::from_path("src/main.rs"), Language::Rust);
        assert_eq!(Language::from_path("lib/index.js"), Language::JavaScript);
        assert_eq!(Language::from_path("lib/view.jsx"), Language::JavaScript);
        assert_eq!(Language::from_path("lib/types.ts"), Language::TypeScript);
        assert_eq!(Language::from_path("lib/App.tsx"), Language::Tsx);
        assert_eq!(Language::from_path("README.md"), Language::Unknown);
        assert_eq!(Language::from_path("Makefile"), Language::Unknown);
    }

    #[test]
    fn test_extract_python_function_and_class() {
        let source = r#"def load_data(path):
    return open(path).read()

class VideoProcessor:
    def process(self, frame):
        return frame
"#;
        let snippets = extract_snippets(source, "processor.py").unwrap();
        // load_data, VideoProcessor, and the nested process method.
        assert_eq!(snippets.len(), 3);

        assert_eq!(snippets[0].tags, vec!["load_data"]);
        assert_eq!(snippets[0].description, "A function that defines load_data");
        assert!(snippets[0].text.starts_with("def load_data"));

        assert_eq!(snippets[1].tags, vec!["videoprocessor"]);
        assert_eq!(
            snippets[1].description,
            "A class that defines VideoProcessor"
        );
        assert!(snippets[1].text.contains("def process"));
    }

    #[test]
    fn test_extraction_order_is_traversal_order() {
        let source = "def first(): pass\n\ndef second(): pass\n\ndef third(): pass\n";
        let snippets = extract_snippets(source, "ordered.py").unwrap();
        let names: Vec<&str> = snippets.iter().map(|s| s.tags[0].as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_nested_function_emitted_after_parent() {
        let source = "def outer():\n    def inner():\n        pass\n    return inner\n";
        let snippets = extract_snippets(source, "nested.py").unwrap();
        let names: Vec<&str> = snippets.iter().map(|s| s.tags[0].as_str()).collect();
        assert_eq!(names, vec!["outer", "inner"]);
        // The parent span contains the nested definition verbatim.
        assert!(snippets[0].text.contains("def inner"));
    }

    #[test]
    fn test_extract_rust_constructs() {
        let source = r#"pub struct Parser {
    input: String,
}

fn parse_tokens(input: &str) -> Vec<String> {
    input.split_whitespace().map(String::from).collect()
}
"#;
        let snippets = extract_snippets(source, "parser.rs").unwrap();
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].tags, vec!["parser"]);
        assert_eq!(snippets[0].description, "A struct that defines Parser");
        assert_eq!(snippets[1].tags, vec!["parse_tokens"]);
    }

    #[test]
    fn test_extract_javascript_class() {
        let source = r#"class Chatbot {
    constructor(name) {
        this.name = name;
    }
}

function sendQuery(text) {
    return fetch('/api/search', { body: text });
}
"#;
        let snippets = extract_snippets(source, "chatbot.js").unwrap();
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].description, "A class that defines Chatbot");
        assert_eq!(snippets[1].tags, vec!["sendquery"]);
    }

    #[test]
    fn test_text_is_exact_source_span() {
        let source = "x = 1\n\ndef exact_span(a, b):\n    return a + b\n\ny = 2\n";
        let snippets = extract_snippets(source, "span.py").unwrap();
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].text, "def exact_span(a, b):\n    return a + b");
    }

    #[test]
    fn test_malformed_source_is_an_error() {
        let source = "def broken(:\n    ???\n";
        assert!(extract_snippets(source, "broken.py").is_err());
    }

    #[test]
    fn test_unsupported_language_is_an_error() {
        assert!(extract_snippets("# heading", "README.md").is_err());
    }

    #[test]
    fn test_file_path_recorded_as_provenance() {
        let source = "def tagged(): pass\n";
        let snippets = extract_snippets(source, "pkg/util.py").unwrap();
        assert_eq!(snippets[0].file_path, "pkg/util.py");
    }
}
