//! Embedded-language highlighter backed by tree-sitter's Python grammar.

use anyhow::Result;
use rst_lit_engine::{CodeHighlighter, CodeStyle, LanguageMode, Span};
use tree_sitter::{Node, Parser};

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

pub struct TreeSitterHighlighter {
    parser: Parser,
}

impl TreeSitterHighlighter {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into())?;
        Ok(Self { parser })
    }
}

impl CodeHighlighter for TreeSitterHighlighter {
    fn highlight(
        &mut self,
        source: &str,
        base: usize,
        _mode: LanguageMode,
    ) -> Vec<(Span, CodeStyle)> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        collect_leaves(tree.root_node(), base, &mut out);
        out
    }
}

fn collect_leaves(node: Node<'_>, base: usize, out: &mut Vec<(Span, CodeStyle)>) {
    if node.child_count() == 0 {
        if let Some(style) = style_for(node.kind()) {
            let r = node.byte_range();
            out.push((
                Span {
                    start: base + r.start,
                    end: base + r.end,
                },
                style,
            ));
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_leaves(child, base, out);
    }
}

fn style_for(kind: &str) -> Option<CodeStyle> {
    match kind {
        "identifier" => Some(CodeStyle::Ident),
        "comment" => Some(CodeStyle::Comment),
        "integer" | "float" | "string_start" | "string_content" | "string_end"
        | "escape_sequence" => Some(CodeStyle::Literal),
        _ if KEYWORDS.contains(&kind) => Some(CodeStyle::Keyword),
        _ if kind.bytes().all(|b| b.is_ascii_punctuation()) => {
            if matches!(kind, "(" | ")" | "[" | "]" | "{" | "}" | "," | ":" | ";" | ".") {
                Some(CodeStyle::Punct)
            } else {
                Some(CodeStyle::Operator)
            }
        }
        _ => None,
    }
}
