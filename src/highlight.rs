//! Syntax highlighting collaborator
//!
//! Renders the current code and settings into the HTML code block that the
//! export pipeline later locates and rasterizes. The built-in highlighter is
//! a line-oriented lexical classifier, enough to colour comments, strings,
//! numbers and keywords.

use crate::settings::TabSize;
use crate::themes::{Rgb, ThemeStyle};

/// Class of the element that wraps a rendered code block
pub const CODE_BOX_CLASS: &str = "code-box";

/// Everything a highlighter needs to render one block
#[derive(Debug, Clone)]
pub struct HighlightRequest<'a> {
    pub code: &'a str,
    pub language: &'a str,
    pub theme: &'a ThemeStyle,
    pub show_line_numbers: bool,
    pub tab_size: TabSize,
}

pub trait Highlighter: Send + Sync {
    /// Produce an HTML fragment whose root is a `div.code-box`.
    fn highlight(&self, req: &HighlightRequest<'_>) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Plain,
    Comment,
    String,
    Number,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

static KEYWORDS: &[&str] = &[
    "and", "as", "async", "await", "break", "case", "catch", "class", "const", "continue", "def",
    "default", "defer", "del", "do", "elif", "else", "end", "enum", "except", "export", "extends",
    "false", "False", "finally", "fn", "for", "from", "func", "function", "go", "if", "impl",
    "import", "in", "interface", "is", "lambda", "let", "loop", "match", "mod", "module", "mut",
    "new", "nil", "None", "not", "null", "or", "package", "pass", "pub", "raise", "return",
    "self", "static", "struct", "super", "switch", "this", "throw", "trait", "true", "True",
    "try", "type", "typeof", "use", "val", "var", "void", "where", "while", "with", "yield",
];

fn line_comment_prefix(language: &str) -> Option<&'static str> {
    match language {
        "c" | "cpp" | "csharp" | "dart" | "go" | "java" | "javascript" | "kotlin" | "objectivec"
        | "php" | "rust" | "scala" | "scss" | "swift" | "typescript" => Some("//"),
        "bash" | "shell" | "python" | "ruby" | "perl" | "r" | "yaml" | "makefile" | "dockerfile"
        | "elixir" | "nginx" | "graphql" => Some("#"),
        "sql" | "lua" | "haskell" => Some("--"),
        "clojure" | "ini" => Some(";"),
        "erlang" => Some("%"),
        _ => None,
    }
}

/// Split one line of source into classified tokens.
pub fn tokenize_line<'a>(line: &'a str, language: &str) -> Vec<Token<'a>> {
    if language == "plaintext" {
        return vec![Token { kind: TokenKind::Plain, text: line }];
    }
    let comment = line_comment_prefix(language);
    let mut tokens = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < line.len() {
        let rest = &line[i..];
        let c = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };
        let (kind, len) = if comment.is_some_and(|p| rest.starts_with(p)) {
            (TokenKind::Comment, rest.len())
        } else if c == '"' || c == '\'' || c == '`' {
            (TokenKind::String, string_len(rest, c))
        } else if c.is_ascii_digit() {
            let len = rest
                .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '.' || ch == '_'))
                .unwrap_or(rest.len());
            (TokenKind::Number, len)
        } else if c.is_alphabetic() || c == '_' {
            let len = rest
                .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
                .unwrap_or(rest.len());
            if KEYWORDS.contains(&&rest[..len]) {
                (TokenKind::Keyword, len)
            } else {
                i += len;
                continue;
            }
        } else {
            i += c.len_utf8();
            continue;
        };

        if plain_start < i {
            tokens.push(Token { kind: TokenKind::Plain, text: &line[plain_start..i] });
        }
        tokens.push(Token { kind, text: &rest[..len] });
        i += len;
        plain_start = i;
    }
    if plain_start < line.len() {
        tokens.push(Token { kind: TokenKind::Plain, text: &line[plain_start..] });
    }
    tokens
}

// Length of a quoted string starting at `s`, honouring backslash escapes.
// Unterminated strings run to the end of the line.
fn string_len(s: &str, quote: char) -> usize {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return i + c.len_utf8();
        }
    }
    s.len()
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Built-in HTML highlighter
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlHighlighter;

impl HtmlHighlighter {
    pub fn new() -> Self {
        HtmlHighlighter
    }

    fn color_of(kind: TokenKind, theme: &ThemeStyle) -> Option<Rgb> {
        match kind {
            TokenKind::Plain => None,
            TokenKind::Comment => Some(theme.comment),
            TokenKind::String => Some(theme.string),
            TokenKind::Number => Some(theme.number),
            TokenKind::Keyword => Some(theme.keyword),
        }
    }
}

impl Highlighter for HtmlHighlighter {
    fn highlight(&self, req: &HighlightRequest<'_>) -> String {
        let theme = req.theme;
        let lines: Vec<&str> = req.code.split('\n').map(|l| l.trim_end_matches('\r')).collect();
        let gutter = lines.len().to_string().len();

        let mut html = format!(
            "<div class=\"{}\" data-language=\"{}\" style=\"margin: 1.5rem 0; overflow: hidden; tab-size: {}; background: transparent\">",
            CODE_BOX_CLASS,
            escape_html(req.language),
            req.tab_size.width()
        );
        html.push_str(&format!(
            "<pre style=\"background: {}; color: {}; padding: 0.5em\"><code>",
            theme.background, theme.foreground
        ));
        for (n, line) in lines.iter().enumerate() {
            html.push_str("<span class=\"line\">");
            if req.show_line_numbers {
                html.push_str(&format!(
                    "<span class=\"line-number\" style=\"color: {}\">{:>w$} </span>",
                    theme.line_number,
                    n + 1,
                    w = gutter
                ));
            }
            for tok in tokenize_line(line, req.language) {
                match Self::color_of(tok.kind, theme) {
                    Some(color) => html.push_str(&format!(
                        "<span style=\"color: {}\">{}</span>",
                        color,
                        escape_html(tok.text)
                    )),
                    None => html.push_str(&escape_html(tok.text)),
                }
            }
            html.push_str("</span>\n");
        }
        html.push_str("</code></pre></div>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::ThemeRegistry;

    fn kinds(line: &str, lang: &str) -> Vec<(TokenKind, String)> {
        tokenize_line(line, lang).into_iter().map(|t| (t.kind, t.text.to_string())).collect()
    }

    #[test]
    fn tokenizes_the_default_snippet() {
        assert_eq!(
            kinds("let x = 'cool';", "javascript"),
            vec![
                (TokenKind::Keyword, "let".to_string()),
                (TokenKind::Plain, " x = ".to_string()),
                (TokenKind::String, "'cool'".to_string()),
                (TokenKind::Plain, ";".to_string()),
            ]
        );
    }

    #[test]
    fn comment_prefix_depends_on_language() {
        assert_eq!(kinds("x # y", "python").last().unwrap().0, TokenKind::Comment);
        assert_eq!(kinds("x # y", "javascript").last().unwrap().0, TokenKind::Plain);
    }

    #[test]
    fn escaped_quotes_stay_inside_strings() {
        let toks = kinds(r#""a\"b" 42"#, "rust");
        assert_eq!(toks[0], (TokenKind::String, r#""a\"b""#.to_string()));
        assert_eq!(toks[2], (TokenKind::Number, "42".to_string()));
    }

    #[test]
    fn output_is_escaped_and_numbered() {
        let theme = ThemeRegistry::new().get("github").unwrap();
        let html = HtmlHighlighter::new().highlight(&HighlightRequest {
            code: "a < b\n\n// done",
            language: "javascript",
            theme,
            show_line_numbers: true,
            tab_size: TabSize::Six,
        });
        assert!(html.starts_with("<div class=\"code-box\""));
        assert!(html.contains("tab-size: 6"));
        assert!(html.contains("a &lt; b"));
        assert!(html.contains(">3 </span>"));
        assert!(!html.contains("a < b"));
    }
}
