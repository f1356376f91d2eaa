//! Highlighting language identifiers accepted by the language selector

/// Supported languages, in selector order
pub static LANGUAGES: &[&str] = &[
    "bash", "c", "clojure", "cpp", "csharp", "css", "dart", "diff", "dockerfile", "elixir",
    "erlang", "go", "graphql", "haskell", "ini", "java", "javascript", "json", "kotlin", "lua",
    "makefile", "markdown", "nginx", "objectivec", "ocaml", "perl", "php", "plaintext", "python",
    "r", "ruby", "rust", "scala", "scss", "shell", "sql", "swift", "typescript", "xml", "yaml",
];

pub fn is_supported(name: &str) -> bool {
    LANGUAGES.contains(&name)
}
