//! Canonical formatting of emitted Rust source.
//!
//! Emitted text is parsed with `syn` (which doubles as the syntax check) and
//! printed back with `prettyplease`. A parse failure means the emitter produced
//! invalid code; the error keeps the unformatted text for diagnosis.

use thiserror::Error;

/// Banner prepended to every formatted file. Plain `//` comments do not
/// survive a `syn` round trip, so it is added after formatting.
pub const GENERATED_HEADER: &str = "// Code generated by apigen. DO NOT EDIT.\n";

/// Emitted text is not valid Rust.
#[derive(Debug, Error)]
#[error("generated source is not valid Rust: {source}")]
pub struct FormatError {
    /// The parser error, with its line/column span.
    #[source]
    pub source: syn::Error,
    /// The unformatted text that failed to parse.
    pub text: String,
}

impl FormatError {
    /// Line and column (1-based line, 0-based column) where parsing failed.
    pub fn location(&self) -> (usize, usize) {
        let start = self.source.span().start();
        (start.line, start.column)
    }
}

/// Parses `text` as a Rust file and pretty-prints it with the generated-code
/// banner on top.
pub fn format_rust(text: &str) -> Result<String, FormatError> {
    let file = syn::parse_file(text.trim())
        .map_err(|source| FormatError { source, text: text.to_string() })?;
    Ok(format!("{GENERATED_HEADER}\n{}", prettyplease::unparse(&file)))
}
