//! Tokenizer for Mel.
//!
//! Converts source text into a flat [`TokenList`]. Hand-written, one pass,
//! scanning raw bytes over a sentinel-terminated buffer.
//!
//! Lexical rules worth calling out:
//!
//! - `/* ... */` block comments nest.
//! - `// ...` line comments run to the next statement terminator `;`
//!   (which is consumed with the comment), **not** to end of line. A
//!   comment reaching end of input ends there.
//! - Two-character operators are matched greedily before single
//!   characters (`<=` before `<`, `+=` before `+`).
//! - `$name` tokenizes as a variable, bare `name` as an identifier, and
//!   `@word` is resolved through a reserved-word alias table (block-form
//!   keywords plus operator aliases such as `@gt` for `>`).
//! - A numeric literal containing `.` tokenizes as a float, otherwise as
//!   an integer.

mod cursor;
mod error;
mod scanner;
mod source_buffer;

pub use error::{LexError, LexErrorKind};
pub use source_buffer::SourceBuffer;

use mel_ir::{Interner, TokenList};

/// Tokenize `source`, interning identifier and string payloads.
///
/// Fails on an unterminated string literal, an unterminated block comment,
/// an unknown `@` word, or any character that starts no valid token.
pub fn tokenize(source: &str, interner: &Interner) -> Result<TokenList, LexError> {
    let buffer = SourceBuffer::new(source);
    scanner::Scanner::new(&buffer, interner).run()
}

#[cfg(test)]
mod proptests;
