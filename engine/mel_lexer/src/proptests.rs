//! Property tests: tokenizing arbitrary input must never panic, and
//! accepted token streams must be well-formed.

use crate::tokenize;
use mel_ir::{Interner, TokenKind};
use proptest::prelude::*;

proptest! {
    #[test]
    fn tokenize_never_panics(source in "\\PC*") {
        let interner = Interner::new();
        let _ = tokenize(&source, &interner);
    }

    #[test]
    fn accepted_streams_end_with_eof(source in "[a-z0-9 $@+*/;.()<>=!{}']*") {
        let interner = Interner::new();
        if let Ok(tokens) = tokenize(&source, &interner) {
            prop_assert!(!tokens.is_empty());
            prop_assert_eq!(tokens[tokens.len() - 1].kind, TokenKind::Eof);
        }
    }
}
