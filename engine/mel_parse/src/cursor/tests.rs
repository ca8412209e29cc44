use super::Cursor;
use mel_ir::{Token, TokenKind, TokenList};
use pretty_assertions::assert_eq;

fn token_list(kinds: &[TokenKind]) -> TokenList {
    let mut tokens = TokenList::new();
    for &kind in kinds {
        tokens.push(Token::dummy(kind));
    }
    tokens.push(Token::dummy(TokenKind::Eof));
    tokens
}

#[test]
fn advance_consumes_in_order() {
    let tokens = token_list(&[TokenKind::Plus, TokenKind::Minus]);
    let mut cursor = Cursor::new(&tokens);
    assert_eq!(cursor.advance().kind, TokenKind::Plus);
    assert_eq!(cursor.advance().kind, TokenKind::Minus);
    assert!(cursor.at_end());
}

#[test]
fn advance_past_eof_stays_at_eof() {
    let tokens = token_list(&[]);
    let mut cursor = Cursor::new(&tokens);
    assert_eq!(cursor.advance().kind, TokenKind::Eof);
    assert_eq!(cursor.advance().kind, TokenKind::Eof);
}

#[test]
fn retreat_rewinds_one_token() {
    let tokens = token_list(&[TokenKind::Comma, TokenKind::Semicolon]);
    let mut cursor = Cursor::new(&tokens);
    assert_eq!(cursor.advance().kind, TokenKind::Comma);
    cursor.retreat();
    assert_eq!(cursor.current_kind(), TokenKind::Comma);
    assert_eq!(cursor.advance().kind, TokenKind::Comma);
    assert_eq!(cursor.advance().kind, TokenKind::Semicolon);
}

#[test]
fn eat_only_consumes_on_match() {
    let tokens = token_list(&[TokenKind::Colon]);
    let mut cursor = Cursor::new(&tokens);
    assert!(!cursor.eat(TokenKind::Comma));
    assert!(cursor.eat(TokenKind::Colon));
    assert!(cursor.at_end());
}

#[test]
fn expect_reports_expected_and_found() {
    let tokens = token_list(&[TokenKind::Comma]);
    let mut cursor = Cursor::new(&tokens);
    let err = cursor
        .expect(TokenKind::Semicolon)
        .map(|_| ())
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("`;`"), "message: {message}");
    assert!(message.contains("`,`"), "message: {message}");
}
