use super::*;

#[test]
fn simple_tokens() {
    let source = r#"message Foo . 42 "proto3" { } < > , = ; _bar"#;
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("message")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("Foo")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Dot));
    assert_eq!(lexer.next().unwrap(), Ok(Token::IntLiteral(42)));
    assert_eq!(lexer.next().unwrap(), Ok(Token::StringLiteral("proto3")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::LeftBrace));
    assert_eq!(lexer.next().unwrap(), Ok(Token::RightBrace));
    assert_eq!(lexer.next().unwrap(), Ok(Token::LeftAngleBracket));
    assert_eq!(lexer.next().unwrap(), Ok(Token::RightAngleBracket));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Comma));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Equals));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Semicolon));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("_bar")));
    assert_eq!(lexer.next(), None);

    assert_eq!(lexer.extras.errors, vec![]);
}

#[test]
fn comments_are_skipped() {
    let source = "foo // line comment\nbar /* block\ncomment */ baz";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("foo")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("bar")));
    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("baz")));
    assert_eq!(lexer.next(), None);

    assert_eq!(lexer.extras.errors, vec![]);
}

#[test]
fn unterminated_block_comment() {
    let source = "foo /* never closed";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("foo")));
    assert_eq!(lexer.next(), None);

    assert_eq!(
        lexer.extras.errors,
        vec![ParseErrorKind::UnexpectedEof {
            expected: "comment terminator".to_owned(),
        }]
    );
}

#[test]
fn integer_overflow() {
    let source = "99999999999999999999999999999999999999 4";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next(), Some(Ok(Token::IntLiteral(0))));
    assert_eq!(lexer.next(), Some(Ok(Token::IntLiteral(4))));
    assert_eq!(lexer.next(), None);

    assert_eq!(
        lexer.extras.errors,
        vec![ParseErrorKind::IntegerOutOfRange {
            span: 0..(source.len() - 2),
        }]
    );
}

#[test]
fn invalid_token() {
    let source = "message @";
    let mut lexer = Token::lexer(source);

    assert_eq!(lexer.next().unwrap(), Ok(Token::Ident("message")));
    assert_eq!(lexer.next(), Some(Err(())));
    assert_eq!(lexer.span(), 8..9);
    assert_eq!(lexer.next(), None);
}
