#[cfg(test)]
mod tests;

use logos::{Lexer, Logos, Span};

use crate::{
    ast,
    error::ParseErrorKind,
    lex::Token,
    MAX_FIELD_NUMBER,
};

pub(crate) fn parse_file(source: &str) -> Result<ast::File, Vec<ParseErrorKind>> {
    let mut parser = Parser::new(source);
    match parser.parse_file() {
        Ok(file) if parser.lexer.extras.errors.is_empty() => Ok(file),
        _ => Err(parser.lexer.extras.errors),
    }
}

struct Parser<'a> {
    lexer: Lexer<'a, Token<'a>>,
    peek: Option<(Token<'a>, Span)>,
    package: Option<Span>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Parser {
            lexer: Token::lexer(source),
            peek: None,
            package: None,
        }
    }

    fn parse_file(&mut self) -> Result<ast::File, ()> {
        if self.bump_if_eq(Token::SYNTAX) {
            self.parse_syntax()?;
        }

        let mut definitions = Vec::new();

        loop {
            match self.peek() {
                Some((Token::Semicolon, _)) => {
                    self.bump();
                    continue;
                }
                Some((Token::PACKAGE, _)) => {
                    if self.parse_package().is_err() {
                        self.skip_until(&[Token::MESSAGE, Token::ENUM]);
                    }
                }
                Some((Token::MESSAGE, _)) => match self.parse_message() {
                    Ok(message) => definitions.push(ast::Definition::Message(message)),
                    Err(()) => self.skip_until(&[Token::MESSAGE, Token::ENUM]),
                },
                Some((Token::ENUM, _)) => match self.parse_enum() {
                    Ok(enum_) => definitions.push(ast::Definition::Enum(enum_)),
                    Err(()) => self.skip_until(&[Token::MESSAGE, Token::ENUM]),
                },
                Some((Token::IMPORT, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "imports",
                        span,
                    });
                    self.skip_until(&[Token::MESSAGE, Token::ENUM]);
                }
                Some((Token::OPTION, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "options",
                        span,
                    });
                    self.skip_until(&[Token::MESSAGE, Token::ENUM]);
                }
                Some((Token::SERVICE, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "service declarations",
                        span,
                    });
                    self.skip_until(&[Token::MESSAGE, Token::ENUM]);
                }
                Some((Token::EXTEND, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "extensions",
                        span,
                    });
                    self.skip_until(&[Token::MESSAGE, Token::ENUM]);
                }
                Some(_) => {
                    self.unexpected_token::<()>("'message', 'enum', 'package' or ';'")
                        .unwrap_err();
                    self.skip_until(&[Token::MESSAGE, Token::ENUM]);
                }
                None => break,
            }
        }

        Ok(ast::File { definitions })
    }

    fn parse_syntax(&mut self) -> Result<(), ()> {
        self.expect_eq(Token::Equals)?;

        match self.peek() {
            Some((Token::StringLiteral(syntax), span)) => {
                if syntax != "proto3" {
                    self.add_error(ParseErrorKind::UnknownSyntax {
                        syntax: syntax.to_owned(),
                        span,
                    });
                }
                self.bump();
            }
            _ => self.unexpected_token("a string literal")?,
        }

        self.expect_eq(Token::Semicolon)
    }

    fn parse_package(&mut self) -> Result<(), ()> {
        let (_, span) = self.bump();

        // The package name has no bearing on generated definition names, but
        // a second declaration is still an error.
        match self.package {
            None => self.package = Some(span.clone()),
            Some(ref first) => self.add_error(ParseErrorKind::DuplicatePackage {
                first: first.clone(),
                second: span,
            }),
        }

        self.parse_full_ident(&[Token::Semicolon])?;
        self.expect_eq(Token::Semicolon)
    }

    fn parse_message(&mut self) -> Result<ast::Message, ()> {
        self.expect_eq(Token::MESSAGE)?;

        let name = self.parse_ident()?;

        let mut message = ast::Message {
            name,
            ..Default::default()
        };

        self.expect_eq(Token::LeftBrace)?;

        loop {
            match self.peek() {
                Some((Token::MESSAGE, _)) => message.messages.push(self.parse_message()?),
                Some((Token::ENUM, _)) => message.enums.push(self.parse_enum()?),
                Some((Token::REPEATED, _)) => {
                    self.bump();
                    let (ty, name, number) = self.parse_field_body()?;
                    message
                        .fields
                        .push(ast::Field::Repeated(ast::RepeatedField { ty, name, number }));
                }
                Some((Token::MAP, _)) => message.fields.push(ast::Field::Map(self.parse_map()?)),
                Some((Token::OPTIONAL | Token::REQUIRED, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "field labels",
                        span,
                    });
                    return Err(());
                }
                Some((Token::ONEOF, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "oneof groups",
                        span,
                    });
                    return Err(());
                }
                Some((Token::OPTION, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "options",
                        span,
                    });
                    return Err(());
                }
                Some((Token::RESERVED, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "reserved ranges",
                        span,
                    });
                    return Err(());
                }
                Some((Token::EXTENSIONS, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "extension ranges",
                        span,
                    });
                    return Err(());
                }
                Some((Token::EXTEND, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "extensions",
                        span,
                    });
                    return Err(());
                }
                Some((Token::GROUP, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "groups",
                        span,
                    });
                    return Err(());
                }
                Some((Token::Ident(_), _)) => {
                    let (ty, name, number) = self.parse_field_body()?;
                    message
                        .fields
                        .push(ast::Field::Singular(ast::SingularField { ty, name, number }));
                }
                Some((Token::Semicolon, _)) => {
                    self.bump();
                    continue;
                }
                Some((Token::RightBrace, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token("a field, message, enum or '}'")?,
            }
        }

        Ok(message)
    }

    fn parse_field_body(&mut self) -> Result<(ast::Ty, String, i32), ()> {
        let ty = self.parse_field_type()?;

        let name = self.parse_ident()?;

        self.expect_eq(Token::Equals)?;

        let number = self.parse_field_number()?;

        match self.peek() {
            Some((Token::LeftBracket, span)) => {
                self.add_error(ParseErrorKind::Unsupported {
                    kind: "field options",
                    span,
                });
                Err(())
            }
            Some((Token::Semicolon, _)) => {
                self.bump();
                Ok((ty, name, number))
            }
            _ => self.unexpected_token("';'")?,
        }
    }

    fn parse_map(&mut self) -> Result<ast::MapField, ()> {
        self.expect_eq(Token::MAP)?;

        self.expect_eq(Token::LeftAngleBracket)?;
        let key_ty = self.parse_key_type()?;
        self.expect_eq(Token::Comma)?;
        let ty = self.parse_field_type()?;
        self.expect_eq(Token::RightAngleBracket)?;

        let name = self.parse_ident()?;

        self.expect_eq(Token::Equals)?;

        let number = self.parse_field_number()?;

        self.expect_eq(Token::Semicolon)?;

        Ok(ast::MapField {
            key_ty,
            ty,
            name,
            number,
        })
    }

    fn parse_enum(&mut self) -> Result<ast::Enum, ()> {
        self.expect_eq(Token::ENUM)?;

        let name = self.parse_ident()?;

        self.expect_eq(Token::LeftBrace)?;

        let mut values = Vec::new();

        loop {
            match self.peek() {
                Some((Token::OPTION, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "options",
                        span,
                    });
                    return Err(());
                }
                Some((Token::RESERVED, span)) => {
                    self.add_error(ParseErrorKind::Unsupported {
                        kind: "reserved ranges",
                        span,
                    });
                    return Err(());
                }
                Some((Token::Ident(_), _)) => values.push(self.parse_enum_value()?),
                Some((Token::Semicolon, _)) => {
                    self.bump();
                    continue;
                }
                Some((Token::RightBrace, _)) => {
                    self.bump();
                    break;
                }
                _ => self.unexpected_token("an identifier, ';' or '}'")?,
            }
        }

        Ok(ast::Enum { name, values })
    }

    fn parse_enum_value(&mut self) -> Result<String, ()> {
        let name = self.parse_ident()?;

        self.expect_eq(Token::Equals)?;

        match self.peek() {
            Some((Token::IntLiteral(value), span)) => {
                self.bump();
                // Value numbers are validated but not retained; only the
                // declaration order matters for the generated schema.
                if value > i32::MAX as u64 {
                    self.add_error(ParseErrorKind::InvalidEnumNumber { span });
                }
            }
            _ => self.unexpected_token("an integer")?,
        }

        self.expect_eq(Token::Semicolon)?;
        Ok(name)
    }

    fn parse_key_type(&mut self) -> Result<ast::KeyTy, ()> {
        let ty = match self.peek() {
            Some((Token::INT32, _)) => ast::KeyTy::Int32,
            Some((Token::INT64, _)) => ast::KeyTy::Int64,
            Some((Token::UINT32, _)) => ast::KeyTy::Uint32,
            Some((Token::UINT64, _)) => ast::KeyTy::Uint64,
            Some((Token::SINT32, _)) => ast::KeyTy::Sint32,
            Some((Token::SINT64, _)) => ast::KeyTy::Sint64,
            Some((Token::FIXED32, _)) => ast::KeyTy::Fixed32,
            Some((Token::FIXED64, _)) => ast::KeyTy::Fixed64,
            Some((Token::SFIXED32, _)) => ast::KeyTy::Sfixed32,
            Some((Token::SFIXED64, _)) => ast::KeyTy::Sfixed64,
            Some((Token::BOOL, _)) => ast::KeyTy::Bool,
            Some((Token::STRING, _)) => ast::KeyTy::String,
            _ => self.unexpected_token("an integer type, 'bool' or 'string'")?,
        };

        self.bump();
        Ok(ty)
    }

    fn parse_field_type(&mut self) -> Result<ast::Ty, ()> {
        let scalar_ty = match self.peek() {
            Some((Token::DOUBLE, _)) => ast::Ty::Double,
            Some((Token::FLOAT, _)) => ast::Ty::Float,
            Some((Token::INT32, _)) => ast::Ty::Int32,
            Some((Token::INT64, _)) => ast::Ty::Int64,
            Some((Token::UINT32, _)) => ast::Ty::Uint32,
            Some((Token::UINT64, _)) => ast::Ty::Uint64,
            Some((Token::SINT32, _)) => ast::Ty::Sint32,
            Some((Token::SINT64, _)) => ast::Ty::Sint64,
            Some((Token::FIXED32, _)) => ast::Ty::Fixed32,
            Some((Token::FIXED64, _)) => ast::Ty::Fixed64,
            Some((Token::SFIXED32, _)) => ast::Ty::Sfixed32,
            Some((Token::SFIXED64, _)) => ast::Ty::Sfixed64,
            Some((Token::BOOL, _)) => ast::Ty::Bool,
            Some((Token::STRING, _)) => ast::Ty::String,
            Some((Token::BYTES, _)) => ast::Ty::Bytes,
            Some((Token::Ident(_), _)) => {
                return Ok(ast::Ty::Named(
                    self.parse_full_ident(&[Token::Ident(Default::default())])?,
                ))
            }
            _ => self.unexpected_token("a field type")?,
        };

        self.bump();
        Ok(scalar_ty)
    }

    fn parse_full_ident(&mut self, terminators: &[Token<'a>]) -> Result<String, ()> {
        let mut result = self.parse_ident()?;

        loop {
            match self.peek() {
                Some((Token::Dot, _)) => {
                    self.bump();
                }
                Some((tok, _))
                    if terminators
                        .iter()
                        .any(|t| std::mem::discriminant(t) == std::mem::discriminant(&tok)) =>
                {
                    return Ok(result);
                }
                _ => self.unexpected_token("'.' or an identifier")?,
            }

            result.push('.');
            result.push_str(&self.parse_ident()?);
        }
    }

    fn parse_ident(&mut self) -> Result<String, ()> {
        match self.peek() {
            Some((Token::Ident(value), _)) => {
                self.bump();
                Ok(value.to_owned())
            }
            _ => self.unexpected_token("an identifier")?,
        }
    }

    fn parse_field_number(&mut self) -> Result<i32, ()> {
        match self.peek() {
            Some((Token::IntLiteral(value), span)) => {
                self.bump();
                if (1..=MAX_FIELD_NUMBER as u64).contains(&value) {
                    Ok(value as i32)
                } else {
                    self.add_error(ParseErrorKind::InvalidMessageNumber { span });
                    Ok(1)
                }
            }
            _ => self.unexpected_token("a positive integer")?,
        }
    }

    fn expect_eq(&mut self, t: Token<'a>) -> Result<(), ()> {
        match self.peek() {
            Some((tok, _)) if tok == t => {
                self.bump();
                Ok(())
            }
            _ => self.unexpected_token(format!("'{}'", t))?,
        }
    }

    fn skip_until(&mut self, tokens: &[Token<'a>]) {
        while self.peek().is_some() && !tokens.contains(&self.peek().unwrap().0) {
            self.bump();
        }
    }

    fn bump_if_eq(&mut self, t: Token<'a>) -> bool {
        match self.peek() {
            Some((tok, _)) if tok == t => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    fn bump(&mut self) -> (Token<'a>, Span) {
        self.peek
            .take()
            .expect("called bump without peek returning Some()")
    }

    fn peek(&mut self) -> Option<(Token<'a>, Span)> {
        if self.peek.is_none() {
            self.peek = self.next();
        }
        self.peek.clone()
    }

    fn next(&mut self) -> Option<(Token<'a>, Span)> {
        debug_assert!(self.peek.is_none());
        loop {
            match self.lexer.next() {
                Some(Ok(tok)) => return Some((tok, self.lexer.span())),
                Some(Err(())) => {
                    self.add_error(ParseErrorKind::InvalidToken {
                        span: self.lexer.span(),
                    });
                    continue;
                }
                None => return None,
            }
        }
    }

    fn unexpected_token<T>(&mut self, expected: impl ToString) -> Result<T, ()> {
        match self.peek() {
            Some((found, span)) => {
                self.add_error(ParseErrorKind::UnexpectedToken {
                    expected: expected.to_string(),
                    found: found.to_string(),
                    span,
                });
                Err(())
            }
            None => {
                self.add_error(ParseErrorKind::UnexpectedEof {
                    expected: expected.to_string(),
                });
                Err(())
            }
        }
    }

    fn add_error(&mut self, err: ParseErrorKind) {
        self.lexer.extras.errors.push(err);
    }
}
