use proptest::prelude::*;

use super::*;
use crate::ast::{
    Definition, Enum, Field, File, KeyTy, MapField, Message, RepeatedField, SingularField, Ty,
};

fn singular(ty: Ty, name: &str, number: i32) -> Field {
    Field::Singular(SingularField {
        ty,
        name: name.to_owned(),
        number,
    })
}

#[test]
fn parse_empty_file() {
    assert_eq!(parse_file("").unwrap(), File::default());
    assert_eq!(parse_file("  // comment\n;;").unwrap(), File::default());
}

#[test]
fn parse_message_fields_in_order() {
    let file = parse_file(
        "message MessageA { \
            string x = 1; \
            int32 y = 2; \
            bytes z = 3; \
         }",
    )
    .unwrap();

    assert_eq!(
        file,
        File {
            definitions: vec![Definition::Message(Message {
                name: "MessageA".to_owned(),
                fields: vec![
                    singular(Ty::String, "x", 1),
                    singular(Ty::Int32, "y", 2),
                    singular(Ty::Bytes, "z", 3),
                ],
                ..Default::default()
            })],
        },
    );
}

#[test]
fn parse_repeated_and_map_fields() {
    let file = parse_file(
        "message M { \
            repeated double values = 1; \
            map<string, int32> counter = 2; \
            repeated Other others = 3; \
         }",
    )
    .unwrap();

    assert_eq!(
        file,
        File {
            definitions: vec![Definition::Message(Message {
                name: "M".to_owned(),
                fields: vec![
                    Field::Repeated(RepeatedField {
                        ty: Ty::Double,
                        name: "values".to_owned(),
                        number: 1,
                    }),
                    Field::Map(MapField {
                        key_ty: KeyTy::String,
                        ty: Ty::Int32,
                        name: "counter".to_owned(),
                        number: 2,
                    }),
                    Field::Repeated(RepeatedField {
                        ty: Ty::Named("Other".to_owned()),
                        name: "others".to_owned(),
                        number: 3,
                    }),
                ],
                ..Default::default()
            })],
        },
    );
}

#[test]
fn parse_nested_declarations_grouped_in_order() {
    let file = parse_file(
        "message Outer { \
            Inner first = 1; \
            message Inner { bool ok = 1; } \
            enum Mode { OFF = 0; ON = 1; } \
            Mode mode = 2; \
            message Second {} \
         }",
    )
    .unwrap();

    let Definition::Message(outer) = &file.definitions[0] else {
        panic!("expected a message");
    };
    assert_eq!(
        outer.fields,
        vec![
            singular(Ty::Named("Inner".to_owned()), "first", 1),
            singular(Ty::Named("Mode".to_owned()), "mode", 2),
        ],
    );
    assert_eq!(
        outer.messages.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
        vec!["Inner", "Second"],
    );
    assert_eq!(
        outer.enums,
        vec![Enum {
            name: "Mode".to_owned(),
            values: vec!["OFF".to_owned(), "ON".to_owned()],
        }],
    );
}

#[test]
fn parse_enum_values_in_order() {
    let file = parse_file("enum EnumA { x = 0; y = 1; z = 2; }").unwrap();

    assert_eq!(
        file,
        File {
            definitions: vec![Definition::Enum(Enum {
                name: "EnumA".to_owned(),
                values: vec!["x".to_owned(), "y".to_owned(), "z".to_owned()],
            })],
        },
    );
}

#[test]
fn parse_dotted_type_reference() {
    let file = parse_file("message M { Outer.Inner.Leaf leaf = 1; }").unwrap();

    let Definition::Message(message) = &file.definitions[0] else {
        panic!("expected a message");
    };
    assert_eq!(
        message.fields,
        vec![singular(Ty::Named("Outer.Inner.Leaf".to_owned()), "leaf", 1)],
    );
}

#[test]
fn parse_syntax_and_package_discarded() {
    let file = parse_file(
        "syntax = \"proto3\";\n\
         package com.example.model;\n\
         message M { string s = 1; }",
    )
    .unwrap();

    assert_eq!(file.definitions.len(), 1);
}

#[test]
fn parse_unknown_syntax() {
    let errors = parse_file("syntax = \"proto2\"; message M {}").unwrap_err();
    assert_eq!(
        errors,
        vec![ParseErrorKind::UnknownSyntax {
            syntax: "proto2".to_owned(),
            span: 9..17,
        }],
    );
}

#[test]
fn parse_duplicate_package() {
    let errors = parse_file("package a; package b;").unwrap_err();
    assert_eq!(
        errors,
        vec![ParseErrorKind::DuplicatePackage {
            first: 0..7,
            second: 11..18,
        }],
    );
}

#[test]
fn unsupported_constructs_are_rejected() {
    let cases: &[(&str, &str)] = &[
        ("import \"other.proto\";", "imports"),
        ("option java_package = \"com.example\";", "options"),
        ("service Foo { }", "service declarations"),
        ("extend Foo { }", "extensions"),
        ("message M { oneof choice { string a = 1; } }", "oneof groups"),
        ("message M { option deprecated = true; }", "options"),
        ("message M { reserved 2; }", "reserved ranges"),
        ("message M { extensions 100 to 199; }", "extension ranges"),
        ("message M { optional string s = 1; }", "field labels"),
        ("message M { required string s = 1; }", "field labels"),
        ("message M { group Result = 1 { } }", "groups"),
        ("message M { string s = 1 [deprecated = true]; }", "field options"),
        ("enum E { option allow_alias = true; }", "options"),
    ];

    for (source, kind) in cases {
        let errors = parse_file(source).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|err| matches!(err, ParseErrorKind::Unsupported { kind: k, .. } if k == kind)),
            "expected '{}' to be rejected as unsupported {}, got {:?}",
            source,
            kind,
            errors,
        );
    }
}

#[test]
fn field_number_out_of_range() {
    let errors = parse_file("message M { string s = 0; }").unwrap_err();
    assert_eq!(
        errors,
        vec![ParseErrorKind::InvalidMessageNumber { span: 23..24 }],
    );

    let errors = parse_file("message M { string s = 536870912; }").unwrap_err();
    assert_eq!(
        errors,
        vec![ParseErrorKind::InvalidMessageNumber { span: 23..32 }],
    );
}

#[test]
fn unexpected_token_reports_expectation() {
    let errors = parse_file("message M { string = 1; }").unwrap_err();
    assert_eq!(
        errors,
        vec![ParseErrorKind::UnexpectedToken {
            expected: "an identifier".to_owned(),
            found: "=".to_owned(),
            span: 19..20,
        }],
    );
}

#[test]
fn errors_from_multiple_definitions_are_collected() {
    let errors = parse_file(
        "message A { string s = 0; }\n\
         message B { oneof x { } }",
    )
    .unwrap_err();

    assert_eq!(errors.len(), 2);
}

proptest! {
    #[test]
    fn field_declaration_order_is_preserved(tys in prop::collection::vec(0usize..15, 1..16)) {
        const SCALARS: &[&str] = &[
            "double", "float", "int32", "int64", "uint32", "uint64", "sint32", "sint64",
            "fixed32", "fixed64", "sfixed32", "sfixed64", "bool", "string", "bytes",
        ];

        let mut source = String::from("message M {\n");
        for (i, ty) in tys.iter().enumerate() {
            source.push_str(&format!("    {} f{} = {};\n", SCALARS[*ty], i, i + 1));
        }
        source.push('}');

        let file = parse_file(&source).unwrap();
        let Definition::Message(message) = &file.definitions[0] else {
            panic!("expected a message");
        };

        prop_assert_eq!(message.fields.len(), tys.len());
        for (i, field) in message.fields.iter().enumerate() {
            prop_assert_eq!(field.name(), format!("f{}", i));
            prop_assert_eq!(field.number(), (i + 1) as i32);
        }
    }
}
