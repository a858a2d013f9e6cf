//! Tests for column type parsing

use super::*;

#[test]
fn test_parse_scalar_types() {
    let cases = [
        ("Int8", ElementKind::Int8),
        ("Int256", ElementKind::Int256),
        ("UInt64", ElementKind::UInt64),
        ("UInt128", ElementKind::UInt128),
        ("Float32", ElementKind::Float32),
        ("String", ElementKind::String),
    ];
    for (type_name, kind) in cases {
        let spec = ColumnSpec::parse("c", type_name).unwrap();
        assert_eq!(spec.kind, kind, "{type_name}");
        assert!(!spec.nullable);
        assert_eq!(spec.column_type().as_str(), type_name);
    }
}

#[test]
fn test_parse_nullable() {
    let spec = ColumnSpec::parse("name", " Nullable( String ) ").unwrap();
    assert_eq!(spec.name, "name");
    assert_eq!(spec.kind, ElementKind::String);
    assert!(spec.nullable);
    assert_eq!(spec.column_type().as_str(), "Nullable(String)");
}

#[test]
fn test_parse_enum8() {
    let spec = ColumnSpec::parse("level", "Enum8('debug' = 1, 'info' = 2, 'error' = -3)").unwrap();
    let ElementKind::Enum(dict) = &spec.kind else {
        panic!("expected enum, got {:?}", spec.kind);
    };
    assert_eq!(dict.width(), EnumWidth::Enum8);
    assert_eq!(dict.code("debug"), Some(1));
    assert_eq!(dict.code("error"), Some(-3));
    assert_eq!(
        spec.column_type().as_str(),
        "Enum8('debug' = 1, 'info' = 2, 'error' = -3)"
    );
}

#[test]
fn test_parse_enum16_with_escapes() {
    let spec = ColumnSpec::parse("e", r"Enum16('it\'s'=1000,'a,b' = 2)").unwrap();
    let ElementKind::Enum(dict) = &spec.kind else {
        panic!("expected enum");
    };
    assert_eq!(dict.width(), EnumWidth::Enum16);
    assert_eq!(dict.code("it's"), Some(1000));
    assert_eq!(dict.code("a,b"), Some(2));
}

#[test]
fn test_rejects_unsupported_types() {
    for type_name in ["DateTime", "LowCardinality(String)", "int32", "", "Array(Int8)"] {
        assert!(
            matches!(
                ColumnSpec::parse("c", type_name),
                Err(SchemaError::UnsupportedType(_))
            ),
            "{type_name:?} should be unsupported"
        );
    }
}

#[test]
fn test_rejects_nullable_enum() {
    assert!(matches!(
        ColumnSpec::parse("c", "Nullable(Enum8('a' = 1))"),
        Err(SchemaError::NullableEnum(_))
    ));
}

#[test]
fn test_rejects_nested_nullable() {
    assert!(matches!(
        ColumnSpec::parse("c", "Nullable(Nullable(Int8))"),
        Err(SchemaError::NestedNullable(_))
    ));
}

#[test]
fn test_rejects_malformed_enums() {
    assert_eq!(ColumnSpec::parse("c", "Enum8()"), Err(SchemaError::EmptyEnum));

    for type_name in [
        "Enum8('a')",
        "Enum8('a' = )",
        "Enum8(a = 1)",
        "Enum8('a' = 1,)",
        "Enum8('a' = 1 'b' = 2)",
        "Enum8('unterminated = 1)",
    ] {
        assert!(
            matches!(
                ColumnSpec::parse("c", type_name),
                Err(SchemaError::MalformedEnumEntry(_))
            ),
            "{type_name} should be malformed"
        );
    }
}

#[test]
fn test_rejects_out_of_range_enum_codes() {
    assert!(matches!(
        ColumnSpec::parse("c", "Enum8('a' = 200)"),
        Err(SchemaError::EnumCodeOutOfRange { code: 200, .. })
    ));
}

#[test]
fn test_element_kind_from_str() {
    let kind: ElementKind = "UInt32".parse().unwrap();
    assert_eq!(kind, ElementKind::UInt32);
    assert_eq!(kind.to_string(), "UInt32");
}
