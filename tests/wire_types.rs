use std::collections::HashSet;

use servidl::{
    Error, TypeError, WireType,
    metadata::{
        FieldMetadata, MethodMetadata, ParameterMetadata, ServiceMetadata, StructKind,
        TypeCatalog,
    },
    types::Protocol,
};

fn point(catalog: &mut TypeCatalog) -> WireType {
    catalog
        .add_struct(
            "Point",
            StructKind::Struct,
            None,
            vec![
                FieldMetadata::new(1, "x", WireType::I32),
                FieldMetadata::new(2, "y", WireType::I32),
            ],
        )
        .unwrap()
}

#[test]
fn coercing_composites_is_rejected() {
    let mut catalog = TypeCatalog::new();
    let point = point(&mut catalog);

    let composites = [
        point,
        WireType::list(WireType::I32),
        WireType::set(WireType::STRING),
        WireType::map(WireType::STRING, WireType::I64),
        WireType::VOID,
    ];

    for r#type in composites {
        let error = r#type.coerce_to("Renamed").unwrap_err();
        assert!(
            matches!(error, TypeError::UnsupportedCoercion(protocol) if protocol == r#type.protocol()),
            "{} was coerced",
            r#type
        );
    }
}

#[test]
fn coercion_keeps_tag_and_keyword() {
    let user_id = WireType::I64.coerce_to("UserId").unwrap();

    assert!(user_id.is_coerced());
    assert_eq!(user_id.protocol(), Protocol::I64);
    assert_eq!(user_id.representation(), "UserId");
    assert_eq!(user_id.keyword().unwrap(), "i64");
    assert_eq!(user_id.underlying().unwrap(), &WireType::I64);
    assert_ne!(user_id, WireType::I64);
}

#[test]
fn coercion_to_same_representation_is_identity() {
    let same = WireType::I32.coerce_to("i32").unwrap();

    assert!(!same.is_coerced());
    assert_eq!(same, WireType::I32);
}

#[test]
fn coerced_types_can_be_coerced_again() {
    let user_id = WireType::I64.coerce_to("UserId").unwrap();
    let admin_id = user_id.coerce_to("AdminId").unwrap();

    assert_eq!(admin_id.protocol(), Protocol::I64);
    assert_eq!(admin_id.keyword().unwrap(), "i64");
    assert_eq!(admin_id.underlying().unwrap(), &user_id);
}

#[test]
fn binary_shares_the_string_tag() {
    assert_eq!(WireType::BINARY.protocol(), Protocol::String);
    assert_eq!(WireType::BINARY.keyword().unwrap(), "binary");
    assert_ne!(WireType::BINARY, WireType::STRING);
}

#[test]
fn equality_uses_tag_and_representation() {
    assert_eq!(
        WireType::map(WireType::STRING, WireType::list(WireType::I32)),
        WireType::map(WireType::STRING, WireType::list(WireType::I32)),
    );
    assert_ne!(WireType::list(WireType::I32), WireType::set(WireType::I32));
    assert_ne!(WireType::list(WireType::I32), WireType::list(WireType::I64));

    let set: HashSet<_> = [
        WireType::list(WireType::I32),
        WireType::list(WireType::I32),
        WireType::I32,
    ]
    .into_iter()
    .collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn container_representations() {
    let mut catalog = TypeCatalog::new();
    let point = point(&mut catalog);
    let r#type = WireType::map(WireType::STRING, WireType::set(point));

    assert_eq!(r#type.representation(), "map<string, set<Point>>");
    assert_eq!(r#type.keyword().unwrap(), "map<string, set<Point>>");
    assert_eq!(r#type.key().unwrap(), &WireType::STRING);
    assert_eq!(r#type.value().unwrap().representation(), "set<Point>");
}

#[test]
fn unknown_types_have_no_keyword() {
    let unknown = WireType::unknown("java.util.Optional");

    assert_eq!(unknown.protocol(), Protocol::Unknown);
    assert!(unknown.keyword().is_none());
    assert!(WireType::list(unknown).keyword().is_none());
}

#[test]
fn accessor_misuse_is_reported() {
    assert!(matches!(
        WireType::I32.key(),
        Err(TypeError::MissingAttribute {
            protocol: Protocol::I32,
            attribute: "key"
        })
    ));
    assert!(matches!(
        WireType::list(WireType::I32).key(),
        Err(TypeError::MissingAttribute {
            protocol: Protocol::List,
            ..
        })
    ));
    assert!(WireType::STRING.value().is_err());
    assert!(WireType::I32.struct_ref().is_err());
    assert!(WireType::I32.underlying().is_err());

    let error = WireType::BOOL.key().unwrap_err();
    assert_eq!(error.to_string(), "bool does not have a key");
}

#[test]
fn structs_are_bound_to_their_catalog() {
    let mut catalog = TypeCatalog::new();
    let point = point(&mut catalog);

    let metadata = catalog.struct_metadata(&point).unwrap();
    assert_eq!(metadata.name(), "Point");
    assert_eq!(metadata.kind(), StructKind::Struct);
    assert_eq!(metadata.fields().len(), 2);

    let other = TypeCatalog::new();
    assert!(matches!(
        other.struct_metadata(&point),
        Err(Error::UnknownStruct(name)) if name == "Point"
    ));
}

#[test]
fn catalog_validates_fields() {
    let mut catalog = TypeCatalog::new();

    let duplicate_id = catalog.add_struct(
        "Pair",
        StructKind::Struct,
        None,
        vec![
            FieldMetadata::new(1, "left", WireType::I32),
            FieldMetadata::new(1, "right", WireType::I32),
        ],
    );
    assert!(matches!(
        duplicate_id,
        Err(Error::DuplicateFieldId { id: 1, .. })
    ));

    let invalid_id = catalog.add_struct(
        "Single",
        StructKind::Struct,
        None,
        vec![FieldMetadata::new(0, "value", WireType::I32)],
    );
    assert!(matches!(invalid_id, Err(Error::InvalidFieldId { id: 0, .. })));

    assert!(matches!(
        catalog.declare_struct("Pair", StructKind::Struct, None),
        Err(Error::DuplicateName { .. })
    ));
}

#[test]
fn methods_validate_parameters() {
    let duplicate_id = MethodMetadata::new(
        "a",
        WireType::VOID,
        vec![
            ParameterMetadata::new(1, "x", WireType::I32),
            ParameterMetadata::new(1, "y", WireType::I32),
        ],
    );
    assert!(matches!(
        duplicate_id,
        Err(Error::DuplicateFieldId { ref owner, id: 1 }) if owner == "method 'a'"
    ));

    let duplicate_name = MethodMetadata::new(
        "a",
        WireType::VOID,
        vec![
            ParameterMetadata::new(1, "x", WireType::I32),
            ParameterMetadata::new(2, "x", WireType::STRING),
        ],
    );
    assert!(matches!(
        duplicate_name,
        Err(Error::DuplicateName { ref name, .. }) if name == "x"
    ));

    let invalid_id = MethodMetadata::new(
        "a",
        WireType::VOID,
        vec![ParameterMetadata::new(0, "x", WireType::I32)],
    );
    assert!(matches!(invalid_id, Err(Error::InvalidFieldId { id: 0, .. })));
}

#[test]
fn services_reject_duplicate_methods() {
    let method = || MethodMetadata::new("a", WireType::VOID, vec![]).unwrap();

    let result = ServiceMetadata::new("S", [method(), method()]);
    assert!(matches!(
        result,
        Err(Error::DuplicateName { ref owner, ref name }) if owner == "service 'S'" && name == "a"
    ));

    let other = MethodMetadata::new("b", WireType::I32, vec![]).unwrap();
    let service = ServiceMetadata::new("S", [method(), other]).unwrap();
    assert_eq!(service.name(), "S");
}

#[test]
fn fields_are_sorted_and_defined_once() {
    let mut catalog = TypeCatalog::new();
    let node = catalog
        .declare_struct("Node", StructKind::Struct, None)
        .unwrap();

    catalog
        .define_fields(
            &node,
            vec![
                FieldMetadata::new(2, "children", WireType::list(node.clone())),
                FieldMetadata::new(1, "value", WireType::STRING),
            ],
        )
        .unwrap();

    let ids: Vec<_> = catalog
        .struct_metadata(&node)
        .unwrap()
        .fields()
        .iter()
        .map(|field| field.id)
        .collect();
    assert_eq!(ids, [1, 2]);

    assert!(matches!(
        catalog.define_fields(&node, Vec::new()),
        Err(Error::AlreadyDefined(name)) if name == "Node"
    ));
}
