use ariadne::Source;
use indoc::indoc;
use servidl::{
    Error, GeneratorConfig, IdlGenerator, MetadataResolver, ResolvedMetadata, SourceResolver,
};

const FILENAME: &str = "test.idl";

/// Resolves `src`, returning the result and every report rendered as text.
fn resolve(src: &str) -> (Result<ResolvedMetadata, Error>, String) {
    let mut resolver = SourceResolver::new(src, FILENAME);
    let result = resolver.resolve();

    let mut cache = (FILENAME, Source::from(src));
    let mut out = Vec::new();
    for report in resolver.reports() {
        report.write(&mut cache, &mut out).unwrap();
    }

    (result, String::from_utf8(out).unwrap())
}

fn assert_rejected(src: &str, message: &str) {
    let (result, reports) = resolve(src);

    assert!(
        matches!(result, Err(Error::Malformed(_))),
        "accepted:\n{src}"
    );
    assert!(
        reports.contains(message),
        "expected '{message}' in:\n{reports}"
    );
}

const GEOMETRY: &str = indoc! {"
    /// A point on a plane
    Point = struct {
        1 x: i32,
        2 y: i32,
    };

    Failure = exception { 1 message: string }; // raised by shift

    UserId = coerce i64;

    /// Geometry operations
    Geometry = service {
        /// Moves a point
        shift: (1 point: Point, 2 by: map<string, i32>) -> Point throws (1: Failure),
        owner: (1 point: Point) -> UserId,
        ping: () -> void,
    };
"};

#[test]
fn resolves_a_description() {
    let (result, reports) = resolve(GEOMETRY);
    let resolved = result.unwrap();

    assert!(reports.is_empty(), "{reports}");
    assert_eq!(resolved.catalog.len(), 2);

    let service = resolved.service(None).unwrap();
    assert_eq!(service.name(), "Geometry");
    assert_eq!(service.documentation(), Some("Geometry operations"));

    let owner = &service.methods()["owner"];
    assert!(owner.return_type().is_coerced());
    assert_eq!(owner.return_type().representation(), "UserId");

    let shift = &service.methods()["shift"];
    assert_eq!(shift.documentation(), Some("Moves a point"));
    assert_eq!(shift.parameters().len(), 2);
    assert_eq!(shift.exceptions()[&1].r#type.representation(), "Failure");
    assert_eq!(shift.exceptions()[&1].name, None);
}

#[test]
fn generates_from_a_description() {
    let (result, _) = resolve(GEOMETRY);
    let resolved = result.unwrap();
    let service = resolved.service(Some("Geometry")).unwrap();
    let generator = IdlGenerator::new(&resolved.catalog, service, GeneratorConfig::new());

    assert_eq!(
        generator.generate_to_string().unwrap(),
        indoc! {"
            /**
             * A point on a plane
             */
            struct Point {
              1: i32 x,
              2: i32 y
            }

            exception Failure {
              1: string message
            }

            /**
             * Geometry operations
             */
            service Geometry {
              i64 owner(1: Point point);
              void ping();

              /**
               * Moves a point
               */
              Point shift(1: Point point, 2: map<string, i32> by) throws (1: Failure e1);
            }
        "}
    );
}

#[test]
fn recursive_structs_resolve() {
    let (result, _) = resolve(indoc! {"
        Node = struct { 1 value: string, 2 children: list<Node> };
        Tree = service { root: () -> Node };
    "});
    let resolved = result.unwrap();
    let service = resolved.service(None).unwrap();
    let generator = IdlGenerator::new(&resolved.catalog, service, GeneratorConfig::new());

    assert_eq!(
        generator.generate_to_string().unwrap(),
        indoc! {"
            struct Node {
              1: string value,
              2: list<Node> children
            }

            service Tree {
              Node root();
            }
        "}
    );
}

#[test]
fn named_exceptions() {
    let (result, _) = resolve(indoc! {"
        Failure = exception {};
        Jobs = service { run: () -> void throws (3 failed: Failure) };
    "});
    let resolved = result.unwrap();
    let run = &resolved.service(None).unwrap().methods()["run"];

    assert_eq!(run.exceptions()[&3].name.as_deref(), Some("failed"));
}

#[test]
fn service_selection() {
    let (result, _) = resolve(indoc! {"
        First = service { a: () -> void };
        Second = service { b: () -> void };
    "});
    let resolved = result.unwrap();

    assert!(matches!(
        resolved.service(None),
        Err(Error::AmbiguousService(names)) if names == ["First", "Second"]
    ));
    assert!(matches!(
        resolved.service(Some("Third")),
        Err(Error::UnknownService(name)) if name == "Third"
    ));
    assert_eq!(resolved.service(Some("Second")).unwrap().name(), "Second");

    let (result, _) = resolve("Point = struct { 1 x: i32 };");
    assert!(matches!(result.unwrap().service(None), Err(Error::NoService)));
}

#[test]
fn duplicate_names() {
    assert_rejected(
        indoc! {"
            Point = struct { 1 x: i32 };
            Point = coerce string;
        "},
        "the name 'Point' was declared multiple times",
    );
}

#[test]
fn unknown_types() {
    assert_rejected(
        "Holder = struct { 1 value: Missing };",
        "there is no type named 'Missing'",
    );
}

#[test]
fn services_are_not_types() {
    assert_rejected(
        indoc! {"
            Svc = service { ping: () -> void };
            Holder = struct { 1 value: list<Svc> };
        "},
        "'Svc' is a service and cannot be used as a type",
    );
}

#[test]
fn duplicate_field_ids() {
    assert_rejected(
        "Pair = struct { 1 left: i32, 1 right: i32 };",
        "the field id #1 was used multiple times in 'Pair'",
    );
}

#[test]
fn duplicate_field_names() {
    assert_rejected(
        "Pair = struct { 1 x: i32, 2 x: i32 };",
        "the field 'x' was declared multiple times",
    );
}

#[test]
fn duplicate_parameter_ids() {
    assert_rejected(
        "Svc = service { f: (1 a: i32, 1 b: i32) -> void };",
        "the parameter id #1 was used multiple times in method 'f'",
    );
}

#[test]
fn duplicate_methods() {
    assert_rejected(
        "Svc = service { ping: () -> void, ping: () -> i32 };",
        "the method 'ping' was declared multiple times",
    );
}

#[test]
fn parameters_cannot_be_documented() {
    assert_rejected(
        indoc! {"
            Svc = service {
                f: (
                    /// the value
                    1 x: i32,
                ) -> void,
            };
        "},
        "parameters cannot be documented",
    );
}

#[test]
fn four_slashes_start_a_comment() {
    let (result, reports) = resolve(indoc! {"
        //// not documentation
        Svc = service { ping: () -> void };////trailing
    "});

    let resolved = result.unwrap();
    assert!(reports.is_empty(), "{reports}");
    assert_eq!(resolved.services[0].documentation(), None);
}

#[test]
fn ids_out_of_range() {
    assert_rejected(
        "Big = struct { 40000 x: i32 };",
        "ids must be between 1 and 32767",
    );
    assert_rejected(
        "Small = struct { 0 x: i32 };",
        "ids must be between 1 and 32767",
    );
}

#[test]
fn void_outside_return_position() {
    assert_rejected(
        "Holder = struct { 1 nothing: void };",
        "void can only be used as a return type",
    );
    assert_rejected(
        "Svc = service { f: (1 a: list<void>) -> void };",
        "void can only be used as a return type",
    );
}

#[test]
fn only_exceptions_can_be_thrown() {
    assert_rejected(
        indoc! {"
            Point = struct { 1 x: i32 };
            Svc = service { f: () -> void throws (1: Point) };
        "},
        "'Point' is not an exception and cannot be thrown",
    );
}

#[test]
fn coercing_structs() {
    assert_rejected(
        indoc! {"
            Point = struct { 1 x: i32 };
            Alias = coerce Point;
        "},
        "'Alias' cannot be declared: coercion is not supported for struct",
    );
    assert_rejected(
        "Ids = coerce list<i64>;",
        "'Ids' cannot be declared: coercion is not supported for list",
    );
}

#[test]
fn coercion_cycles() {
    assert_rejected(
        indoc! {"
            A = coerce B;
            B = coerce A;
        "},
        "the coerced type 'A' refers to itself",
    );
}

#[test]
fn syntax_errors_are_reported() {
    let (result, reports) = resolve("Point = struct { 1 x: i32 }");

    assert!(result.is_err());
    assert!(!reports.is_empty());

    let (result, reports) = resolve(indoc! {"
        Point = struct { 1 x i32 };
        Holder = struct { 1 value: Missing };
    "});

    assert!(result.is_err());
    assert!(reports.contains("there is no type named 'Missing'"), "{reports}");
}

#[test]
fn unused_declarations_are_warned_about() {
    let (result, reports) = resolve(indoc! {"
        UserId = coerce i64;
        AdminId = coerce UserId;
        Orphan = struct { 1 x: i32 };
        Users = service { admin: () -> AdminId };
    "});

    assert!(result.is_ok());
    assert!(
        reports.contains("the struct 'Orphan' is not used by any service"),
        "{reports}"
    );
    assert!(!reports.contains("'UserId'"), "{reports}");
    assert!(!reports.contains("'AdminId'"), "{reports}");
}
