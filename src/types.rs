use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::error::TypeError;

/// The wire-level tag of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Void,
    Bool,
    Byte,
    Double,
    I16,
    I32,
    I64,
    String,
    List,
    Set,
    Map,
    Struct,
    Unknown,
}

impl Protocol {
    pub fn is_coercible(self) -> bool {
        !matches!(
            self,
            Protocol::Void | Protocol::Struct | Protocol::List | Protocol::Set | Protocol::Map
        )
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Protocol::Void => "void",
            Protocol::Bool => "bool",
            Protocol::Byte => "byte",
            Protocol::Double => "double",
            Protocol::I16 => "i16",
            Protocol::I32 => "i32",
            Protocol::I64 => "i64",
            Protocol::String => "string",
            Protocol::List => "list",
            Protocol::Set => "set",
            Protocol::Map => "map",
            Protocol::Struct => "struct",
            Protocol::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
}

impl Primitive {
    pub fn protocol(self) -> Protocol {
        match self {
            Primitive::Bool => Protocol::Bool,
            Primitive::Byte => Protocol::Byte,
            Primitive::I16 => Protocol::I16,
            Primitive::I32 => Protocol::I32,
            Primitive::I64 => Protocol::I64,
            Primitive::Double => Protocol::Double,
            Primitive::String | Primitive::Binary => Protocol::String,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Byte => "byte",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::Double => "double",
            Primitive::String => "string",
            Primitive::Binary => "binary",
        }
    }
}

/// A primitive (or another coerced type) exposed under a different name.
#[derive(Debug, Clone)]
pub struct Coerced {
    pub underlying: Arc<WireType>,
    pub representation: Arc<str>,
}

#[derive(Debug, Clone)]
pub struct Container {
    pub element: Arc<WireType>,
    representation: Arc<str>,
}

#[derive(Debug, Clone)]
pub struct MapType {
    pub key: Arc<WireType>,
    pub value: Arc<WireType>,
    representation: Arc<str>,
}

/// Points at a struct descriptor owned by a [`TypeCatalog`](crate::metadata::TypeCatalog).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructRef {
    pub(crate) index: usize,
    pub(crate) name: Arc<str>,
}

impl StructRef {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A protocol-level type.
///
/// Two values are equal when their [`protocol`](WireType::protocol) and
/// [`representation`](WireType::representation) are equal. Children of
/// containers only take part through the representation, so anything that
/// needs the whole graph has to walk it explicitly.
#[derive(Debug, Clone)]
pub enum WireType {
    /// The "no value" marker used for method return types.
    Void,
    Primitive(Primitive),
    Coerced(Coerced),
    List(Container),
    Set(Container),
    Map(MapType),
    Struct(StructRef),
    /// A type the metadata layer could not map onto the wire protocol.
    Unknown(Arc<str>),
}

impl WireType {
    pub const VOID: WireType = WireType::Void;
    pub const BOOL: WireType = WireType::Primitive(Primitive::Bool);
    pub const BYTE: WireType = WireType::Primitive(Primitive::Byte);
    pub const I16: WireType = WireType::Primitive(Primitive::I16);
    pub const I32: WireType = WireType::Primitive(Primitive::I32);
    pub const I64: WireType = WireType::Primitive(Primitive::I64);
    pub const DOUBLE: WireType = WireType::Primitive(Primitive::Double);
    pub const STRING: WireType = WireType::Primitive(Primitive::String);
    pub const BINARY: WireType = WireType::Primitive(Primitive::Binary);

    pub fn list(element: WireType) -> WireType {
        WireType::List(Container::new("list", element))
    }

    pub fn set(element: WireType) -> WireType {
        WireType::Set(Container::new("set", element))
    }

    pub fn map(key: WireType, value: WireType) -> WireType {
        let representation = format!("map<{}, {}>", key.representation(), value.representation());

        WireType::Map(MapType {
            key: Arc::new(key),
            value: Arc::new(value),
            representation: representation.into(),
        })
    }

    pub fn unknown(name: impl Into<Arc<str>>) -> WireType {
        WireType::Unknown(name.into())
    }

    pub(crate) fn r#struct(index: usize, name: Arc<str>) -> WireType {
        WireType::Struct(StructRef { index, name })
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            WireType::Void => Protocol::Void,
            WireType::Primitive(primitive) => primitive.protocol(),
            WireType::Coerced(coerced) => coerced.underlying.protocol(),
            WireType::List(_) => Protocol::List,
            WireType::Set(_) => Protocol::Set,
            WireType::Map(_) => Protocol::Map,
            WireType::Struct(_) => Protocol::Struct,
            WireType::Unknown(_) => Protocol::Unknown,
        }
    }

    /// The externally visible name of this type, used for identity.
    pub fn representation(&self) -> &str {
        match self {
            WireType::Void => "void",
            WireType::Primitive(primitive) => primitive.keyword(),
            WireType::Coerced(coerced) => &coerced.representation,
            WireType::List(list) => &list.representation,
            WireType::Set(set) => &set.representation,
            WireType::Map(map) => &map.representation,
            WireType::Struct(r#struct) => &r#struct.name,
            WireType::Unknown(name) => name,
        }
    }

    /// How a reference to this type is spelled in IDL. Coerced types use the
    /// keyword of the type they wrap. Unknown types have no spelling.
    pub fn keyword(&self) -> Option<Cow<'_, str>> {
        Some(match self {
            WireType::Void => Cow::Borrowed("void"),
            WireType::Primitive(primitive) => Cow::Borrowed(primitive.keyword()),
            WireType::Coerced(coerced) => return coerced.underlying.keyword(),
            WireType::List(list) => Cow::Owned(format!("list<{}>", list.element.keyword()?)),
            WireType::Set(set) => Cow::Owned(format!("set<{}>", set.element.keyword()?)),
            WireType::Map(map) => Cow::Owned(format!(
                "map<{}, {}>",
                map.key.keyword()?,
                map.value.keyword()?
            )),
            WireType::Struct(r#struct) => Cow::Borrowed(&*r#struct.name),
            WireType::Unknown(_) => return None,
        })
    }

    pub fn is_void(&self) -> bool {
        matches!(self, WireType::Void)
    }

    pub fn is_coerced(&self) -> bool {
        matches!(self, WireType::Coerced(_))
    }

    /// Exposes this type under another representation while keeping its tag.
    pub fn coerce_to(&self, representation: impl Into<Arc<str>>) -> Result<WireType, TypeError> {
        let representation = representation.into();

        if *representation == *self.representation() {
            return Ok(self.clone());
        }

        let protocol = self.protocol();
        if !protocol.is_coercible() {
            return Err(TypeError::UnsupportedCoercion(protocol));
        }

        Ok(WireType::Coerced(Coerced {
            underlying: Arc::new(self.clone()),
            representation,
        }))
    }

    pub fn key(&self) -> Result<&WireType, TypeError> {
        match self {
            WireType::Map(map) => Ok(&map.key),
            _ => Err(self.missing("key")),
        }
    }

    /// The element of a list or set, or the value of a map.
    pub fn value(&self) -> Result<&WireType, TypeError> {
        match self {
            WireType::List(container) | WireType::Set(container) => Ok(&container.element),
            WireType::Map(map) => Ok(&map.value),
            _ => Err(self.missing("value")),
        }
    }

    pub fn struct_ref(&self) -> Result<&StructRef, TypeError> {
        match self {
            WireType::Struct(r#struct) => Ok(r#struct),
            _ => Err(self.missing("struct metadata")),
        }
    }

    pub fn underlying(&self) -> Result<&WireType, TypeError> {
        match self {
            WireType::Coerced(coerced) => Ok(&coerced.underlying),
            _ => Err(self.missing("underlying type")),
        }
    }

    fn missing(&self, attribute: &'static str) -> TypeError {
        TypeError::MissingAttribute {
            protocol: self.protocol(),
            attribute,
        }
    }
}

impl Container {
    fn new(prefix: &str, element: WireType) -> Container {
        let representation = format!("{prefix}<{}>", element.representation());

        Container {
            element: Arc::new(element),
            representation: representation.into(),
        }
    }
}

impl PartialEq for WireType {
    fn eq(&self, other: &Self) -> bool {
        self.protocol() == other.protocol() && self.representation() == other.representation()
    }
}

impl Eq for WireType {}

impl Hash for WireType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.protocol().hash(state);
        self.representation().hash(state);
    }
}

impl Display for WireType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Struct(r#struct) => write!(f, "struct {}", r#struct.name),
            WireType::Coerced(coerced) => {
                write!(f, "{} ({})", coerced.representation, coerced.underlying)
            }
            WireType::Unknown(name) => write!(f, "unknown type '{name}'"),
            other => f.write_str(other.representation()),
        }
    }
}
