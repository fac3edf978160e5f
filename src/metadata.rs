use std::{
    collections::{BTreeMap, HashMap, HashSet, hash_map::Entry},
    sync::Arc,
};

use crate::{
    error::Error,
    types::{StructRef, WireType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructKind {
    Struct,
    /// A struct that methods may raise.
    Exception,
}

#[derive(Debug, Clone)]
pub struct FieldMetadata {
    pub id: i16,
    pub name: String,
    pub r#type: WireType,
    pub documentation: Option<String>,
}

impl FieldMetadata {
    pub fn new(id: i16, name: impl Into<String>, r#type: WireType) -> Self {
        FieldMetadata {
            id,
            name: name.into(),
            r#type,
            documentation: None,
        }
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct StructMetadata {
    name: Arc<str>,
    kind: StructKind,
    documentation: Option<String>,
    fields: Vec<FieldMetadata>,
}

impl StructMetadata {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StructKind {
        self.kind
    }

    pub fn is_exception(&self) -> bool {
        self.kind == StructKind::Exception
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Fields ordered by id.
    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }
}

/// Owns every struct descriptor so struct types can refer to each other,
/// including recursively, without reference cycles.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    structs: Vec<Slot>,
    names: HashMap<Arc<str>, usize>,
}

#[derive(Debug)]
struct Slot {
    metadata: StructMetadata,
    defined: bool,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a struct without fields and returns its type, so that fields
    /// referring back to it can be built before [`define_fields`](Self::define_fields).
    pub fn declare_struct(
        &mut self,
        name: impl Into<Arc<str>>,
        kind: StructKind,
        documentation: Option<String>,
    ) -> Result<WireType, Error> {
        let name = name.into();
        let index = self.structs.len();

        match self.names.entry(name.clone()) {
            Entry::Occupied(_) => {
                return Err(Error::DuplicateName {
                    owner: "the type catalog".to_string(),
                    name: name.to_string(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(index);
            }
        }

        self.structs.push(Slot {
            metadata: StructMetadata {
                name: name.clone(),
                kind,
                documentation,
                fields: Vec::new(),
            },
            defined: false,
        });

        Ok(WireType::r#struct(index, name))
    }

    pub fn define_fields(
        &mut self,
        r#type: &WireType,
        mut fields: Vec<FieldMetadata>,
    ) -> Result<(), Error> {
        let index = self.index_of(r#type.struct_ref()?)?;
        let slot = &mut self.structs[index];

        if slot.defined {
            return Err(Error::AlreadyDefined(slot.metadata.name.to_string()));
        }

        let owner = format!("struct '{}'", slot.metadata.name);
        check_members(
            &owner,
            fields.iter().map(|field| (field.id, field.name.as_str())),
        )?;

        fields.sort_by_key(|field| field.id);
        slot.metadata.fields = fields;
        slot.defined = true;

        Ok(())
    }

    pub fn add_struct(
        &mut self,
        name: impl Into<Arc<str>>,
        kind: StructKind,
        documentation: Option<String>,
        fields: Vec<FieldMetadata>,
    ) -> Result<WireType, Error> {
        let r#type = self.declare_struct(name, kind, documentation)?;
        self.define_fields(&r#type, fields)?;
        Ok(r#type)
    }

    pub fn get(&self, r#struct: &StructRef) -> Result<&StructMetadata, Error> {
        let index = self.index_of(r#struct)?;
        Ok(&self.structs[index].metadata)
    }

    /// Resolves the descriptor behind a `STRUCT` type.
    pub fn struct_metadata(&self, r#type: &WireType) -> Result<&StructMetadata, Error> {
        self.get(r#type.struct_ref()?)
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    fn index_of(&self, r#struct: &StructRef) -> Result<usize, Error> {
        match self.structs.get(r#struct.index) {
            Some(slot) if slot.metadata.name == r#struct.name => Ok(r#struct.index),
            _ => Err(Error::UnknownStruct(r#struct.name.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParameterMetadata {
    pub id: i16,
    pub name: String,
    pub r#type: WireType,
}

impl ParameterMetadata {
    pub fn new(id: i16, name: impl Into<String>, r#type: WireType) -> Self {
        ParameterMetadata {
            id,
            name: name.into(),
            r#type,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExceptionMetadata {
    pub r#type: WireType,
    /// Overrides the generated name in the throws clause.
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MethodMetadata {
    name: String,
    documentation: Option<String>,
    return_type: WireType,
    parameters: Vec<ParameterMetadata>,
    exceptions: BTreeMap<i16, ExceptionMetadata>,
}

impl MethodMetadata {
    pub fn new(
        name: impl Into<String>,
        return_type: WireType,
        parameters: Vec<ParameterMetadata>,
    ) -> Result<Self, Error> {
        let name = name.into();

        check_members(
            &format!("method '{name}'"),
            parameters
                .iter()
                .map(|parameter| (parameter.id, parameter.name.as_str())),
        )?;

        Ok(MethodMetadata {
            name,
            documentation: None,
            return_type,
            parameters,
            exceptions: BTreeMap::new(),
        })
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn with_exception(
        mut self,
        id: i16,
        r#type: WireType,
        name: Option<String>,
    ) -> Result<Self, Error> {
        let owner = || format!("the throws clause of method '{}'", self.name);

        if id < 1 {
            return Err(Error::InvalidFieldId { owner: owner(), id });
        }
        if self.exceptions.contains_key(&id) {
            return Err(Error::DuplicateFieldId { owner: owner(), id });
        }

        self.exceptions
            .insert(id, ExceptionMetadata { r#type, name });
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    pub fn return_type(&self) -> &WireType {
        &self.return_type
    }

    pub fn parameters(&self) -> &[ParameterMetadata] {
        &self.parameters
    }

    /// Exceptions keyed by field id, iterated in ascending id order.
    pub fn exceptions(&self) -> &BTreeMap<i16, ExceptionMetadata> {
        &self.exceptions
    }
}

#[derive(Debug, Clone)]
pub struct ServiceMetadata {
    name: String,
    documentation: Option<String>,
    methods: HashMap<String, MethodMetadata>,
}

impl ServiceMetadata {
    pub fn new(
        name: impl Into<String>,
        methods: impl IntoIterator<Item = MethodMetadata>,
    ) -> Result<Self, Error> {
        let name = name.into();
        let mut by_name = HashMap::new();

        for method in methods {
            match by_name.entry(method.name.clone()) {
                Entry::Occupied(entry) => {
                    return Err(Error::DuplicateName {
                        owner: format!("service '{name}'"),
                        name: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(method);
                }
            }
        }

        Ok(ServiceMetadata {
            name,
            documentation: None,
            methods: by_name,
        })
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Methods by name. The iteration order is unspecified.
    pub fn methods(&self) -> &HashMap<String, MethodMetadata> {
        &self.methods
    }
}

/// Everything a resolver produced: the struct catalog and the services using it.
#[derive(Debug, Default)]
pub struct ResolvedMetadata {
    pub catalog: TypeCatalog,
    pub services: Vec<ServiceMetadata>,
}

impl ResolvedMetadata {
    /// Picks a service by name, or the only one when no name is given.
    pub fn service(&self, name: Option<&str>) -> Result<&ServiceMetadata, Error> {
        match (name, self.services.as_slice()) {
            (Some(name), services) => services
                .iter()
                .find(|service| service.name == name)
                .ok_or_else(|| Error::UnknownService(name.to_string())),
            (None, []) => Err(Error::NoService),
            (None, [service]) => Ok(service),
            (None, services) => Err(Error::AmbiguousService(
                services.iter().map(|service| service.name.clone()).collect(),
            )),
        }
    }
}

/// Produces service and struct metadata from some description of a service.
///
/// Implementations decide where metadata comes from; the generator only ever
/// sees the result.
pub trait MetadataResolver {
    type Error;

    fn resolve(&mut self) -> Result<ResolvedMetadata, Self::Error>;
}

fn check_members<'a>(
    owner: &str,
    members: impl Iterator<Item = (i16, &'a str)>,
) -> Result<(), Error> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();

    for (id, name) in members {
        if id < 1 {
            return Err(Error::InvalidFieldId {
                owner: owner.to_string(),
                id,
            });
        }
        if !ids.insert(id) {
            return Err(Error::DuplicateFieldId {
                owner: owner.to_string(),
                id,
            });
        }
        if !names.insert(name) {
            return Err(Error::DuplicateName {
                owner: owner.to_string(),
                name: name.to_string(),
            });
        }
    }

    Ok(())
}
