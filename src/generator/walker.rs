use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::{
    error::Error,
    metadata::{MethodMetadata, TypeCatalog},
    types::{Protocol, WireType},
};

/// Collects every type reachable from a set of methods, in the order the
/// types were first seen.
pub struct TypeWalker<'a> {
    catalog: &'a TypeCatalog,
    visited: IndexSet<WireType>,
}

impl<'a> TypeWalker<'a> {
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        TypeWalker {
            catalog,
            visited: IndexSet::new(),
        }
    }

    /// Walks the return type, then the exceptions by ascending id, then the parameters.
    pub fn walk_method(&mut self, method: &MethodMetadata) -> Result<(), Error> {
        self.walk_type(method.return_type())?;

        for exception in method.exceptions().values() {
            self.walk_type(&exception.r#type)?;
        }

        for parameter in method.parameters() {
            self.walk_type(&parameter.r#type)?;
        }

        Ok(())
    }

    pub fn walk_type(&mut self, r#type: &WireType) -> Result<(), Error> {
        if r#type.is_void() || !self.visited.insert(r#type.clone()) {
            return Ok(());
        }

        trace!(wire_type = %r#type, "discovered type");

        self.walk_children(r#type).map_err(|error| Error::Walk {
            name: r#type.to_string(),
            source: Box::new(error),
        })
    }

    fn walk_children(&mut self, r#type: &WireType) -> Result<(), Error> {
        match r#type {
            // Coercion keeps the tag, so a coerced unknown is still unknown.
            _ if r#type.protocol() == Protocol::Unknown => {
                Err(Error::Unrepresentable(r#type.to_string()))
            }
            WireType::List(list) => self.walk_type(&list.element),
            WireType::Set(set) => self.walk_type(&set.element),
            WireType::Map(map) => {
                self.walk_type(&map.key)?;
                self.walk_type(&map.value)
            }
            WireType::Struct(r#struct) => {
                let catalog = self.catalog;

                for field in catalog.get(r#struct)?.fields() {
                    self.walk_type(&field.r#type)?;
                }

                Ok(())
            }
            WireType::Void
            | WireType::Primitive(_)
            | WireType::Coerced(_)
            | WireType::Unknown(_) => Ok(()),
        }
    }

    pub fn into_types(self) -> IndexSet<WireType> {
        self.visited
    }
}

/// Computes the reachable type set of `methods`, walked in the given order.
pub fn reachable_types<'m>(
    catalog: &TypeCatalog,
    methods: impl IntoIterator<Item = &'m MethodMetadata>,
) -> Result<IndexSet<WireType>, Error> {
    let mut walker = TypeWalker::new(catalog);

    for method in methods {
        walker.walk_method(method)?;
    }

    let types = walker.into_types();
    debug!(count = types.len(), "collected reachable types");

    Ok(types)
}
