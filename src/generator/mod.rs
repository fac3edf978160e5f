use std::io::{self, Write};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info};

use crate::{
    error::Error,
    metadata::{MethodMetadata, ServiceMetadata, TypeCatalog},
    types::WireType,
};

mod template;
mod walker;

pub use template::{Bindings, IdlTemplate, ThriftTemplate};
pub use walker::{TypeWalker, reachable_types};

/// Settings supplied by the caller rather than derived from metadata.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    name: Option<String>,
    extends: Option<String>,
    includes: Vec<String>,
    namespaces: IndexMap<String, String>,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the service name taken from metadata.
    pub fn set_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_extends(mut self, extends: impl Into<String>) -> Self {
        self.extends = Some(extends.into());
        self
    }

    pub fn add_include(mut self, include: impl Into<String>) -> Self {
        self.includes.push(include.into());
        self
    }

    /// Sets the namespace of a language. Setting a language again replaces
    /// its namespace but keeps its original position.
    pub fn add_namespace(
        mut self,
        language: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        self.namespaces.insert(language.into(), namespace.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn extends(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn namespaces(&self) -> &IndexMap<String, String> {
        &self.namespaces
    }
}

/// Generates the IDL of a single service.
///
/// Every call to [`generate`](IdlGenerator::generate) walks the metadata
/// afresh, so one generator can be shared between threads.
#[derive(Debug)]
pub struct IdlGenerator<'a, T = ThriftTemplate> {
    catalog: &'a TypeCatalog,
    service: &'a ServiceMetadata,
    config: GeneratorConfig,
    template: T,
}

impl<'a> IdlGenerator<'a> {
    pub fn new(
        catalog: &'a TypeCatalog,
        service: &'a ServiceMetadata,
        config: GeneratorConfig,
    ) -> Self {
        Self::with_template(catalog, service, config, ThriftTemplate)
    }
}

impl<'a, T: IdlTemplate> IdlGenerator<'a, T> {
    pub fn with_template(
        catalog: &'a TypeCatalog,
        service: &'a ServiceMetadata,
        config: GeneratorConfig,
        template: T,
    ) -> Self {
        IdlGenerator {
            catalog,
            service,
            config,
            template,
        }
    }

    /// The name the service is rendered under.
    pub fn name(&self) -> &str {
        self.config.name().unwrap_or(self.service.name())
    }

    /// Methods sorted by name, since metadata does not order them.
    pub fn methods(&self) -> Vec<&'a MethodMetadata> {
        let mut methods: Vec<_> = self.service.methods().values().collect();
        methods.sort_by(|left, right| left.name().cmp(right.name()));
        methods
    }

    /// Types reachable from the sorted methods, in discovery order.
    pub fn types(&self) -> Result<IndexSet<WireType>, Error> {
        reachable_types(self.catalog, self.methods())
    }

    /// Renders the whole document before anything reaches `out`, so a failed
    /// run never leaves partial IDL behind.
    pub fn generate<W: Write>(&self, mut out: W) -> Result<(), Error> {
        let buffer = self.render()?;
        out.write_all(&buffer)?;
        out.flush()?;
        Ok(())
    }

    pub fn generate_to_string(&self) -> Result<String, Error> {
        let buffer = self.render()?;
        String::from_utf8(buffer)
            .map_err(|error| Error::Render(io::Error::new(io::ErrorKind::InvalidData, error)))
    }

    fn render(&self) -> Result<Vec<u8>, Error> {
        let methods = self.methods();
        let types = reachable_types(self.catalog, methods.iter().copied())?;

        let bindings = Bindings {
            name: self.name(),
            documentation: self.service.documentation(),
            extends: self.config.extends(),
            includes: self.config.includes(),
            namespaces: self.config.namespaces(),
            methods: &methods,
            types: &types,
            catalog: self.catalog,
        };

        debug!(
            service = bindings.name,
            methods = methods.len(),
            types = types.len(),
            "rendering service"
        );

        let mut buffer = Vec::new();
        self.template.render(&mut buffer, &bindings)?;

        info!(service = bindings.name, bytes = buffer.len(), "generated IDL");

        Ok(buffer)
    }
}
