use std::collections::{HashMap, hash_map::Entry};

use ariadne::ReportKind;

use crate::{
    ast::{Body, Declaration, Description, Field, Method, TypeExpr},
    metadata::{
        FieldMetadata, MethodMetadata, ParameterMetadata, ResolvedMetadata, ServiceMetadata,
        StructKind, TypeCatalog,
    },
    preprocessing::member_check::{check_members, check_unique},
    reports::{Reports, double_label_report, simple_report},
    syntax::{Span, Spanned},
    types::WireType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Return,
    Value,
}

#[derive(Debug)]
enum Coercion {
    InProgress,
    Done(Option<WireType>),
}

struct Context<'d, 'filename, 'reports> {
    declarations: &'d [Declaration],
    names: HashMap<&'d str, usize>,
    structs: HashMap<usize, WireType>,
    coercions: HashMap<usize, Coercion>,
    catalog: TypeCatalog,
    reports: &'reports mut Reports<'filename>,
    filename: &'filename str,
}

/// Turns declarations into a struct catalog and service metadata.
///
/// Everything that fails to resolve is reported and left out, so the result
/// is only complete when no fatal report was added.
pub fn resolve_names<'filename>(
    description: &Description,
    reports: &mut Reports<'filename>,
    filename: &'filename str,
) -> ResolvedMetadata {
    let declarations = description.declarations.as_slice();
    let mut names: HashMap<&str, usize> = HashMap::new();

    for (index, declaration) in declarations.iter().enumerate() {
        let (name, span) = &declaration.name;

        match names.entry(name.as_str()) {
            Entry::Occupied(entry) => reports.add_fatal(double_label_report(
                format!("the name '{name}' was declared multiple times"),
                format!("the name '{name}' was used again here"),
                *span,
                format!("the name '{name}' was first used here"),
                declarations[*entry.get()].name.1,
                filename,
            )),
            Entry::Vacant(entry) => {
                entry.insert(index);
            }
        }
    }

    let mut context = Context {
        declarations,
        names,
        structs: HashMap::new(),
        coercions: HashMap::new(),
        catalog: TypeCatalog::new(),
        reports,
        filename,
    };

    // Structs are declared up front so fields can refer to any of them,
    // including the struct they belong to.
    for (index, declaration) in context.canonical() {
        let kind = match declaration.body {
            Body::Struct(_) => StructKind::Struct,
            Body::Exception(_) => StructKind::Exception,
            Body::Coerce(_) | Body::Service(_) => continue,
        };

        let (name, span) = &declaration.name;
        match context
            .catalog
            .declare_struct(name.as_str(), kind, declaration.documentation.clone())
        {
            Ok(r#type) => {
                context.structs.insert(index, r#type);
            }
            Err(error) => context.error(error.to_string(), *span),
        }
    }

    let mut services = Vec::new();

    for (index, declaration) in context.canonical() {
        match &declaration.body {
            Body::Struct(fields) | Body::Exception(fields) => {
                context.define_struct(index, &declaration.name, fields);
            }
            Body::Coerce(target) => {
                context.resolve_coercion(index, &declaration.name, target);
            }
            Body::Service(methods) => {
                services.extend(context.resolve_service(declaration, methods));
            }
        }
    }

    ResolvedMetadata {
        catalog: context.catalog,
        services,
    }
}

impl<'d> Context<'d, '_, '_> {
    /// Declarations that own their name; later duplicates have been reported.
    fn canonical(&self) -> Vec<(usize, &'d Declaration)> {
        self.declarations
            .iter()
            .enumerate()
            .filter(|(index, declaration)| {
                self.names.get(declaration.name.0.as_str()) == Some(index)
            })
            .collect()
    }

    fn error(&mut self, message: String, span: Span) {
        self.reports.add_fatal(simple_report(
            ReportKind::Error,
            message,
            span,
            self.filename,
        ));
    }

    fn define_struct(&mut self, index: usize, (name, span): &Spanned<String>, fields: &[Field]) {
        let owner = format!("'{name}'");
        let mut valid = check_members(
            fields.iter().map(|field| (field.id, Some(&field.name))),
            "field",
            &owner,
            self.filename,
            self.reports,
        );

        let mut resolved = Vec::with_capacity(fields.len());
        for field in fields {
            let Some(r#type) = self.resolve_type(&field.r#type, Position::Value) else {
                valid = false;
                continue;
            };

            let metadata = FieldMetadata::new(field.id.0, field.name.0.clone(), r#type);
            resolved.push(match &field.documentation {
                Some(documentation) => metadata.with_documentation(documentation.clone()),
                None => metadata,
            });
        }

        let Some(r#type) = self.structs.get(&index).cloned() else {
            return;
        };
        if valid && let Err(error) = self.catalog.define_fields(&r#type, resolved) {
            self.error(error.to_string(), *span);
        }
    }

    fn resolve_type(
        &mut self,
        (r#type, span): &Spanned<TypeExpr>,
        position: Position,
    ) -> Option<WireType> {
        match r#type {
            TypeExpr::Void if position == Position::Return => Some(WireType::VOID),
            TypeExpr::Void => {
                self.error("void can only be used as a return type".to_string(), *span);
                None
            }
            TypeExpr::Primitive(primitive) => Some(WireType::Primitive(*primitive)),
            TypeExpr::List(element) => self
                .resolve_type(element, Position::Value)
                .map(WireType::list),
            TypeExpr::Set(element) => self
                .resolve_type(element, Position::Value)
                .map(WireType::set),
            TypeExpr::Map(key, value) => {
                let key = self.resolve_type(key, Position::Value);
                let value = self.resolve_type(value, Position::Value);
                Some(WireType::map(key?, value?))
            }
            TypeExpr::Named(name) => {
                let Some(&index) = self.names.get(name.as_str()) else {
                    self.error(format!("there is no type named '{name}'"), *span);
                    return None;
                };

                let declarations = self.declarations;
                let declaration = &declarations[index];

                match &declaration.body {
                    Body::Struct(_) | Body::Exception(_) => self.structs.get(&index).cloned(),
                    Body::Coerce(target) => self.resolve_coercion(index, &declaration.name, target),
                    Body::Service(_) => {
                        self.error(
                            format!("'{name}' is a service and cannot be used as a type"),
                            *span,
                        );
                        None
                    }
                }
            }
        }
    }

    fn resolve_coercion(
        &mut self,
        index: usize,
        (name, span): &Spanned<String>,
        target: &Spanned<TypeExpr>,
    ) -> Option<WireType> {
        match self.coercions.get(&index) {
            Some(Coercion::Done(r#type)) => return r#type.clone(),
            Some(Coercion::InProgress) => {
                self.error(format!("the coerced type '{name}' refers to itself"), *span);
                return None;
            }
            None => {}
        }

        self.coercions.insert(index, Coercion::InProgress);

        let r#type = match self.resolve_type(target, Position::Value) {
            Some(underlying) => match underlying.coerce_to(name.as_str()) {
                Ok(r#type) => Some(r#type),
                Err(error) => {
                    self.error(format!("'{name}' cannot be declared: {error}"), target.1);
                    None
                }
            },
            None => None,
        };

        self.coercions.insert(index, Coercion::Done(r#type.clone()));
        r#type
    }

    fn resolve_service(
        &mut self,
        declaration: &Declaration,
        methods: &[Method],
    ) -> Option<ServiceMetadata> {
        let (name, span) = &declaration.name;

        let mut valid = check_unique(
            methods
                .iter()
                .map(|method| (method.name.0.as_str(), method.name.1)),
            "method",
            self.filename,
            self.reports,
        );

        let mut resolved = Vec::with_capacity(methods.len());
        for method in methods {
            match self.resolve_method(method) {
                Some(method) => resolved.push(method),
                None => valid = false,
            }
        }

        if !valid {
            return None;
        }

        match ServiceMetadata::new(name.clone(), resolved) {
            Ok(service) => Some(match &declaration.documentation {
                Some(documentation) => service.with_documentation(documentation.clone()),
                None => service,
            }),
            Err(error) => {
                self.error(error.to_string(), *span);
                None
            }
        }
    }

    fn resolve_method(&mut self, method: &Method) -> Option<MethodMetadata> {
        let (name, span) = &method.name;
        let owner = format!("method '{name}'");

        let mut valid = check_members(
            method
                .parameters
                .iter()
                .map(|parameter| (parameter.id, Some(&parameter.name))),
            "parameter",
            &owner,
            self.filename,
            self.reports,
        );
        valid &= check_members(
            method.exceptions.iter().map(|throws| (throws.id, None)),
            "exception",
            &owner,
            self.filename,
            self.reports,
        );

        let return_type = self.resolve_type(&method.return_type, Position::Return);

        let mut parameters = Vec::with_capacity(method.parameters.len());
        for parameter in &method.parameters {
            if parameter.documentation.is_some() {
                valid = false;
                self.error("parameters cannot be documented".to_string(), parameter.name.1);
            }

            match self.resolve_type(&parameter.r#type, Position::Value) {
                Some(r#type) => parameters.push(ParameterMetadata::new(
                    parameter.id.0,
                    parameter.name.0.clone(),
                    r#type,
                )),
                None => valid = false,
            }
        }

        let mut exceptions = Vec::with_capacity(method.exceptions.len());
        for throws in &method.exceptions {
            match self.resolve_type(&throws.r#type, Position::Value) {
                Some(r#type) if self.is_exception(&r#type) => exceptions.push((throws, r#type)),
                Some(r#type) => {
                    valid = false;
                    self.error(
                        format!(
                            "'{}' is not an exception and cannot be thrown",
                            r#type.representation()
                        ),
                        throws.r#type.1,
                    );
                }
                None => valid = false,
            }
        }

        if !valid {
            return None;
        }

        let result = MethodMetadata::new(name.clone(), return_type?, parameters).and_then(
            |resolved| {
                exceptions
                    .into_iter()
                    .try_fold(resolved, |resolved, (throws, r#type)| {
                        resolved.with_exception(throws.id.0, r#type, throws.name.clone())
                    })
            },
        );

        match result {
            Ok(resolved) => Some(match &method.documentation {
                Some(documentation) => resolved.with_documentation(documentation.clone()),
                None => resolved,
            }),
            Err(error) => {
                self.error(error.to_string(), *span);
                None
            }
        }
    }

    fn is_exception(&self, r#type: &WireType) -> bool {
        self.catalog
            .struct_metadata(r#type)
            .is_ok_and(|r#struct| r#struct.is_exception())
    }
}
