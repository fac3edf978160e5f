use std::io::Write;

use indexmap::{IndexMap, IndexSet};

use crate::{
    codegen::SourceWriter,
    error::Error,
    metadata::{MethodMetadata, StructMetadata, TypeCatalog},
    types::WireType,
};

/// Everything a template gets to see.
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    pub name: &'a str,
    pub documentation: Option<&'a str>,
    pub extends: Option<&'a str>,
    pub includes: &'a [String],
    pub namespaces: &'a IndexMap<String, String>,
    /// Sorted by name.
    pub methods: &'a [&'a MethodMetadata],
    /// In discovery order.
    pub types: &'a IndexSet<WireType>,
    pub catalog: &'a TypeCatalog,
}

/// Formats the bindings of one service as IDL text.
pub trait IdlTemplate {
    fn render<W: Write>(&self, out: W, bindings: &Bindings<'_>) -> Result<(), Error>;
}

/// Thrift-style IDL with two-space indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThriftTemplate;

impl IdlTemplate for ThriftTemplate {
    fn render<W: Write>(&self, mut out: W, bindings: &Bindings<'_>) -> Result<(), Error> {
        let mut writer = SourceWriter::with_indent(&mut out, "  ");

        for include in bindings.includes {
            writer.write_fmt_nl(format_args!("include \"{include}\";"))?;
        }
        writer.blank_line();

        for (language, namespace) in bindings.namespaces {
            writer.write_fmt_nl(format_args!("namespace {language} {namespace};"))?;
        }
        writer.blank_line();

        for r#type in bindings.types {
            if let WireType::Struct(r#struct) = r#type {
                emit_struct(&mut writer, bindings.catalog.get(r#struct)?)?;
                writer.blank_line();
            }
        }

        emit_service(&mut writer, bindings)?;
        writer.into_inner().flush()?;

        Ok(())
    }
}

fn emit_struct(
    writer: &mut SourceWriter<impl Write>,
    r#struct: &StructMetadata,
) -> Result<(), Error> {
    if let Some(documentation) = r#struct.documentation() {
        emit_documentation(writer, documentation)?;
    }

    let keyword = if r#struct.is_exception() {
        "exception"
    } else {
        "struct"
    };
    writer.write_fmt_nl(format_args!("{keyword} {} {{", r#struct.name()))?;
    writer.indent();

    let fields = r#struct.fields();
    for (index, field) in fields.iter().enumerate() {
        writer.write_fmt(format_args!("{}: ", field.id))?;
        write_type_name(writer, &field.r#type)?;
        writer.write(" ")?;
        writer.write(&field.name)?;

        if index + 1 < fields.len() {
            writer.write(",")?;
        }
        writer.nl()?;

        if let Some(documentation) = &field.documentation {
            emit_documentation(writer, documentation)?;
        }
    }

    writer.dedent();
    writer.write_nl("}")?;

    Ok(())
}

fn emit_service(
    writer: &mut SourceWriter<impl Write>,
    bindings: &Bindings<'_>,
) -> Result<(), Error> {
    if let Some(documentation) = bindings.documentation {
        emit_documentation(writer, documentation)?;
    }

    writer.write("service ")?;
    writer.write(bindings.name)?;
    if let Some(extends) = bindings.extends {
        writer.write(" extends ")?;
        writer.write(extends)?;
    }
    writer.write_nl(" {")?;
    writer.indent();

    for method in bindings.methods {
        emit_method(writer, method)?;
    }

    writer.dedent();
    writer.write_nl("}")?;

    Ok(())
}

fn emit_method(
    writer: &mut SourceWriter<impl Write>,
    method: &MethodMetadata,
) -> Result<(), Error> {
    if let Some(documentation) = method.documentation() {
        writer.blank_line();
        emit_documentation(writer, documentation)?;
    }

    write_type_name(writer, method.return_type())?;
    writer.write(" ")?;
    writer.write(method.name())?;
    writer.write("(")?;

    for (index, parameter) in method.parameters().iter().enumerate() {
        if index > 0 {
            writer.write(", ")?;
        }

        writer.write_fmt(format_args!("{}: ", parameter.id))?;
        write_type_name(writer, &parameter.r#type)?;
        writer.write(" ")?;
        writer.write(&parameter.name)?;
    }

    writer.write(")")?;

    if !method.exceptions().is_empty() {
        writer.write(" throws (")?;

        for (index, (id, exception)) in method.exceptions().iter().enumerate() {
            if index > 0 {
                writer.write(", ")?;
            }

            writer.write_fmt(format_args!("{id}: "))?;
            write_type_name(writer, &exception.r#type)?;
            match &exception.name {
                Some(name) => writer.write_fmt(format_args!(" {name}"))?,
                None => writer.write_fmt(format_args!(" e{id}"))?,
            }
        }

        writer.write(")")?;
    }

    writer.write_nl(";")?;

    Ok(())
}

fn write_type_name(writer: &mut SourceWriter<impl Write>, r#type: &WireType) -> Result<(), Error> {
    let keyword = r#type
        .keyword()
        .ok_or_else(|| Error::Unrepresentable(r#type.to_string()))?;
    writer.write(&keyword)?;

    Ok(())
}

fn emit_documentation(
    writer: &mut SourceWriter<impl Write>,
    documentation: &str,
) -> Result<(), Error> {
    writer.write_nl("/**")?;

    for line in documentation.lines() {
        let line = line.trim_end().replace("*/", "* /");

        if line.is_empty() {
            writer.write_nl(" *")?;
        } else {
            writer.write_fmt_nl(format_args!(" * {line}"))?;
        }
    }

    writer.write_nl(" */")?;

    Ok(())
}
