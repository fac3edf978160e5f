use crate::{syntax::Spanned, types::Primitive};

/// A parsed description file, before any names are resolved.
#[derive(Debug, Clone)]
pub struct Description {
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: Spanned<String>,
    pub documentation: Option<String>,
    pub body: Body,
}

#[derive(Debug, Clone)]
pub enum Body {
    Struct(Vec<Field>),
    Exception(Vec<Field>),
    Coerce(Spanned<TypeExpr>),
    Service(Vec<Method>),
}

impl Body {
    pub fn kind(&self) -> &'static str {
        match self {
            Body::Struct(_) => "struct",
            Body::Exception(_) => "exception",
            Body::Coerce(_) => "coerced type",
            Body::Service(_) => "service",
        }
    }
}

/// A struct field or a method parameter.
#[derive(Debug, Clone)]
pub struct Field {
    pub id: Spanned<i16>,
    pub name: Spanned<String>,
    pub r#type: Spanned<TypeExpr>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: Spanned<String>,
    pub documentation: Option<String>,
    pub parameters: Vec<Field>,
    pub return_type: Spanned<TypeExpr>,
    pub exceptions: Vec<Throws>,
}

#[derive(Debug, Clone)]
pub struct Throws {
    pub id: Spanned<i16>,
    pub name: Option<String>,
    pub r#type: Spanned<TypeExpr>,
}

#[derive(Debug, Clone)]
pub enum TypeExpr {
    Void,
    Primitive(Primitive),
    List(Box<Spanned<TypeExpr>>),
    Set(Box<Spanned<TypeExpr>>),
    Map(Box<Spanned<TypeExpr>>, Box<Spanned<TypeExpr>>),
    Named(String),
}
