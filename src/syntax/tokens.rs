use std::fmt::{self, Display, Formatter, Write};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Token {
    Ident(String),
    Number(String),
    /// A single `///` line, without the marker.
    Doc(String),

    GroupLeft(Group),
    GroupRight(Group),

    Punct(Punct),
    Keyword(Keyword),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Group {
    Paren,
    Angle,
    Brace,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Punct {
    Equals,
    Colon,
    Comma,
    Semicolon,
    Arrow,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Keyword {
    Struct,
    Exception,
    Service,
    Coerce,
    Throws,
    Void,
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    List,
    Set,
    Map,
}

impl Keyword {
    pub fn from_ident(ident: &str) -> Option<Keyword> {
        Some(match ident {
            "struct" => Keyword::Struct,
            "exception" => Keyword::Exception,
            "service" => Keyword::Service,
            "coerce" => Keyword::Coerce,
            "throws" => Keyword::Throws,
            "void" => Keyword::Void,
            "bool" => Keyword::Bool,
            "byte" => Keyword::Byte,
            "i16" => Keyword::I16,
            "i32" => Keyword::I32,
            "i64" => Keyword::I64,
            "double" => Keyword::Double,
            "string" => Keyword::String,
            "binary" => Keyword::Binary,
            "list" => Keyword::List,
            "set" => Keyword::Set,
            "map" => Keyword::Map,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Struct => "struct",
            Keyword::Exception => "exception",
            Keyword::Service => "service",
            Keyword::Coerce => "coerce",
            Keyword::Throws => "throws",
            Keyword::Void => "void",
            Keyword::Bool => "bool",
            Keyword::Byte => "byte",
            Keyword::I16 => "i16",
            Keyword::I32 => "i32",
            Keyword::I64 => "i64",
            Keyword::Double => "double",
            Keyword::String => "string",
            Keyword::Binary => "binary",
            Keyword::List => "list",
            Keyword::Set => "set",
            Keyword::Map => "map",
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(ident) | Token::Number(ident) => f.write_str(ident),
            Token::Doc(_) => f.write_str("documentation comment"),
            Token::GroupLeft(Group::Paren) => f.write_char('('),
            Token::GroupLeft(Group::Angle) => f.write_char('<'),
            Token::GroupLeft(Group::Brace) => f.write_char('{'),
            Token::GroupRight(Group::Paren) => f.write_char(')'),
            Token::GroupRight(Group::Angle) => f.write_char('>'),
            Token::GroupRight(Group::Brace) => f.write_char('}'),
            Token::Punct(Punct::Equals) => f.write_char('='),
            Token::Punct(Punct::Colon) => f.write_char(':'),
            Token::Punct(Punct::Comma) => f.write_char(','),
            Token::Punct(Punct::Semicolon) => f.write_char(';'),
            Token::Punct(Punct::Arrow) => f.write_str("->"),
            Token::Keyword(keyword) => f.write_str(keyword.as_str()),
        }
    }
}
