use std::borrow::Cow;

use chumsky::{
    IterParser, Parser,
    error::Rich,
    extra,
    input::ValueInput,
    prelude::{any, choice, end, just, recursive, skip_until, via_parser},
    select,
};
use icu_normalizer::ComposingNormalizerBorrowed;

use crate::{
    ast::{Body, Declaration, Description, Field, Method, Throws, TypeExpr},
    syntax::{
        ExtendVec, Span, Spanned,
        tokens::{Group, Keyword, Punct, Token},
    },
    types::Primitive,
};

pub type Error<'tokens> = Rich<'tokens, Token, Span>;

macro_rules! Parser {
    [$type: ty] => {
        impl Parser<'tokens, I, $type, extra::Err<Error<'tokens>>> + Clone
    };
}

pub trait Input<'tokens>: ValueInput<'tokens, Token = Token, Span = Span> {}
impl<'tokens, I: ValueInput<'tokens, Token = Token, Span = Span>> Input<'tokens> for I {}

fn normalize(ident: String) -> String {
    const NORMALIZER: ComposingNormalizerBorrowed<'static> = ComposingNormalizerBorrowed::new_nfc();

    match NORMALIZER.normalize(&ident) {
        Cow::Borrowed(_) => ident,
        Cow::Owned(string) => string,
    }
}

fn ident<'tokens, I: Input<'tokens>>() -> Parser![String] {
    select! {
        Token::Ident(ident) => ident,
    }
    .map(normalize)
    .labelled("identifier")
}

fn spanned_ident<'tokens, I: Input<'tokens>>() -> Parser![Spanned<String>] {
    ident().map_with(|ident, e| (ident, e.span()))
}

fn id<'tokens, I: Input<'tokens>>() -> Parser![Spanned<i16>] {
    select! {
        Token::Number(digits) => digits,
    }
    .validate(|digits, e, emitter| match digits.parse::<i16>() {
        Ok(id) if id >= 1 => (id, e.span()),
        _ => {
            emitter.emit(Rich::custom(
                e.span(),
                format!("ids must be between 1 and {}", i16::MAX),
            ));

            (0, e.span())
        }
    })
    .labelled("id")
}

fn documentation<'tokens, I: Input<'tokens>>() -> Parser![Option<String>] {
    select! {
        Token::Doc(line) => line,
    }
    .repeated()
    .collect::<Vec<_>>()
    .map(|lines| (!lines.is_empty()).then(|| lines.join("\n")))
}

fn keyword<'tokens, I: Input<'tokens>>(keyword: Keyword) -> Parser![Token] {
    just(Token::Keyword(keyword))
}
fn punct<'tokens, I: Input<'tokens>>(punct: Punct) -> Parser![Token] {
    just(Token::Punct(punct))
}
fn left<'tokens, I: Input<'tokens>>(group: Group) -> Parser![Token] {
    just(Token::GroupLeft(group))
}
fn right<'tokens, I: Input<'tokens>>(group: Group) -> Parser![Token] {
    just(Token::GroupRight(group))
}

/// Matches any token or a balanced bracketed expression, but never a
/// semicolon, since those end declarations and are used to synchronize.
fn single_or_group<'tokens, I: Input<'tokens>>() -> Parser![()] {
    recursive(|single_or_group| {
        let single = any()
            .filter(|t| {
                !matches!(
                    t,
                    Token::GroupLeft(_) | Token::GroupRight(_) | Token::Punct(Punct::Semicolon)
                )
            })
            .ignored();

        let groups = [Group::Paren, Group::Angle, Group::Brace].map(|group| {
            single_or_group
                .clone()
                .repeated()
                .delimited_by(left(group), right(group))
        });

        choice((single, choice(groups)))
    })
}

fn type_expr<'tokens, I: Input<'tokens>>() -> Parser![Spanned<TypeExpr>] {
    recursive(|r#type| {
        let primitive = select! {
            Token::Keyword(Keyword::Void) => TypeExpr::Void,
            Token::Keyword(Keyword::Bool) => TypeExpr::Primitive(Primitive::Bool),
            Token::Keyword(Keyword::Byte) => TypeExpr::Primitive(Primitive::Byte),
            Token::Keyword(Keyword::I16) => TypeExpr::Primitive(Primitive::I16),
            Token::Keyword(Keyword::I32) => TypeExpr::Primitive(Primitive::I32),
            Token::Keyword(Keyword::I64) => TypeExpr::Primitive(Primitive::I64),
            Token::Keyword(Keyword::Double) => TypeExpr::Primitive(Primitive::Double),
            Token::Keyword(Keyword::String) => TypeExpr::Primitive(Primitive::String),
            Token::Keyword(Keyword::Binary) => TypeExpr::Primitive(Primitive::Binary),
        };

        let element = r#type
            .clone()
            .delimited_by(left(Group::Angle), right(Group::Angle));

        let list = keyword(Keyword::List)
            .ignore_then(element.clone())
            .map(|element| TypeExpr::List(Box::new(element)));

        let set = keyword(Keyword::Set)
            .ignore_then(element)
            .map(|element| TypeExpr::Set(Box::new(element)));

        let map = keyword(Keyword::Map)
            .ignore_then(
                r#type
                    .clone()
                    .then_ignore(punct(Punct::Comma))
                    .then(r#type)
                    .delimited_by(left(Group::Angle), right(Group::Angle)),
            )
            .map(|(key, value)| TypeExpr::Map(Box::new(key), Box::new(value)));

        let named = ident().map(TypeExpr::Named);

        choice((primitive, list, set, map, named))
            .map_with(|r#type, e| (r#type, e.span()))
            .labelled("type")
    })
}

/// A comma separated list inside `group`. Broken members are skipped up to
/// the next comma or the closing bracket.
fn members<'tokens, I: Input<'tokens>, T>(member: Parser![T], group: Group) -> Parser![Vec<T>] {
    let skip_to_comma = skip_until(
        single_or_group(),
        punct(Punct::Comma).rewind().ignored(),
        || None,
    );
    let skip_to_close = via_parser(
        single_or_group()
            .repeated()
            .at_least(1)
            .then_ignore(right(group).rewind())
            .map(|()| None),
    );

    member
        .map(Some)
        .recover_with(skip_to_comma)
        .recover_with(skip_to_close)
        .separated_by(punct(Punct::Comma))
        .allow_trailing()
        .collect()
        .map(|ExtendVec(inner)| inner)
        .delimited_by(left(group), right(group))
}

fn field<'tokens, I: Input<'tokens>>(r#type: Parser![Spanned<TypeExpr>]) -> Parser![Field] {
    documentation()
        .then(id())
        .then(spanned_ident())
        .then_ignore(punct(Punct::Colon))
        .then(r#type)
        .map(|(((documentation, id), name), r#type)| Field {
            id,
            name,
            r#type,
            documentation,
        })
}

fn method<'tokens, I: Input<'tokens>>(r#type: Parser![Spanned<TypeExpr>]) -> Parser![Method] {
    let exception = id()
        .then(ident().or_not())
        .then_ignore(punct(Punct::Colon))
        .then(r#type.clone())
        .map(|((id, name), r#type)| Throws { id, name, r#type });

    let throws = keyword(Keyword::Throws)
        .ignore_then(members(exception, Group::Paren))
        .or_not()
        .map(Option::unwrap_or_default);

    documentation()
        .then(spanned_ident())
        .then_ignore(punct(Punct::Colon))
        .then(members(field(r#type.clone()), Group::Paren))
        .then_ignore(punct(Punct::Arrow))
        .then(r#type)
        .then(throws)
        .map(
            |((((documentation, name), parameters), return_type), exceptions)| Method {
                name,
                documentation,
                parameters,
                return_type,
                exceptions,
            },
        )
}

pub fn parser<'tokens, I: Input<'tokens>>() -> Parser![Description] {
    let r#type = type_expr();

    let body = choice((
        keyword(Keyword::Struct)
            .ignore_then(members(field(r#type.clone()), Group::Brace))
            .map(Body::Struct),
        keyword(Keyword::Exception)
            .ignore_then(members(field(r#type.clone()), Group::Brace))
            .map(Body::Exception),
        keyword(Keyword::Coerce)
            .ignore_then(r#type.clone())
            .map(Body::Coerce),
        keyword(Keyword::Service)
            .ignore_then(members(method(r#type), Group::Brace))
            .map(Body::Service),
    ));

    let declaration = documentation()
        .then(spanned_ident())
        .then_ignore(punct(Punct::Equals))
        .then(body)
        .then_ignore(punct(Punct::Semicolon))
        .map(|((documentation, name), body)| Declaration {
            name,
            documentation,
            body,
        });

    declaration
        .map(Some)
        .recover_with(skip_until(
            any().ignored(),
            punct(Punct::Semicolon).ignored(),
            || None,
        ))
        .recover_with(via_parser(
            any().repeated().at_least(1).then(end()).to(None),
        ))
        .repeated()
        .collect()
        .map(|ExtendVec(declarations)| Description { declarations })
}
