use chumsky::{
    IterParser, Parser,
    error::Rich,
    extra,
    prelude::{any, choice, just, none_of, via_parser},
    text::{digits, ident, whitespace},
};

use crate::syntax::{
    ExtendVec, Span, Spanned,
    tokens::{Group, Keyword, Punct, Token},
};

pub type Error<'src> = Rich<'src, char, Span>;

pub fn lexer<'src>() -> impl Parser<'src, &'src str, Vec<Spanned<Token>>, extra::Err<Error<'src>>>
{
    let ident_like = ident().map(|s: &str| match Keyword::from_ident(s) {
        Some(keyword) => Token::Keyword(keyword),
        None => Token::Ident(s.to_owned()),
    });

    let number = digits(10).to_slice().map(|s: &str| Token::Number(s.to_owned()));

    let doc = just("///")
        .then(just('/').not())
        .ignore_then(none_of("\r\n").repeated().to_slice())
        .map(|line: &str| {
            let line = line.strip_prefix(' ').unwrap_or(line);
            Token::Doc(line.trim_end().to_owned())
        });

    let punct_or_group = choice([
        just("->").to(Token::Punct(Punct::Arrow)),
        just("=").to(Token::Punct(Punct::Equals)),
        just(":").to(Token::Punct(Punct::Colon)),
        just(",").to(Token::Punct(Punct::Comma)),
        just(";").to(Token::Punct(Punct::Semicolon)),
        just("(").to(Token::GroupLeft(Group::Paren)),
        just(")").to(Token::GroupRight(Group::Paren)),
        just("<").to(Token::GroupLeft(Group::Angle)),
        just(">").to(Token::GroupRight(Group::Angle)),
        just("{").to(Token::GroupLeft(Group::Brace)),
        just("}").to(Token::GroupRight(Group::Brace)),
    ]);

    let token = choice((doc, ident_like, number, punct_or_group));

    // Exactly three slashes make documentation; four or more are a comment again.
    let comment = just("////")
        .or(just("//").then_ignore(just('/').not()))
        .ignore_then(none_of("\r\n").repeated());

    let skip = whitespace().then(comment.then_ignore(whitespace()).repeated());

    let body = token
        .map_with(|tok, e| (tok, e.span()))
        .map(Some)
        .recover_with(via_parser(any().to(None)))
        .then_ignore(skip.clone())
        .repeated()
        .collect()
        .map(|ExtendVec(inner)| inner);

    skip.ignore_then(body)
}
