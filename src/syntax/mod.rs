use std::{fmt::Display, ops::Range};

use ariadne::{Color, Label, Report, ReportKind};
use chumsky::{Parser, container::Container, error::Rich, input::Input as _, span::SimpleSpan};

use crate::{ast::Description, reports::Reports, syntax::lexer::lexer};

pub mod lexer;
pub mod parser;
pub mod tokens;

pub type Span = SimpleSpan;
pub type Spanned<T> = (T, Span);

/// Lexes and parses a description file. Syntax errors end up in `reports`;
/// `None` is only returned when nothing usable could be recovered.
pub fn parse<'filename>(
    src: &str,
    reports: &mut Reports<'filename>,
    filename: &'filename str,
) -> Option<Description> {
    let (tokens, errors) = lexer().parse(src).into_output_errors();
    reports.extend_fatal(errors.into_iter().map(|error| make_report(error, filename)));

    let tokens = tokens?;
    let tokens = tokens
        .as_slice()
        .map((src.len()..src.len()).into(), |(t, s)| (t, s));

    let (description, errors) = parser::parser().parse(tokens).into_output_errors();
    reports.extend_fatal(errors.into_iter().map(|error| make_report(error, filename)));

    description
}

fn make_report<'src, 'tokens, T: Display>(
    error: Rich<'src, T>,
    filename: &'tokens str,
) -> Report<'static, (&'tokens str, Range<usize>)> {
    Report::build(ReportKind::Error, (filename, error.span().into_range()))
        .with_config(ariadne::Config::new().with_index_type(ariadne::IndexType::Byte))
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, error.span().into_range()))
                .with_message(error.to_string())
                .with_color(Color::Red),
        )
        .finish()
}

#[derive(Debug, Clone)]
struct ExtendVec<T>(Vec<T>);

impl<T> Default for ExtendVec<T> {
    fn default() -> Self {
        Self(vec![])
    }
}

impl<I, T> Container<I> for ExtendVec<T>
where
    I: IntoIterator<Item = T>,
{
    fn push(&mut self, item: I) {
        self.0.extend(item);
    }

    fn with_capacity(n: usize) -> Self {
        Self(Vec::with_capacity(n))
    }
}
