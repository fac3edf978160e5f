use std::{ops::Range, slice};

use ariadne::{Color, Config, IndexType, Label, ReportKind};

use crate::syntax::Span;

pub type Report<'filename> = ariadne::Report<'static, (&'filename str, Range<usize>)>;

/// Diagnostics collected while reading a description file.
#[derive(Debug, Default)]
pub struct Reports<'filename> {
    reports: Vec<Report<'filename>>,
    has_fatal: bool,
}

impl<'filename> Reports<'filename> {
    pub fn add_fatal(&mut self, report: Report<'filename>) {
        self.reports.push(report);
        self.has_fatal = true;
    }

    pub fn add_nonfatal(&mut self, report: Report<'filename>) {
        self.reports.push(report);
    }

    pub fn extend_fatal<I: IntoIterator<Item = Report<'filename>>>(&mut self, reports: I) {
        for report in reports {
            self.add_fatal(report);
        }
    }

    pub fn has_fatal(&self) -> bool {
        self.has_fatal
    }

    pub fn has_any(&self) -> bool {
        !self.reports.is_empty()
    }
}

impl<'a, 'filename> IntoIterator for &'a Reports<'filename> {
    type Item = &'a Report<'filename>;
    type IntoIter = slice::Iter<'a, Report<'filename>>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.iter()
    }
}

pub fn simple_report<'filename>(
    kind: ReportKind<'static>,
    message: String,
    span: Span,
    filename: &'filename str,
) -> Report<'filename> {
    let color = if matches!(kind, ReportKind::Error) {
        Color::Red
    } else {
        Color::Yellow
    };

    Report::build(kind, (filename, span.into_range()))
        .with_config(Config::new().with_index_type(IndexType::Byte))
        .with_message(message.clone())
        .with_label(
            Label::new((filename, span.into_range()))
                .with_message(message)
                .with_color(color),
        )
        .finish()
}

pub fn double_label_report<'filename>(
    message: String,
    primary_label: String,
    primary_span: Span,
    secondary_label: String,
    secondary_span: Span,
    filename: &'filename str,
) -> Report<'filename> {
    Report::build(ReportKind::Error, (filename, primary_span.into_range()))
        .with_config(Config::new().with_index_type(IndexType::Byte))
        .with_message(message)
        .with_label(
            Label::new((filename, primary_span.into_range()))
                .with_message(primary_label)
                .with_color(Color::Red),
        )
        .with_label(
            Label::new((filename, secondary_span.into_range()))
                .with_message(secondary_label)
                .with_color(Color::Yellow),
        )
        .finish()
}
