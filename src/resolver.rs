use tracing::{debug, info};

use crate::{
    error::Error,
    metadata::{MetadataResolver, ResolvedMetadata},
    preprocessing::preprocess,
    reports::Reports,
    syntax::parse,
};

/// Reads metadata from the text of a description file.
///
/// Diagnostics are kept in [`reports`](SourceResolver::reports) whether or
/// not resolution succeeds, so callers can print warnings as well as errors.
#[derive(Debug)]
pub struct SourceResolver<'a> {
    src: &'a str,
    filename: &'a str,
    reports: Reports<'a>,
}

impl<'a> SourceResolver<'a> {
    pub fn new(src: &'a str, filename: &'a str) -> Self {
        SourceResolver {
            src,
            filename,
            reports: Reports::default(),
        }
    }

    pub fn reports(&self) -> &Reports<'a> {
        &self.reports
    }
}

impl MetadataResolver for SourceResolver<'_> {
    type Error = Error;

    fn resolve(&mut self) -> Result<ResolvedMetadata, Error> {
        let mut reports = Reports::default();
        let resolved = parse(self.src, &mut reports, self.filename)
            .map(|description| {
                debug!(
                    declarations = description.declarations.len(),
                    "parsed description"
                );
                preprocess(&description, &mut reports, self.filename)
            });
        self.reports = reports;

        match resolved {
            Some(resolved) if !self.reports.has_fatal() => {
                info!(
                    file = self.filename,
                    services = resolved.services.len(),
                    structs = resolved.catalog.len(),
                    "resolved description"
                );
                Ok(resolved)
            }
            _ => Err(Error::Malformed(self.filename.to_string())),
        }
    }
}
