use crate::{
    ast::Description,
    metadata::ResolvedMetadata,
    preprocessing::{name_resolution::resolve_names, usage_check::check_usage},
    reports::Reports,
};

mod member_check;
mod name_resolution;
mod usage_check;

/// Resolves a parsed description into metadata, reporting every problem found.
pub fn preprocess<'filename>(
    description: &Description,
    reports: &mut Reports<'filename>,
    filename: &'filename str,
) -> ResolvedMetadata {
    let resolved = resolve_names(description, reports, filename);

    // A partial catalog would produce spurious warnings.
    if !reports.has_fatal() {
        check_usage(description, &resolved, reports, filename);
    }

    resolved
}
