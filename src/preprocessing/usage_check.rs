use std::collections::HashSet;

use ariadne::ReportKind;

use crate::{
    ast::{Body, Description},
    generator::reachable_types,
    metadata::ResolvedMetadata,
    reports::{Reports, simple_report},
};

/// Warns about declarations that no service can reach.
pub fn check_usage<'filename>(
    description: &Description,
    resolved: &ResolvedMetadata,
    reports: &mut Reports<'filename>,
    filename: &'filename str,
) {
    let mut used = HashSet::new();

    for service in &resolved.services {
        let Ok(types) = reachable_types(&resolved.catalog, service.methods().values()) else {
            continue;
        };

        for r#type in &types {
            // Coerced types only point at what they wrap, the walker stops there.
            let mut current = r#type;
            loop {
                used.insert(current.representation().to_owned());

                match current.underlying() {
                    Ok(underlying) => current = underlying,
                    Err(_) => break,
                }
            }
        }
    }

    for declaration in &description.declarations {
        let (name, span) = &declaration.name;

        if matches!(declaration.body, Body::Service(_)) || used.contains(name) {
            continue;
        }

        reports.add_nonfatal(simple_report(
            ReportKind::Warning,
            format!(
                "the {} '{name}' is not used by any service",
                declaration.body.kind()
            ),
            *span,
            filename,
        ));
    }
}
