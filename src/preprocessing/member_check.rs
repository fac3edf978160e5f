use std::collections::{HashMap, hash_map::Entry};

use crate::{
    reports::{Reports, double_label_report},
    syntax::{Span, Spanned},
};

/// Checks that ids and names are unique within one member list.
/// Returns `false` if anything was reported.
pub fn check_members<'a, 'filename>(
    members: impl Iterator<Item = (Spanned<i16>, Option<&'a Spanned<String>>)>,
    member_kind: &str,
    owner: &str,
    filename: &'filename str,
    reports: &mut Reports<'filename>,
) -> bool {
    let mut ids = HashMap::new();
    let mut names = Vec::new();
    let mut valid = true;

    for ((id, span), name) in members {
        match ids.entry(id) {
            Entry::Occupied(entry) => {
                valid = false;
                reports.add_fatal(double_label_report(
                    format!("the {member_kind} id #{id} was used multiple times in {owner}"),
                    format!("the {member_kind} id #{id} was used again here"),
                    span,
                    format!("the {member_kind} id #{id} was first used here"),
                    *entry.get(),
                    filename,
                ));
            }
            Entry::Vacant(entry) => {
                entry.insert(span);
            }
        }

        if let Some((name, span)) = name {
            names.push((name.as_str(), *span));
        }
    }

    check_unique(names.into_iter(), member_kind, filename, reports) && valid
}

pub fn check_unique<'a, 'filename>(
    iter: impl Iterator<Item = (&'a str, Span)>,
    type_name: &str,
    filename: &'filename str,
    reports: &mut Reports<'filename>,
) -> bool {
    let mut names = HashMap::new();
    let mut valid = true;

    for (name, span) in iter {
        match names.entry(name) {
            Entry::Occupied(entry) => {
                valid = false;
                reports.add_fatal(double_label_report(
                    format!("the {type_name} '{name}' was declared multiple times"),
                    format!("the {type_name} '{name}' was declared again here"),
                    span,
                    format!("the {type_name} '{name}' was first declared here"),
                    *entry.get(),
                    filename,
                ));
            }
            Entry::Vacant(entry) => {
                entry.insert(span);
            }
        }
    }

    valid
}
