// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duplicate identifier checks.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::modifier::Modifier;
use crate::modifierset::ModifierSet;
use crate::sensorgrid::SensorGrid;

/// Objects addressed by a string identifier.
pub trait Identified {
    fn identifier(&self) -> &str;
}

impl Identified for Modifier {
    fn identifier(&self) -> &str {
        Modifier::identifier(self)
    }
}

impl Identified for ModifierSet {
    fn identifier(&self) -> &str {
        ModifierSet::identifier(self)
    }
}

impl Identified for SensorGrid {
    fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl<T: Identified + ?Sized> Identified for Arc<T> {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }
}

/// Report identifiers used by more than one object.
///
/// Returns an empty string when all identifiers are unique. Otherwise the
/// report lists each repeated identifier once, in first-seen order, and is
/// returned or raised as [`Error::DuplicateIdentifiers`] depending on `raise`.
pub fn check_duplicate_identifiers<T: Identified>(
    objects: &[T],
    raise: bool,
    kind: &str,
) -> Result<String> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    let mut order: Vec<&str> = Vec::new();
    for obj in objects {
        let id = obj.identifier();
        let count = counts.entry(id).or_insert(0);
        if *count == 0 {
            order.push(id);
        }
        *count += 1;
    }

    let duplicates: Vec<&str> = order.into_iter().filter(|id| counts[id] > 1).collect();
    if duplicates.is_empty() {
        return Ok(String::new());
    }

    let msg = format!(
        "The following duplicated {} identifiers were found:\n{}",
        kind,
        duplicates.join("\n")
    );
    if raise {
        return Err(Error::DuplicateIdentifiers(msg));
    }
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(ids: &[&str]) -> Vec<Arc<ModifierSet>> {
        ids.iter()
            .map(|id| Arc::new(ModifierSet::new(id).unwrap()))
            .collect()
    }

    #[test]
    fn unique_identifiers_give_empty_report() {
        let report = check_duplicate_identifiers(&sets(&["A", "B"]), true, "ModifierSet").unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn duplicates_listed_once() {
        let report =
            check_duplicate_identifiers(&sets(&["A", "B", "A", "A"]), false, "ModifierSet").unwrap();
        assert_eq!(
            report,
            "The following duplicated ModifierSet identifiers were found:\nA"
        );
    }

    #[test]
    fn raise_returns_error_with_report() {
        let err = check_duplicate_identifiers(&sets(&["A", "A"]), true, "ModifierSet").unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentifiers(ref msg) if msg.ends_with("\nA")));
    }
}
