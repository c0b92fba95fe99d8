// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collection helpers for shared radiance objects.
//!
//! Two kinds of membership test are needed. While walking a model tree the
//! same `Arc` is usually seen many times, so collection compares pointers
//! and keeps distinct-but-equal objects apart. The final flat list then
//! collapses value-equal objects so that freshly loaded copies of one
//! material are written once.

use std::sync::Arc;

/// True when this exact instance is already in `items`.
pub fn instance_in<T>(item: &Arc<T>, items: &[Arc<T>]) -> bool {
    items.iter().any(|other| Arc::ptr_eq(item, other))
}

/// Push `item` unless the same instance is already present.
pub fn push_instance<T>(items: &mut Vec<Arc<T>>, item: &Arc<T>) {
    if !instance_in(item, items) {
        items.push(Arc::clone(item));
    }
}

/// Collapse value-equal objects, keeping the first occurrence of each.
pub fn unique_values<T: PartialEq>(items: Vec<Arc<T>>) -> Vec<Arc<T>> {
    let mut unique: Vec<Arc<T>> = Vec::with_capacity(items.len());
    for item in items {
        let seen = unique
            .iter()
            .any(|u| Arc::ptr_eq(u, &item) || **u == *item);
        if !seen {
            unique.push(item);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keeps_equal_copies_apart() {
        let a = Arc::new(String::from("tinted"));
        let b = Arc::new(String::from("tinted"));
        let mut items = Vec::new();
        push_instance(&mut items, &a);
        push_instance(&mut items, &a);
        push_instance(&mut items, &b);
        assert_eq!(items.len(), 2);
        assert!(instance_in(&b, &items));
    }

    #[test]
    fn value_collapse_keeps_first_seen_order() {
        let items = vec![
            Arc::new(3),
            Arc::new(1),
            Arc::new(3),
            Arc::new(2),
            Arc::new(1),
        ];
        let unique: Vec<i32> = unique_values(items).iter().map(|v| **v).collect();
        assert_eq!(unique, vec![3, 1, 2]);
    }
}
