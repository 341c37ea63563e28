//! Duplicate-aware list differences
//!
//! Both functions pair each item of `left` with at most one equal, not yet
//! paired item of `right`, scanning `left` in order. Two equal expected
//! items therefore need two equal observed items.

use lockstep_common::Value;

/// Items of `left` that find no partner in `right`
pub fn multiset_difference(left: &[Value], right: &[Value]) -> Vec<Value> {
    partition(left, right).1
}

/// Items of `left` that do find a partner in `right`
pub fn multiset_intersection(left: &[Value], right: &[Value]) -> Vec<Value> {
    partition(left, right).0
}

fn partition(left: &[Value], right: &[Value]) -> (Vec<Value>, Vec<Value>) {
    let mut used = vec![false; right.len()];
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();

    for item in left {
        let partner = (0..right.len()).find(|&i| !used[i] && right[i] == *item);

        match partner {
            Some(i) => {
                used[i] = true;
                matched.push(item.clone());
            }
            None => unmatched.push(item.clone()),
        }
    }

    (matched, unmatched)
}
