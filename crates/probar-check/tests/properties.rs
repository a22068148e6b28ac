//! Property tests for dumps, diffs and predicates.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use probar_check::compare;
use probar_check::dump::{quote, Dump};
use proptest::prelude::*;
use std::collections::HashMap;

fn unquote(quoted: &str) -> &str {
    let inner = &quoted[1..quoted.len() - 1];
    inner
        .strip_prefix('\n')
        .and_then(|s| s.strip_suffix('\n'))
        .unwrap_or(inner)
}

proptest! {
    #[test]
    fn prop_dump_is_deterministic(entries in prop::collection::vec(("[a-z]{1,6}", any::<i32>()), 0..20)) {
        let map: HashMap<String, i32> = entries.into_iter().collect();
        let first = Dump::new(&map);
        let again = Dump::new(&map.clone());
        prop_assert_eq!(first.as_str(), again.as_str());
    }

    #[test]
    fn prop_some_has_pointee_type(value in any::<i64>(), text in ".*") {
        let plain = Dump::new(&value);
        let some = Dump::new(&Some(value));
        let boxed = Dump::new(&Box::new(value));
        prop_assert_eq!(some.indirect_type(), plain.indirect_type());
        prop_assert_eq!(boxed.indirect_type(), plain.indirect_type());

        let plain_text = Dump::new(&text);
        let some_text = Dump::new(&Some(text.clone()));
        prop_assert_eq!(some_text.indirect_type(), plain_text.indirect_type());
    }

    #[test]
    fn prop_utf8_bytes_round_trip_through_quoting(text in "[a-zA-Z0-9 \"\n]{1,40}") {
        let dump = Dump::new(text.as_bytes());
        let expected = format!("([u8]) (len={}) {}", text.len(), quote(&text));
        prop_assert_eq!(dump.as_str(), expected.as_str());
        let quoted = quote(&text);
        prop_assert_eq!(unquote(&quoted), text.as_str());
    }

    #[test]
    fn prop_no_diff_across_types(a in any::<i32>(), b in any::<i64>()) {
        let lines_a = vec![a; 3];
        let lines_b = vec![b; 3];
        let (dump_a, dump_b) = (Dump::new(&lines_a), Dump::new(&lines_b));
        prop_assert_eq!(dump_a.diff(&dump_b, 1), "");
    }

    #[test]
    fn prop_no_diff_for_single_lines(a in any::<u64>(), b in any::<u64>()) {
        let (dump_a, dump_b) = (Dump::new(&a), Dump::new(&b));
        prop_assert_eq!(dump_a.diff(&dump_b, 1), "");
    }

    #[test]
    fn prop_changed_multiline_text_diffs(lines in prop::collection::vec("[a-z]{1,8}", 2..10), at in any::<prop::sample::Index>()) {
        let expected = lines.join("\n");
        let mut changed = lines.clone();
        let i = at.index(changed.len());
        changed[i] = changed[i].to_uppercase();
        let actual = changed.join("\n");

        let (actual, expected) = (Dump::new(&actual), Dump::new(&expected));
        let diff = actual.diff(&expected, 1);
        prop_assert!(diff.contains("--- Expected"));
        prop_assert!(diff.contains("+++ Actual"));
    }

    #[test]
    fn prop_successor_is_greater(a in any::<i64>(), u in any::<u32>(), f in -1.0e9f64..1.0e9) {
        prop_assume!(a < i64::MAX);
        prop_assert!(compare::less(&a, &(a + 1)));
        prop_assert!(compare::greater(&(a + 1), &a));
        prop_assert!(compare::less(&u, &(u64::from(u) + 1)));
        prop_assert!(compare::greater(&(f + 1.0), &f));
    }

    #[test]
    fn prop_empty_containers_are_zero(n in 1usize..10) {
        prop_assert!(compare::zero(&Vec::<u8>::new()));
        prop_assert!(compare::zero(&HashMap::<String, u8>::new()));
        prop_assert!(!compare::zero(&vec![0u8; n]));
    }
}
