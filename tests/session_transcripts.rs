//! Transcript tests for the command protocol.
//!
//! Each test feeds a script through an in-memory [`Session`] and compares
//! stdout against the expected result lines.

use slotwise::core::config::HarnessConfig;
use slotwise::engine::{Session, SessionSummary};
use slotwise::ui::output::Verbosity;

// =============================================================================
// Test Fixtures
// =============================================================================

fn run_with(config: HarnessConfig, script: &str) -> (String, SessionSummary) {
    let mut session = Session::new(&config, Verbosity::Quiet);
    let mut out = Vec::new();
    let summary = session
        .run(script.as_bytes(), &mut out)
        .expect("in-memory I/O never fails");
    (String::from_utf8(out).expect("utf-8 output"), summary)
}

fn run(script: &str) -> String {
    let config = HarnessConfig {
        shuffle_seed: Some(0),
        ..Default::default()
    };
    run_with(config, script).0
}

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn sort_then_dump() {
    let out = run("create list list0
list_push_back list0 3
list_push_back list0 1
list_push_back list0 2
list_sort list0
dumpdata list0
");
    assert_eq!(out, "1 2 3\n");
}

#[test]
fn bitmap_set_then_dump() {
    let out = run("create bitmap bm0 8
bitmap_set bm0 3 true
bitmap_dump bm0
");
    assert_eq!(out, "00010000\n");
}

#[test]
fn hash_square_then_find() {
    let out = run("create hashtable hash0
hash_insert hash0 4
hash_apply hash0 square
hash_find hash0 16
");
    assert_eq!(out, "16\n");
}

#[test]
fn hash_delete_then_find_prints_nothing() {
    let (out, summary) = run_with(
        HarnessConfig::default(),
        "create hashtable hash0
hash_insert hash0 5
hash_find hash0 5
hash_delete hash0 5
hash_find hash0 5
",
    );
    assert_eq!(out, "5\n");
    assert_eq!(summary.failures, 1);
}

#[test]
fn set_all_then_count() {
    let out = run("create bitmap bm1 100
bitmap_set_all bm1 true
bitmap_count bm1 0 100 true
bitmap_all bm1 0 100
bitmap_none bm1 0 100
");
    assert_eq!(lines(&out), vec!["100", "true", "false"]);
}

// =============================================================================
// Lists
// =============================================================================

#[test]
fn positional_insert_and_remove() {
    let out = run("create list list0
list_insert list0 0 5
list_insert list0 0 4
list_insert list0 9 7
list_insert list0 2 6
dumpdata list0
list_remove list0 1
dumpdata list0
list_remove list0 3
dumpdata list0
");
    assert_eq!(lines(&out), vec!["4 5 6 7", "4 6 7", "4 6 7"]);
}

#[test]
fn ends_and_extremes() {
    let out = run("create list list2
list_push_back list2 8
list_push_front list2 -3
list_push_back list2 11
list_front list2
list_back list2
list_max list2
list_min list2
list_size list2
list_empty list2
list_pop_back list2
list_pop_front list2
dumpdata list2
");
    assert_eq!(
        lines(&out),
        vec!["-3", "11", "11", "-3", "3", "false", "8"]
    );
}

#[test]
fn ordered_insert_keeps_sorted() {
    let out = run("create list list0
list_insert_ordered list0 5
list_insert_ordered list0 1
list_insert_ordered list0 3
list_insert_ordered list0 3
list_insert_ordered list0 9
dumpdata list0
list_sort list0
dumpdata list0
");
    assert_eq!(lines(&out), vec!["1 3 3 5 9", "1 3 3 5 9"]);
}

#[test]
fn swap_and_reverse() {
    let out = run("create list list0
list_push_back list0 1
list_push_back list0 2
list_push_back list0 3
list_push_back list0 4
list_swap list0 0 3
dumpdata list0
list_swap list0 1 2
dumpdata list0
list_swap list0 2 2
list_reverse list0
dumpdata list0
list_swap list0 0 4
dumpdata list0
");
    assert_eq!(
        lines(&out),
        vec!["4 2 3 1", "4 3 2 1", "1 2 3 4", "1 2 3 4"]
    );
}

#[test]
fn splice_full_source() {
    let out = run("create list list0
create list list1
list_push_back list0 1
list_push_back list0 2
list_push_back list1 7
list_push_back list1 8
list_push_back list1 9
list_splice list0 0 list1 0 3
list_size list1
list_size list0
dumpdata list0
");
    assert_eq!(lines(&out), vec!["0", "5", "7 8 9 1 2"]);
}

#[test]
fn unique_without_and_with_sink() {
    let out = run("create list list0
create list list1
list_push_back list0 2
list_push_back list0 2
list_push_back list0 5
list_push_back list0 5
list_push_back list0 5
list_unique list0
dumpdata list0
list_push_back list0 5
list_push_back list0 7
list_unique list0 list1
dumpdata list0
dumpdata list1
");
    assert_eq!(lines(&out), vec!["2 5", "2 5 7", "5"]);
}

#[test]
fn delete_releases_nodes_and_frees_slot() {
    let mut session = Session::new(&HarnessConfig::default(), Verbosity::Quiet);
    for line in [
        "create list list0",
        "list_push_back list0 1",
        "list_push_back list0 2",
        "delete list0",
    ] {
        session.execute_line(line).unwrap();
    }
    assert_eq!(session.registry().list_nodes(), 0);
    assert!(session.execute_line("list_size list0").is_err());
    assert!(session.execute_line("create list list0").is_ok());
}

// =============================================================================
// Hash tables
// =============================================================================

#[test]
fn insert_keeps_duplicates_replace_does_not() {
    let out = run("create hashtable hash1
hash_insert hash1 3
hash_insert hash1 3
hash_size hash1
hash_replace hash1 3
hash_size hash1
hash_replace hash1 4
hash_size hash1
");
    assert_eq!(lines(&out), vec!["2", "2", "3"]);
}

#[test]
fn triple_clear_and_empty() {
    let out = run("create hashtable hash0
hash_insert hash0 2
hash_insert hash0 -3
hash_apply hash0 triple
hash_find hash0 8
hash_find hash0 -27
hash_empty hash0
hash_clear hash0
hash_empty hash0
hash_size hash0
dumpdata hash0
");
    assert_eq!(lines(&out), vec!["8", "-27", "false", "true", "0"]);
}

#[test]
fn hash_dump_contains_every_entry() {
    let mut script = String::from("create hashtable hash0\n");
    for v in 0..20 {
        script.push_str(&format!("hash_insert hash0 {}\n", v));
    }
    script.push_str("dumpdata hash0\n");
    let out = run(&script);
    let mut values: Vec<i64> = out
        .split_whitespace()
        .map(|v| v.parse().unwrap())
        .collect();
    values.sort();
    assert_eq!(values, (0..20).collect::<Vec<_>>());
}

// =============================================================================
// Bitmaps
// =============================================================================

#[test]
fn single_bit_commands() {
    let out = run("create bitmap bm0 4
bitmap_mark bm0 0
bitmap_flip bm0 1
bitmap_flip bm0 0
bitmap_test bm0 0
bitmap_test bm0 1
bitmap_reset bm0 1
dumpdata bm0
bitmap_size bm0
");
    assert_eq!(lines(&out), vec!["false", "true", "0000", "4"]);
}

#[test]
fn range_commands() {
    let out = run("create bitmap bm0 16
bitmap_set_multiple bm0 2 3 true
bitmap_count bm0 0 16 true
bitmap_contains bm0 0 2 true
bitmap_any bm0 0 3
bitmap_scan bm0 0 3 true
bitmap_scan_and_flip bm0 0 4 false
dumpdata bm0
");
    assert_eq!(
        lines(&out),
        vec!["3", "false", "true", "2", "5", "0011111110000000"]
    );
}

#[test]
fn expand_and_hexdump() {
    let out = run("create bitmap bm0 8
bitmap_set bm0 0 true
bitmap_expand bm0 120
bitmap_size bm0
bitmap_test bm0 0
bitmap_test bm0 127
bitmap_hexdump bm0
");
    assert_eq!(
        lines(&out),
        vec![
            "128",
            "true",
            "false",
            "00000000  01 00 00 00 00 00 00 00-00 00 00 00 00 00 00 00",
        ]
    );
}

#[test]
fn empty_bitmap_is_allowed() {
    let out = run("create bitmap bm0 0
bitmap_size bm0
dumpdata bm0
bitmap_expand bm0 2
dumpdata bm0
");
    assert_eq!(lines(&out), vec!["0", "00"]);
}

// =============================================================================
// Error handling
// =============================================================================

#[test]
fn rejected_lines_change_nothing() {
    let (out, summary) = run_with(
        HarnessConfig::default(),
        "create list list0
list_push_back list0 1
create list list0
list_push_back list0 x
list_push_back list0
list_remove list0 4
list_swap list0 0 1
list_splice list0 0 list9 0 1
bitmap_set bm0 0 true
create list list10
create bitmap bm0 -4
dumpdata list0
",
    );
    assert_eq!(out, "1\n");
    assert_eq!(summary.failures, 9);
}

#[test]
fn blank_and_comment_lines_are_ignored() {
    let (out, summary) = run_with(
        HarnessConfig::default(),
        "\n# setup\ncreate list list0\n   \nlist_size list0\n",
    );
    assert_eq!(out, "0\n");
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.lines, 5);
}

#[test]
fn node_limit_surfaces_as_allocation_failure() {
    let config = HarnessConfig {
        node_limit: Some(2),
        ..Default::default()
    };
    let (out, summary) = run_with(
        config,
        "create list list0
list_push_back list0 1
list_push_back list0 2
list_push_back list0 3
list_size list0
list_pop_back list0
list_push_back list0 4
dumpdata list0
",
    );
    assert_eq!(lines(&out), vec!["2", "1 4"]);
    assert_eq!(summary.failures, 1);
}

#[test]
fn oversized_bitmaps_fail_without_ending_the_session() {
    let (out, summary) = run_with(
        HarnessConfig::default(),
        "create bitmap bm0 18446744073709551615
create bitmap bm0 8
bitmap_mark bm0 1
bitmap_expand bm0 18446744073709551000
bitmap_size bm0
dumpdata bm0
",
    );
    assert_eq!(lines(&out), vec!["8", "01000000"]);
    assert_eq!(summary.failures, 2);
}

#[test]
fn oversized_bitmap_reports_allocation_failure() {
    let mut session = Session::new(&HarnessConfig::default(), Verbosity::Quiet);
    let err = session
        .execute_line("create bitmap bm0 18446744073709551615")
        .unwrap_err();
    assert!(err.to_string().contains("could not allocate"));
    assert!(!session.registry().contains(&"bm0".parse().unwrap()));
}

#[test]
fn teardown_on_quit_releases_everything() {
    let (_, summary) = run_with(
        HarnessConfig::default(),
        "create list list0
create hashtable hash0
create bitmap bm0 8
list_push_back list0 1
hash_insert hash0 1
hash_insert hash0 2
quit
",
    );
    assert!(summary.quit);
    assert_eq!(summary.released.instances(), 3);
    assert_eq!(summary.released.nodes, 3);
}
