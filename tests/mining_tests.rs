use logshape::{FreqThresholdStrategy, PartialConfig, SortingStrategy, TemplateMiner};
use std::collections::HashSet;

fn distinct(results: &std::collections::HashMap<String, String>) -> HashSet<&str> {
    results.values().map(String::as_str).collect()
}

#[test]
fn parenthesized_names_become_placeholders() {
    let lines = [
        "Invalid controller specified (publishers)",
        "Invalid controller specified (admin)",
        "Invalid controller specified (users)",
        "Invalid controller specified (managers)",
    ];
    let mut miner = TemplateMiner::new();
    let results = miner.parse(&lines);
    assert_eq!(results.len(), 4);
    assert!(results.values().all(|t| t == "Invalid controller specified <*>"));
}

#[test]
fn numbers_are_cleaned_after_synthesis() {
    let lines = ["Error code 404 occurred", "Error code 500 occurred", "Error code 403 occurred"];
    let mut miner = TemplateMiner::new();
    let results = miner.parse(&lines);
    assert_eq!(distinct(&results), HashSet::from(["Error code <*> occurred"]));
    assert_eq!(miner.templates(), vec!["Error code <*> occurred".to_string()]);
}

#[test]
fn identical_lines_share_one_entry() {
    let lines = ["Server started successfully"; 4];
    let mut miner = TemplateMiner::new();
    let results = miner.parse(&lines);
    assert_eq!(results.len(), 1);
    assert_eq!(results["Server started successfully"], "Server started successfully");
    assert_eq!(miner.patterns()[0].len(), 4);
}

#[test]
fn blank_lines_are_skipped() {
    let lines = ["", "   ", "\t", "Valid log message", "  \n  ", "Another valid message"];
    let mut miner = TemplateMiner::new();
    let results = miner.parse(&lines);
    assert_eq!(results.len(), 2);
    assert_eq!(results["Valid log message"], "Valid log message");
    assert_eq!(results["Another valid message"], "Another valid message");
}

#[test]
fn keys_are_trimmed_lines() {
    let mut miner = TemplateMiner::new();
    let results = miner.parse(&["   padded message here \t"]);
    assert_eq!(results["padded message here"], "padded message here");
}

#[test]
fn empty_batch_yields_nothing() {
    let mut miner = TemplateMiner::new();
    let results = miner.parse::<&str>(&[]);
    assert!(results.is_empty());
    assert!(miner.templates().is_empty());
    assert!(miner.patterns().is_empty());
}

#[test]
fn duplicates_keep_one_key_per_line() {
    let lines = ["Message A", "Message A", "Message B", "Message C", "Message B", "Message A"];
    let mut miner = TemplateMiner::new();
    let results = miner.parse(&lines);
    assert_eq!(results.len(), 3);
    // equal letter counts put all six events in one pattern
    assert_eq!(miner.patterns().len(), 1);

    let mut miner = TemplateMiner::from_config(PartialConfig {
        freq_threshold: Some(FreqThresholdStrategy::All),
        ..Default::default()
    })
    .unwrap();
    let results = miner.parse(&lines);
    assert_eq!(distinct(&results), HashSet::from(["Message <*>"]));
}

#[test]
fn frequency_strategies_disagree_on_rare_tokens() {
    let lines = [
        "Error in functionA detected",
        "Error in functionB detected",
        "Error in functionA detected",
    ];
    let run = |strategy| {
        let mut miner = TemplateMiner::from_config(PartialConfig {
            freq_threshold: Some(strategy),
            ..Default::default()
        })
        .unwrap();
        miner.parse(&lines)
    };

    let min = run(FreqThresholdStrategy::Min);
    assert_eq!(min["Error in functionB detected"], "Error in functionA detected");

    for strategy in [FreqThresholdStrategy::All, FreqThresholdStrategy::Median] {
        let results = run(strategy);
        assert_eq!(distinct(&results), HashSet::from(["Error in <*> detected"]), "{strategy}");
    }
}

#[test]
fn small_groups_keep_representative_content() {
    let lines = [
        "Rare error message one",
        "Rare error message two",
        "Common message",
        "Common message",
        "Common message",
        "Common message",
    ];
    let base = PartialConfig {
        min_group_size: Some(3),
        freq_threshold: Some(FreqThresholdStrategy::All),
        ..Default::default()
    };

    let mut miner = TemplateMiner::from_config(PartialConfig {
        analyze_small_groups: Some(false),
        ..base.clone()
    })
    .unwrap();
    let results = miner.parse(&lines);
    assert_eq!(results.len(), 3);
    assert_eq!(results["Rare error message two"], "Rare error message one");
    assert_eq!(results["Common message"], "Common message");
    assert!(miner.patterns()[0].token_frequency.is_empty());

    let mut miner = TemplateMiner::from_config(PartialConfig {
        analyze_small_groups: Some(true),
        ..base
    })
    .unwrap();
    let results = miner.parse(&lines);
    assert_eq!(results["Rare error message one"], "Rare error message <*>");
    assert_eq!(results["Rare error message two"], "Rare error message <*>");
}

#[test]
fn placeholder_guard_falls_back_to_content() {
    let lines = ["Error in functionA detected", "Error in functionB detected"];
    let mut miner = TemplateMiner::from_config(PartialConfig {
        freq_threshold: Some(FreqThresholdStrategy::All),
        max_placeholder_ratio: Some(0.1),
        ..Default::default()
    })
    .unwrap();
    let results = miner.parse(&lines);
    assert_eq!(distinct(&results), HashSet::from(["Error in functionA detected"]));
}

#[test]
fn datetimes_inside_messages_are_variables() {
    let cases: [[&str; 3]; 2] = [
        [
            "Error occurred at 2024-01-15T10:30:15.123Z in system",
            "Error occurred at 2024-01-16T11:45:30Z in system",
            "Error occurred at 2024-01-17T09:15:22.456789Z in system",
        ],
        [
            "2024-01-15 10:30:15.123 System started successfully",
            "2024-01-16 11:45:30 System started successfully",
            "2024-01-17 09:15:22 System started successfully",
        ],
    ];
    let expected = ["Error occurred at <*> in system", "<*> System started successfully"];
    for (lines, expected) in cases.iter().zip(expected) {
        let mut miner = TemplateMiner::new();
        let results = miner.parse(lines);
        assert_eq!(distinct(&results), HashSet::from([expected]));
    }
}

#[test]
fn custom_rules_run_after_builtin_ones() {
    let lines = ["Opened session=abcd for user", "Opened session=wxyz for user"];

    let mut plain = TemplateMiner::new();
    let results = plain.parse(&lines);
    assert_eq!(results["Opened session=wxyz for user"], "Opened session=abcd for user");

    let mut custom = TemplateMiner::from_config(PartialConfig {
        custom_regexes: Some(vec![r"session=[a-z]+".to_string()]),
        ..Default::default()
    })
    .unwrap();
    let results = custom.parse(&lines);
    assert_eq!(distinct(&results), HashSet::from(["Opened <*> for user"]));
}

#[test]
fn strict_matching_splits_reordered_words() {
    let lines = ["disk sda full", "full sda disk"];

    let mut loose = TemplateMiner::new();
    loose.parse(&lines);
    assert_eq!(loose.patterns().len(), 1);

    let mut strict = TemplateMiner::from_config(PartialConfig {
        strict_alphabetical_matching: Some(true),
        ..Default::default()
    })
    .unwrap();
    strict.parse(&lines);
    assert_eq!(strict.patterns().len(), 2);
}

#[test]
fn sorting_changes_the_representative() {
    let lines = ["job beta finished in 30 s", "job alpha finished"];
    // letter counts differ (18 vs 16), so loosen the threshold
    let run = |sorting| {
        let mut miner = TemplateMiner::from_config(PartialConfig {
            min_similarity: Some(0.5),
            sorting: Some(sorting),
            ..Default::default()
        })
        .unwrap();
        miner.parse(&lines);
        let pattern = &miner.patterns()[0];
        let rep = miner.pattern_events(pattern).next().map(|e| e.raw.clone()).unwrap();
        rep
    };
    assert_eq!(run(SortingStrategy::None), "job beta finished in 30 s");
    assert_eq!(run(SortingStrategy::ByLength), "job alpha finished");
    assert_eq!(run(SortingStrategy::Lexical), "job alpha finished");
    assert_eq!(run(SortingStrategy::ByDynamicTokens), "job alpha finished");
}

#[test]
fn later_batches_join_earlier_patterns() {
    let mut miner = TemplateMiner::new();
    let first = miner.parse(&["Error code 404 occurred"]);
    assert_eq!(first["Error code 404 occurred"], "Error code <*> occurred");

    let second = miner.parse(&["Error code 500 occurred"]);
    assert_eq!(second.len(), 1);
    assert_eq!(second["Error code 500 occurred"], "Error code <*> occurred");
    assert_eq!(miner.patterns().len(), 1);
    assert_eq!(miner.patterns()[0].len(), 2);
}

#[test]
fn rejected_config_leaves_engine_unchanged() {
    let mut miner = TemplateMiner::from_config(PartialConfig {
        min_similarity: Some(0.7),
        ..Default::default()
    })
    .unwrap();
    let err = miner.with_config(PartialConfig { min_similarity: Some(1.5), ..Default::default() });
    assert!(err.is_err());
    assert_eq!(miner.config().min_similarity, 0.7);

    let err = miner.with_config(PartialConfig {
        custom_regexes: Some(vec!["(unclosed".to_string()]),
        ..Default::default()
    });
    assert!(err.is_err());
    assert!(miner.config().custom_regexes.is_empty());
}

#[test]
fn overlong_lines_are_truncated_in_keys() {
    let line = format!("start {}", "x".repeat(20_000));
    let mut miner = TemplateMiner::new();
    let results = miner.parse(&[line.as_str()]);
    let key = results.keys().next().unwrap();
    assert_eq!(key.chars().count(), logshape::miner::MAX_LINE_CHARS);
    assert!(line.starts_with(key.as_str()));
}

#[test]
fn templates_filter_on_real_token_count() {
    let lines = ["12345", "alpha beta gamma"];
    let mut miner = TemplateMiner::new();
    let results = miner.parse(&lines);
    // no letters: never similar, gets its own pattern and a numeric-only template
    assert_eq!(results["12345"], "12345");
    assert_eq!(miner.templates(), vec!["12345".to_string(), "alpha beta gamma".to_string()]);

    let mut strict = TemplateMiner::from_config(PartialConfig {
        min_template_tokens: Some(3),
        ..Default::default()
    })
    .unwrap();
    strict.parse(&lines);
    assert_eq!(strict.templates(), vec!["alpha beta gamma".to_string()]);
}

#[test]
fn singleton_group_below_min_size_is_cleaned_but_not_analysed() {
    let mut miner = TemplateMiner::from_config(PartialConfig {
        min_group_size: Some(2),
        analyze_small_groups: Some(false),
        ..Default::default()
    })
    .unwrap();
    let results = miner.parse(&["Disk 3 failed"]);
    assert_eq!(results["Disk 3 failed"], "Disk <*> failed");
    let patterns = miner.patterns();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].len(), 1);
    assert!(patterns[0].token_frequency.is_empty());
    assert_eq!(miner.templates(), vec!["Disk <*> failed".to_string()]);
}

#[test]
fn zero_similarity_means_exact_letter_match() {
    let lines = ["disk full now", "user login ok please"];
    let mut miner = TemplateMiner::from_config(PartialConfig { min_similarity: Some(0.0), ..Default::default() }).unwrap();
    let results = miner.parse(&lines);
    assert_eq!(miner.patterns().len(), 2);
    assert_eq!(distinct(&results), HashSet::from(["disk full now", "user login ok please"]));
}
