//! End-to-end behaviour of the query language: tokenizer, field registry,
//! enum canonicalization, emoji routing, and tag math.

use tagbot_core::{
    parse_query, parse_tags, strip_emojis, Field, FieldRegistry, MatchStrategy, MediaType,
    ParsedQuery, QueryParser, QueryWarning, TaggedDocument,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_type_value_no_warnings() {
    let q = parse_query("t:sticker");
    assert_eq!(q.get("type", false), strings(&["sticker"]).as_slice());
    assert!(q.warnings().is_empty(), "{:?}", q.warnings());
    assert_eq!(q.iter().count(), 1);
}

#[test]
fn test_invalid_type_value_defaults_with_one_warning() {
    let q = parse_query("t:zz");
    assert_eq!(q.get_first("type", false), Some("sticker"));
    assert_eq!(
        q.warnings(),
        &[QueryWarning::InvalidValue {
            field: "type".into(),
            value: "zz".into()
        }]
    );
}

#[test]
fn test_bare_words_positive_and_negative() {
    let q = parse_query("foo !bar");
    assert_eq!(q.get("tags", false), strings(&["foo"]).as_slice());
    assert_eq!(q.get("tags", true), strings(&["bar"]).as_slice());
    assert!(q.warnings().is_empty());
}

#[test]
fn test_dash_negates_like_bang() {
    let q = parse_query("-bar");
    assert_eq!(q.get("tags", true), strings(&["bar"]).as_slice());
}

#[test]
fn test_colon_inside_value_is_literal() {
    let q = parse_query("p:p:bob");
    assert_eq!(q.get("pack_name", false), strings(&["p:bob"]).as_slice());
    assert!(q.warnings().is_empty());
}

#[test]
fn test_enum_first_value_wins() {
    let q = parse_query("a:yes a:no");
    assert_eq!(q.get("is_animated", false), strings(&["yes"]).as_slice());
    assert_eq!(
        q.warnings(),
        &[QueryWarning::DuplicateValue {
            field: "is_animated".into(),
            value: "no".into()
        }]
    );
}

#[test]
fn test_enum_ambiguous_prefix() {
    let fields = vec![
        Field::text("tags", &["s"], MatchStrategy::FuzzyText),
        Field::enumerated("type", &["t"], &["sticker", "voice", "video"]),
    ];
    let registry = FieldRegistry::new(fields, "tags").unwrap();
    let q = QueryParser::new(&registry).parse("t:v");
    assert!(!q.has("type", false));
    assert!(matches!(
        q.warnings(),
        [QueryWarning::AmbiguousValue { candidates, .. }] if candidates.len() == 2
    ));

    let q = QueryParser::new(&registry).parse("t:s");
    assert_eq!(q.get_first("type", false), Some("sticker"));
}

#[test]
fn test_enum_prefix_is_case_insensitive() {
    let q = parse_query("t:PH");
    assert_eq!(q.get_first("type", false), Some("photo"));
}

#[test]
fn test_unknown_field_is_ignored() {
    let q = parse_query("bla:x cat");
    assert_eq!(
        q.warnings(),
        &[QueryWarning::UnknownField {
            field: "bla".into()
        }]
    );
    assert_eq!(q.get("tags", false), strings(&["x", "cat"]).as_slice());
}

#[test]
fn test_empty_field_warns() {
    let q = parse_query("p: fn:x");
    assert_eq!(
        q.warnings(),
        &[QueryWarning::UnusedField {
            field: "pack_name".into()
        }]
    );
    assert_eq!(q.get("filename", false), strings(&["x"]).as_slice());

    let trailing = parse_query("cat ext:");
    assert_eq!(
        trailing.warnings(),
        &[QueryWarning::UnusedField { field: "ext".into() }]
    );
}

#[test]
fn test_newline_resets_to_tags() {
    let q = parse_query("p: memes\ncat");
    assert_eq!(q.get("pack_name", false), strings(&["memes"]).as_slice());
    assert_eq!(q.get("tags", false), strings(&["cat"]).as_slice());

    // The reset also clears an unused field without warning.
    let q = parse_query("p:\ncat");
    assert!(q.warnings().is_empty());
    assert_eq!(q.get("tags", false), strings(&["cat"]).as_slice());
}

#[test]
fn test_short_field_returns_to_tags() {
    let q = parse_query("t: gif funny");
    assert_eq!(q.get_first("type", false), Some("gif"));
    assert_eq!(q.get("tags", false), strings(&["funny"]).as_slice());
}

#[test]
fn test_emoji_routed_to_emoji_field() {
    let q = parse_query("p:cats😺 !😡 dog👍🏽");
    assert_eq!(q.get("pack_name", false), strings(&["cats", "dog"]).as_slice());
    assert_eq!(q.get("emoji", false), strings(&["😺", "👍"]).as_slice());
    assert_eq!(q.get("emoji", true), strings(&["😡"]).as_slice());
    assert!(!q.has("tags", false));
}

#[test]
fn test_emoji_only_value_consumes_short_field() {
    let q = parse_query("t:😺 cat");
    assert_eq!(q.get("emoji", false), strings(&["😺"]).as_slice());
    assert_eq!(q.get_first("type", false), Some("sticker"));
    assert_eq!(q.get("tags", false), strings(&["cat"]).as_slice());
}

#[test]
fn test_pretty_round_trip() {
    let registry = FieldRegistry::standard();
    let inputs = [
        "foo !bar",
        "p:p:bob t:gif 😺 !🐶",
        "!s: a b\nc fn:x.png e:png a:no",
        "!a:yes m:y delete:y",
        "t:zz bla:x cat",
    ];
    for input in inputs {
        let first = parse_query(input);
        let pretty = first.pretty(registry);
        let second = parse_query(&pretty);
        let left: Vec<_> = first.iter().collect();
        let right: Vec<_> = second.iter().collect();
        assert_eq!(left, right, "round trip of {:?} via {:?}", input, pretty);
    }
}

#[test]
fn test_strip_emojis_output_has_no_plain_emoji_and_unique_list() {
    let inputs = ["😀😀 hi 👍🏽👍", "a👨‍👩‍👧b", "❤️❤", "plain text", ""];
    for input in inputs {
        let (clean, found) = strip_emojis(input);
        for e in &found {
            assert!(!clean.contains(e.as_str()), "{:?} left in {:?}", e, clean);
        }
        let mut dedup = found.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), found.len());
        let unique: std::collections::HashSet<_> = found.iter().collect();
        assert_eq!(unique.len(), found.len());
    }
}

#[test]
fn test_tag_merge_add_and_remove() {
    let mut doc = TaggedDocument::new(1, 1, 0, MediaType::Sticker);
    doc.tags = strings(&["a", "b"]);

    let q = parse_tags("c !a");
    assert_eq!(q.merge_into(&doc).tags, strings(&["b", "c"]));

    doc.tags = strings(&["a"]);
    let q = parse_tags("a !a");
    assert!(q.merge_into(&doc).tags.is_empty());
}

#[test]
fn test_tagging_parse_has_no_default_type() {
    let q = parse_tags("cat delete:yes");
    assert!(!q.has("type", false));
    assert_eq!(q.get_first("delete", false), Some("yes"));
}

#[test]
fn test_parse_never_panics_on_odd_input() {
    for input in [":", "::", "!", "!:", "a:", "\n\n", "t:!!", "💀:x", "-:-"] {
        let q: ParsedQuery = parse_query(input);
        assert!(q.get("type", false).len() <= 1);
    }
}
