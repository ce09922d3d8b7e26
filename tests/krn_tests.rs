//! KRN parsing, matching and ancestor pattern tests

use iam_krn::KrnError;
use iam_krn::identifier::{Krn, KrnParts, Level};
use rstest::rstest;

#[rstest]
#[case("krn:iam:kaa::endpoint/42")]
#[case("krn:iam:kaa:/eu/prod:endpoint/group/a/42")]
#[case("krn:iam:kaa:/eu:user/1")]
#[case("krn:iam:*")]
#[case("krn:iam:kaa:*")]
#[case("krn:iam:kaa:/eu/*")]
#[case("krn:iam:kaa::*")]
#[case("krn:iam:kaa::endpoint/*")]
#[case("krn:iam:kaa::endpoint/group/*")]
#[case("*")]
fn test_parse_renders_canonical_text(#[case] text: &str) {
    let krn = Krn::parse(text).unwrap();
    assert_eq!(krn.as_str(), text);
    assert_eq!(krn.to_string(), text);
    assert_eq!(Krn::parse(krn.as_str()).unwrap(), krn);
}

#[rstest]
#[case("krn:iam:*", Level::TenantId)]
#[case("krn:iam:kaa:*", Level::Pool)]
#[case("krn:iam:kaa:/eu/*", Level::Pool)]
#[case("krn:iam:kaa::*", Level::ResourceType)]
#[case("krn:iam:kaa::endpoint/*", Level::ResourceId)]
#[case("*", Level::Service)]
fn test_wildcard_level(#[case] text: &str, #[case] level: Level) {
    let krn = Krn::parse(text).unwrap();
    assert!(krn.is_wildcard());
    assert_eq!(krn.wildcard_level(), Some(level));
}

#[test]
fn test_service_wildcard_collapses_to_blanket() {
    let krn = Krn::parse("krn:*").unwrap();
    assert!(krn.is_blanket());
    assert_eq!(krn.as_str(), "*");
    assert_eq!(krn, Krn::blanket());
}

#[test]
fn test_accessors() {
    let krn = Krn::parse("krn:iam:kaa:/eu/prod:endpoint/group/a/42").unwrap();
    assert_eq!(krn.prefix_token(), Some("krn"));
    assert_eq!(krn.service(), Some("iam"));
    assert_eq!(krn.tenant_id(), Some("kaa"));
    assert_eq!(krn.pool(), ["", "eu", "prod"]);
    assert_eq!(krn.resource_type(), Some("endpoint"));
    assert_eq!(krn.resource_path(), ["group", "a"]);
    assert_eq!(krn.resource_id(), Some("42"));

    let blanket = Krn::blanket();
    assert_eq!(blanket.service(), None);
    assert!(blanket.pool().is_empty());
    assert_eq!(blanket.resource_id(), None);
}

#[rstest]
#[case("krn:svc:*:x:y")]
#[case("krn:iam:kaa::end*point/1")]
#[case("krn:iam:*:*")]
#[case("krn:iam:kaa::endpoint/*/1")]
fn test_rejects_misplaced_wildcards(#[case] text: &str) {
    let err = Krn::parse(text).unwrap_err();
    assert!(err.is_wildcard_error(), "{text}: {err}");
}

#[rstest]
#[case("")]
#[case("krn::tenant::type/id")]
#[case(":iam:kaa::endpoint/1")]
#[case("krn:iam:kaa::endpoint/")]
#[case("krn:iam:kaa::endpoint")]
#[case("krn:iam:kaa:endpoint/1")]
#[case("krn:iam:kaa::endpoint/1:extra")]
#[case("krn:iam:kaa:eu:endpoint/1")]
#[case("krn:iam:k a::endpoint/1")]
#[case("krn")]
fn test_rejects_malformed(#[case] text: &str) {
    let err = Krn::parse(text).unwrap_err();
    assert!(matches!(err, KrnError::Malformed(_)), "{text}: {err}");
}

#[test]
fn test_error_messages() {
    assert_eq!(
        Krn::parse("krn:svc:*:x:y").unwrap_err().to_string(),
        "malformed wildcard KRN: misplaced asterisk at index 8"
    );
    assert!(matches!(
        Krn::parse("").unwrap_err(),
        KrnError::Malformed(msg) if msg == "empty prefix token"
    ));
    assert!(matches!(
        Krn::parse("krn:iam:kaa").unwrap_err(),
        KrnError::Malformed(msg) if msg == "too few tokens in a non-wildcard KRN"
    ));
    assert!(matches!(
        Krn::parse("krn:iam:*:x*").unwrap_err(),
        KrnError::MalformedWildcard(msg) if msg == "only one asterisk allowed"
    ));
}

#[test]
fn test_new_matches_parse() {
    let built = Krn::new(
        KrnParts::new("iam", "kaa")
            .with_pool(["", "eu"])
            .with_resource("user", "1"),
    )
    .unwrap();
    assert_eq!(built, Krn::parse("krn:iam:kaa:/eu:user/1").unwrap());
}

#[rstest]
#[case("krn:iam:kaa::endpoint/42", "krn:iam:kaa::endpoint/42", true)]
#[case("krn:iam:kaa::endpoint/42", "krn:iam:kaa::endpoint/*", true)]
#[case("krn:iam:kaa::endpoint/42", "krn:iam:kaa::*", true)]
#[case("krn:iam:kaa::endpoint/42", "krn:iam:kaa:*", true)]
#[case("krn:iam:kaa::endpoint/42", "krn:iam:*", true)]
#[case("krn:iam:kaa::endpoint/42", "*", true)]
#[case("krn:iam:kaa::endpoint/42", "krn:iam:kaa::endpoint/43", false)]
#[case("krn:iam:kaa::endpoint/42", "krn:iam:other:*", false)]
#[case("krn:iam:kaa::endpoint/42", "krn:iam:kaa:/eu/*", false)]
#[case("krn:iam:kaa::endpoint/*", "krn:iam:kaa::endpoint/42", false)]
#[case("krn:iam:kaa:/eu/prod:user/1", "krn:iam:kaa:/eu/*", true)]
#[case("krn:iam:kaa:/eu:user/1", "krn:iam:kaa:/eu/*", false)]
#[case("krn:iam:kaa:/eu:user/1", "krn:iam:kaa:/eu:*", true)]
#[case("*", "krn:iam:*", false)]
fn test_matches(#[case] value: &str, #[case] pattern: &str, #[case] expected: bool) {
    let value = Krn::parse(value).unwrap();
    let pattern = Krn::parse(pattern).unwrap();
    assert_eq!(value.matches(&pattern), expected);
}

#[rstest]
#[case("krn:iam:kaa::endpoint/42")]
#[case("krn:iam:kaa::endpoint/*")]
#[case("*")]
fn test_matches_is_reflexive(#[case] text: &str) {
    let krn = Krn::parse(text).unwrap();
    assert!(krn.matches(&krn));
}

#[test]
fn test_ancestor_patterns_concrete() {
    let krn = Krn::parse("krn:iam:kaa::endpoint/42").unwrap();
    assert_eq!(
        krn.ancestor_patterns(),
        vec![
            "krn:iam:kaa::endpoint/42",
            "krn:iam:kaa::endpoint/*",
            "krn:iam:kaa::*",
            "krn:iam:kaa:*",
            "krn:iam:*",
            "*",
        ]
    );
}

#[test]
fn test_ancestor_patterns_with_pool_and_path() {
    let krn = Krn::parse("krn:iam:kaa:/eu:endpoint/group/42").unwrap();
    assert_eq!(
        krn.ancestor_patterns(),
        vec![
            "krn:iam:kaa:/eu:endpoint/group/42",
            "krn:iam:kaa:/eu:endpoint/group/*",
            "krn:iam:kaa:/eu:endpoint/*",
            "krn:iam:kaa:/eu:*",
            "krn:iam:kaa:/*",
            "krn:iam:kaa:*",
            "krn:iam:*",
            "*",
        ]
    );
}

#[test]
fn test_ancestor_patterns_wildcard() {
    let krn = Krn::parse("krn:iam:kaa::*").unwrap();
    assert_eq!(
        krn.ancestor_patterns(),
        vec!["krn:iam:kaa::*", "krn:iam:kaa:*", "krn:iam:*", "*"]
    );
    assert_eq!(Krn::blanket().ancestor_patterns(), vec!["*"]);
}

#[test]
fn test_every_ancestor_matches() {
    let krn = Krn::parse("krn:iam:kaa:/eu:endpoint/group/42").unwrap();
    for pattern in krn.ancestor_patterns() {
        let pattern = Krn::parse(&pattern).unwrap();
        assert!(krn.matches(&pattern), "{pattern}");
    }
}

#[test]
fn test_parse_all() {
    let krns = Krn::parse_all(["krn:iam:kaa::user/1", "*"]).unwrap();
    assert_eq!(krns.len(), 2);
    assert!(krns[1].is_blanket());

    let err = Krn::parse_all(["krn:iam:kaa::user/1", "krn:iam"]).unwrap_err();
    assert!(matches!(err, KrnError::Malformed(_)));
}

#[test]
fn test_serde() {
    let krn = Krn::parse("krn:iam:kaa::endpoint/42").unwrap();
    let json = serde_json::to_string(&krn).unwrap();
    assert_eq!(json, r#""krn:iam:kaa::endpoint/42""#);
    assert_eq!(serde_json::from_str::<Krn>(&json).unwrap(), krn);

    assert!(serde_json::from_str::<Krn>(r#""krn:iam:*:x""#).is_err());
}
