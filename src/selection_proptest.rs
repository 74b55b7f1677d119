//! Property-based tests for component selection and credential handling.
//!
//! These tests use proptest to generate random component lists and logins
//! and verify that invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::config::{authenticated_url, parse_base_url, redact_credentials, Login};
    use crate::output::Printer;
    use crate::spec::{self, BaselineSpec};
    use crate::stages::{for_each_selected, Selection};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn spec_with(names: &[String]) -> BaselineSpec {
        let components: Vec<_> = names
            .iter()
            .map(|name| {
                serde_json::json!({
                    "repository-name": name,
                    "github-repository": format!("acme/{}", name),
                    "commit": "abc123",
                    "use-nightly": false,
                })
            })
            .collect();
        let json = serde_json::json!({ "tag": "b1", "components": components });
        spec::parse(&json.to_string()).unwrap()
    }

    fn component_names() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set("[a-z][a-z0-9-]{0,11}", 1..8)
            .prop_map(|set: BTreeSet<String>| set.into_iter().filter(|n| n != "all").collect())
            .prop_filter("at least one component", |names: &Vec<String>| !names.is_empty())
    }

    // ============================================================================
    // Selection property tests
    // ============================================================================

    proptest! {
        /// Property: any word other than `all` selects exactly that name
        #[test]
        fn parse_selects_exactly_the_given_name(name in "[A-Za-z0-9_.-]{1,20}") {
            prop_assume!(name != "all");
            let selection = Selection::parse(&name);
            prop_assert!(selection.includes(&name));
            let other = format!("{}x", name);
            prop_assert!(!selection.includes(&other));
        }

        /// Property: `all` includes every name
        #[test]
        fn all_includes_everything(name in ".*") {
            prop_assert!(Selection::parse("all").includes(&name));
        }

        /// Property: selecting a declared component processes it alone and
        /// skips every other component, in spec order
        #[test]
        fn single_selection_partitions_components(names in component_names(), pick in any::<prop::sample::Index>()) {
            let spec = spec_with(&names);
            let chosen = pick.get(&names).clone();
            let printer = Printer::capturing();

            let report = for_each_selected(&spec, &printer, &Selection::parse(&chosen), "testing", |_| Ok(()))
                .unwrap();

            prop_assert_eq!(report.processed, vec![chosen.clone()]);
            let expected: Vec<String> = names.iter().filter(|n| **n != chosen).cloned().collect();
            prop_assert_eq!(&report.skipped, &expected);
            prop_assert_eq!(printer.lines().len(), expected.len());
        }

        /// Property: `all` processes every component in spec order
        #[test]
        fn all_processes_in_spec_order(names in component_names()) {
            let spec = spec_with(&names);
            let mut seen = Vec::new();
            let report = for_each_selected(&spec, &Printer::capturing(), &Selection::All, "testing", |c| {
                seen.push(c.repository_name.clone());
                Ok(())
            })
            .unwrap();

            prop_assert_eq!(&seen, &names);
            prop_assert!(report.skipped.is_empty());
        }

        /// Property: an undeclared name never reaches the callback
        #[test]
        fn unknown_selection_runs_nothing(names in component_names(), unknown in "[A-Z]{1,8}") {
            let spec = spec_with(&names);
            let mut calls = 0;
            let result = for_each_selected(&spec, &Printer::capturing(), &Selection::parse(&unknown), "testing", |_| {
                calls += 1;
                Ok(())
            });
            prop_assert!(result.is_err());
            prop_assert_eq!(calls, 0);
        }
    }

    // ============================================================================
    // Credential redaction property tests
    // ============================================================================

    proptest! {
        /// Property: redacting an authenticated URL removes the whole login
        #[test]
        fn redaction_removes_any_login(
            username in "[A-Za-z0-9_.-]{1,16}",
            token in "[A-Za-z0-9_@:/+=-]{1,40}",
        ) {
            let base = parse_base_url("https://github.com").unwrap();
            let login = Login { username, token };
            let url = authenticated_url(&base, "acme/backend", &login).unwrap();

            let redacted = redact_credentials(&format!("fatal: could not read {}", url));
            prop_assert_eq!(redacted, "fatal: could not read https://github.com/acme/backend");
        }

        /// Property: text without URLs is left untouched
        #[test]
        fn redaction_keeps_plain_text(text in "[A-Za-z0-9 ,.@]{0,60}") {
            prop_assert_eq!(redact_credentials(&text), text);
        }
    }
}
