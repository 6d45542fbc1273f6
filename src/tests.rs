//! Shared test-only helpers.

use std::fmt::Debug;

use itertools::Itertools;

use crate::parse::Document;

/// Asserts that an expression matches a pattern, with an optional
/// match guard, in the manner of the unstable `assert_matches!()`.
macro_rules! assert_matches {
    ($left:expr, $($pattern:pat_param)|+ $(if $guard:expr)? $(,)?) => {
        match $left {
            $($pattern)|+ $(if $guard)? => {}
            ref left => {
                crate::tests::assert_matches_failed(
                    left,
                    stringify!($($pattern)|+ $(if $guard)?),
                );
            }
        }
    };
}

pub(crate) use assert_matches;

#[track_caller]
pub(crate) fn assert_matches_failed(left: impl Debug, right: &str) {
    panic!(
        "{}",
        indoc::formatdoc! {"
            assertion `left matches right` failed
              left: {left:?}
             right: {right:?}
        "},
    );
}

/// Parses an OpenAPI 3 document whose `paths` are the given
/// (unindented) YAML mapping.
#[track_caller]
pub(crate) fn document_with_paths(paths: &str) -> Document {
    let paths = paths.lines().map(|line| format!("  {line}")).join("\n");
    let yaml = indoc::formatdoc! {"
        openapi: 3.0.3
        info:
          title: Watering Hole
          version: 1.0.0
        paths:
        {paths}
    "};
    match Document::from_yaml(&yaml) {
        Ok(doc) => doc,
        Err(err) => panic!("failed to parse fixture: {err}\n{yaml}"),
    }
}
