//! Assertion helpers for tests.

/// Assert that a result is Ok and return the inner value.
#[allow(dead_code)]
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("{} failed: {:?}", context, e),
    }
}

/// Assert that an error's display text contains `expected`.
#[allow(dead_code)]
pub fn assert_error_contains<T: std::fmt::Debug, E: std::fmt::Display>(
    result: Result<T, E>,
    expected: &str,
) {
    match result {
        Ok(v) => panic!("expected error containing '{}', got Ok({:?})", expected, v),
        Err(e) => {
            let msg = e.to_string();
            assert!(
                msg.contains(expected),
                "error '{}' should contain '{}'",
                msg,
                expected
            );
        }
    }
}
