//! Custom assertion macros
//!
//! Assertions over `TestResponse` values with the response body in the
//! failure message.

/// Assert the status of a `TestResponse`
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status,
            $status,
            "unexpected status, body: {}",
            $response.text()
        );
    };
}

/// Assert a JSON error response with the given status and message
#[macro_export]
macro_rules! assert_error {
    ($response:expr, $status:expr, $message:expr) => {
        $crate::assert_status!($response, $status);
        assert_eq!($response.json()["error"], $message);
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}
