//! Localhost availability check for wiremock-backed tests.
//!
//! Sandboxed runners sometimes forbid binding sockets. Tests that need a mock
//! server call [`start_mock_server_or_skip`] and return early on `None`, unless
//! `GRABBER_REQUIRE_SOCKET_TESTS` is set, in which case they fail loudly.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "GRABBER_REQUIRE_SOCKET_TESTS";

/// What a socket-bound test should do in the current environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketVerdict {
    Run,
    Skip,
    Fail,
}

/// Pure decision table behind [`should_skip_socket_bound_test`].
#[must_use]
pub fn socket_verdict(can_bind: bool, required: bool) -> SocketVerdict {
    match (can_bind, required) {
        (true, _) => SocketVerdict::Run,
        (false, false) => SocketVerdict::Skip,
        (false, true) => SocketVerdict::Fail,
    }
}

/// Reads a truthy flag value (`1`, `true`, `yes`, any case).
#[must_use]
pub fn is_truthy(value: Option<&str>) -> bool {
    value.is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[must_use]
pub fn socket_tests_required() -> bool {
    is_truthy(std::env::var(REQUIRE_ENV).ok().as_deref())
}

#[track_caller]
#[must_use]
pub fn should_skip_socket_bound_test() -> bool {
    let can_bind = TcpListener::bind("127.0.0.1:0").is_ok();
    let location = Location::caller();
    match socket_verdict(can_bind, socket_tests_required()) {
        SocketVerdict::Run => false,
        SocketVerdict::Fail => panic!(
            "{}:{} needs a localhost socket and {REQUIRE_ENV} is set",
            location.file(),
            location.line()
        ),
        SocketVerdict::Skip => {
            eprintln!(
                "skipping {}:{}: cannot bind 127.0.0.1 (set {REQUIRE_ENV}=1 to fail instead)",
                location.file(),
                location.line()
            );
            true
        }
    }
}

#[track_caller]
pub fn start_mock_server_or_skip() -> impl std::future::Future<Output = Option<MockServer>> {
    let skip = should_skip_socket_bound_test();
    async move {
        if skip {
            None
        } else {
            Some(MockServer::start().await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_verdict_table() {
        assert_eq!(socket_verdict(true, false), SocketVerdict::Run);
        assert_eq!(socket_verdict(true, true), SocketVerdict::Run);
        assert_eq!(socket_verdict(false, false), SocketVerdict::Skip);
        assert_eq!(socket_verdict(false, true), SocketVerdict::Fail);
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(Some("1")));
        assert!(is_truthy(Some("TRUE")));
        assert!(is_truthy(Some("yes")));
        assert!(!is_truthy(Some("0")));
        assert!(!is_truthy(Some("")));
        assert!(!is_truthy(None));
    }
}
