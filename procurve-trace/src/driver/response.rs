//! Result of one command round trip.

use std::time::Duration;

/// Output of a command, up to the next CLI prompt.
///
/// A response whose output carries a platform failure marker (such as
/// `Invalid input`) is still a response: the device answered. Callers
/// branch on [`Response::is_success`].
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was sent.
    pub command: String,

    /// Output with the command echo and trailing prompt removed.
    pub result: String,

    /// Output as received.
    pub raw_result: String,

    /// The prompt that ended the output.
    pub prompt: String,

    /// Round-trip time.
    pub elapsed: Duration,

    /// Failure marker found in the output, if any.
    pub failure_message: Option<String>,
}

impl Response {
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// Mark the response as failed with the marker that was found.
    pub fn with_failure(mut self, marker: impl Into<String>) -> Self {
        self.failure_message = Some(marker.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.result.lines()
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.result.contains(pattern)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_response() {
        let response = Response::new(
            "show lacp interfaces Trk1",
            "Invalid input: interfaces",
            "show lacp interfaces Trk1\r\nInvalid input: interfaces\r\nHP# ",
            "HP#",
            Duration::from_millis(12),
        )
        .with_failure("Invalid input");

        assert!(!response.is_success());
        assert_eq!(response.failure_message.as_deref(), Some("Invalid input"));
        assert!(response.contains("interfaces"));
        assert_eq!(response.to_string(), "Invalid input: interfaces");
    }

    #[test]
    fn test_lines() {
        let response = Response::new("show telnet", "a\nb", "", "", Duration::ZERO);
        assert!(response.is_success());
        assert_eq!(response.lines().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
