//! Status codes and their behavioral classes.

use std::fmt;

/// A two-digit response status as sent by the upstream server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(u8);

/// What the gateway does with a response, decided by its status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// 10 and 11: ask the user for a query string.
    Input { secret: bool },
    /// 20: a body follows.
    Success,
    /// 30 and 31.
    Redirect { permanent: bool },
    /// 40 to 44.
    TemporaryFailure,
    /// 50 and 51.
    PermanentFailure,
    /// 52, 53 and 59.
    OtherFailure,
    /// Anything the gateway does not know how to handle.
    Unrecognized,
}

impl Status {
    pub fn new(code: u8) -> Self {
        Self(code)
    }

    pub fn code(&self) -> u8 {
        self.0
    }

    /// The tens digit of the code.
    pub fn class(&self) -> u8 {
        self.0 / 10
    }

    /// Whether a body follows the header line.
    pub fn has_body(&self) -> bool {
        self.class() == 2
    }

    pub fn kind(&self) -> StatusKind {
        match self.0 {
            10 => StatusKind::Input { secret: false },
            11 => StatusKind::Input { secret: true },
            20 => StatusKind::Success,
            30 => StatusKind::Redirect { permanent: false },
            31 => StatusKind::Redirect { permanent: true },
            40..=44 => StatusKind::TemporaryFailure,
            50 | 51 => StatusKind::PermanentFailure,
            52 | 53 | 59 => StatusKind::OtherFailure,
            _ => StatusKind::Unrecognized,
        }
    }

    /// Label used for metrics.
    pub fn kind_label(&self) -> &'static str {
        match self.kind() {
            StatusKind::Input { .. } => "input",
            StatusKind::Success => "success",
            StatusKind::Redirect { .. } => "redirect",
            StatusKind::TemporaryFailure => "temporary_failure",
            StatusKind::PermanentFailure => "permanent_failure",
            StatusKind::OtherFailure => "other_failure",
            StatusKind::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_codes() {
        assert_eq!(Status::new(10).kind(), StatusKind::Input { secret: false });
        assert_eq!(Status::new(11).kind(), StatusKind::Input { secret: true });
        assert_eq!(Status::new(12).kind(), StatusKind::Unrecognized);
    }

    #[test]
    fn test_failure_ranges() {
        for code in 40..=44 {
            assert_eq!(Status::new(code).kind(), StatusKind::TemporaryFailure);
        }
        assert_eq!(Status::new(45).kind(), StatusKind::Unrecognized);
        assert_eq!(Status::new(51).kind(), StatusKind::PermanentFailure);
        assert_eq!(Status::new(59).kind(), StatusKind::OtherFailure);
        assert_eq!(Status::new(60).kind(), StatusKind::Unrecognized);
    }

    #[test]
    fn test_only_success_class_has_body() {
        assert!(Status::new(20).has_body());
        assert!(!Status::new(30).has_body());
        assert!(!Status::new(51).has_body());
    }
}
