//! Dialog lifecycle event codes.

use std::fmt;

/// The user closed the dialog window.
pub const USER_CLOSED: i32 = 12006;
/// The dialog page could not be loaded.
pub const PAGE_NOT_FOUND: i32 = 12002;
/// The dialog page was served over an insecure scheme.
pub const MIXED_CONTENT: i32 = 12003;
/// The host already shows a dialog for this panel.
pub const HOST_DIALOG_OPEN: i32 = 12007;
/// The user dismissed the dialog prompt without opening it.
pub const DIALOG_IGNORED: i32 = 12009;

/// A status code delivered on the platform lifecycle channel.
///
/// Every code is terminal for the dialog. Only [`LifecycleEvent::UserClosed`]
/// is expected; the rest are surfaced to diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    UserClosed,
    PageNotFound,
    MixedContent,
    HostDialogOpen,
    DialogIgnored,
    Other(i32),
}

impl LifecycleEvent {
    pub fn from_code(code: i32) -> Self {
        match code {
            USER_CLOSED => Self::UserClosed,
            PAGE_NOT_FOUND => Self::PageNotFound,
            MIXED_CONTENT => Self::MixedContent,
            HOST_DIALOG_OPEN => Self::HostDialogOpen,
            DIALOG_IGNORED => Self::DialogIgnored,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::UserClosed => USER_CLOSED,
            Self::PageNotFound => PAGE_NOT_FOUND,
            Self::MixedContent => MIXED_CONTENT,
            Self::HostDialogOpen => HOST_DIALOG_OPEN,
            Self::DialogIgnored => DIALOG_IGNORED,
            Self::Other(code) => code,
        }
    }

    pub fn is_expected(self) -> bool {
        self == Self::UserClosed
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserClosed => f.write_str("user closed the dialog"),
            Self::PageNotFound => f.write_str("dialog page not found"),
            Self::MixedContent => f.write_str("dialog page uses an insecure scheme"),
            Self::HostDialogOpen => f.write_str("host already shows a dialog"),
            Self::DialogIgnored => f.write_str("dialog prompt ignored"),
            Self::Other(code) => write!(f, "unrecognized lifecycle code {code}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_closed_is_the_only_expected_code() {
        assert_eq!(LifecycleEvent::from_code(12006), LifecycleEvent::UserClosed);
        assert!(LifecycleEvent::from_code(12006).is_expected());
        assert!(!LifecycleEvent::from_code(12002).is_expected());
        assert!(!LifecycleEvent::from_code(0).is_expected());
    }

    #[test]
    fn codes_round_trip() {
        for code in [12006, 12002, 12003, 12007, 12009, 4242, -1] {
            assert_eq!(LifecycleEvent::from_code(code).code(), code);
        }
    }

    #[test]
    fn unknown_code_is_other() {
        let event = LifecycleEvent::from_code(99);
        assert_eq!(event, LifecycleEvent::Other(99));
        assert_eq!(event.to_string(), "unrecognized lifecycle code 99");
    }
}
