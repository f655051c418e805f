use iced::{Event};

use crate::config::types::Config;
use crate::device::types::{DeviceEvent, Notice, NoticeActions, PairedDevice};
use crate::keys::KeyDefinition;

/// Something the user must click away before the keyboard is shown again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppNotice {
    Device(Notice),
    // informational, dismiss only
    Message(String),
}

impl AppNotice {
    pub fn title(&self) -> &str {
        match self {
            AppNotice::Device(notice) => notice.title(),
            AppNotice::Message(message) => message.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppNotice::Device(notice) => notice.message(),
            AppNotice::Message(_) => "",
        }
    }

    pub fn actions(&self) -> NoticeActions {
        match self {
            AppNotice::Device(notice) => notice.actions(),
            AppNotice::Message(_) => NoticeActions::Dismiss,
        }
    }
}

/// What answering the front notice asks of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeOutcome {
    Exit,
    Dismiss,
    Connect(PairedDevice),
}

/// Removes the front notice and resolves the user's answer to it. Declining always exits.
pub fn answer_notice(notices: &mut Vec<AppNotice>, confirmed: bool) -> Option<NoticeOutcome> {
    if notices.is_empty() {
        return None;
    }

    let notice = notices.remove(0);
    if !confirmed {
        return Some(NoticeOutcome::Exit);
    }

    let outcome = match notice.actions() {
        NoticeActions::Exit => NoticeOutcome::Exit,
        NoticeActions::Dismiss => NoticeOutcome::Dismiss,
        NoticeActions::Confirm => match notice {
            AppNotice::Device(Notice::ModuleFound(device)) => NoticeOutcome::Connect(device),
            _ => NoticeOutcome::Dismiss,
        },
    };
    Some(outcome)
}

#[derive(Debug, Clone)]
pub enum Message {
    EventOccurred(Event),
    ConfigLoadComplete((Config, Option<String>)),
    DeviceEvent(DeviceEvent),
    KeyPress(KeyDefinition),
    NoticeConfirmed,
    NoticeDeclined,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hc06() -> PairedDevice {
        PairedDevice { id: "00:22:09:02:68:3E".to_string(), name: Some("HC-06".to_string()) }
    }

    #[test]
    fn declining_the_prompt_exits_without_connecting() {
        let mut notices = vec![AppNotice::Device(Notice::ModuleFound(hc06()))];
        assert_eq!(answer_notice(&mut notices, false), Some(NoticeOutcome::Exit));
        assert!(notices.is_empty());
    }

    #[test]
    fn confirming_the_prompt_connects_to_that_device() {
        let mut notices = vec![AppNotice::Device(Notice::ModuleFound(hc06()))];
        assert_eq!(answer_notice(&mut notices, true), Some(NoticeOutcome::Connect(hc06())));
        assert!(notices.is_empty());
    }

    #[test]
    fn per_device_notices_are_answered_in_order() {
        let mut notices = vec![
            AppNotice::Device(Notice::ModuleNotFound),
            AppNotice::Device(Notice::ModuleFound(hc06())),
        ];

        // "Okay" on the not-found notice closes the application before the prompt is reached
        assert_eq!(answer_notice(&mut notices, true), Some(NoticeOutcome::Exit));
        assert_eq!(notices, vec![AppNotice::Device(Notice::ModuleFound(hc06()))]);
    }

    #[test]
    fn informational_notices_only_dismiss() {
        let mut notices = vec![
            AppNotice::Message("Failed to load config".to_string()),
            AppNotice::Device(Notice::Connected),
        ];

        assert_eq!(answer_notice(&mut notices, true), Some(NoticeOutcome::Dismiss));
        assert_eq!(answer_notice(&mut notices, true), Some(NoticeOutcome::Dismiss));
        assert_eq!(answer_notice(&mut notices, true), None);
    }

    #[test]
    fn failures_exit() {
        for notice in [Notice::PermissionDenied, Notice::BluetoothDisabled, Notice::ConnectionFailed] {
            let mut notices = vec![AppNotice::Device(notice)];
            assert_eq!(answer_notice(&mut notices, true), Some(NoticeOutcome::Exit));
        }
    }
}
