use futures::channel::mpsc::Sender;
use iced::{Alignment, Application, Command, Element, Length, Settings, Size, Subscription, window};
use iced::event::{self, Event};
use iced::theme::{self, Theme};
use iced::widget::{Column, Row, Space, button, column, container, horizontal_rule, row, text};
use log::{error, info, warn};
use tokio_util::sync::{CancellationToken};

use crate::config::io::{ConfigIO};
use crate::config::types::{Config, ConfigOverrides};
use crate::device::connection::connect_device_subscription;
use crate::device::types::{ConnectionState, DeviceCommand, DeviceEvent, NoticeActions, Session};
use crate::error::AppRunError;
use crate::gui::style::{AccidentalKeyStyleSheet, NaturalKeyStyleSheet};
use crate::gui::types::{answer_notice, AppNotice, Message, NoticeOutcome};
use crate::keys::{keyboard_layout, KeyDefinition, KeySlot};

pub struct ApplicationFlags {
    config_io: ConfigIO,
    overrides: ConfigOverrides,
}

pub struct PianoApplication {
    // this token is cancelled upon exit
    app_cancel: CancellationToken,

    // messages that the user must click away
    notices: Vec<AppNotice>,

    config_io: ConfigIO,
    overrides: ConfigOverrides,
    // None until loaded; the device connection starts once this is set
    config: Option<Config>,

    // commands for the connection task, available once it is running
    device_commands: Option<Sender<DeviceCommand>>,

    // latest state from the connection task
    session: Session,
}

impl PianoApplication {
    fn exit(&mut self) -> Command<Message> {
        info!("Exiting");
        self.app_cancel.cancel();
        window::close(window::Id::MAIN)
    }

    fn load_config(&self) -> Command<Message> {
        let config_io = self.config_io.clone();

        let fut = async move {
            match config_io.read().await {
                Ok(config) => {
                    // writes the defaults on first start
                    if let Err(err) = config_io.save(&config).await {
                        error!("Failed to save config: {:?}", &err);
                    }
                    (config, None)
                },
                Err(err) => {
                    error!("Failed to load config: {:?}", &err);
                    (Config::default(), Some(format!("Failed to load config: {}", &err)))
                },
            }
        };

        Command::perform(fut, Message::ConfigLoadComplete)
    }

    fn send_device_command(&mut self, command: DeviceCommand) {
        match &mut self.device_commands {
            Some(sender) => {
                // never wait for the device, a full queue drops the command
                if let Err(err) = sender.try_send(command) {
                    warn!("Failed to queue device command: {:?}", err);
                }
            },
            None => warn!("Connection task not running; dropping {:?}", command),
        }
    }

    fn notice_view<'a>(&self, notice: &'a AppNotice) -> Element<'a, Message> {
        let actions: Element<Message> = match notice.actions() {
            NoticeActions::Exit | NoticeActions::Dismiss => {
                button(text("Okay")).on_press(Message::NoticeConfirmed).into()
            },
            NoticeActions::Confirm => {
                row![
                    button(text("No")).style(theme::Button::Secondary).on_press(Message::NoticeDeclined),
                    button(text("Yes")).on_press(Message::NoticeConfirmed),
                ].spacing(20).into()
            },
        };

        container(
            column![
                text(notice.title()).size(20),
                text(notice.message()),
                actions,
            ].align_items(Alignment::Center).spacing(20),
        )
        .width(Length::Fill)
        .padding(20)
        .into()
    }
}

fn key_button(key: KeyDefinition, label: &'static str, width: Length, height: Length) -> Element<'static, Message> {
    let style = if key.is_accidental() {
        theme::Button::Custom(Box::new(AccidentalKeyStyleSheet))
    } else {
        theme::Button::Custom(Box::new(NaturalKeyStyleSheet))
    };

    button(text(label).size(if key.is_accidental() { 20 } else { 30 }))
        .style(style)
        .on_press(Message::KeyPress(key))
        .width(width)
        .height(height)
        .padding(10)
        .into()
}

// The upper half of a white key shares its width with the black key to its right.
fn slot_view(slot: KeySlot) -> Element<'static, Message> {
    let upper: Element<Message> = match slot.accidental {
        Some(accidental) => row![
            key_button(slot.natural, "", Length::FillPortion(1), Length::Fill),
            key_button(accidental, accidental.label, Length::FillPortion(2), Length::Fill),
        ].height(Length::FillPortion(1)).into(),
        None => key_button(slot.natural, "", Length::Fill, Length::FillPortion(1)),
    };

    column![
        upper,
        key_button(slot.natural, slot.natural.label, Length::Fill, Length::FillPortion(1)),
    ]
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

fn status_text(session: &Session) -> String {
    if session.loading {
        return "Please wait…".to_string();
    }

    if let Some(device) = session.connected_device() {
        return format!("Connected to {}", device);
    }

    match session.stage {
        ConnectionState::NotChecked => "".to_string(),
        ConnectionState::PermissionDenied => "Not allowed to access Bluetooth!".to_string(),
        ConnectionState::BluetoothDisabled => "Bluetooth is off".to_string(),
        ConnectionState::Disconnected => "Not connected".to_string(),
        ConnectionState::Connecting => "Connecting…".to_string(),
        ConnectionState::Connected => "Connected".to_string(),
    }
}

impl Application for PianoApplication {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ApplicationFlags;

    fn new(flags: ApplicationFlags) -> (PianoApplication, Command<Self::Message>) {
        let app = PianoApplication {
            app_cancel: CancellationToken::new(),
            notices: Vec::new(),
            config_io: flags.config_io,
            overrides: flags.overrides,
            config: None,
            device_commands: None,
            session: Session::default(),
        };

        let command = app.load_config();
        (app, command)
    }

    fn title(&self) -> String {
        String::from(concat!("Mini Piano ", env!("CARGO_PKG_VERSION")))
    }

    fn update(&mut self, message: Message) -> Command<Self::Message> {
        match message {
            Message::ConfigLoadComplete((mut config, error_message)) => {
                info!("Config load complete");
                self.overrides.apply(&mut config);
                info!("Using module {}", config.peripheral_address);
                self.config = Some(config);
                if let Some(error_message) = error_message {
                    self.notices.push(AppNotice::Message(error_message));
                }
            },
            Message::EventOccurred(Event::Window(_, window::Event::CloseRequested)) => {
                info!("Close requested");
                return self.exit();
            },
            Message::DeviceEvent(DeviceEvent::Ready(sender)) => {
                self.device_commands = Some(sender);
            },
            Message::DeviceEvent(DeviceEvent::SessionChange(session)) => {
                self.session = session;
            },
            Message::DeviceEvent(DeviceEvent::Notice(notice)) => {
                self.notices.push(AppNotice::Device(notice));
            },
            Message::KeyPress(key) => {
                self.send_device_command(DeviceCommand::KeyPress(key));
            },
            Message::NoticeConfirmed | Message::NoticeDeclined => {
                let confirmed = matches!(message, Message::NoticeConfirmed);
                match answer_notice(&mut self.notices, confirmed) {
                    Some(NoticeOutcome::Exit) => return self.exit(),
                    Some(NoticeOutcome::Connect(device)) => {
                        self.send_device_command(DeviceCommand::ConnectConfirmed(device));
                    },
                    Some(NoticeOutcome::Dismiss) | None => {},
                }
            },

            _ => {}
        }

        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            event::listen().map(Message::EventOccurred),
        ];

        if let Some(config) = &self.config {
            subscriptions.push(
                connect_device_subscription(self.app_cancel.clone(), config.clone())
                    .map(Message::DeviceEvent)
            );
        }

        Subscription::batch(subscriptions)
    }

    fn view(&self) -> Element<Message> {
        if let Some(notice) = self.notices.first() {
            return self.notice_view(notice);
        }

        let keyboard = Row::with_children(
            keyboard_layout()
                .into_iter()
                .map(slot_view)
        )
            .spacing(2)
            .width(Length::Fill)
            .height(Length::Fill);

        container(
            Column::new()
                .push(
                    row![
                        text("Arduino Mini Piano").size(18),
                        Space::with_width(Length::Fill),
                        text(status_text(&self.session)).size(14),
                    ].align_items(Alignment::Center)
                )
                .push(horizontal_rule(10))
                .push(keyboard)
                .width(Length::Fill)
                .height(Length::Fill),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(20)
        .into()
    }
}

pub fn run_application(config_io: ConfigIO, overrides: ConfigOverrides) -> Result<(), AppRunError> {
    let mut config_locker = config_io.locker()?;
    let _lock_guard = config_locker.lock()?;

    let flags = ApplicationFlags { config_io, overrides };
    let mut settings = Settings::with_flags(flags);

    // handle exits ourselves (Event::CloseRequested)
    settings.id = Some("mini-piano-remote".to_string());
    settings.window.exit_on_close_request = false;
    settings.window.size = Size::new(900.0, 420.0);

    // this function will call process::exit() unless there was a startup error
    PianoApplication::run(settings)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::types::PairedDevice;

    #[test]
    fn status_follows_session() {
        let mut session = Session::default();
        assert_eq!(status_text(&session), "");

        session.loading = true;
        assert_eq!(status_text(&session), "Please wait…");

        session.loading = false;
        session.stage = ConnectionState::Connected;
        session.device = Some(PairedDevice { id: "00:22:09:02:68:3E".to_string(), name: None });
        assert_eq!(status_text(&session), "Connected to 00:22:09:02:68:3E");

        session.stage = ConnectionState::Disconnected;
        session.device = None;
        assert_eq!(status_text(&session), "Not connected");
    }
}
