use std::convert::Infallible;
use iced::subscription::{self, Subscription};
use futures::{StreamExt, SinkExt};
use futures::channel::mpsc::{channel, Sender};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::config::types::Config;
use crate::device::constants::{EVENT_QUEUE_SIZE, KEY_QUEUE_SIZE};
use crate::device::manager::ConnectionManager;
use crate::device::platform::{BluetoothSerial, Permissions};
use crate::device::types::{DeviceCommand, DeviceEvent};

async fn send_event(output: &mut Sender<DeviceEvent>, event: DeviceEvent) {
    if let Err(err) = output.send(event).await {
        warn!("Failed to send DeviceEvent: {:?}", err);
    }
}

/// Runs the startup sequence, then serves prompt answers and key presses until cancelled or
/// until the GUI drops its command sender.
pub async fn run_connection<B: BluetoothSerial + Permissions>(
    cancel: CancellationToken,
    mut manager: ConnectionManager<B>,
    mut output: Sender<DeviceEvent>,
) {
    let (command_sender, mut command_receiver) = channel::<DeviceCommand>(KEY_QUEUE_SIZE);
    send_event(&mut output, DeviceEvent::Ready(command_sender)).await;

    for notice in manager.startup().await {
        send_event(&mut output, DeviceEvent::Notice(notice)).await;
    }

    'mainloop: loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break 'mainloop;
            },
            command = command_receiver.next() => match command {
                Some(DeviceCommand::ConnectConfirmed(device)) => {
                    if let Some(notice) = manager.connect_to_device(device).await {
                        send_event(&mut output, DeviceEvent::Notice(notice)).await;
                    }
                },
                Some(DeviceCommand::KeyPress(key)) => {
                    manager.write_code(key).await;
                },
                None => {
                    debug!("Command sender dropped");
                    break 'mainloop;
                },
            },
        }
    }

    info!("Connection task stopped");
}

#[cfg(target_os = "linux")]
fn platform_bluetooth(config: &Config) -> crate::device::bluez::BluezBluetooth {
    crate::device::bluez::BluezBluetooth::new(config.peripheral_address.clone())
}

#[cfg(not(target_os = "linux"))]
fn platform_bluetooth(config: &Config) -> crate::device::btle::BtleBluetooth {
    crate::device::btle::BtleBluetooth::new(
        config.peripheral_address.clone(),
        std::path::PathBuf::from(&config.serial_port),
    )
}

async fn connect_device(cancel: CancellationToken, config: Config, output: Sender<DeviceEvent>) -> Infallible {
    let bluetooth = platform_bluetooth(&config);
    let manager = ConnectionManager::new(bluetooth, config.peripheral_address, config.discovery_alerts)
        .with_events(output.clone());

    run_connection(cancel, manager, output).await;

    // note: subscription::channel expects the future to never resolve (Infallible)
    futures::future::pending().await
}

pub fn connect_device_subscription(cancel: CancellationToken, config: Config) -> Subscription<DeviceEvent> {
    struct Connect;

    subscription::channel(
        std::any::TypeId::of::<Connect>(),
        EVENT_QUEUE_SIZE,
        move |subscription_sender| {
            let cancel2 = cancel.clone();
            let config2 = config.clone();

            async move {
                connect_device(cancel2, config2, subscription_sender).await
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use futures::channel::mpsc::Receiver;
    use super::*;
    use crate::config::types::DiscoveryAlerts;
    use crate::device::constants::PERIPHERAL_ADDRESS;
    use crate::device::manager::tests::{hc06, FakeBluetooth};
    use crate::device::types::{ConnectionState, Notice};
    use crate::keys::find_key;

    async fn next_notice(events: &mut Receiver<DeviceEvent>) -> Notice {
        while let Some(event) = events.next().await {
            if let DeviceEvent::Notice(notice) = event {
                return notice;
            }
        }
        panic!("event stream ended without a notice");
    }

    #[tokio::test]
    async fn confirm_then_play() {
        let bluetooth = FakeBluetooth::default();
        let state = bluetooth.state.clone();
        let (output, mut events) = channel::<DeviceEvent>(EVENT_QUEUE_SIZE);
        let manager = ConnectionManager::new(bluetooth, PERIPHERAL_ADDRESS.to_string(), DiscoveryAlerts::Aggregate)
            .with_events(output.clone());
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_connection(cancel.clone(), manager, output));

        let mut commands = match events.next().await {
            Some(DeviceEvent::Ready(sender)) => sender,
            other => panic!("expected Ready, got {:?}", other),
        };

        assert_eq!(next_notice(&mut events).await, Notice::ModuleFound(hc06()));
        commands.send(DeviceCommand::ConnectConfirmed(hc06())).await.unwrap();
        assert_eq!(next_notice(&mut events).await, Notice::Connected);

        for label in ["C", "C#", "B"] {
            commands.send(DeviceCommand::KeyPress(find_key(label).unwrap())).await.unwrap();
        }

        // dropping the sender ends the task once the queue is drained
        drop(commands);
        task.await.unwrap();

        let state = state.lock().unwrap();
        assert_eq!(state.connects, vec![PERIPHERAL_ADDRESS.to_string()]);
        assert_eq!(state.written, b"abl".to_vec());
    }

    #[tokio::test]
    async fn cancel_stops_the_task() {
        let (output, mut events) = channel::<DeviceEvent>(EVENT_QUEUE_SIZE);
        let bluetooth = FakeBluetooth { enabled: false, enable_on_request: false, ..Default::default() };
        let manager = ConnectionManager::new(bluetooth, PERIPHERAL_ADDRESS.to_string(), DiscoveryAlerts::Aggregate);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_connection(cancel.clone(), manager, output));

        let _commands = match events.next().await {
            Some(DeviceEvent::Ready(sender)) => sender,
            other => panic!("expected Ready, got {:?}", other),
        };
        assert_eq!(next_notice(&mut events).await, Notice::BluetoothDisabled);

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn sessions_reach_the_gui() {
        let (output, events) = channel::<DeviceEvent>(EVENT_QUEUE_SIZE);
        let manager = ConnectionManager::new(FakeBluetooth::default(), PERIPHERAL_ADDRESS.to_string(), DiscoveryAlerts::Aggregate)
            .with_events(output.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        run_connection(cancel, manager, output).await;

        let stages: Vec<ConnectionState> = events
            .filter_map(|event| async move {
                match event {
                    DeviceEvent::SessionChange(session) => Some(session.stage),
                    _ => None,
                }
            })
            .collect()
            .await;

        assert_eq!(stages.last(), Some(&ConnectionState::Disconnected));
    }
}
