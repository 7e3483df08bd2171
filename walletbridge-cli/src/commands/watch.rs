//! Watch command - stream push notifications from the node

use anyhow::Result;
use colored::Colorize;
use tokio::sync::mpsc;
use tracing::debug;
use walletbridge_core::PushMessage;

use super::open_session;
use crate::output;

enum Event {
    Message(PushMessage),
    Error(String),
}

pub async fn run(json: bool) -> Result<()> {
    let session = open_session()?;
    let (tx, mut rx) = mpsc::unbounded_channel();

    let on_error_tx = tx.clone();
    session.bridge.notifications.subscribe(
        move |message| {
            let _ = tx.send(Event::Message(message.clone()));
        },
        move |error| {
            let _ = on_error_tx.send(Event::Error(error.message.clone()));
        },
    );

    if !json {
        output::info("Listening for node notifications (Ctrl-C to stop)");
    }

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(Event::Message(PushMessage::ConnectionClosed)) => {
                    if !json {
                        output::warning("Node closed the notification channel");
                    }
                    break;
                }
                Some(Event::Message(PushMessage::Payload(payload))) => {
                    if json {
                        println!("{}", payload);
                    } else {
                        let tag = payload
                            .get("tag")
                            .and_then(|t| t.as_str())
                            .unwrap_or("message");
                        println!("{} {}", tag.bold(), payload.get("contents").unwrap_or(&payload));
                    }
                }
                // The transport gives up after reporting an error
                Some(Event::Error(message)) => {
                    output::error(&message);
                    break;
                }
                None => break,
            },
            _ = session.host.restart_requested() => {
                debug!("Restart requested, stopping watch");
                break;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.bridge.notifications.reset();
    Ok(())
}
