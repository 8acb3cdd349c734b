//! Telegram bot notifications
//!
//! A worker task owns the HTTP client and drains an unbounded channel, so
//! `send` returns immediately.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::{NotificationSink, TradeEvent};
use crate::error::{Error, Result};

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

pub struct TelegramNotifier {
    tx: mpsc::UnboundedSender<TradeEvent>,
}

impl TelegramNotifier {
    /// Start the delivery worker; it stops when the notifier is dropped
    pub fn spawn(bot_token: String, chat_id: String) -> Result<(Self, JoinHandle<()>)> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let url = format!("{}/bot{}/sendMessage", TELEGRAM_API, bot_token);

        let (tx, mut rx) = mpsc::unbounded_channel::<TradeEvent>();
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = deliver(&http, &url, &chat_id, &event.message()).await {
                    warn!("Telegram delivery failed for {}: {}", event.mint(), e);
                }
            }
            debug!("Telegram worker stopped");
        });

        Ok((Self { tx }, handle))
    }
}

async fn deliver(http: &reqwest::Client, url: &str, chat_id: &str, text: &str) -> Result<()> {
    let body = SendMessage {
        chat_id,
        text,
        disable_web_page_preview: true,
    };

    let response = http.post(url).json(&body).send().await?;
    if !response.status().is_success() {
        return Err(Error::Notification(format!("Telegram returned {}", response.status())));
    }

    trace!("Sent message: {}", text);
    Ok(())
}

impl NotificationSink for TelegramNotifier {
    fn send(&self, event: TradeEvent) {
        if self.tx.send(event).is_err() {
            warn!("Telegram worker is gone, dropping notification");
        }
    }
}
