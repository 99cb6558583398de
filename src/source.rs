use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::cards::{Card, CardKind};
use crate::http_client::http_client;
use crate::state::{Delta, ProviderCommand};
use crate::stats_fetch::{self, FetchError, StatsSnapshot};

/// Where the dashboard gets its data from.
pub trait DashboardSource: Send {
    fn fetch_stats(&mut self) -> Result<StatsSnapshot, FetchError>;
    fn fetch_cards(&mut self, kind: CardKind) -> Result<Vec<Card>, FetchError>;
    fn describe(&self) -> String;
}

pub struct HttpSource {
    base_url: String,
    client: &'static Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: http_client(timeout)?,
        })
    }
}

impl DashboardSource for HttpSource {
    fn fetch_stats(&mut self) -> Result<StatsSnapshot, FetchError> {
        stats_fetch::fetch_stats(self.client, &self.base_url)
    }

    fn fetch_cards(&mut self, kind: CardKind) -> Result<Vec<Card>, FetchError> {
        stats_fetch::fetch_cards(self.client, &self.base_url, kind)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Runs `source` on a worker thread. Commands are served in arrival order and
/// the thread ends once every command sender is dropped.
pub fn spawn_provider(
    mut source: Box<dyn DashboardSource>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let delta = serve(source.as_mut(), cmd);
            if tx.send(delta).is_err() {
                break;
            }
        }
        debug!("provider worker stopped");
    })
}

pub fn serve(source: &mut dyn DashboardSource, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::FetchStats => match source.fetch_stats() {
            Ok(snapshot) => Delta::StatsFetched(snapshot),
            Err(err) => Delta::StatsFailed(err.to_string()),
        },
        ProviderCommand::LoadCards(kind) => match source.fetch_cards(kind) {
            Ok(cards) => Delta::SetCards { kind, cards },
            Err(err) => Delta::CardsFailed {
                kind,
                error: err.to_string(),
            },
        },
    }
}
