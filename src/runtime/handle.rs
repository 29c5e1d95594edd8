use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, error, warn};
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};

use crate::{
    core::store::{NightStore, StoreError},
    night::SleepNight,
    persist::{NightDao, PersistError, PersistResult},
    signal::TrackerSignals,
    types::{EpochMs, NightId, Quality},
};

use super::events::TrackerEvent;

/// Runtime-level failure cases.
#[derive(Debug)]
pub enum RuntimeError {
    /// A DAO call failed; the operation did not complete.
    Persist(PersistError),
    /// The runtime task is gone.
    ChannelClosed,
}

impl From<PersistError> for RuntimeError {
    fn from(value: PersistError) -> Self {
        Self::Persist(value)
    }
}

/// Tuning knobs for the runtime loop.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Bound of the command queue feeding the writer task.
    pub command_queue: usize,
    /// Capacity of the broadcast event stream.
    pub event_capacity: usize,
    /// Restore pending navigation from the DAO on spawn.
    pub restore_signals: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue: 64,
            event_capacity: 256,
            restore_signals: true,
        }
    }
}

/// Derived enablement of the tracker screen's buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlsState {
    /// Start is available while no session is open.
    pub can_start: bool,
    /// Stop is available while a session is open.
    pub can_stop: bool,
    /// Clear is available while the log is nonempty.
    pub can_clear: bool,
}

type DaoCell = Arc<Mutex<Box<dyn NightDao>>>;

/// Cloneable handle to the single-writer tracker runtime.
pub struct TrackerHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<TrackerEvent>,
    nights_rx: watch::Receiver<Vec<SleepNight>>,
    tonight_rx: watch::Receiver<Option<SleepNight>>,
    controls_rx: watch::Receiver<ControlsState>,
    signals: Arc<TrackerSignals>,
}

impl Clone for TrackerHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
            nights_rx: self.nights_rx.clone(),
            tonight_rx: self.tonight_rx.clone(),
            controls_rx: self.controls_rx.clone(),
            signals: Arc::clone(&self.signals),
        }
    }
}

enum Command {
    Start {
        resp: oneshot::Sender<Result<Option<NightId>, RuntimeError>>,
    },
    Stop {
        resp: oneshot::Sender<Result<Option<NightId>, RuntimeError>>,
    },
    SetQuality {
        id: NightId,
        quality: Quality,
        resp: oneshot::Sender<Result<bool, RuntimeError>>,
    },
    Clear {
        resp: oneshot::Sender<Result<usize, RuntimeError>>,
    },
    Night {
        id: NightId,
        resp: oneshot::Sender<Option<SleepNight>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
}

struct StateTx {
    nights: watch::Sender<Vec<SleepNight>>,
    tonight: watch::Sender<Option<SleepNight>>,
    controls: watch::Sender<ControlsState>,
}

impl StateTx {
    fn publish(&self, store: &NightStore) {
        let open = store.open_night().cloned();
        self.controls.send_replace(ControlsState {
            can_start: open.is_none(),
            can_stop: open.is_some(),
            can_clear: !store.is_empty(),
        });
        self.tonight.send_replace(open);
        self.nights.send_replace(store.nights_desc());
    }
}

/// Spawns the tracker runtime and returns its handle.
///
/// When a DAO is supplied, the log and any pending navigation are loaded
/// before the first command is served, and every mutation is mirrored to the
/// DAO on the blocking worker context and awaited before the gesture
/// continues. Without a DAO the store lives purely in memory.
pub fn spawn_tracker(dao: Option<Box<dyn NightDao>>, config: RuntimeConfig) -> TrackerHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue);
    let (events_tx, _) = broadcast::channel::<TrackerEvent>(config.event_capacity);
    let (nights_tx, nights_rx) = watch::channel(Vec::new());
    let (tonight_tx, tonight_rx) = watch::channel(None);
    let (controls_tx, controls_rx) = watch::channel(ControlsState::default());

    let signals = Arc::new(TrackerSignals::new());
    let dao = dao.map(|d| Arc::new(Mutex::new(d)));

    let events_tx_loop = events_tx.clone();
    let signals_loop = Arc::clone(&signals);
    let dao_loop = dao.clone();
    let restore_signals = config.restore_signals;

    tokio::spawn(async move {
        let state = StateTx {
            nights: nights_tx,
            tonight: tonight_tx,
            controls: controls_tx,
        };

        let mut store = NightStore::new();
        if let Some(dao) = dao_loop.as_ref() {
            match dao_call(dao, |d| d.fetch_all()).await {
                Ok(nights) => store = NightStore::from_nights(nights),
                Err(err) => error!("sleep log load failed: {err:?}"),
            }
            if restore_signals {
                match dao_call(dao, |d| d.load_signals()).await {
                    Ok(Some(saved)) => signals_loop.restore(&saved),
                    Ok(None) => {}
                    Err(err) => warn!("pending-navigation restore failed: {err:?}"),
                }
            }
        }
        state.publish(&store);

        while let Some(cmd) = cmd_rx.recv().await {
            let done = handle_command(
                cmd,
                &mut store,
                &state,
                &events_tx_loop,
                dao_loop.as_ref(),
                &signals_loop,
            )
            .await;
            if done {
                break;
            }
        }
    });

    TrackerHandle {
        cmd_tx,
        events_tx,
        nights_rx,
        tonight_rx,
        controls_rx,
        signals,
    }
}

impl TrackerHandle {
    /// Subscribes to the discrete event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events_tx.subscribe()
    }

    /// Observable display-ordered log snapshot.
    pub fn nights(&self) -> watch::Receiver<Vec<SleepNight>> {
        self.nights_rx.clone()
    }

    /// Observable open night, `None` while idle.
    pub fn tonight(&self) -> watch::Receiver<Option<SleepNight>> {
        self.tonight_rx.clone()
    }

    /// Observable button enablement for the tracker screen.
    pub fn controls(&self) -> watch::Receiver<ControlsState> {
        self.controls_rx.clone()
    }

    /// The one-shot navigation signals.
    pub fn signals(&self) -> Arc<TrackerSignals> {
        Arc::clone(&self.signals)
    }

    /// Row-tap handler: arms the tracker → detail navigation signal.
    pub fn night_tapped(&self, id: NightId) {
        self.signals.to_detail.request(id);
    }

    /// Starts a tracking session.
    ///
    /// Returns the new night id, or `None` as a silent no-op when a session
    /// is already open.
    pub async fn start_tracking(&self) -> Result<Option<NightId>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Start { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Stops the open session and arms the quality-screen navigation.
    ///
    /// Returns the closed night id, or `None` as a silent no-op when nothing
    /// is open.
    pub async fn stop_tracking(&self) -> Result<Option<NightId>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Stop { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Records a quality rating and arms the back-to-tracker navigation.
    ///
    /// Returns `false` as a silent no-op when the id is unknown.
    pub async fn set_quality(&self, id: NightId, quality: Quality) -> Result<bool, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::SetQuality {
                id,
                quality,
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Clears the whole log and arms the cleared notice.
    pub async fn clear(&self) -> Result<usize, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Clear { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Looks up one night, as the detail screen does.
    pub async fn night(&self, id: NightId) -> Result<Option<SleepNight>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Night { id, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Stops the runtime, persisting pending navigation first.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }
}

async fn handle_command(
    cmd: Command,
    store: &mut NightStore,
    state: &StateTx,
    events_tx: &broadcast::Sender<TrackerEvent>,
    dao: Option<&DaoCell>,
    signals: &TrackerSignals,
) -> bool {
    match cmd {
        Command::Start { resp } => {
            let out = match store.begin(now_ms()) {
                Ok(night) => {
                    debug!("tracking started as night {}", night.id);
                    let mirrored = {
                        let n = night.clone();
                        mirror_write(dao, move |d| d.insert(&n)).await
                    };
                    state.publish(store);
                    let _ = events_tx.send(TrackerEvent::Started { id: night.id });
                    mirrored.map(|_| Some(night.id))
                }
                Err(StoreError::SessionAlreadyOpen(id)) => {
                    warn!("start ignored: night {id} is still open");
                    Ok(None)
                }
                Err(err) => {
                    warn!("start ignored: {err:?}");
                    Ok(None)
                }
            };
            let _ = resp.send(out);
        }
        Command::Stop { resp } => {
            let out = match store.close_open(now_ms()) {
                Some(night) => {
                    debug!("tracking stopped for night {}", night.id);
                    let mirrored = {
                        let n = night.clone();
                        mirror_write(dao, move |d| d.update(&n)).await
                    };
                    state.publish(store);
                    let _ = events_tx.send(TrackerEvent::Stopped { id: night.id });
                    // The store update is fully settled before the quality
                    // navigation arms.
                    match mirrored {
                        Ok(()) => {
                            signals.to_quality.request(night.id);
                            Ok(Some(night.id))
                        }
                        Err(err) => Err(err),
                    }
                }
                None => {
                    warn!("stop ignored: no open session");
                    Ok(None)
                }
            };
            let _ = resp.send(out);
        }
        Command::SetQuality { id, quality, resp } => {
            let out = match store.set_quality(id, quality) {
                Ok(night) => {
                    debug!("night {} rated {:?}", night.id, night.quality);
                    let mirrored = {
                        let n = night.clone();
                        mirror_write(dao, move |d| d.update(&n)).await
                    };
                    state.publish(store);
                    let _ = events_tx.send(TrackerEvent::QualityRated { id: night.id });
                    match mirrored {
                        Ok(()) => {
                            signals.to_tracker.request(());
                            Ok(true)
                        }
                        Err(err) => Err(err),
                    }
                }
                Err(err) => {
                    warn!("quality rating ignored: {err:?}");
                    Ok(false)
                }
            };
            let _ = resp.send(out);
        }
        Command::Clear { resp } => {
            let removed = store.clear();
            debug!("cleared {removed} nights");
            let mirrored = mirror_write(dao, move |d| d.clear_all().map(|_| ())).await;
            state.publish(store);
            let _ = events_tx.send(TrackerEvent::Cleared { removed });
            let out = match mirrored {
                Ok(()) => {
                    signals.cleared_notice.request(());
                    Ok(removed)
                }
                Err(err) => Err(err),
            };
            let _ = resp.send(out);
        }
        Command::Night { id, resp } => {
            let _ = resp.send(store.night_cloned(id));
        }
        Command::Shutdown { resp } => {
            let out = match dao {
                Some(dao) => {
                    let snapshot = signals.snapshot();
                    dao_call(dao, move |d| d.save_signals(&snapshot)).await
                }
                None => Ok(()),
            };
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

async fn mirror_write<F>(dao: Option<&DaoCell>, write: F) -> Result<(), RuntimeError>
where
    F: FnOnce(&mut dyn NightDao) -> PersistResult<()> + Send + 'static,
{
    match dao {
        Some(dao) => dao_call(dao, write).await,
        None => Ok(()),
    }
}

async fn dao_call<T, F>(dao: &DaoCell, call: F) -> Result<T, RuntimeError>
where
    T: Send + 'static,
    F: FnOnce(&mut dyn NightDao) -> PersistResult<T> + Send + 'static,
{
    let dao = Arc::clone(dao);
    tokio::task::spawn_blocking(move || {
        let mut guard = dao.blocking_lock();
        call(guard.as_mut())
    })
    .await
    .map_err(|e| RuntimeError::Persist(PersistError::Message(format!("join error: {e}"))))?
    .map_err(RuntimeError::Persist)
}

fn now_ms() -> EpochMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
