//! Async driver for [`Admission`] and the public [`UploadQueue`] handle.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use nas_transfer::{
    Acknowledgement, FileHandle, ProgressSample, ProgressSink, TransferClient, TransferError,
    TransferResult, UploadTarget,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{self, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::admission::{Admission, PendingTransfer};
use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};
use crate::event::{QueueEvent, TransferId};

const SHUTDOWN_MESSAGE: &str = "Upload cancelled: queue shut down";

enum QueueCommand {
    Enqueue {
        files: Vec<FileHandle>,
        target: UploadTarget,
        reply: oneshot::Sender<QueueResult<Vec<TransferId>>>,
    },
}

/// Handle to a running upload queue.
///
/// Dropping every handle lets the worker finish queued and active transfers
/// and then exit. [`UploadQueue::shutdown`] instead stops admitting queued
/// transfers; transfers already started still run to completion.
#[derive(Clone)]
pub struct UploadQueue {
    commands: mpsc::UnboundedSender<QueueCommand>,
    shutdown: CancellationToken,
}

impl UploadQueue {
    /// Spawn the worker task on the current Tokio runtime and return the
    /// handle together with the event stream.
    #[must_use]
    pub fn spawn(
        client: Arc<dyn TransferClient>,
        config: QueueConfig,
    ) -> (Self, mpsc::UnboundedReceiver<QueueEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let worker = Worker::new(client, config, event_tx, shutdown.clone());
        tokio::spawn(worker.run(command_rx));
        (
            Self {
                commands: command_tx,
                shutdown,
            },
            event_rx,
        )
    }

    /// Append `files` to the queue and start as many as free slots allow.
    /// An empty batch is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] once [`UploadQueue::shutdown`] has been
    /// called or the worker has exited.
    pub async fn enqueue(
        &self,
        files: Vec<FileHandle>,
        target: UploadTarget,
    ) -> QueueResult<Vec<TransferId>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let (reply, response) = oneshot::channel();
        self.commands
            .send(QueueCommand::Enqueue {
                files,
                target,
                reply,
            })
            .map_err(|_| QueueError::Closed)?;
        response.await.map_err(|_| QueueError::Closed)?
    }

    /// Stop admitting queued transfers. Queued entries are reported as
    /// failed; active ones finish normally.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Token cancelled when the queue shuts down.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

type TaskOutput = (TransferId, TransferResult<Acknowledgement>);
type Joined = Result<(task::Id, TaskOutput), JoinError>;

struct Worker {
    client: Arc<dyn TransferClient>,
    admission: Admission,
    tasks: JoinSet<TaskOutput>,
    task_ids: HashMap<task::Id, TransferId>,
    events: mpsc::UnboundedSender<QueueEvent>,
    progress_tx: mpsc::UnboundedSender<(TransferId, ProgressSample)>,
    progress_rx: mpsc::UnboundedReceiver<(TransferId, ProgressSample)>,
    shutdown: CancellationToken,
    accepting: bool,
}

impl Worker {
    fn new(
        client: Arc<dyn TransferClient>,
        config: QueueConfig,
        events: mpsc::UnboundedSender<QueueEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        Self {
            client,
            admission: Admission::new(config.concurrency),
            tasks: JoinSet::new(),
            task_ids: HashMap::new(),
            events,
            progress_tx,
            progress_rx,
            shutdown,
            accepting: true,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<QueueCommand>) {
        let mut commands_open = true;
        loop {
            if !commands_open && self.tasks.is_empty() && self.admission.is_drained() {
                break;
            }
            if !self.accepting && self.tasks.is_empty() {
                break;
            }
            // Progress is drained before completions so a transfer's progress
            // events always precede its terminal event.
            tokio::select! {
                biased;
                () = self.shutdown.cancelled(), if self.accepting => {
                    self.begin_shutdown();
                }
                Some((id, sample)) = self.progress_rx.recv() => {
                    self.on_progress(id, sample);
                }
                command = commands.recv(), if commands_open => {
                    match command {
                        Some(command) => self.handle(command),
                        None => commands_open = false,
                    }
                }
                Some(joined) = self.tasks.join_next_with_id(), if !self.tasks.is_empty() => {
                    self.on_joined(joined);
                }
            }
        }
        debug!("upload queue worker stopped");
    }

    fn handle(&mut self, command: QueueCommand) {
        match command {
            QueueCommand::Enqueue {
                files,
                target,
                reply,
            } => {
                if !self.accepting {
                    debug!(count = files.len(), "enqueue refused; queue shutting down");
                    if reply.send(Err(QueueError::Closed)).is_err() {
                        debug!("enqueue caller went away before reply");
                    }
                    return;
                }
                let queued = self.admission.enqueue(files, &target);
                let ids = queued.iter().map(|pending| pending.id).collect();
                info!(
                    count = queued.len(),
                    active = self.admission.active_count(),
                    "files queued for upload"
                );
                for pending in queued {
                    self.emit(QueueEvent::Queued {
                        id: pending.id,
                        file: pending.file,
                        target: pending.target,
                    });
                }
                if reply.send(Ok(ids)).is_err() {
                    debug!("enqueue caller went away before reply");
                }
                self.fill_slots();
            }
        }
    }

    fn fill_slots(&mut self) {
        if !self.accepting {
            return;
        }
        for pending in self.admission.admit() {
            self.start(pending);
        }
    }

    fn start(&mut self, pending: PendingTransfer) {
        let PendingTransfer {
            id, file, target, ..
        } = pending;
        self.emit(QueueEvent::Started { id });
        debug!(transfer = %id, file = %file.name, "upload slot granted");

        let client = Arc::clone(&self.client);
        let progress_tx = self.progress_tx.clone();
        let progress: ProgressSink = Arc::new(move |sample| {
            if progress_tx.send((id, sample)).is_err() {
                debug!(transfer = %id, "progress sample dropped; queue worker gone");
            }
        });
        let handle = self.tasks.spawn(async move {
            let attempt = AssertUnwindSafe(client.upload(&file, &target, progress))
                .catch_unwind()
                .await;
            let outcome = attempt.unwrap_or_else(|_| {
                Err(TransferError::InvalidInput {
                    field: "upload",
                    reason: "upload task panicked",
                    value: Some(file.name.clone()),
                })
            });
            (id, outcome)
        });
        self.task_ids.insert(handle.id(), id);
    }

    fn on_joined(&mut self, joined: Joined) {
        match joined {
            Ok((task, (id, outcome))) => {
                self.task_ids.remove(&task);
                self.on_complete(id, outcome);
            }
            Err(err) => {
                let Some(id) = self.task_ids.remove(&err.id()) else {
                    warn!(error = %err, "untracked upload task ended without an outcome");
                    return;
                };
                warn!(transfer = %id, error = %err, "upload task ended without an outcome");
                self.on_complete(
                    id,
                    Err(TransferError::InvalidInput {
                        field: "upload",
                        reason: "upload task ended without an outcome",
                        value: None,
                    }),
                );
            }
        }
    }

    fn on_progress(&mut self, id: TransferId, sample: ProgressSample) {
        if self.admission.record_progress(id, sample).is_some() {
            self.emit(QueueEvent::Progress { id, sample });
        }
    }

    fn on_complete(&mut self, id: TransferId, outcome: TransferResult<Acknowledgement>) {
        let succeeded = outcome.is_ok();
        let Some(done) = self.admission.finish(id, succeeded) else {
            warn!(transfer = %id, "completion for unknown transfer ignored");
            return;
        };
        match outcome {
            Ok(acknowledgement) => {
                info!(transfer = %id, file = %done.file.name, "upload succeeded");
                self.emit(QueueEvent::Succeeded {
                    id,
                    file_name: done.file.name,
                    acknowledgement,
                });
            }
            Err(err) => {
                let message = err.user_message();
                warn!(transfer = %id, file = %done.file.name, error = %message, "upload failed");
                self.emit(QueueEvent::Failed {
                    id,
                    file_name: done.file.name,
                    message,
                });
            }
        }
        self.fill_slots();
        self.emit_drained_if_idle();
    }

    fn begin_shutdown(&mut self) {
        self.accepting = false;
        let abandoned = self.admission.abandon_queued();
        info!(
            abandoned = abandoned.len(),
            active = self.admission.active_count(),
            "upload queue shutting down"
        );
        for pending in abandoned {
            self.emit(QueueEvent::Failed {
                id: pending.id,
                file_name: pending.file.name,
                message: SHUTDOWN_MESSAGE.to_string(),
            });
        }
        self.emit_drained_if_idle();
    }

    fn emit_drained_if_idle(&mut self) {
        if self.admission.is_drained() {
            let summary = self.admission.take_summary();
            if summary.succeeded + summary.failed == 0 {
                return;
            }
            info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "upload queue drained"
            );
            self.emit(QueueEvent::Drained {
                succeeded: summary.succeeded,
                failed: summary.failed,
            });
        }
    }

    fn emit(&self, event: QueueEvent) {
        if self.events.send(event).is_err() {
            debug!("queue event dropped; no subscriber");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use nas_transfer::{FileId, GroupId, Operation, TagId, TransferError, UserId};
    use tokio::sync::Mutex;
    use tokio::time::timeout;

    type Gate = oneshot::Receiver<TransferResult<Acknowledgement>>;

    /// Client whose uploads block until the test releases them by name.
    #[derive(Default)]
    struct GatedClient {
        gates: Mutex<HashMap<String, Gate>>,
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl GatedClient {
        async fn gate(&self, name: &str) -> oneshot::Sender<TransferResult<Acknowledgement>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().await.insert(name.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl TransferClient for GatedClient {
        async fn upload(
            &self,
            file: &FileHandle,
            _target: &UploadTarget,
            progress: ProgressSink,
        ) -> TransferResult<Acknowledgement> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            progress(ProgressSample {
                transferred: file.size / 2,
                total: file.size,
            });
            let gate = self.gates.lock().await.remove(&file.name);
            let outcome = match gate {
                Some(gate) => gate.await.unwrap_or_else(|_| {
                    Err(rejected("gate dropped"))
                }),
                None => Ok(Acknowledgement::message("ok")),
            };
            if outcome.is_ok() {
                progress(ProgressSample {
                    transferred: file.size,
                    total: file.size,
                });
            }
            self.active.fetch_sub(1, Ordering::SeqCst);
            outcome
        }

        async fn delete_resource(&self, _id: FileId) -> TransferResult<Acknowledgement> {
            Ok(Acknowledgement::message("unused"))
        }

        async fn fetch_tags(&self, _id: FileId) -> TransferResult<Vec<TagId>> {
            Ok(Vec::new())
        }

        async fn update_tags(
            &self,
            _id: FileId,
            _tags: &BTreeSet<TagId>,
        ) -> TransferResult<Acknowledgement> {
            Ok(Acknowledgement::message("unused"))
        }

        async fn delete_user(&self, _id: UserId) -> TransferResult<Acknowledgement> {
            Ok(Acknowledgement::message("unused"))
        }
    }

    fn rejected(message: &str) -> TransferError {
        TransferError::Rejected {
            operation: Operation::GroupUpload,
            status: 500,
            message: message.to_string(),
        }
    }

    fn files(names: &[&str]) -> Vec<FileHandle> {
        names
            .iter()
            .map(|name| FileHandle::new(format!("/tmp/{name}"), *name, 100))
            .collect()
    }

    fn group() -> UploadTarget {
        UploadTarget::Group {
            group_id: GroupId(9),
        }
    }

    async fn next_event(events: &mut mpsc::UnboundedReceiver<QueueEvent>) -> Result<QueueEvent> {
        timeout(Duration::from_secs(5), events.recv())
            .await
            .map_err(|_| anyhow!("timed out waiting for queue event"))?
            .ok_or_else(|| anyhow!("event stream closed"))
    }

    async fn wait_for(
        events: &mut mpsc::UnboundedReceiver<QueueEvent>,
        seen: &mut Vec<QueueEvent>,
        predicate: impl Fn(&QueueEvent) -> bool,
    ) -> Result<QueueEvent> {
        loop {
            let event = next_event(events).await?;
            seen.push(event.clone());
            if predicate(&event) {
                return Ok(event);
            }
        }
    }

    fn started(seen: &[QueueEvent]) -> Vec<TransferId> {
        seen.iter()
            .filter_map(|event| match event {
                QueueEvent::Started { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn sliding_window_keeps_three_active() -> Result<()> {
        let client = Arc::new(GatedClient::default());
        let names = ["a", "b", "c", "d", "e"];
        let mut gates = Vec::new();
        for name in names {
            gates.push(client.gate(name).await);
        }
        let (queue, mut events) = UploadQueue::spawn(client.clone(), QueueConfig::default());

        let ids = queue.enqueue(files(&names), group()).await?;
        assert_eq!(ids.len(), 5);

        let mut seen = Vec::new();
        while started(&seen).len() < 3 {
            wait_for(&mut events, &mut seen, |e| matches!(e, QueueEvent::Started { .. })).await?;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(started(&seen), vec![TransferId(1), TransferId(2), TransferId(3)]);

        let mut gates = gates.into_iter();
        let gate_a = gates.next().ok_or_else(|| anyhow!("gate"))?;
        let _ = gate_a.send(Err(rejected("disk full")));
        wait_for(&mut events, &mut seen, |e| {
            matches!(e, QueueEvent::Started { id } if *id == TransferId(4))
        })
        .await?;
        assert!(seen.iter().any(|e| matches!(
            e,
            QueueEvent::Failed { id, message, .. } if *id == TransferId(1) && message == "disk full"
        )));

        for gate in gates {
            let _ = gate.send(Ok(Acknowledgement::message("ok")));
        }
        let drained = wait_for(&mut events, &mut seen, |e| {
            matches!(e, QueueEvent::Drained { .. })
        })
        .await?;
        assert_eq!(
            drained,
            QueueEvent::Drained {
                succeeded: 4,
                failed: 1
            }
        );
        assert_eq!(client.peak.load(Ordering::SeqCst), 3);
        assert_eq!(client.calls.load(Ordering::SeqCst), 5);
        Ok(())
    }

    #[tokio::test]
    async fn failures_do_not_block_remaining_transfers() -> Result<()> {
        let client = Arc::new(GatedClient::default());
        let names = ["a", "b", "c", "d"];
        for name in names {
            let gate = client.gate(name).await;
            let _ = gate.send(Err(rejected("boom")));
        }
        let config = QueueConfig::new(1)?;
        let (queue, mut events) = UploadQueue::spawn(client.clone(), config);
        queue.enqueue(files(&names), group()).await?;

        let mut seen = Vec::new();
        let drained = wait_for(&mut events, &mut seen, |e| {
            matches!(e, QueueEvent::Drained { .. })
        })
        .await?;
        assert_eq!(
            drained,
            QueueEvent::Drained {
                succeeded: 0,
                failed: 4
            }
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 4);
        assert_eq!(client.peak.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn progress_precedes_terminal_event() -> Result<()> {
        let client = Arc::new(GatedClient::default());
        let (queue, mut events) = UploadQueue::spawn(client, QueueConfig::default());
        queue.enqueue(files(&["x", "y"]), group()).await?;

        let mut seen = Vec::new();
        wait_for(&mut events, &mut seen, |e| matches!(e, QueueEvent::Drained { .. })).await?;

        for id in [TransferId(1), TransferId(2)] {
            let lifecycle: Vec<&QueueEvent> = seen
                .iter()
                .filter(|event| event.transfer_id() == Some(id))
                .collect();
            assert!(matches!(lifecycle.first(), Some(QueueEvent::Queued { .. })));
            assert!(matches!(lifecycle.get(1), Some(QueueEvent::Started { .. })));
            let terminal = lifecycle
                .iter()
                .position(|event| event.is_terminal())
                .ok_or_else(|| anyhow!("missing terminal event"))?;
            assert_eq!(terminal, lifecycle.len() - 1);
            assert!(lifecycle.iter().any(|e| matches!(e, QueueEvent::Progress { .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() -> Result<()> {
        let client = Arc::new(GatedClient::default());
        let (queue, mut events) = UploadQueue::spawn(client.clone(), QueueConfig::default());
        let ids = queue.enqueue(Vec::new(), group()).await?;
        assert!(ids.is_empty());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(events.try_recv().is_err());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn shutdown_abandons_queued_but_finishes_active() -> Result<()> {
        let client = Arc::new(GatedClient::default());
        let gate = client.gate("a").await;
        let config = QueueConfig::new(1)?;
        let (queue, mut events) = UploadQueue::spawn(client.clone(), config);
        queue.enqueue(files(&["a", "b", "c"]), group()).await?;

        let mut seen = Vec::new();
        wait_for(&mut events, &mut seen, |e| matches!(e, QueueEvent::Started { .. })).await?;
        queue.shutdown();
        wait_for(&mut events, &mut seen, |e| {
            matches!(e, QueueEvent::Failed { id, .. } if *id == TransferId(3))
        })
        .await?;

        let _ = gate.send(Ok(Acknowledgement::message("ok")));
        let drained = wait_for(&mut events, &mut seen, |e| {
            matches!(e, QueueEvent::Drained { .. })
        })
        .await?;
        assert_eq!(
            drained,
            QueueEvent::Drained {
                succeeded: 1,
                failed: 2
            }
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            queue.enqueue(files(&["late"]), group()).await,
            Err(QueueError::Closed)
        );
        Ok(())
    }

    #[tokio::test]
    async fn enqueue_after_shutdown_is_refused_while_uploads_finish() -> Result<()> {
        let client = Arc::new(GatedClient::default());
        let gate = client.gate("a").await;
        let config = QueueConfig::new(1)?;
        let (queue, mut events) = UploadQueue::spawn(client.clone(), config);
        queue.enqueue(files(&["a"]), group()).await?;

        let mut seen = Vec::new();
        wait_for(&mut events, &mut seen, |e| matches!(e, QueueEvent::Started { .. })).await?;
        queue.shutdown();
        let refused = timeout(
            Duration::from_secs(1),
            queue.enqueue(files(&["late"]), group()),
        )
        .await
        .map_err(|_| anyhow!("enqueue waited for the active upload"))?;
        assert_eq!(refused, Err(QueueError::Closed));

        let _ = gate.send(Ok(Acknowledgement::message("ok")));
        let drained = wait_for(&mut events, &mut seen, |e| {
            matches!(e, QueueEvent::Drained { .. })
        })
        .await?;
        assert_eq!(
            drained,
            QueueEvent::Drained {
                succeeded: 1,
                failed: 0
            }
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[tokio::test]
    async fn lost_task_still_releases_its_slot() -> Result<()> {
        let client = Arc::new(GatedClient::default());
        let _gate = client.gate("a").await;
        let (event_tx, mut events) = mpsc::unbounded_channel();
        let mut worker = Worker::new(
            client,
            QueueConfig::new(1)?,
            event_tx,
            CancellationToken::new(),
        );
        let (reply, response) = oneshot::channel();
        worker.handle(QueueCommand::Enqueue {
            files: files(&["a"]),
            target: group(),
            reply,
        });
        assert_eq!(response.await?, Ok(vec![TransferId(1)]));

        worker.tasks.abort_all();
        let joined = worker
            .tasks
            .join_next_with_id()
            .await
            .ok_or_else(|| anyhow!("no task to join"))?;
        assert!(joined.is_err());
        worker.on_joined(joined);

        assert!(worker.admission.is_drained());
        assert!(worker.task_ids.is_empty());
        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert!(seen.iter().any(|e| matches!(
            e,
            QueueEvent::Failed { id, message, .. }
                if *id == TransferId(1) && message == "upload task ended without an outcome"
        )));
        assert_eq!(
            seen.last(),
            Some(&QueueEvent::Drained {
                succeeded: 0,
                failed: 1
            })
        );
        Ok(())
    }
}
