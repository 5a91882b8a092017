//! Voxel generation on a background thread.
//!
//! The writer runs on a dedicated named thread and streams progress back over
//! a bounded channel. Progress is advisory: when the consumer falls behind,
//! snapshots are dropped rather than stalling the writer.

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, bounded};
use strata_config::TerrainParameters;
use strata_voxel::VoxelStore;

use crate::voxel_writer::{
    CancellationToken, VoxelBatchWriter, VoxelWriterConfig, WriteError, WriteProgress, WriteSummary,
    WriterHooks,
};

/// Capacity of the progress channel.
pub const PROGRESS_CAPACITY: usize = 64;

/// What a finished job hands back.
#[derive(Debug)]
pub struct JobOutcome<S> {
    /// The store, returned so the caller can inspect or reuse it.
    pub store: S,
    pub result: Result<WriteSummary, WriteError>,
}

/// Handle to a running voxel job.
pub struct VoxelJob<S> {
    cancel: CancellationToken,
    progress: Receiver<WriteProgress>,
    handle: JoinHandle<JobOutcome<S>>,
}

impl<S> VoxelJob<S> {
    /// Ask the writer to stop before its next batch.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Progress snapshots. Disconnects once the job finishes.
    pub fn progress(&self) -> &Receiver<WriteProgress> {
        &self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job to end.
    pub fn join(self) -> Result<JobOutcome<S>, WriteError> {
        self.handle.join().map_err(|_| WriteError::WorkerPanicked)
    }
}

struct ChannelHooks {
    sender: Sender<WriteProgress>,
    cancel: CancellationToken,
    batch_limit: Option<usize>,
}

impl WriterHooks for ChannelHooks {
    fn on_batch(&mut self, batches_done: usize) {
        if self.batch_limit.is_some_and(|max| batches_done >= max) {
            self.cancel.cancel();
        }
    }

    fn on_progress(&mut self, progress: &WriteProgress) {
        let _ = self.sender.try_send(*progress);
    }

    fn on_yield(&mut self) {
        std::thread::yield_now();
    }
}

/// Start writing the whole map into `store` on a background thread.
pub fn spawn_voxel_job<S>(
    params: TerrainParameters,
    config: VoxelWriterConfig,
    store: S,
) -> std::io::Result<VoxelJob<S>>
where
    S: VoxelStore + 'static,
{
    spawn_voxel_job_with_limit(params, config, store, None)
}

/// Like [`spawn_voxel_job`], but the writer cancels itself once
/// `batch_limit` batches are committed. A map with no more batches than the
/// limit completes normally.
pub fn spawn_voxel_job_with_limit<S>(
    params: TerrainParameters,
    config: VoxelWriterConfig,
    mut store: S,
    batch_limit: Option<usize>,
) -> std::io::Result<VoxelJob<S>>
where
    S: VoxelStore + 'static,
{
    let (sender, progress) = bounded(PROGRESS_CAPACITY);
    let cancel = CancellationToken::new();
    if batch_limit == Some(0) {
        cancel.cancel();
    }
    let token = cancel.clone();
    let hook_token = cancel.clone();

    let handle = std::thread::Builder::new()
        .name("voxel-writer".into())
        .spawn(move || {
            let writer = VoxelBatchWriter::new(params, config);
            let mut hooks = ChannelHooks {
                sender,
                cancel: hook_token,
                batch_limit,
            };
            let result = writer.run(&mut store, &mut hooks, &token);
            JobOutcome { store, result }
        })?;

    Ok(VoxelJob {
        cancel,
        progress,
        handle,
    })
}
