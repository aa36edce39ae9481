use std::io;
use std::sync::mpsc;
use std::thread;

use tracing::{info, Dispatch};

use crate::applications::Application;
use crate::command::CommandRunner;
use crate::error::Result;
use crate::processor::Processor;
use crate::report::ResultRecord;

/// Splits `items` into `groups` contiguous slices whose lengths differ by at
/// most one; the first `len % groups` slices take the extra element.
pub fn split_evenly<T>(items: &[T], groups: usize) -> Vec<&[T]> {
    assert!(groups >= 1, "groups must be >= 1");
    let mut out = Vec::with_capacity(groups);
    let base = items.len() / groups;
    let remainder = items.len() % groups;
    let mut start = 0usize;
    for i in 0..groups {
        let size = if i < remainder { base + 1 } else { base };
        let end = start + size;
        out.push(&items[start..end]);
        start = end;
    }
    out
}

/// Number of batches that will actually get a worker.
pub fn active_batches<T>(batches: &[&[T]]) -> usize {
    batches.iter().filter(|b| !b.is_empty()).count()
}

/// Runs every non-empty batch on its own scoped thread and feeds each finished
/// record to `sink` on the calling thread. Returns the number of records written.
///
/// All workers start immediately and are joined before returning. A `sink`
/// error stops collection; workers notice the closed channel and stop too.
pub fn run_batches<R, F>(
    batches: &[&[Application]],
    processor: &Processor<'_, R>,
    log: &Dispatch,
    mut sink: F,
) -> Result<usize>
where
    R: CommandRunner,
    F: FnMut(ResultRecord) -> Result<()>,
{
    let (tx, rx) = mpsc::channel::<ResultRecord>();

    thread::scope(|scope| -> Result<usize> {
        for (idx, batch) in batches.iter().enumerate() {
            let batch_no = idx + 1;
            if batch.is_empty() {
                info!(batch = batch_no, "Skipping empty batch");
                continue;
            }
            let tx = tx.clone();
            let log = log.clone();
            thread::Builder::new()
                .name(format!("batch-{:04}", batch_no))
                .spawn_scoped(scope, move || {
                    tracing::dispatcher::with_default(&log, || {
                        processor.process_batch(batch_no, batch, &tx)
                    })
                })
                .map_err(|err| io::Error::new(err.kind(), format!("spawning batch {batch_no}: {err}")))?;
        }
        drop(tx);

        let mut written = 0usize;
        for record in rx {
            sink(record)?;
            written += 1;
        }
        Ok(written)
    })
}
