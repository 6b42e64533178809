use std::{
    io,
    sync::mpsc::{self, Receiver},
    thread::{self, JoinHandle},
};

use super::{ReadStatus, RecordReader};

/// A reader that parses records ahead of consumption on a background thread.
///
/// The wrapped reader is moved into the worker thread, which sends records through a bounded
/// channel in input order. Dropping the reader stops the worker and waits for it to finish.
pub struct ReadAhead<T> {
    receiver: Option<Receiver<ReadStatus<T>>>,
    worker: Option<JoinHandle<()>>,
    sample_count: usize,
}

impl<T> ReadAhead<T>
where
    T: Send + 'static,
{
    /// Spawns a worker reading from the provided reader, buffering at most `capacity` records.
    pub fn spawn<R>(mut reader: R, capacity: usize) -> io::Result<Self>
    where
        R: RecordReader<Record = T> + Send + 'static,
    {
        let sample_count = reader.sample_count();
        let (sender, receiver) = mpsc::sync_channel(capacity);

        let worker = thread::Builder::new()
            .name(String::from("read-ahead"))
            .spawn(move || loop {
                let status = reader.read_record();
                let done = matches!(status, ReadStatus::Done);

                if sender.send(status).is_err() || done {
                    break;
                }
            })?;

        log::debug!("Spawned read-ahead worker buffering up to {capacity} records");

        Ok(Self {
            receiver: Some(receiver),
            worker: Some(worker),
            sample_count,
        })
    }
}

impl<T> RecordReader for ReadAhead<T> {
    type Record = T;

    fn read_record(&mut self) -> ReadStatus<Self::Record> {
        match self.receiver.as_ref().map(Receiver::recv) {
            Some(Ok(status)) => status,
            // Worker has finished and hung up
            Some(Err(_)) | None => ReadStatus::Done,
        }
    }

    fn sample_count(&self) -> usize {
        self.sample_count
    }
}

impl<T> Drop for ReadAhead<T> {
    fn drop(&mut self) {
        // Hang up first, so that a worker blocked on a full channel can exit
        drop(self.receiver.take());

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Read-ahead worker panicked");
            }
        }
    }
}
