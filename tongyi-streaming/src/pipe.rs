//! Bounded producer/consumer pipe.
//!
//! [`StreamPipe::go`] spawns one producer task that pushes items through a
//! bounded [`mpsc`] channel. A slow consumer back-pressures the producer; an
//! error returned by the producer terminates the pipe and nothing follows it.

use futures::Stream;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Default pipe capacity.
pub const DEFAULT_PIPE_CAPACITY: usize = 16;

/// Producer half of a [`StreamPipe`].
#[derive(Debug)]
pub struct PipeSender<T, E> {
    tx: mpsc::Sender<Result<T, E>>,
}

impl<T, E> Clone for PipeSender<T, E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T, E> PipeSender<T, E> {
    /// Send one item, waiting while the pipe is full.
    ///
    /// Returns `false` once the consumer has gone away.
    pub async fn send(&self, item: T) -> bool {
        self.tx.send(Ok(item)).await.is_ok()
    }

    /// Whether the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half: a bounded pipe fed by a single producer task.
///
/// Consume it either with the cursor API ([`next`](Self::next),
/// [`current`](Self::current), [`error`](Self::error)) or as a
/// [`futures::Stream`].
///
/// ```rust
/// use tongyi_streaming::StreamPipe;
///
/// # tokio_test::block_on(async {
/// let mut pipe = StreamPipe::<u32, String>::go(4, |tx| async move {
///     for n in 1..=3 {
///         tx.send(n).await;
///     }
///     Ok(())
/// });
///
/// let mut seen = Vec::new();
/// while pipe.next().await {
///     seen.push(*pipe.current().unwrap());
/// }
/// assert_eq!(seen, vec![1, 2, 3]);
/// assert!(pipe.error().is_none());
/// # });
/// ```
#[derive(Debug)]
pub struct StreamPipe<T, E> {
    rx: mpsc::Receiver<Result<T, E>>,
    current: Option<T>,
    error: Option<E>,
    done: bool,
    producer: Option<JoinHandle<()>>,
}

impl<T, E> StreamPipe<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Spawn `producer` on the tokio runtime and return the consuming end.
    ///
    /// If the producer returns an error it becomes the terminal error of the
    /// pipe.
    pub fn go<F, Fut>(capacity: usize, producer: F) -> Self
    where
        F: FnOnce(PipeSender<T, E>) -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let fut = producer(PipeSender { tx: tx.clone() });

        let handle = tokio::spawn(async move {
            if let Err(e) = fut.await {
                debug!("Pipe producer failed");
                let _ = tx.send(Err(e)).await;
            }
        });

        Self {
            rx,
            current: None,
            error: None,
            done: false,
            producer: Some(handle),
        }
    }
}

impl<T, E> StreamPipe<T, E> {
    /// Advance to the next item. Returns `false` when the pipe is exhausted
    /// or has failed; check [`error`](Self::error) to tell the two apart.
    pub async fn next(&mut self) -> bool {
        if self.done {
            return false;
        }
        match self.rx.recv().await {
            Some(Ok(item)) => {
                self.current = Some(item);
                true
            }
            Some(Err(e)) => {
                self.finish(Some(e));
                false
            }
            None => {
                self.finish(None);
                false
            }
        }
    }

    /// The item produced by the last successful [`next`](Self::next).
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Take ownership of the current item.
    pub fn take_current(&mut self) -> Option<T> {
        self.current.take()
    }

    /// The terminal error, if the producer failed.
    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    /// Drain the remaining items, stopping at the first error.
    pub async fn collect_all(mut self) -> Result<Vec<T>, E> {
        let mut items = Vec::new();
        while self.next().await {
            if let Some(item) = self.current.take() {
                items.push(item);
            }
        }
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(items),
        }
    }

    fn finish(&mut self, error: Option<E>) {
        self.done = true;
        self.current = None;
        self.error = error;
        self.rx.close();
    }
}

impl<T, E> Unpin for StreamPipe<T, E> {}

impl<T, E> Stream for StreamPipe<T, E> {
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(Err(e))) => {
                this.done = true;
                this.rx.close();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl<T, E> Drop for StreamPipe<T, E> {
    fn drop(&mut self) {
        if let Some(handle) = self.producer.take() {
            handle.abort();
        }
    }
}
