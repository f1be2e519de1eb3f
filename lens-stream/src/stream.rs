//! Async drivers over a response body.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use futures::{Stream, StreamExt};
use lens_types::{DocumentEvent, Finish, FinishReason, StreamError};
use tokio_util::sync::CancellationToken;

use crate::assembler::{FrameAssembler, Step};
use crate::render::Render;

/// Turn a byte stream into a stream of [`DocumentEvent`]s.
///
/// Emits [`DocumentEvent::Updated`] with the full document after every
/// frame that changes it, then exactly one [`DocumentEvent::Finished`].
/// A read error ends the stream as [`FinishReason::Failed`] with the
/// document assembled from every frame that ended before the failure; a
/// half-received trailing frame is dropped. Dropping the returned stream
/// drops the body.
pub fn document_stream<S, B, E>(byte_stream: S) -> impl Stream<Item = DocumentEvent> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    events_until(byte_stream, std::future::pending())
}

/// [`document_stream`] that stops reading when `deadline` resolves, failing
/// with the error it yields.
fn events_until<S, B, E, D>(byte_stream: S, deadline: D) -> impl Stream<Item = DocumentEvent> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    D: Future<Output = StreamError> + Send + 'static,
{
    async_stream::stream! {
        let mut assembler = FrameAssembler::new();
        let mut bytes = std::pin::pin!(byte_stream);
        let mut deadline = std::pin::pin!(deadline);
        let mut failure = None;

        loop {
            let next = tokio::select! {
                biased;
                error = &mut deadline => Err(error),
                chunk = bytes.next() => Ok(chunk),
            };
            let pushed = match next {
                Ok(Some(Ok(b))) => assembler.push_bytes(b.as_ref()),
                Ok(Some(Err(e))) => Err(StreamError::Transport(format!("stream read error: {e}"))),
                Ok(None) => break,
                Err(error) => Err(error),
            };
            if let Err(e) = pushed {
                failure = Some(e);
                break;
            }

            while let Some(step) = assembler.next_step() {
                if let Step::Appended(_) = step {
                    yield DocumentEvent::Updated(assembler.document().to_string());
                }
            }
            if assembler.is_done() {
                break;
            }
        }

        // A clean close ends the trailing frame. After a failure only frames
        // that were already terminated count.
        if failure.is_none() {
            assembler.finish_input();
        }
        while let Some(step) = assembler.next_step() {
            if let Step::Appended(_) = step {
                yield DocumentEvent::Updated(assembler.document().to_string());
            }
        }

        if failure.is_none() && !assembler.is_done() && assembler.has_partial_char() {
            failure = Some(StreamError::Decode("stream ended inside a UTF-8 sequence".into()));
        }

        let finish = match failure {
            Some(error) => {
                tracing::warn!(%error, frames = assembler.frames(), "text stream failed");
                Finish::failed(error, assembler.into_document())
            }
            None => {
                let reason = if assembler.is_done() {
                    FinishReason::Done
                } else {
                    FinishReason::EndOfStream
                };
                tracing::debug!(?reason, frames = assembler.frames(), "text stream finished");
                Finish::new(reason, assembler.into_document())
            }
        };
        yield DocumentEvent::Finished(finish);
    }
}

/// Assemble a document from `byte_stream`, rendering after every change.
///
/// Stops on the sentinel, end of input, a read or decode error, or
/// cancellation. Once `cancel` fires no further chunk is read and the
/// renderer is not called again; the returned document is the last one
/// rendered.
pub async fn assemble<S, B, E, R>(byte_stream: S, renderer: &mut R, cancel: &CancellationToken) -> Finish
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    R: Render + ?Sized,
{
    assemble_with_timeout(byte_stream, renderer, cancel, None).await
}

/// [`assemble`] with an overall deadline.
///
/// When `limit` elapses first, reading stops, every frame already
/// terminated is applied and rendered, and the result is
/// [`FinishReason::Failed`] with [`StreamError::Timeout`].
pub async fn assemble_with_timeout<S, B, E, R>(
    byte_stream: S,
    renderer: &mut R,
    cancel: &CancellationToken,
    limit: Option<Duration>,
) -> Finish
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    R: Render + ?Sized,
{
    let deadline = async move {
        match limit {
            Some(limit) => {
                tokio::time::sleep(limit).await;
                StreamError::Timeout(limit)
            }
            None => std::future::pending().await,
        }
    };
    let mut events = std::pin::pin!(events_until(byte_stream, deadline));
    let mut document = String::new();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(len = document.len(), "text stream cancelled");
                return Finish::new(FinishReason::Cancelled, document);
            }
            event = events.next() => match event {
                Some(DocumentEvent::Updated(updated)) => {
                    if cancel.is_cancelled() {
                        return Finish::new(FinishReason::Cancelled, document);
                    }
                    renderer.render(&updated);
                    document = updated;
                }
                Some(DocumentEvent::Finished(finish)) => return finish,
                None => return Finish::new(FinishReason::EndOfStream, document),
            },
        }
    }
}
