//! Per-connection transport handling.
//!
//! # Responsibilities
//! - Report accept and TLS handshake failures through tracing
//! - Report socket read and write errors on established connections
//! - Close connections that stay idle past the timeout
//!
//! # Design Decisions
//! - Wraps any inner acceptor, so plaintext and TLS share one code path
//! - Trailing newlines are stripped from transport messages; downstream log
//!   checksums break on embedded newlines
//! - HTTP protocol errors (malformed requests, header read timeouts) are
//!   dropped by the serve loop and never reach this layer

use axum_server::accept::Accept;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::{Instant, Sleep};

/// Strip the trailing newlines transport errors often carry.
pub fn sanitize_transport_message(message: &str) -> &str {
    message.trim_end_matches('\n')
}

fn log_transport_error(listener: &'static str, error: &io::Error) {
    let message = error.to_string();
    tracing::error!(
        listener,
        error = sanitize_transport_message(&message),
        "Transport error"
    );
}

/// Acceptor that logs failed accepts and applies an idle timeout.
#[derive(Debug, Clone)]
pub struct ConnectionAcceptor<A> {
    inner: A,
    listener: &'static str,
    idle_timeout: Duration,
}

impl<A> ConnectionAcceptor<A> {
    pub fn new(inner: A, listener: &'static str, idle_timeout: Duration) -> Self {
        Self {
            inner,
            listener,
            idle_timeout,
        }
    }
}

impl<A, I, S> Accept<I, S> for ConnectionAcceptor<A>
where
    A: Accept<I, S>,
    A::Future: Send + 'static,
    A::Stream: Send + 'static,
    A::Service: Send + 'static,
{
    type Stream = IdleStream<A::Stream>;
    type Service = A::Service;
    type Future = BoxFuture<'static, io::Result<(Self::Stream, Self::Service)>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let listener = self.listener;
        let idle_timeout = self.idle_timeout;
        let accepting = self.inner.accept(stream, service);

        Box::pin(async move {
            match accepting.await {
                Ok((stream, service)) => {
                    Ok((IdleStream::new(stream, listener, idle_timeout), service))
                }
                Err(e) => {
                    log_transport_error(listener, &e);
                    Err(e)
                }
            }
        })
    }
}

/// Stream wrapper that fails reads once no I/O happened for `timeout`.
///
/// Errors from the wrapped socket are logged before being returned.
#[derive(Debug)]
pub struct IdleStream<S> {
    inner: S,
    listener: &'static str,
    timeout: Duration,
    deadline: Pin<Box<Sleep>>,
}

impl<S> IdleStream<S> {
    pub fn new(inner: S, listener: &'static str, timeout: Duration) -> Self {
        Self {
            inner,
            listener,
            timeout,
            deadline: Box::pin(tokio::time::sleep(timeout)),
        }
    }

    fn observe<T>(&mut self, result: io::Result<T>) -> io::Result<T> {
        self.touch();
        if let Err(e) = &result {
            log_transport_error(self.listener, e);
        }
        result
    }

    fn touch(&mut self) {
        let next = Instant::now() + self.timeout;
        self.deadline.as_mut().reset(next);
    }

    fn poll_idle(&mut self, cx: &mut Context<'_>) -> Poll<io::Error> {
        match self.deadline.as_mut().poll(cx) {
            Poll::Ready(()) => Poll::Ready(io::Error::new(
                io::ErrorKind::TimedOut,
                "connection idle timeout",
            )),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for IdleStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(result) => Poll::Ready(this.observe(result)),
            Poll::Pending => this.poll_idle(cx).map(Err),
        }
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for IdleStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        Pin::new(&mut this.inner)
            .poll_write(cx, buf)
            .map(|result| this.observe(result))
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        Pin::new(&mut this.inner)
            .poll_write_vectored(cx, bufs)
            .map(|result| this.observe(result))
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
