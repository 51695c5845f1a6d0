use std::{
    future::Future,
    io::{self, BufRead, BufReader, Read},
    pin::Pin,
    thread,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub type Shutdown = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Longest line, terminator excluded, that is handed to the parser.
pub const MAX_LINE_LEN: usize = 64 * 1024;
const CHANNEL_CAPACITY: usize = 1024;

/// Why a [`LineSource`] stopped yielding lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Eof,
    Interrupted,
    ReadFailed,
}

#[derive(Debug)]
enum Chunk {
    Line(Vec<u8>),
    Overlong(usize),
    Failed(io::Error),
}

/// Line-at-a-time reader that folds end of input, interruption and read
/// failures into the same `None`.
///
/// Reads happen on a plain thread so a blocked read never holds up the
/// runtime; once the source is done with, that thread is simply abandoned.
pub struct LineSource<S> {
    rx: mpsc::Receiver<Chunk>,
    shutdown: Pin<Box<S>>,
    ended: Option<EndReason>,
    overlong: u64,
}

impl<S> LineSource<S>
where
    S: Future<Output = ()>,
{
    pub fn spawn<R>(reader: R, max_line_len: usize, shutdown: S) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        thread::Builder::new()
            .name("log-reader".into())
            .spawn(move || read_lines(BufReader::new(reader), max_line_len, tx))?;
        Ok(Self {
            rx,
            shutdown: Box::pin(shutdown),
            ended: None,
            overlong: 0,
        })
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.ended
    }

    /// Lines dropped for exceeding the length limit.
    pub fn overlong_lines(&self) -> u64 {
        self.overlong
    }

    /// Next line without its terminator, or `None` once the stream is over.
    pub async fn next_line(&mut self) -> Option<String> {
        while self.ended.is_none() {
            let outcome = tokio::select! {
                biased;
                _ = self.shutdown.as_mut() => Err(EndReason::Interrupted),
                chunk = self.rx.recv() => match chunk {
                    Some(Chunk::Line(bytes)) => Ok(Some(bytes)),
                    Some(Chunk::Overlong(len)) => {
                        debug!(len, "skipping overlong line");
                        self.overlong += 1;
                        Ok(None)
                    }
                    Some(Chunk::Failed(e)) => {
                        warn!(error = %e, "failed to read input, finishing up");
                        Err(EndReason::ReadFailed)
                    }
                    None => Err(EndReason::Eof),
                },
            };
            match outcome {
                Ok(Some(bytes)) => {
                    let line = String::from_utf8_lossy(&bytes);
                    return Some(line.trim_end_matches(['\n', '\r']).to_string());
                }
                Ok(None) => {}
                Err(reason) => {
                    debug!(?reason, "input stream ended");
                    self.ended = Some(reason);
                }
            }
        }
        None
    }
}

fn read_lines<R: BufRead>(mut reader: R, max_line_len: usize, tx: mpsc::Sender<Chunk>) {
    loop {
        let chunk = match read_capped_line(&mut reader, max_line_len) {
            Ok(Some(chunk)) => chunk,
            Ok(None) => return,
            Err(e) => Chunk::Failed(e),
        };
        let failed = matches!(chunk, Chunk::Failed(_));
        if tx.blocking_send(chunk).is_err() || failed {
            return;
        }
    }
}

/// Reads through the next `\n`. Bytes past the limit are consumed but not
/// kept, so memory stays bounded whatever the input looks like.
fn read_capped_line<R: BufRead>(reader: &mut R, max_line_len: usize) -> io::Result<Option<Chunk>> {
    let mut line = Vec::new();
    let mut seen = 0usize;
    let mut overlong = false;
    loop {
        let available = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            if seen == 0 {
                return Ok(None);
            }
            break;
        }
        let (taken, done) = match available.iter().position(|b| *b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        if !overlong {
            line.extend_from_slice(&available[..taken]);
            let content = line.len() - usize::from(done);
            if content > max_line_len {
                overlong = true;
                line = Vec::new();
            }
        }
        seen += taken;
        reader.consume(taken);
        if done {
            break;
        }
    }
    Ok(Some(if overlong {
        Chunk::Overlong(seen)
    } else {
        Chunk::Line(line)
    }))
}

/// Resolves on the first SIGINT or SIGTERM. Handlers are installed when this
/// is called rather than on first poll, so no signal is missed in between.
#[cfg(unix)]
pub fn shutdown_signal() -> Shutdown {
    use tokio::signal::unix::{SignalKind, signal};

    match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(mut interrupt), Ok(mut terminate)) => {
            debug!("signal handlers installed");
            Box::pin(async move {
                tokio::select! {
                    _ = interrupt.recv() => {},
                    _ = terminate.recv() => {},
                }
            })
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "failed to install signal handler");
            Box::pin(std::future::pending())
        }
    }
}

#[cfg(not(unix))]
pub fn shutdown_signal() -> Shutdown {
    Box::pin(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    })
}
