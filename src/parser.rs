//! Asynchronous CSV parser
//!
//! A [`Parser`] hands its [`CsvReader`] to a worker task and talks to it over
//! a channel. Each [`Parser::advance`] call enqueues one request immediately
//! and returns an [`Advance`] future that resolves exactly once, with a
//! record, `done`, or the read error.
//!
//! Physical reads never overlap: requests are served one at a time in the
//! order the calls were made, so issuing several `advance()` calls before
//! awaiting any of them is well defined. Each read runs on the blocking pool
//! only for its own duration; an idle parser holds no thread. A dispatched
//! request always runs to completion, even if its `Advance` is dropped.

use crate::csv::RecordDecoder;
use crate::csv_reader::CsvReader;
use crate::error::{CsvStreamError, Result};
use crate::options::ParserOptions;
use crate::types::AdvanceResult;
use std::future::Future;
use std::io::Read;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

/// One pending advance call
struct AdvanceRequest {
    reply: oneshot::Sender<Result<AdvanceResult>>,
}

/// Streaming CSV parser with an asynchronous advance operation
///
/// Must be created inside a Tokio runtime. The source is owned by the parser
/// and dropped once the parser and all pending requests are gone, or when the
/// runtime shuts down.
///
/// # Blocking construction
///
/// Constructors perform the leading-line skip synchronously on the calling
/// thread. A large `from_line` therefore blocks the executor for the length of
/// the skip; build the reader on the blocking pool and hand it over instead:
///
/// ```no_run
/// use csvstream::{CsvReader, Parser, ParserOptions};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let options = ParserOptions::builder().from_line(5_000_000).resolve()?;
/// let reader =
///     tokio::task::spawn_blocking(move || CsvReader::open("huge.csv", options)).await??;
/// let parser = Parser::from_csv_reader(reader)?;
/// # Ok(())
/// # }
/// ```
///
/// # Examples
///
/// ```no_run
/// use csvstream::{Parser, ParserOptions};
///
/// # async fn run() -> csvstream::Result<()> {
/// let options = ParserOptions::builder()
///     .from_line(1_000)
///     .to_line(2_000)
///     .resolve()?;
/// let parser = Parser::open("large.csv", options)?;
///
/// loop {
///     let result = parser.advance().await?;
///     if result.done {
///         break;
///     }
///     println!("{:?}", result.value);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Parser {
    requests: mpsc::UnboundedSender<AdvanceRequest>,
    cursor: Arc<AtomicU64>,
    options: ParserOptions,
}

impl Parser {
    /// Create a parser decoding `source` with the bundled CSV decoder
    ///
    /// Leading lines are skipped before this returns, blocking the caller
    /// (see [Blocking construction](Parser#blocking-construction)).
    pub fn new<R>(source: R, options: ParserOptions) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let runtime = current_runtime()?;
        let reader = CsvReader::from_reader(source, options)?;
        Ok(Self::spawn(&runtime, reader))
    }

    /// Open a CSV file and create a parser over it
    ///
    /// Opening and skipping block the caller.
    pub fn open<P: AsRef<Path>>(path: P, options: ParserOptions) -> Result<Self> {
        let runtime = current_runtime()?;
        let reader = CsvReader::open(path, options)?;
        Ok(Self::spawn(&runtime, reader))
    }

    /// Create a parser over a custom record decoder
    pub fn with_decoder<D>(decoder: D, options: ParserOptions) -> Result<Self>
    where
        D: RecordDecoder + 'static,
    {
        let runtime = current_runtime()?;
        let reader = CsvReader::new(decoder, options)?;
        Ok(Self::spawn(&runtime, reader))
    }

    /// Move an already positioned reader behind the async interface
    pub fn from_csv_reader<D>(reader: CsvReader<D>) -> Result<Self>
    where
        D: RecordDecoder + 'static,
    {
        let runtime = current_runtime()?;
        Ok(Self::spawn(&runtime, reader))
    }

    fn spawn<D>(runtime: &Handle, reader: CsvReader<D>) -> Self
    where
        D: RecordDecoder + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let cursor = reader.cursor_handle();
        let options = *reader.options();

        runtime.spawn(run_worker(reader, rx));

        Parser {
            requests: tx,
            cursor,
            options,
        }
    }

    /// Request the next record
    ///
    /// The request is queued before this returns; await the returned
    /// [`Advance`] for its outcome.
    pub fn advance(&self) -> Advance {
        let (reply, rx) = oneshot::channel();
        // On failure the request (and its reply sender) is dropped, which
        // the Advance reports as a stopped worker.
        let _ = self.requests.send(AdvanceRequest { reply });
        Advance { rx }
    }

    /// Number of records delivered so far
    ///
    /// Safe to call while requests are in flight.
    pub fn current_line(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    /// Options the parser was built with
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }
}

/// Completion handle for one [`Parser::advance`] call
pub struct Advance {
    rx: oneshot::Receiver<Result<AdvanceResult>>,
}

impl Future for Advance {
    type Output = Result<AdvanceResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|reply| match reply {
            Ok(result) => result,
            Err(_) => Err(CsvStreamError::InvalidState(
                "csv parser worker stopped".to_string(),
            )),
        })
    }
}

fn current_runtime() -> Result<Handle> {
    Handle::try_current().map_err(|e| {
        CsvStreamError::InvalidState(format!("csv parser requires a Tokio runtime: {}", e))
    })
}

async fn run_worker<D>(
    mut reader: CsvReader<D>,
    mut requests: mpsc::UnboundedReceiver<AdvanceRequest>,
) where
    D: RecordDecoder + 'static,
{
    while let Some(request) = requests.recv().await {
        let task = tokio::task::spawn_blocking(move || {
            let result = reader.advance();
            (reader, result)
        });
        let (returned, result) = match task.await {
            Ok(done) => done,
            Err(e) => {
                tracing::warn!(error = %e, "csv read task failed");
                let _ = request.reply.send(Err(CsvStreamError::InvalidState(format!(
                    "csv read task failed: {}",
                    e
                ))));
                // The reader was lost with the task; pending callers see a stopped worker.
                return;
            }
        };
        reader = returned;
        // Ignore send error, the caller may have dropped the handle.
        let _ = request.reply.send(result);
    }
    tracing::debug!(
        line = reader.current_line(),
        state = %reader.state(),
        "csv parser worker stopped"
    );
}
