//! Single-shot non-blocking HTTP/1.1 GET.
//!
//! `fetch` opens a connection with a bounded connect timeout, switches the
//! socket to non-blocking mode, and enqueues a polling task. Once per tick
//! that task attempts one non-blocking write (until the request is out) or
//! one non-blocking read (appending to the accumulated buffer). When the
//! peer closes the connection, the socket is closed, the buffer is split
//! into header block and body, and the body is delivered.
//!
//! There is no read-phase timeout: a connected peer that never closes keeps
//! the polling task alive indefinitely. Only the connect phase is bounded.
//! Reading in small chunks costs O(n) system calls in the response size,
//! which is fine for the small payloads this client is meant for.

use crate::error::Error;
use crate::net::response;
use crate::net::url::Target;
use crate::promise::Promise;
use crate::runtime::Scheduler;
use crate::task::{Step, Task};

use log::{debug, trace};
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

const READ_CHUNK: usize = 4096;

type Deliver = Box<dyn FnOnce(Result<String, Error>)>;

/// Fetches `url` and resolves the returned promise with the response body.
///
/// Connection failures reject immediately; everything after the connect is
/// driven by the scheduler, one poll per tick.
///
/// # Example
/// ```ignore
/// use looper::{fetch, Scheduler};
///
/// let scheduler = Scheduler::new();
/// let body = scheduler.block_on(&fetch(&scheduler, "http://localhost:8000/"))?;
/// ```
pub fn fetch(scheduler: &Scheduler, url: &str) -> Promise<String> {
    let (promise, settle) = Promise::pending();
    fetch_with(scheduler, url, move |outcome| match outcome {
        Ok(body) => settle.fulfill(body),
        Err(error) => settle.reject(error),
    });
    promise
}

/// Callback-pair variant of [`fetch`]: `deliver` receives the body on
/// success or the error on failure, exactly once.
pub fn fetch_with<F>(scheduler: &Scheduler, url: &str, deliver: F)
where
    F: FnOnce(Result<String, Error>) + 'static,
{
    match open(scheduler, url) {
        Ok((stream, request)) => scheduler.enqueue(poll_exchange(
            Exchange::Send {
                stream,
                request,
                written: 0,
            },
            Box::new(deliver),
        )),
        Err(error) => deliver(Err(error)),
    }
}

/// Connects and prepares the request bytes. Everything here is the blocking
/// prologue; the socket comes back already in non-blocking mode.
fn open(scheduler: &Scheduler, url: &str) -> Result<(TcpStream, Vec<u8>), Error> {
    let target = Target::parse(url)?;

    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: Close\r\n\r\n",
        target.request_target(),
        target.host,
    )
    .into_bytes();

    let address = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .map_err(|err| Error::connection(&err))?
        .next()
        .ok_or_else(|| Error::Connection {
            code: -1,
            message: format!("no address found for {}", target.host),
        })?;

    debug!("connecting to {}:{}", target.host, target.port);
    let stream = TcpStream::connect_timeout(&address, scheduler.connect_timeout())
        .map_err(|err| Error::connection(&err))?;
    stream
        .set_nonblocking(true)
        .map_err(|err| Error::connection(&err))?;

    Ok((stream, request))
}

/// The per-tick state of an exchange, carried by value from one polling
/// task to the next.
enum Exchange {
    Send {
        stream: TcpStream,
        request: Vec<u8>,
        written: usize,
    },
    Receive {
        stream: TcpStream,
        buffer: Vec<u8>,
    },
}

fn poll_exchange(state: Exchange, deliver: Deliver) -> Task {
    Task::new(move |_scheduler| advance(state, deliver))
}

/// One non-blocking I/O attempt. Anything unfinished comes back as a fresh
/// task carrying the updated state.
fn advance(state: Exchange, deliver: Deliver) -> Step {
    match state {
        Exchange::Send {
            mut stream,
            request,
            written,
        } => match stream.write(&request[written..]) {
            Ok(0) => {
                drop(stream);
                deliver(Err(Error::Connection {
                    code: -1,
                    message: "write returned zero bytes".to_string(),
                }));
                Step::Done
            }
            Ok(count) => {
                let written = written + count;
                if written == request.len() {
                    trace!("request sent ({} bytes)", written);
                    Step::Again(poll_exchange(
                        Exchange::Receive {
                            stream,
                            buffer: Vec::new(),
                        },
                        deliver,
                    ))
                } else {
                    Step::Again(poll_exchange(
                        Exchange::Send {
                            stream,
                            request,
                            written,
                        },
                        deliver,
                    ))
                }
            }
            Err(error) if retryable(&error) => Step::Again(poll_exchange(
                Exchange::Send {
                    stream,
                    request,
                    written,
                },
                deliver,
            )),
            Err(error) => {
                drop(stream);
                deliver(Err(Error::connection(&error)));
                Step::Done
            }
        },
        Exchange::Receive {
            mut stream,
            mut buffer,
        } => {
            let mut chunk = [0u8; READ_CHUNK];
            match stream.read(&mut chunk) {
                // End of stream: close the socket, then deliver.
                Ok(0) => {
                    debug!("peer closed connection, {} bytes buffered", buffer.len());
                    drop(stream);
                    deliver(response::split(&buffer).map(|(_head, body)| body));
                    Step::Done
                }
                Ok(count) => {
                    trace!("read {} bytes", count);
                    buffer.extend_from_slice(&chunk[..count]);
                    Step::Again(poll_exchange(Exchange::Receive { stream, buffer }, deliver))
                }
                Err(error) if retryable(&error) => {
                    Step::Again(poll_exchange(Exchange::Receive { stream, buffer }, deliver))
                }
                Err(error) => {
                    drop(stream);
                    deliver(Err(Error::connection(&error)));
                    Step::Done
                }
            }
        }
    }
}

fn retryable(error: &std::io::Error) -> bool {
    matches!(error.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted)
}
