use looper::{Error, Scheduler, fetch, fetch_with};
use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;

/// Serves exactly one connection: reads the request, writes `response`, and
/// closes. Returns the port and a channel carrying the captured request.
fn serve_once(response: &'static [u8]) -> (u16, mpsc::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();
    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _peer) = listener.accept().expect("accept");

        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => request.extend_from_slice(&chunk[..n]),
                Err(err) => panic!("server read failed: {err}"),
            }
        }
        sender.send(request).expect("report request");

        stream.write_all(response).expect("write response");
        // Dropping the stream closes the connection, which ends the fetch.
    });

    (port, receiver)
}

#[test]
fn fetch_resolves_with_the_response_body() {
    let (port, _request) = serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK");
    let scheduler = Scheduler::new();

    let body = scheduler
        .block_on(&fetch(&scheduler, &format!("http://127.0.0.1:{port}/")))
        .expect("fetch should resolve");

    assert_eq!(body, "OK");
}

#[test]
fn fetch_sends_the_exact_request_bytes() {
    let (port, request) = serve_once(b"HTTP/1.1 200 OK\r\n\r\n");
    let scheduler = Scheduler::new();

    scheduler
        .block_on(&fetch(
            &scheduler,
            &format!("http://127.0.0.1:{port}/weather?city=lyon"),
        ))
        .expect("fetch should resolve");

    let request = request.recv().expect("server captured the request");
    assert_eq!(
        request,
        b"GET /weather?city=lyon HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: Close\r\n\r\n".to_vec()
    );
}

#[test]
fn fetch_rejects_when_the_connection_fails() {
    // Bind then drop, so the port is very likely dead.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local addr").port()
    };

    let scheduler = Scheduler::new();
    let error = scheduler
        .block_on(&fetch(&scheduler, &format!("http://127.0.0.1:{port}/")))
        .expect_err("fetch should reject");

    assert!(
        matches!(error, Error::Connection { .. }),
        "expected a connection error, got {error:?}"
    );
}

#[test]
fn fetch_rejects_a_bad_url_immediately() {
    let scheduler = Scheduler::new();

    let error = scheduler
        .block_on(&fetch(&scheduler, "ftp://127.0.0.1/"))
        .expect_err("non-http scheme should reject");

    assert!(matches!(error, Error::Url(_)));
}

#[test]
fn response_without_delimiter_is_a_decode_error() {
    let (port, _request) = serve_once(b"HTTP/1.1 200 OK\r\n");
    let scheduler = Scheduler::new();

    let error = scheduler
        .block_on(&fetch(&scheduler, &format!("http://127.0.0.1:{port}/")))
        .expect_err("headers without a blank line should reject");

    assert_eq!(error, Error::Decode);
}

#[test]
fn lf_only_delimiter_is_accepted() {
    let (port, _request) = serve_once(b"HTTP/1.1 200 OK\nContent-Length: 2\n\nOK");
    let scheduler = Scheduler::new();

    let body = scheduler
        .block_on(&fetch(&scheduler, &format!("http://127.0.0.1:{port}/")))
        .expect("fetch should resolve");

    assert_eq!(body, "OK");
}

#[test]
fn fetch_with_delivers_through_the_callback_pair() {
    let (port, _request) = serve_once(b"HTTP/1.1 200 OK\r\n\r\nhello");
    let scheduler = Scheduler::new();
    let delivered = Rc::new(RefCell::new(None));

    {
        let delivered = delivered.clone();
        fetch_with(
            &scheduler,
            &format!("http://127.0.0.1:{port}/"),
            move |outcome| *delivered.borrow_mut() = Some(outcome),
        );
    }
    scheduler.run();

    assert_eq!(*delivered.borrow(), Some(Ok("hello".to_string())));
}

#[test]
fn fetches_poll_concurrently() {
    let (port_a, _ra) = serve_once(b"HTTP/1.1 200 OK\r\n\r\nA");
    let (port_b, _rb) = serve_once(b"HTTP/1.1 200 OK\r\n\r\nB");
    let scheduler = Scheduler::new();

    // Both polling tasks are enqueued before either result is awaited.
    let first = fetch(&scheduler, &format!("http://127.0.0.1:{port_a}/"));
    let second = fetch(&scheduler, &format!("http://127.0.0.1:{port_b}/"));

    assert_eq!(scheduler.block_on(&first), Ok("A".to_string()));
    assert_eq!(scheduler.block_on(&second), Ok("B".to_string()));
}
