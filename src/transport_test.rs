use super::*;
use crate::error::Category;
use std::net::TcpListener;
use std::os::unix::net::UnixListener;

#[test]
fn dial_rejects_unknown_scheme() {
    let err =
        dial("http://127.0.0.1:7077", Duration::from_secs(1)).expect_err("http must be rejected");
    assert_eq!(err.category, Some(Category::Connection));
    assert_eq!(err.message, "Invalid schema: Use tcp or local.");
}

#[test]
fn dial_rejects_unparseable_connection_string() {
    let err =
        dial("not a connection string", Duration::from_secs(1)).expect_err("garbage must fail");
    assert_eq!(err.category, Some(Category::Connection));
    assert!(err.message.starts_with("Invalid connection string"));
}

#[test]
fn dial_rejects_tcp_without_port() {
    let err = dial("tcp://127.0.0.1", Duration::from_secs(1)).expect_err("missing port must fail");
    assert_eq!(err.category, Some(Category::Connection));
    assert!(err.message.contains("missing port"));
}

#[test]
fn dial_rejects_local_without_path() {
    let err = dial("local://ignored-host", Duration::from_secs(1))
        .expect_err("empty socket path must fail");
    assert_eq!(err.category, Some(Category::Connection));
    assert!(err.message.contains("missing socket path"));
}

#[test]
fn dial_tcp_connects_to_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();

    let mut conn = dial(&format!("tcp://127.0.0.1:{port}"), Duration::from_secs(5))
        .expect("dial should succeed");
    conn.refresh_write_deadline(Duration::from_secs(5))
        .expect("deadline refresh should succeed");
    conn.write_all(b"hello").expect("write should succeed");
}

#[test]
fn dial_tcp_connects_to_ipv6_literal() {
    let listener = TcpListener::bind("[::1]:0").expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();

    dial(&format!("tcp://[::1]:{port}"), Duration::from_secs(5))
        .expect("bracketed literal should dial without a resolver");
}

#[test]
fn dial_tcp_reports_refused_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let err = dial(&format!("tcp://127.0.0.1:{port}"), Duration::from_secs(5))
        .expect_err("refused connect must fail");
    assert_eq!(err.category, Some(Category::Connection));
}

#[test]
fn dial_local_connects_through_socket_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("node.sock");
    let _listener = UnixListener::bind(&path).expect("bind unix socket");

    let mut conn = dial(&format!("local://{}", path.display()), Duration::from_secs(5))
        .expect("dial should succeed");
    conn.refresh_write_deadline(Duration::from_secs(5))
        .expect("deadline refresh should succeed");
    conn.write_all(b"hello").expect("write should succeed");
}

#[test]
fn dial_local_decodes_percent_encoded_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("node with spaces.sock");
    let _listener = UnixListener::bind(&path).expect("bind unix socket");

    // the url parser encodes the spaces; dialing must undo that.
    dial(&format!("local://{}", path.display()), Duration::from_secs(5))
        .expect("decoded path should reach the socket");
}

#[test]
fn dial_local_reports_missing_socket_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.sock");

    let err = dial(&format!("local://{}", path.display()), Duration::from_secs(5))
        .expect_err("missing socket must fail");
    assert_eq!(err.category, Some(Category::Connection));
}

#[test]
fn zero_connect_timeout_means_unbounded_dial() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();

    dial(&format!("tcp://127.0.0.1:{port}"), Duration::ZERO)
        .expect("unbounded dial should succeed");
}

#[test]
fn shutdown_twice_is_not_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();
    let mut conn =
        dial(&format!("tcp://127.0.0.1:{port}"), Duration::from_secs(5)).expect("dial");

    conn.shutdown().expect("first shutdown should succeed");
    conn.shutdown().expect("second shutdown should succeed");
}

#[test]
fn zero_timeout_disables_read_deadline() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let mut stream = TcpStream::connect(addr).expect("connect");

    stream
        .refresh_read_deadline(Duration::from_secs(7))
        .expect("set deadline");
    assert_eq!(
        stream.read_timeout().expect("read timeout"),
        Some(Duration::from_secs(7))
    );

    stream
        .refresh_read_deadline(Duration::ZERO)
        .expect("clear deadline");
    assert_eq!(stream.read_timeout().expect("read timeout"), None);
}
