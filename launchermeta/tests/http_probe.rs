//! Integration tests for the HTTP probe against a local stub server.
//!
//! The stub answers `HEAD` requests for paths in its hosted list with 200,
//! redirects paths under `/old/` to the same file under `/new/`, and answers
//! everything else with 404, one connection at a time. Every request it
//! receives is reported back to the test.

use launchermeta::repository::{ArtifactProbe, HttpProbe, ProbeOutcome, ProbeSettings};
use rstest::rstest;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// A request as seen by the stub server.
#[derive(Debug)]
struct ReceivedRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
}

impl ReceivedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn serve(
    hosted: &'static [&'static str],
    connections: usize,
) -> (String, Receiver<ReceivedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let address = listener.local_addr().expect("local address");
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for stream in listener.incoming().take(connections) {
            respond(stream.expect("accept"), hosted, &sender);
        }
    });
    (format!("http://{address}"), receiver)
}

fn respond(stream: TcpStream, hosted: &[&str], requests: &Sender<ReceivedRequest>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    reader.read_line(&mut request_line).expect("read request line");
    let mut headers = Vec::new();
    loop {
        let mut header = String::new();
        let read = reader.read_line(&mut header).expect("read header");
        if read == 0 || header == "\r\n" {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            headers.push((name.trim().to_lowercase(), value.trim().to_owned()));
        }
    }

    let mut parts = request_line.split(' ');
    let method = parts.next().unwrap_or_default().to_owned();
    let path = parts.next().unwrap_or_default().to_owned();
    let response = if let Some(file) = path.strip_prefix("/old/") {
        format!("302 Found\r\nLocation: /new/{file}")
    } else if method == "HEAD" && hosted.contains(&path.as_str()) {
        "200 OK".to_owned()
    } else {
        "404 Not Found".to_owned()
    };
    requests
        .send(ReceivedRequest {
            method,
            path,
            headers,
        })
        .expect("report request");

    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {response}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    )
    .expect("write response");
}

fn next_request(requests: &Receiver<ReceivedRequest>) -> ReceivedRequest {
    requests
        .recv_timeout(Duration::from_secs(5))
        .expect("stub server received a request")
}

const HOSTED: &[&str] = &["/maven2/eu/example/foo/1.0/foo-1.0.jar", "/new/foo.jar"];

#[rstest]
#[case::hosted("/maven2/eu/example/foo/1.0/foo-1.0.jar", ProbeOutcome::Found)]
#[case::absent(
    "/maven2/eu/example/bar/1.0/bar-1.0.jar",
    ProbeOutcome::Missing { status: 404 }
)]
fn probe_reports_server_status(#[case] path: &str, #[case] expected: ProbeOutcome) {
    let (base, _requests) = serve(HOSTED, 1);
    let probe = HttpProbe::new(&ProbeSettings::default());
    assert_eq!(probe.probe(&format!("{base}{path}")), expected);
}

#[test]
fn redirects_are_followed_with_uncached_head_requests() {
    let (base, requests) = serve(HOSTED, 2);
    let settings = ProbeSettings::default();
    let probe = HttpProbe::new(&settings);

    let outcome = probe.probe(&format!("{base}/old/foo.jar"));

    assert_eq!(outcome, ProbeOutcome::Found);
    let received = [next_request(&requests), next_request(&requests)];
    let paths: Vec<_> = received.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, ["/old/foo.jar", "/new/foo.jar"]);
    for request in &received {
        assert_eq!(request.method, "HEAD", "{request:?}");
        assert_eq!(
            request.header("user-agent"),
            Some(settings.user_agent.as_str())
        );
        assert_eq!(request.header("cache-control"), Some("no-cache"));
        assert_eq!(request.header("pragma"), Some("no-cache"));
    }
}

#[test]
fn probe_reports_refused_connection_as_unreachable() {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local address")
    };
    let settings = ProbeSettings {
        connect_timeout_secs: 2,
        read_timeout_secs: 2,
        ..ProbeSettings::default()
    };
    let probe = HttpProbe::new(&settings);
    let outcome = probe.probe(&format!("http://{address}/foo.jar"));
    assert!(
        matches!(outcome, ProbeOutcome::Unreachable { .. }),
        "{outcome:?}"
    );
}
