use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use url::Url;

/// Answers one HTTP request per `(status_line, body)` pair, in order, then exits.
/// The join handle yields the raw requests it received.
pub(crate) fn serve_sequence(
    replies: Vec<(&'static str, &'static str)>,
) -> (Url, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let address = listener.local_addr().expect("local addr");

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status_line, body) in replies {
            let (mut stream, _) = listener.accept().expect("accept");
            requests.push(read_request(&mut stream));
            let reply = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).expect("write reply");
        }
        requests
    });

    let url = Url::parse(&format!("http://{address}")).expect("server url");
    (url, handle)
}

pub(crate) fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (Url, JoinHandle<String>) {
    let (url, handle) = serve_sequence(vec![(status_line, body)]);
    let single = thread::spawn(move || {
        handle
            .join()
            .expect("server thread")
            .into_iter()
            .next()
            .unwrap_or_default()
    });
    (url, single)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let read = stream.read(&mut chunk).expect("read request");
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&buffer);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buffer).into_owned()
}

/// Request body of a raw HTTP request captured by the test server.
pub(crate) fn request_body(request: &str) -> &str {
    request
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or_default()
}
