//! Shared helpers for integration tests: a scripted Bot API stub served
//! over a real TCP socket, plus a parser for the multipart bodies the
//! handler uploads.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// One scripted reply. The stub answers requests in order and stops once
/// the script runs out.
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
}

impl CannedResponse {
    /// A `200` envelope wrapping `result`, given as raw JSON.
    pub fn ok(result: &str) -> Self {
        Self {
            status: 200,
            body: format!("{{\"ok\":true,\"result\":{result}}}"),
        }
    }

    /// A rejection envelope with a matching HTTP status.
    #[allow(dead_code)]
    pub fn rejection(status: u16, description: &str) -> Self {
        Self {
            status,
            body: format!(
                "{{\"ok\":false,\"error_code\":{status},\"description\":\"{description}\"}}"
            ),
        }
    }
}

#[derive(Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    /// Look up a header by its lowercased name.
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Parses a single header line into a lowercased key-value pair.
fn parse_header_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    line.split_once(':')
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
}

fn read_headers(reader: &mut BufReader<TcpStream>) -> (Vec<(String, String)>, usize) {
    let mut headers = Vec::new();
    let mut content_length = 0usize;

    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header");
        if line.trim().is_empty() {
            break;
        }
        let Some((key, value)) = parse_header_line(&line) else {
            continue;
        };
        if key == "content-length" {
            content_length = value.parse().unwrap_or(0);
        }
        headers.push((key, value));
    }

    (headers, content_length)
}

fn read_body(reader: &mut BufReader<TcpStream>, content_length: usize) -> String {
    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).expect("read body");
    }
    String::from_utf8_lossy(&body).to_string()
}

fn read_http_request(stream: &mut TcpStream) -> CapturedRequest {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .expect("read request line");
    let parts: Vec<&str> = request_line.trim().split(' ').collect();
    let method = parts.first().unwrap_or(&"").to_string();
    let path = parts.get(1).unwrap_or(&"").to_string();

    let (headers, content_length) = read_headers(&mut reader);
    let body = read_body(&mut reader, content_length);

    CapturedRequest {
        method,
        path,
        headers,
        body,
    }
}

/// Spawn a stub Bot API server answering with `responses` in order.
///
/// Returns the base URL to point the handler at and a receiver yielding one
/// [`CapturedRequest`] per exchange. Replies close the connection so every
/// request arrives on a fresh accept.
pub fn spawn_api_server(
    responses: Vec<CannedResponse>,
) -> (String, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
    let addr = listener.local_addr().expect("listener has address");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for response in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                break;
            };
            let captured = read_http_request(&mut stream);
            let reply = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response.status,
                status_text(response.status),
                response.body.len(),
                response.body
            );
            let _ = stream.write_all(reply.as_bytes());
            let _ = tx.send(captured);
        }
    });

    (format!("http://{addr}"), rx)
}

/// A base URL with nothing listening behind it, for transport failures.
#[allow(dead_code)]
pub fn refused_endpoint() -> String {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
    let addr = listener.local_addr().expect("listener has address");
    drop(listener);
    format!("http://{addr}")
}

/// One decoded part of a multipart request body.
#[derive(Debug)]
#[allow(dead_code)]
pub struct MultipartPart {
    pub name: String,
    pub filename: Option<String>,
    pub value: String,
}

/// Decode the parts of a `multipart/form-data` body. The first line of the
/// body is taken as the boundary delimiter.
#[allow(dead_code)]
pub fn multipart_parts(body: &str) -> Vec<MultipartPart> {
    let Some(first_line_end) = body.find("\r\n") else {
        return Vec::new();
    };
    let delimiter = &body[..first_line_end];

    body.split(delimiter)
        .filter_map(|chunk| {
            let chunk = chunk.strip_prefix("\r\n").unwrap_or(chunk);
            let (raw_headers, value) = chunk.split_once("\r\n\r\n")?;
            let mut name = None;
            let mut filename = None;
            for line in raw_headers.lines() {
                let Some(rest) = line.strip_prefix("Content-Disposition: form-data;") else {
                    continue;
                };
                for attribute in rest.split(';') {
                    let attribute = attribute.trim();
                    if let Some(v) = attribute.strip_prefix("name=\"") {
                        name = Some(v.trim_end_matches('"').to_string());
                    } else if let Some(v) = attribute.strip_prefix("filename=\"") {
                        filename = Some(v.trim_end_matches('"').to_string());
                    }
                }
            }
            Some(MultipartPart {
                name: name?,
                filename,
                value: value.strip_suffix("\r\n").unwrap_or(value).to_string(),
            })
        })
        .collect()
}
