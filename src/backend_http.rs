use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    time::{Duration, Instant},
};

use url::Url;

use crate::http_response;

const MAX_STATUS_LINE_BYTES: usize = 1024;
const MIN_IO_TIMEOUT: Duration = Duration::from_millis(1);

fn remaining(deadline: Instant) -> Option<Duration> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        None
    } else {
        Some(left.max(MIN_IO_TIMEOUT))
    }
}

fn resolve_addrs(url: &Url) -> Result<Vec<SocketAddr>, String> {
    let host = url
        .host_str()
        .ok_or_else(|| format!("URL has no host: {url}"))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let port = url.port_or_known_default().unwrap_or(80);
    (host, port)
        .to_socket_addrs()
        .map(|addrs| addrs.collect())
        .map_err(|error| format!("Failed to resolve {host}:{port}: {error}"))
}

fn build_request(url: &Url) -> String {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    let host = match url.port() {
        Some(port) => format!("{}:{port}", url.host_str().unwrap_or("127.0.0.1")),
        None => url.host_str().unwrap_or("127.0.0.1").to_string(),
    };
    format!(
        "GET {target} HTTP/1.1\r\nHost: {host}\r\nUser-Agent: stressless-desktop\r\nAccept: */*\r\nConnection: close\r\n\r\n"
    )
}

/// Issues one GET and returns the response status code. The whole exchange,
/// connect included, is bounded by `timeout`.
pub(crate) fn get_status(raw_url: &str, timeout: Duration) -> Result<u16, String> {
    let url = Url::parse(raw_url).map_err(|error| format!("Invalid URL {raw_url}: {error}"))?;
    if url.scheme() != "http" {
        return Err(format!(
            "Unsupported probe scheme '{}', only http is supported.",
            url.scheme()
        ));
    }

    let deadline = Instant::now() + timeout;
    let addrs = resolve_addrs(&url)?;
    let mut last_error = format!("No addresses resolved for {url}");
    let mut stream = None;
    for address in addrs {
        let Some(left) = remaining(deadline) else {
            break;
        };
        match TcpStream::connect_timeout(&address, left) {
            Ok(connected) => {
                stream = Some(connected);
                break;
            }
            Err(error) => last_error = format!("Failed to connect to {address}: {error}"),
        }
    }
    let mut stream = stream.ok_or(last_error)?;

    let left = remaining(deadline).ok_or_else(|| "Probe deadline elapsed.".to_string())?;
    stream
        .set_write_timeout(Some(left))
        .map_err(|error| format!("Failed to set write timeout: {error}"))?;
    stream
        .write_all(build_request(&url).as_bytes())
        .map_err(|error| format!("Failed to send probe request: {error}"))?;

    let mut buffer = Vec::with_capacity(256);
    let mut chunk = [0_u8; 256];
    loop {
        if let Some(code) = http_response::parse_status_line(&buffer) {
            return Ok(code);
        }
        if buffer.len() >= MAX_STATUS_LINE_BYTES {
            return Err("Probe response has no valid status line.".to_string());
        }
        let left = remaining(deadline).ok_or_else(|| "Probe deadline elapsed.".to_string())?;
        stream
            .set_read_timeout(Some(left))
            .map_err(|error| format!("Failed to set read timeout: {error}"))?;
        match stream.read(&mut chunk) {
            Ok(0) => return Err("Connection closed before a response arrived.".to_string()),
            Ok(read) => buffer.extend_from_slice(&chunk[..read]),
            Err(error) => return Err(format!("Failed to read probe response: {error}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{net::TcpListener, thread};

    use super::*;

    fn serve_once(response: &'static [u8]) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let port = listener.local_addr().expect("local addr").port();
        let handle = thread::spawn(move || {
            let (mut socket, _) = listener.accept().expect("accept probe");
            let mut request = [0_u8; 512];
            let read = socket.read(&mut request).expect("read request");
            socket.write_all(response).expect("write response");
            String::from_utf8_lossy(&request[..read]).to_string()
        });
        (format!("http://127.0.0.1:{port}/api/presets"), handle)
    }

    #[test]
    fn get_status_returns_any_status_code() {
        let (url, handle) = serve_once(b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\n\r\n");
        assert_eq!(get_status(&url, Duration::from_secs(2)), Ok(401));
        let request = handle.join().expect("join server");
        assert!(request.starts_with("GET /api/presets HTTP/1.1\r\n"));
        assert!(request.contains("Connection: close"));
    }

    #[test]
    fn get_status_fails_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let result = get_status(
            &format!("http://127.0.0.1:{port}/"),
            Duration::from_millis(500),
        );
        assert!(result.is_err());
    }

    #[test]
    fn get_status_times_out_on_silent_server() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
        let port = listener.local_addr().expect("local addr").port();

        let started = Instant::now();
        let result = get_status(
            &format!("http://127.0.0.1:{port}/"),
            Duration::from_millis(200),
        );
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(2));
        drop(listener);
    }

    #[test]
    fn get_status_rejects_https() {
        assert!(get_status("https://127.0.0.1:8080/", Duration::from_millis(100)).is_err());
    }

    #[test]
    fn build_request_keeps_query_and_port() {
        let url = Url::parse("http://127.0.0.1:8080/api/presets?probe=1").expect("parse url");
        let request = build_request(&url);
        assert!(request.starts_with("GET /api/presets?probe=1 HTTP/1.1\r\n"));
        assert!(request.contains("Host: 127.0.0.1:8080\r\n"));
    }
}
