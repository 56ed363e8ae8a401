use std::time::Duration;

use reqwest::blocking::{Client, multipart};
use tracing::{Level, event};

use super::frames::Frame;
use super::{RecognitionBackend, TransportError};

/// Uploads each frame as multipart field `image` and returns the reply body.
pub struct HttpBackend {
    client: Client,
    url: String,
}

impl HttpBackend {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl RecognitionBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    fn recognize(&mut self, frame: &Frame) -> Result<String, TransportError> {
        let part = multipart::Part::bytes(frame.bytes.clone())
            .file_name(frame.label.clone())
            .mime_str(frame.mime)?;
        let form = multipart::Form::new().part("image", part);

        let response = self.client.post(&self.url).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text()?;
        event!(
            target: "cardcount::capture",
            Level::DEBUG,
            frame = %frame.label,
            bytes = frame.bytes.len(),
            "upload finished"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Accepts one request, answers with `status` and `body`, and hands the raw
    /// request back to the test.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let url = format!("http://{}/", listener.local_addr().expect("addr"));
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let request = read_request(&mut stream);
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).expect("write");
            request
        });
        (url, handle)
    }

    fn read_request(stream: &mut impl Read) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).expect("read");
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw);
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let headers = text[..header_end].to_ascii_lowercase();
            let body_len = raw.len() - (header_end + 4);
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok());
            let complete = match length {
                Some(length) => body_len >= length,
                None => text.ends_with("0\r\n\r\n"),
            };
            if complete {
                break;
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn frame() -> Frame {
        Frame {
            label: "table-0001.jpg".to_string(),
            bytes: b"not really a jpeg".to_vec(),
            mime: "image/jpeg",
        }
    }

    #[test]
    fn uploads_frame_as_image_field() {
        let (url, server) = serve_once("200 OK", r#"{"suit":"H","rank":"K"}"#);
        let mut backend = HttpBackend::new(url, Duration::from_secs(5)).expect("client");

        let body = backend.recognize(&frame()).expect("upload");
        assert_eq!(body, r#"{"suit":"H","rank":"K"}"#);

        let request = server.join().expect("server thread");
        assert!(request.starts_with("POST / HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("multipart/form-data; boundary="));
        assert!(request.contains(r#"name="image""#));
        assert!(request.contains(r#"filename="table-0001.jpg""#));
        assert!(request.contains("not really a jpeg"));
    }

    #[test]
    fn non_success_status_is_a_transport_error() {
        let (url, server) = serve_once("503 Service Unavailable", "busy");
        let mut backend = HttpBackend::new(url.clone(), Duration::from_secs(5)).expect("client");

        let err = backend.recognize(&frame()).unwrap_err();
        assert!(matches!(
            err,
            TransportError::Status { status: 503, url: ref target } if *target == url
        ));
        server.join().expect("server thread");
    }
}
