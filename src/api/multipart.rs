//! Hand-encoded `multipart/form-data` bodies.
//!
//! Document uploads are the only multipart exchange this crate performs: a
//! handful of text fields plus one file part. That stays small enough to
//! encode directly.

use rand::Rng;
use rand::distributions::Alphanumeric;

pub(crate) struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(24)
            .map(char::from)
            .collect();
        Self {
            boundary: format!("telegram-handler-{suffix}"),
            body: Vec::new(),
        }
    }

    /// Append a text field.
    pub fn text(&mut self, name: &str, value: &str) {
        self.open_part(&format!("Content-Disposition: form-data; name=\"{name}\""));
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
    }

    /// Append the file part.
    pub fn file(&mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) {
        self.open_part(&format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}"
        ));
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
    }

    /// Close the form, returning the `Content-Type` header value and the
    /// encoded body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        let content_type = format!("multipart/form-data; boundary={}", self.boundary);
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (content_type, self.body)
    }

    fn open_part(&mut self, headers: &str) {
        self.body
            .extend_from_slice(format!("--{}\r\n{headers}\r\n\r\n", self.boundary).as_bytes());
    }
}
