//! Log record representation for the delivery pipeline.
//!
//! This module defines the `LogRecord` struct that captures log events along
//! with their contextual metadata, an optional exception snapshot, and an
//! optional web-request context consumed by the rich HTML rendering path.

use crate::level::Level;
use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

/// Additional context associated with a log record.
#[derive(Clone, Debug)]
pub struct RecordMetadata {
    /// Module path where the log call originated.
    pub module_path: String,
    /// Source file name for the log call.
    pub filename: String,
    /// Line number in the source file.
    pub line_number: u32,
    /// Originating function name, when the producer knows it. Records fed
    /// through the `log` facade leave this empty.
    pub function: String,
    /// Time the record was created.
    pub timestamp: SystemTime,
}

impl Default for RecordMetadata {
    fn default() -> Self {
        Self {
            module_path: String::new(),
            filename: String::new(),
            line_number: 0,
            function: String::new(),
            timestamp: SystemTime::now(),
        }
    }
}

/// Snapshot of an exception attached to a record.
///
/// `type_name` is absent for synthetic snapshots built from a bare message,
/// such as the stand-in the rich HTML path uses when a record carries no
/// exception of its own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExceptionInfo {
    /// Exception type name (e.g. "ValueError"), if one exists.
    pub type_name: Option<String>,
    /// Exception message text.
    pub message: String,
    /// Stack frames from outermost to innermost.
    pub frames: Vec<StackFrame>,
}

impl ExceptionInfo {
    /// Create a snapshot with a type name and message.
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            message: message.into(),
            frames: Vec::new(),
        }
    }

    /// Create a synthetic snapshot from a bare message, with no type and no
    /// frames.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            type_name: None,
            message: message.into(),
            frames: Vec::new(),
        }
    }

    /// Attach stack frames to the snapshot.
    #[must_use]
    pub fn with_frames(mut self, frames: Vec<StackFrame>) -> Self {
        self.frames = frames;
        self
    }
}

/// A single frame in a captured stack trace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackFrame {
    /// Source filename where the frame originated.
    pub filename: String,
    /// Line number in the source file.
    pub lineno: u32,
    /// Function or method name.
    pub function: String,
    /// Source code line, if available.
    pub source_line: Option<String>,
}

impl StackFrame {
    /// Create a new stack frame with required fields.
    pub fn new(filename: impl Into<String>, lineno: u32, function: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            lineno,
            function: function.into(),
            source_line: None,
        }
    }

    /// Attach the source code line for the frame.
    #[must_use]
    pub fn with_source_line(mut self, line: impl Into<String>) -> Self {
        self.source_line = Some(line.into());
        self
    }
}

/// Context of the web request active when the record was created.
///
/// Only records produced inside a request cycle carry one; everything else
/// leaves the field unset and the rich HTML path degrades to the base
/// template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// HTTP method of the request.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Submitted form payload, when the request carried one.
    pub post: Option<BTreeMap<String, String>>,
}

impl RequestContext {
    /// Create a context for a request without a form payload.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            post: None,
        }
    }

    /// Attach the submitted form payload.
    #[must_use]
    pub fn with_post(mut self, post: BTreeMap<String, String>) -> Self {
        self.post = Some(post);
        self
    }

    /// Whether the request exposes body data usable by a traceback report.
    pub fn has_body(&self) -> bool {
        self.post.is_some()
    }
}

/// A single log event on its way to a chat.
#[derive(Clone, Debug)]
pub struct LogRecord {
    /// Name of the logger that created this record.
    pub logger: String,
    /// Severity of the record.
    pub level: Level,
    /// The log message content, already merged with its arguments.
    pub message: String,
    /// Contextual metadata for the record.
    pub metadata: RecordMetadata,
    /// Exception snapshot, when the record reports one.
    pub exception: Option<ExceptionInfo>,
    /// Web-request context, when the record was created inside one.
    pub request: Option<RequestContext>,
}

impl LogRecord {
    /// Construct a new log record from logger `name`, `level`, and `message`.
    pub fn new(logger: &str, level: Level, message: &str) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata: RecordMetadata::default(),
            exception: None,
            request: None,
        }
    }

    /// Construct a log record with explicit source metadata.
    pub fn with_metadata(
        logger: &str,
        level: Level,
        message: &str,
        metadata: RecordMetadata,
    ) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata,
            exception: None,
            request: None,
        }
    }

    /// Attach an exception snapshot to the record.
    #[must_use]
    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Attach a web-request context to the record.
    #[must_use]
    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}
