//! Error type shared by every stage of the compiler.
//!
//! Errors are fatal: the compiler never recovers locally and never emits
//! partial IR. The error kind tells callers whether the input used something
//! the compiler does not handle yet, or whether an invariant was broken.
use std::error::Error;
use std::fmt;

pub type Result<T, E = CompilerError> = std::result::Result<T, E>;

/// Broad classification of a compiler error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An invariant was broken, either by the planner or by the compiler
    /// itself. Never expected on well-formed input.
    Internal,
    /// A construct the compiler does not translate (unknown function,
    /// unsupported type combination, malformed CASE).
    Unimplemented,
    /// An operation the type lattice does not define for the given type.
    Unsupported,
    /// Anything else (configuration, parsing test inputs, ...).
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "Internal compiler error"),
            Self::Unimplemented => write!(f, "Not implemented"),
            Self::Unsupported => write!(f, "Unsupported"),
            Self::Other => write!(f, "Error"),
        }
    }
}

pub struct CompilerError {
    inner: Box<CompilerErrorInner>,
}

struct CompilerErrorInner {
    kind: ErrorKind,
    msg: String,
    /// Description of the source node that triggered the error.
    node: Option<String>,
    fields: Vec<(String, String)>,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl CompilerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Other, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Internal, msg)
    }

    pub fn unimplemented(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Unimplemented, msg)
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Unsupported, msg)
    }

    pub fn with_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        CompilerError {
            inner: Box::new(CompilerErrorInner {
                kind,
                msg: msg.into(),
                node: None,
                fields: Vec::new(),
                source: None,
            }),
        }
    }

    pub fn with_source(msg: impl Into<String>, source: Box<dyn Error + Send + Sync>) -> Self {
        let mut err = Self::new(msg);
        err.inner.source = Some(source);
        err
    }

    /// Attach a key/value pair that will be printed alongside the message.
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.inner.fields.push((key.into(), value.to_string()));
        self
    }

    /// Attach the source location (the offending node) to this error.
    ///
    /// Only the innermost location is kept.
    pub fn with_node(mut self, node: impl fmt::Display) -> Self {
        if self.inner.node.is_none() {
            self.inner.node = Some(node.to_string());
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn message(&self) -> &str {
        &self.inner.msg
    }

    pub fn node(&self) -> Option<&str> {
        self.inner.node.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_internal(&self) -> bool {
        self.inner.kind == ErrorKind::Internal
    }

    pub fn is_unimplemented(&self) -> bool {
        self.inner.kind == ErrorKind::Unimplemented
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.inner.kind, self.inner.msg)?;
        if let Some(node) = &self.inner.node {
            write!(f, " (at {node})")?;
        }
        if !self.inner.fields.is_empty() {
            write!(f, " [")?;
            for (idx, (key, value)) in self.inner.fields.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}: {value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(source) = &self.inner.source {
            write!(f, "\nCaused by: {source}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Error for CompilerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

/// Wrap foreign errors with some additional context.
pub trait ResultExt<T, E> {
    fn context(self, msg: &str) -> Result<T>;
    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: Fn() -> String;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| CompilerError::with_source(msg, Box::new(e)))
    }

    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: Fn() -> String,
    {
        self.map_err(|e| CompilerError::with_source(f(), Box::new(e)))
    }
}

pub trait OptionExt<T> {
    /// Turn a missing value into an internal error.
    fn required(self, what: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, what: &'static str) -> Result<T> {
        self.ok_or_else(|| CompilerError::internal(format!("Missing required {what}")))
    }
}

/// Return early with an `Unimplemented` error.
#[macro_export]
macro_rules! not_implemented {
    ($($arg:tt)*) => {
        return Err($crate::CompilerError::unimplemented(format!($($arg)*)))
    };
}

/// Return early with an `Internal` error.
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        return Err($crate::CompilerError::internal(format!($($arg)*)))
    };
}
