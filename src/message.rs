//! The message provider contract.
//!
//! Rules are evaluated against anything that can hand out a body and look up
//! a header by name. Header names are passed through verbatim; any case
//! folding is up to the implementation.

use std::collections::HashMap;

use serde::Deserialize;

pub trait Message {
    fn body(&self) -> &str;

    /// The value of header `name`, or `None` when the message lacks it.
    fn header(&self, name: &str) -> Option<&str>;
}

impl<M: Message + ?Sized> Message for &M {
    fn body(&self) -> &str {
        (**self).body()
    }

    fn header(&self, name: &str) -> Option<&str> {
        (**self).header(name)
    }
}

impl<M: Message + ?Sized> Message for Box<M> {
    fn body(&self) -> &str {
        (**self).body()
    }

    fn header(&self, name: &str) -> Option<&str> {
        (**self).header(name)
    }
}

/// An in-memory message with exact-match header names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimpleMessage {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl SimpleMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl Message for SimpleMessage {
    fn body(&self) -> &str {
        &self.body
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}
