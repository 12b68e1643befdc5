//! Host boundary: output sink, parameter scopes and the mime type.

use std::collections::HashMap;
use std::io::{self, Write};

/// Everything a running script can touch outside the engine.
///
/// Request parameters are read-only. Persistent and transient parameters
/// are read/write/delete.
pub trait RequestContext {
    fn write(&mut self, text: &str) -> io::Result<()>;

    fn parameter(&self, name: &str) -> Option<String>;

    fn persistent_parameter(&self, name: &str) -> Option<String>;
    fn set_persistent_parameter(&mut self, name: String, value: String);
    fn remove_persistent_parameter(&mut self, name: &str);

    fn transient_parameter(&self, name: &str) -> Option<String>;
    fn set_transient_parameter(&mut self, name: String, value: String);
    fn remove_transient_parameter(&mut self, name: &str);

    fn set_mime_type(&mut self, mime_type: String);
}

pub const DEFAULT_MIME_TYPE: &str = "text/html";

/// In-memory [`RequestContext`] writing to any [`Write`].
#[derive(Debug, Clone, Default)]
pub struct RenderContext<W> {
    output: W,
    parameters: HashMap<String, String>,
    persistent: HashMap<String, String>,
    transient: HashMap<String, String>,
    mime_type: Option<String>,
}

impl RenderContext<Vec<u8>> {
    /// A context collecting output in memory.
    pub fn buffered() -> Self {
        Self::new(Vec::new())
    }

    /// Output written so far, decoded lossily.
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl<W: Write> RenderContext<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            parameters: HashMap::new(),
            persistent: HashMap::new(),
            transient: HashMap::new(),
            mime_type: None,
        }
    }

    /// Seed a read-only request parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_persistent_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.persistent.insert(name.into(), value.into());
        self
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    pub fn persistent_parameters(&self) -> &HashMap<String, String> {
        &self.persistent
    }

    pub fn transient_parameters(&self) -> &HashMap<String, String> {
        &self.transient
    }

    pub fn mime_type(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE)
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> RequestContext for RenderContext<W> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())
    }

    fn parameter(&self, name: &str) -> Option<String> {
        self.parameters.get(name).cloned()
    }

    fn persistent_parameter(&self, name: &str) -> Option<String> {
        self.persistent.get(name).cloned()
    }

    fn set_persistent_parameter(&mut self, name: String, value: String) {
        self.persistent.insert(name, value);
    }

    fn remove_persistent_parameter(&mut self, name: &str) {
        self.persistent.remove(name);
    }

    fn transient_parameter(&self, name: &str) -> Option<String> {
        self.transient.get(name).cloned()
    }

    fn set_transient_parameter(&mut self, name: String, value: String) {
        self.transient.insert(name, value);
    }

    fn remove_transient_parameter(&mut self, name: &str) {
        self.transient.remove(name);
    }

    fn set_mime_type(&mut self, mime_type: String) {
        self.mime_type = Some(mime_type);
    }
}
