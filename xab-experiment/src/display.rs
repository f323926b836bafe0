use crate::host::DisplaySurface;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Set(String),
    Append(String),
    Clear,
}

/// Display surface that keeps the current content and every operation
/// applied to it.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    content: String,
    history: Vec<DisplayOp>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn history(&self) -> &[DisplayOp] {
        &self.history
    }
}

impl DisplaySurface for RecordingDisplay {
    fn set_content(&mut self, html: &str) {
        self.content = html.to_owned();
        self.history.push(DisplayOp::Set(html.to_owned()));
    }

    fn append_content(&mut self, html: &str) {
        self.content.push_str(html);
        self.history.push(DisplayOp::Append(html.to_owned()));
    }

    fn clear(&mut self) {
        self.content.clear();
        self.history.push(DisplayOp::Clear);
    }
}
