use xab_experiment::DisplaySurface;

/// Headless display: keeps the current markup and logs every change.
#[derive(Debug, Default)]
pub struct TracingDisplay {
    content: String,
}

impl DisplaySurface for TracingDisplay {
    fn set_content(&mut self, html: &str) {
        self.content = html.to_owned();
        tracing::debug!(content = %self.content, "display set");
    }

    fn append_content(&mut self, html: &str) {
        self.content.push_str(html);
        tracing::debug!(content = %self.content, "display appended");
    }

    fn clear(&mut self) {
        self.content.clear();
        tracing::debug!("display cleared");
    }
}
