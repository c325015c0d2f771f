use extpatch_types::event::{PatchEvent, Severity};

/// Receives the events each mutation step reports.
pub trait EventSink {
    fn emit(&mut self, event: PatchEvent);
}

impl EventSink for Vec<PatchEvent> {
    fn emit(&mut self, event: PatchEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: PatchEvent) {
        (**self).emit(event);
    }
}

/// Logs every event through `tracing` before passing it on.
#[derive(Debug, Default)]
pub struct Traced<S> {
    inner: S,
}

impl<S> Traced<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: EventSink> EventSink for Traced<S> {
    fn emit(&mut self, event: PatchEvent) {
        match event.severity() {
            Severity::Warn => tracing::warn!(event = ?event, "{}", event.message()),
            Severity::Info => tracing::info!("{}", event.message()),
        }
        self.inner.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traced_forwards_to_inner_sink() {
        let mut sink = Traced::new(Vec::new());
        sink.emit(PatchEvent::GroupExists {
            name: "ShareExtension".to_string(),
            key: "AB".to_string(),
        });
        let events = sink.into_inner();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_noop());
    }
}
