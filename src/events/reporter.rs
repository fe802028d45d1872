use crate::events::Event;
use crate::sinks::LogSinkRef;

/// Renders [`Event`]s and hands the lines to the sink.
#[derive(Clone)]
pub(crate) struct Reporter {
    sink: LogSinkRef,
}

impl Reporter {
    pub(crate) fn new(sink: LogSinkRef) -> Self {
        Self { sink }
    }

    pub(crate) fn emit(&self, event: Event) {
        let line = event.to_string();
        if event.is_warning() {
            self.sink.warn(&line);
        } else {
            self.sink.write(&line);
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("sink", &self.sink.name())
            .finish()
    }
}
