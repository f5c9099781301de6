#[derive(Debug, Clone)]
pub enum Progress {
    SystemStart { name: String },
    SystemFinish,

    StageStart { name: &'static str },
    StageFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `f` between a `StageStart` and a `StageFinish` event.
    pub fn stage<T>(&self, name: &'static str, f: impl FnOnce() -> T) -> T {
        self.report(Progress::StageStart { name });
        let out = f();
        self.report(Progress::StageFinish);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::Message("ignored".to_string()));
        assert_eq!(reporter.stage("noop", || 3), 3);
    }

    #[test]
    fn stage_wraps_closure_with_start_and_finish_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p| {
            sink.lock().unwrap().push(format!("{:?}", p));
        }));

        let value = reporter.stage("Clustering", || 42);

        assert_eq!(value, 42);
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].contains("Clustering"));
        assert_eq!(events[1], "StageFinish");
    }
}
