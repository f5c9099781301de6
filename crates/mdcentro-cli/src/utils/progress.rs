use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use mdcentro::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Renders engine progress events as one spinner line per system on stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
    system: Arc<Mutex<String>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(target);
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
            system: Arc::new(Mutex::new(String::new())),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();
        let system_clone = self.system.clone();

        Box::new(move |progress: Progress| {
            let (Ok(pb_guard), Ok(mut system)) = (pb_clone.lock(), system_clone.lock()) else {
                warn!("Progress state mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::SystemStart { name } => {
                    pb_guard.reset();
                    pb_guard.set_style(Self::spinner_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb_guard.set_message(format!("{}: loading", name));
                    *system = name;
                }
                Progress::StageStart { name } => {
                    pb_guard.set_message(format!("{}: {}", system, name));
                }
                Progress::StageFinish => {
                    pb_guard.tick();
                }
                Progress::SystemFinish => {
                    pb_guard.disable_steady_tick();
                    pb_guard.finish_with_message(format!("✓ {}", system));
                }
                Progress::Message(msg) => {
                    if !pb_guard.is_finished() {
                        pb_guard.println(format!("  {}", msg));
                    } else {
                        pb_guard.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let handler = CliProgressHandler::hidden();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert!(pb.is_finished());
    }

    #[test]
    fn callback_tracks_system_and_stage() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::SystemStart {
            name: "MD_A".to_string(),
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "MD_A: loading");
            assert!(!pb.is_finished());
        }

        callback(Progress::StageStart { name: "Clustering" });
        assert_eq!(handler.pb.lock().unwrap().message(), "MD_A: Clustering");

        callback(Progress::StageFinish);
        callback(Progress::SystemFinish);
        {
            let pb = handler.pb.lock().unwrap();
            assert!(pb.is_finished());
            assert_eq!(pb.message(), "✓ MD_A");
        }
    }

    #[test]
    fn message_after_finish_replaces_status() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();
        callback(Progress::Message("summary written".to_string()));
        assert_eq!(handler.pb.lock().unwrap().message(), "summary written");
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::SystemStart {
                name: "MD_T".to_string(),
            });
            callback(Progress::StageStart { name: "Aligning" });
            callback(Progress::SystemFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ MD_T");
    }
}
