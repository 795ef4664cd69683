//! The `trace_*!` macros must compile in downstream crates and emit on the
//! hsync targets.

use std::sync::{Arc, Mutex};

use tracing::subscriber::with_default;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Clone, Default)]
struct TargetRecorder {
    targets: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> Layer<S> for TargetRecorder {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.targets
            .lock()
            .expect("recorder lock")
            .push(event.metadata().target().to_owned());
    }
}

#[test]
fn macros_emit_on_subsystem_targets() {
    let recorder = TargetRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());

    with_default(subscriber, || {
        logging::trace_upload!("uploaded {}", "a.css");
        logging::trace_download!("downloaded {}", "b.css");
        logging::trace_delete!("deleted {}", "c.css");
        logging::trace_convert!("converted {}", "fields.js");
        logging::trace_watch!("event");
        logging::trace_filter!(pattern = "*.log", "loaded rule");
    });

    let targets = recorder.targets.lock().expect("recorder lock").clone();
    assert_eq!(
        targets,
        vec![
            "hsync::upload",
            "hsync::download",
            "hsync::delete",
            "hsync::convert",
            "hsync::watch",
            "hsync::filter",
        ]
    );
}
