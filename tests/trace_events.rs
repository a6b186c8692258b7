use std::fs::write;
use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};
use transfer_intake::cli::{run, Cli};

/// Collects the debug rendering of every event it sees.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

fn collecting_subscriber() -> (Arc<Mutex<Vec<String>>>, impl tracing::Subscriber) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    (events, Registry::default().with(collector))
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let (events, subscriber) = collecting_subscriber();
    let _guard = tracing::subscriber::set_default(subscriber);

    let cli = Cli {
        message: std::path::PathBuf::from("does-not-exist.eml"),
        config: None,
    };
    let _ = run(cli).await;

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}

#[tokio::test]
async fn missing_link_is_logged_as_warning() {
    let dir = tempfile::tempdir().unwrap();
    let message = dir.path().join("message.eml");
    write(&message, "Subject: hi\r\n\r\nno link here\r\n").unwrap();

    let (events, subscriber) = collecting_subscriber();
    let _guard = tracing::subscriber::set_default(subscriber);

    let cli = Cli {
        message,
        config: None,
    };
    let result = run(cli).await;
    assert!(result.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs
            .iter()
            .any(|msg| msg.contains("No download link in message body")),
        "Expected a no-link warning, got: {:?}",
        event_msgs
    );
}
