use crate::error::NotifierError;
use crate::notifier::Notifier;
use crate::sink::OutputSink;
use lambda_runtime::{Error, LambdaEvent};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

pub const GREETING: &str = "Hello from Rust";
pub const COMPLETION_MESSAGE: &str = "Process complete!";

/// Hands `event` to the notifier as its JSON argument and waits for it to
/// finish.
///
/// Returns [`COMPLETION_MESSAGE`] when the notifier exits with status 0. A
/// notifier that can't be started or exits non-zero is an error.
pub async fn handle<T>(
    event: &T,
    notifier: &Notifier,
    sink: &dyn OutputSink,
) -> Result<&'static str, NotifierError>
where
    T: Serialize + Debug + ?Sized,
{
    info!("{}", GREETING);

    let payload = serde_json::to_string(event)?;
    info!("Event: {:?}, stringified: {}", event, payload);

    let outcome = notifier.run(&payload, sink).await?;
    if !outcome.success() {
        return Err(NotifierError::Exit {
            status: outcome.status,
        });
    }

    Ok(COMPLETION_MESSAGE)
}

/// Lambda entry point: the invocation context is only used for logging.
pub async fn function_handler(
    event: LambdaEvent<Value>,
    notifier: &Notifier,
    sink: &dyn OutputSink,
) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();
    debug!("Handling request {}", context.request_id);

    let message = handle(&payload, notifier, sink).await?;
    Ok(Value::from(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::tests::{capture_logs, logged, RecordingSink};
    use log::Level;
    use serde::ser::{Error as _, Serializer};
    use serde_json::json;

    const TARGET: &str = "flowdock_notifier_lambda::handler";

    fn echo_to_stderr() -> Notifier {
        Notifier::new("sh").args(&["-c", "printf '%s\\n' \"$0\" >&2"])
    }

    #[tokio::test]
    async fn success_returns_completion_message() {
        let sink = RecordingSink::default();
        let event = json!({"flow": "main", "content": "hi"});

        let message = handle(&event, &Notifier::new("echo"), &sink)
            .await
            .unwrap();

        assert_eq!(message, "Process complete!");
        assert_eq!(
            *sink.info.lock().unwrap(),
            vec![serde_json::to_string(&event).unwrap()]
        );
    }

    #[tokio::test]
    async fn logs_greeting_then_event() {
        capture_logs();
        let sink = RecordingSink::default();
        let event = json!({"c": "it's"});

        handle(&event, &Notifier::new("true"), &sink).await.unwrap();

        let lines: Vec<_> = logged()
            .into_iter()
            .filter(|(_, target, _)| target == TARGET)
            .collect();
        assert_eq!(
            lines,
            vec![
                (Level::Info, TARGET.to_owned(), "Hello from Rust".to_owned()),
                (
                    Level::Info,
                    TARGET.to_owned(),
                    r#"Event: Object {"c": String("it's")}, stringified: {"c":"it's"}"#
                        .to_owned()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn event_arrives_verbatim_despite_quotes() {
        let sink = RecordingSink::default();
        let event = json!({"content": "it's done'; echo pwned; '"});

        handle(&event, &echo_to_stderr(), &sink).await.unwrap();

        assert_eq!(
            *sink.error.lock().unwrap(),
            vec![r#"{"content":"it's done'; echo pwned; '"}"#]
        );
        assert!(sink.info.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn scalar_and_null_events_are_forwarded() {
        let cases = [
            (json!(null), "null"),
            (json!(42), "42"),
            (json!("x"), "\"x\""),
        ];
        for (event, expected) in cases {
            let sink = RecordingSink::default();
            handle(&event, &Notifier::new("echo"), &sink).await.unwrap();
            assert_eq!(*sink.info.lock().unwrap(), vec![expected]);
        }
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let sink = RecordingSink::default();
        let err = handle(&json!({}), &Notifier::new("false"), &sink)
            .await
            .unwrap_err();

        match err {
            NotifierError::Exit { status } => assert!(!status.success()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_notifier_is_an_error() {
        let sink = RecordingSink::default();
        let err = handle(&json!({}), &Notifier::default(), &sink).await;
        assert!(matches!(err, Err(NotifierError::Spawn { .. })));
    }

    #[tokio::test]
    async fn unserializable_event_spawns_nothing() {
        #[derive(Debug)]
        struct Broken;

        impl Serialize for Broken {
            fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(S::Error::custom("nope"))
            }
        }

        let sink = RecordingSink::default();
        let err = handle(&Broken, &Notifier::new("echo"), &sink).await;

        assert!(matches!(err, Err(NotifierError::Serialize(_))));
        assert!(sink.info.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_invocations_are_independent() {
        let event = json!({"n": 1});
        let notifier = Notifier::new("echo");

        let first = RecordingSink::default();
        let second = RecordingSink::default();
        handle(&event, &notifier, &first).await.unwrap();
        handle(&event, &notifier, &second).await.unwrap();

        assert_eq!(*first.info.lock().unwrap(), *second.info.lock().unwrap());
        assert_eq!(first.info.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lambda_handler_responds_with_message() {
        let sink = RecordingSink::default();
        let event = LambdaEvent::new(json!({"a": 1}), lambda_runtime::Context::default());

        let response = function_handler(event, &Notifier::new("echo"), &sink)
            .await
            .unwrap();

        assert_eq!(response, json!("Process complete!"));
    }
}
