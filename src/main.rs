use flowdock_notifier_lambda::{function_handler, handle, LogSink, Notifier, NotifierError};
use lambda_runtime::{service_fn, Error};
use log::{info, LevelFilter};
use serde_json::Value;
use simple_logger::SimpleLogger;
use std::fs;
use std::path::PathBuf;
use std::process;
use structopt::StructOpt;

/// Forwards Lambda events to the flowdock notifier
#[derive(StructOpt, Debug)]
struct Opt {
    /// Notifier executable to run with the event
    #[structopt(long, parse(from_os_str), default_value = "./flowdock-notifier")]
    notifier: PathBuf,
    /// Handle this JSON event once instead of serving Lambda invocations
    #[structopt(long, conflicts_with = "event-file")]
    event: Option<String>,
    /// Handle the JSON event in this file once instead of serving Lambda invocations
    #[structopt(long, parse(from_os_str))]
    event_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let opt = Opt::from_args();
    let notifier = Notifier::new(&opt.notifier);

    if let Some(event) = local_event(&opt)? {
        match run_once(&event, &notifier).await {
            Ok(message) => println!("{}", message),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
        return Ok(());
    }

    info!(
        "Serving invocations with notifier {}",
        notifier.program().display()
    );
    let notifier = &notifier;
    lambda_runtime::run(service_fn(move |event| {
        function_handler(event, notifier, &LogSink)
    }))
    .await
}

fn local_event(opt: &Opt) -> Result<Option<Value>, Error> {
    let raw = match (&opt.event, &opt.event_file) {
        (Some(event), _) => event.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => return Ok(None),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

async fn run_once(event: &Value, notifier: &Notifier) -> Result<&'static str, NotifierError> {
    handle(event, notifier, &LogSink).await
}
