use std::cell::RefCell;
use std::io::Stdout;
use std::rc::Rc;

use placeboard_client::command::USAGE;
use placeboard_client::store::FileSessionStore;
use placeboard_client::terminal::TerminalSink;
use placeboard_client::{App, Command, Config, HttpApi};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

type CliApp = App<HttpApi, TerminalSink<Stdout>, FileSessionStore>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    let api = match HttpApi::new(&config) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, "failed to build HTTP client");
            return;
        }
    };
    let sink = Rc::new(RefCell::new(TerminalSink::new(std::io::stdout())));
    let store = FileSessionStore::new(config.session_file.clone());
    tracing::info!(
        api_base = %config.api_base,
        session_file = %store.path().display(),
        "starting placeboard client"
    );

    LocalSet::new()
        .run_until(async move {
            let app = Rc::new(App::new(Rc::new(api), sink, store, config));
            run(&app).await;
            app.shutdown();
        })
        .await;

    tracing::info!("client shut down");
}

/// Read commands until EOF, `quit` or a shutdown signal. Each command runs
/// as its own local task so a slow request never stalls input or shutdown.
async fn run(app: &Rc<CliApp>) {
    println!("{USAGE}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            () = &mut shutdown => break,
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "failed to read stdin");
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if matches!(trimmed, "quit" | "exit") {
            break;
        }
        match trimmed.parse::<Command>() {
            Ok(command) => {
                let app = Rc::clone(app);
                tokio::task::spawn_local(async move {
                    let name = command.name();
                    // Failures are already shown through the sink.
                    match app.dispatch(command).await {
                        Err(e) if e.is_retriable() => {
                            tracing::warn!(command = name, error = %e, "command failed, may be retried");
                        }
                        Err(e) => tracing::debug!(command = name, error = %e, "command failed"),
                        Ok(()) => {}
                    }
                });
            }
            Err(message) => eprintln!("{message}"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
