//! Interactive TodoMVC client.
//!
//! Loads the list from the backend, then reads commands from stdin and
//! prints the visible todos after every change. Type `help` for commands.
//!
//! Configuration comes from environment variables (see `todomvc::config`).

use anyhow::Context;
use std::sync::Arc;
use todo_state_core::http::HttpClient;
use todo_state_runtime::StoreConfig;
use todo_state_runtime::metrics::MetricsServer;
use todomvc::cli::{self, Command, HELP};
use todomvc::config::Config;
use todomvc::ids::RandomIdGenerator;
use todomvc::loader::Loader;
use todomvc::rest::{ReqwestHttpClient, TodoRestClient};
use todomvc::{TodoEnvironment, TodoReducer, TodoState, TodoStore, selectors};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Logs go to stderr so they never interleave with the list on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todomvc=info,todo_state_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(api_url = %config.api_url, "Configuration loaded");

    let _metrics = match config.metrics_addr {
        Some(addr) => {
            let mut server = MetricsServer::new(addr);
            server.start().context("starting metrics server")?;
            Some(server)
        }
        None => None,
    };

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(config.api_url.clone()));
    let env = TodoEnvironment::new(Arc::new(RandomIdGenerator), Arc::clone(&http));
    let store = TodoStore::with_config(
        config.initial_state().context("building initial state")?,
        TodoReducer::new(),
        env,
        StoreConfig::default().with_shutdown_timeout(config.shutdown_timeout()),
    );

    store.subscribe(|state: &TodoState| {
        tracing::debug!(
            count = state.count(),
            remaining = selectors::remaining_count(&state.todos),
            filter = %state.filter,
            "State updated"
        );
    });

    let loader = Loader::new(TodoRestClient::new(http), store.clone(), config.load_options());
    let reload = loader.spawn();

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::List) => println!("{}", store.state(cli::render).await),
            Ok(command) => match store.state(|state| command.to_action(state)).await {
                Some(action) => {
                    store.send(action).await?;
                    println!("{}", store.state(cli::render).await);
                }
                None => println!("no such todo"),
            },
            Err(e) => println!("{e}"),
        }
    }

    reload.abort();
    info!("Shutting down");
    if let Err(e) = store.shutdown_with_default().await {
        warn!(error = %e, "Exiting with requests still in flight");
    }

    Ok(())
}
