//! SGDIS terminal client - main entry point.

use std::sync::Arc;

use clap::Parser;
use sgdis::{AppContext, AppError, Args, Backing, Exit, Frontend, repl};
use sgdis_application::BootstrapOutcome;
use sgdis_application::ports::KeyValueStore;
use sgdis_domain::ACCESS_TOKEN_KEY;
use sgdis_infrastructure::{
    ConsoleNavigator, ConsoleWarningView, FileKeyValueStore, MemoryKeyValueStore,
    SharedCookieJar, SystemClock, TerminalBell, TokioScheduler, TracingNotifier, load_config,
};
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    tracing::info!(
        backend = %config.api_base_url,
        "Starting SGDIS client v{}",
        env!("CARGO_PKG_VERSION")
    );

    let clock = Arc::new(SystemClock);
    let store: Arc<dyn KeyValueStore> = match (&args.store, args.ephemeral) {
        (_, true) => Arc::new(MemoryKeyValueStore::new()),
        (Some(path), false) => Arc::new(FileKeyValueStore::open(path)?),
        (None, false) => match FileKeyValueStore::default_path() {
            Some(path) => Arc::new(FileKeyValueStore::open(path)?),
            None => Arc::new(MemoryKeyValueStore::new()),
        },
    };
    if let Some(token) = &args.token {
        store.set(ACCESS_TOKEN_KEY, token)?;
    }
    let cookies = Arc::new(SharedCookieJar::from_cookie_header(
        args.cookie.as_deref().unwrap_or_default(),
        clock.clone(),
    ));

    let (scheduler, timers) = TokioScheduler::new();
    let (navigator, route) = ConsoleNavigator::new(args.route.clone());

    let ctx = AppContext::build(
        config,
        Backing {
            store,
            cookies,
            clock,
            scheduler: Arc::new(scheduler),
        },
        Frontend {
            notifier: Arc::new(TracingNotifier),
            navigator: Arc::new(navigator),
            warning: Arc::new(ConsoleWarningView::stdout(!args.no_color)),
            alert: Arc::new(TerminalBell),
        },
    )?;

    let outcome = ctx.bootstrap.run(&args.route).await;
    if outcome == BootstrapOutcome::RedirectedToLogin {
        println!("No session; now at {}", ctx.config.login_path);
        return Ok(());
    }

    let monitor_task = (outcome != BootstrapOutcome::Skipped
        && ctx.monitor.start_if_signed_in(ctx.session.credentials()))
    .then(|| tokio::spawn(Arc::clone(&ctx.monitor).run(timers)));

    let exit = repl::run(&ctx, BufReader::new(tokio::io::stdin()), tokio::io::stdout(), route).await;

    ctx.shutdown();
    if let Some(task) = monitor_task {
        task.abort();
    }

    if let Exit::Redirected(path) = exit? {
        tracing::info!(path, "Client stopped after session end");
    }
    Ok(())
}
