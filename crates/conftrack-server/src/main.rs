use clap::{value_parser, Arg, Command};
use conftrack_core::LogMailer;
use conftrack_server::{app, AppConfig, AppContext, LocalDocumentSink, VERSION};
use conftrack_store::MemoryStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Command::new("conftrack")
        .version(VERSION)
        .about("Conference identity resolution and status tracking service")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API")
                .arg(config_arg())
                .arg(
                    Arg::new("port")
                        .long("port")
                        .value_parser(value_parser!(u16))
                        .help("Override the configured listen port"),
                ),
        )
        .subcommand(
            Command::new("link-accounts")
                .about("Backfill login accounts for speakers and accepted abstract authors")
                .arg(config_arg()),
        );

    let matches = cli.get_matches();
    let outcome = match matches.subcommand() {
        Some(("serve", args)) => serve(args).await,
        Some(("link-accounts", args)) => link_accounts(args).await,
        _ => Ok(()),
    };

    if let Err(err) = outcome {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .default_value("conftrack.toml")
        .help("Path to the TOML configuration file")
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_context(config: &AppConfig) -> AppContext {
    AppContext::new(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(LocalDocumentSink::new(config.storage.document_dir.clone())),
        Arc::new(LogMailer),
    )
}

async fn serve(args: &clap::ArgMatches) -> anyhow::Result<()> {
    let path = args.get_one::<PathBuf>("config").unwrap();
    let mut config = AppConfig::load(path)?;
    if let Some(port) = args.get_one::<u16>("port") {
        config.server.port = *port;
    }

    let ctx = build_context(&config);
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let (bound, serving) = warp::serve(app(ctx)).try_bind_with_graceful_shutdown(addr, async {
        let _ = tokio::signal::ctrl_c().await;
    })?;

    tracing::info!(addr = %bound, "listening");
    serving.await;
    tracing::info!("shut down");
    Ok(())
}

async fn link_accounts(args: &clap::ArgMatches) -> anyhow::Result<()> {
    let path = args.get_one::<PathBuf>("config").unwrap();
    let config = AppConfig::load(path)?;
    let ctx = build_context(&config);

    let report = ctx.linker.run().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
