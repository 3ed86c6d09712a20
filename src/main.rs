use std::env;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;

use pgcontent::config::Config;
use pgcontent::core::types::BlockEvent;
use pgcontent::projection::Projector;
use pgcontent::store::PgSink;
use pgcontent::Error;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Projects block events read from stdin, one json document per line.
#[tokio::main]
async fn main() -> Result<(), Error> {
    // Configure tracing subscriber
    let filter = env::var("PGCONTENT_LOG").unwrap_or(String::from("pgcontent=info"));
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_max_level(tracing::Level::INFO)
        .with_env_filter(filter)
        .finish();

    let _guard = tracing::subscriber::set_global_default(subscriber);

    tracing::info!("starting pgcontent v{VERSION}");
    if cfg!(feature = "test-utilities") {
        tracing::warn!("build includes test-utilities, use cargo's `--no-default-features` flag");
    } else {
        tracing::debug!("compiled without test-utilities");
    }

    let config = Config::from_env()?;

    let sink = match &config.postgres {
        Some(pgconf) => PgSink::connect(pgconf).await?,
        None => {
            tracing::warn!("no postgres uri configured, indexing is disabled");
            PgSink::disconnected()
        }
    };
    let mut projector = Projector::new(sink, config.start_block);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        tracing::info!("end of input");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("failed reading input: {e}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<BlockEvent>(&line) {
                    Ok(event) => {
                        projector
                            .on_block(&event.block, &event.applied_operations)
                            .await;
                    }
                    Err(e) => tracing::error!("skipping malformed block event: {e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("got a ctrl-c message");
                break;
            }
        }
    }

    tracing::info!("exiting");
    projector.into_sink().close().await;
    Ok(())
}
