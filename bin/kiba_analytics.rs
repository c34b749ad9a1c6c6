use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future::join_all;
use jemallocator::Jemalloc;
use log::{error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use kiba_analytics::{
    analytics::{rank_movers, Pin},
    feeds::{
        holder_gains_feed, holders_feed, pair_transactions_feed, screener_feed, token_data_feed,
        user_sells_feed, user_transactions_feed,
    },
    history::{HistoryEntry, ValueHistory},
    utils::{from_now, positive_finite, DASH},
    ChainProfile, Feed, FeedState, KnownAddresses, MarketSource, RestClient, Settings,
    SubgraphClient,
};

#[tokio::main()]
async fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .context("Failed to initialize logger")?;

    let settings = Settings::new()
        .context("Failed to load config.yaml. Please ensure it exists and is valid")?;
    settings.validate().context("Invalid configuration")?;

    let chain = ChainProfile::resolve(Some(settings.network.chain_id))
        .with_context(|| format!("Unsupported chain {}", settings.network.chain_id))?;

    let subgraph = Arc::new(
        SubgraphClient::new(&settings.subgraph).context("Failed to build subgraph client")?,
    );
    let market = Arc::new(
        RestClient::from_settings(&settings.apis, settings.subgraph.request_timeout())
            .context("Failed to build REST client")?,
    );

    let cancellation_token = CancellationToken::new();

    run(settings, chain, subgraph, market, cancellation_token).await
}

/// Pinned ahead of the other movers on the ticker.
fn ticker_pins() -> Vec<Pin> {
    vec![
        Pin::Symbol("kiba".to_string()),
        Pin::Name("kiba inu".to_string()),
        Pin::Symbol("wci".to_string()),
    ]
}

async fn log_top_movers(market: &RestClient, tokens: &[String]) {
    if tokens.is_empty() {
        return;
    }

    match market.screener_tokens(tokens).await {
        Ok(pairs) => {
            for (rank, mover) in rank_movers(&pairs, &ticker_pins()).iter().enumerate() {
                info!(
                    "Mover #{} {} ({}) {:+.2}% at {}",
                    rank + 1,
                    mover.symbol,
                    mover.address,
                    mover.price_change_24h,
                    mover
                        .price_usd
                        .and_then(positive_finite)
                        .map(|price| format!("${}", price))
                        .unwrap_or_else(|| DASH.to_string())
                );
            }
        },
        Err(e) => warn!("Failed to load top movers: {:#}", e),
    }
}

/// Logs every new state a feed publishes until cancelled.
fn log_updates<T, F>(
    name: String,
    mut rx: watch::Receiver<FeedState<T>>,
    token: CancellationToken,
    mut describe: F,
) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
    F: FnMut(&T) -> String + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                },
            }

            let state = rx.borrow_and_update();
            match (&state.data, &state.last_error) {
                (_, Some(e)) => error!("[{}] {}", name, e),
                (Some(data), None) => info!("[{}] {}", name, describe(data)),
                (None, None) => {},
            }
        }
    })
}

async fn run(
    settings: Settings,
    chain: &'static ChainProfile,
    subgraph: Arc<SubgraphClient>,
    market: Arc<RestClient>,
    cancellation_token: CancellationToken,
) -> Result<()> {
    let polling = &settings.polling;
    let every = Duration::from_millis;
    let mut loggers = Vec::new();

    info!("Following {} on {}", settings.watch.tokens.join(", "), chain.name);

    let mut tokens = Vec::new();
    let mut screeners = Vec::new();
    let mut holders = Vec::new();
    for address in &settings.watch.tokens {
        let feed = token_data_feed(
            subgraph.clone(),
            chain,
            address.clone(),
            every(polling.token_data_ms),
            &cancellation_token,
        );
        let mut history = ValueHistory::new();
        loggers.push(log_updates(
            feed.name().to_string(),
            feed.subscribe(),
            cancellation_token.child_token(),
            move |snapshot| {
                let now = Utc::now();
                let previous = history.last_updated();
                history = history.appended(HistoryEntry {
                    time: now,
                    value: snapshot.price_usd,
                });
                format!(
                    "{} ${} ({:+.2}%) liquidity ${:.0} volume ${:.0} ({} lookups, previous {})",
                    snapshot.symbol,
                    snapshot.price_usd,
                    snapshot.price_change_usd,
                    snapshot.total_liquidity_usd,
                    snapshot.one_day_volume_usd,
                    history.len(),
                    previous
                        .map(|then| from_now(then, now))
                        .unwrap_or_else(|| DASH.to_string())
                )
            },
        ));
        tokens.push(feed);

        let feed = screener_feed(
            market.clone(),
            address.clone(),
            every(polling.screener_ms),
            &cancellation_token,
        );
        loggers.push(log_updates(
            feed.name().to_string(),
            feed.subscribe(),
            cancellation_token.child_token(),
            |pair| {
                format!(
                    "{} on {} 24h {:+.2}%",
                    pair.base_token.symbol,
                    pair.pair_address,
                    pair.price_change_24h()
                )
            },
        ));
        screeners.push(feed);

        let feed = holders_feed(
            market.clone(),
            chain,
            address.clone(),
            every(polling.holders_ms),
            &cancellation_token,
        );
        loggers.push(log_updates(
            feed.name().to_string(),
            feed.subscribe(),
            cancellation_token.child_token(),
            |info| format!("{} holders", info.display_holders()),
        ));
        holders.push(feed);
    }

    let known = KnownAddresses::all();
    let mut sells = Vec::new();
    let mut accounts = Vec::new();
    let mut gains = Vec::new();
    for account in &settings.watch.accounts {
        let sells_feed = user_sells_feed(
            subgraph.clone(),
            chain,
            account.clone(),
            every(polling.user_sells_ms),
            &cancellation_token,
        );
        let feed = user_transactions_feed(
            subgraph.clone(),
            chain,
            account.clone(),
            sells_feed.subscribe(),
            known.clone(),
            every(polling.user_transactions_ms),
            &cancellation_token,
        );
        loggers.push(log_updates(
            feed.name().to_string(),
            feed.subscribe(),
            cancellation_token.child_token(),
            |activity| {
                format!(
                    "{} swaps, {} buys / {} sells, net ${:.2}",
                    activity.events.len(),
                    activity.summary.buys,
                    activity.summary.sells,
                    activity.summary.net_usd()
                )
            },
        ));

        if let (Some(token), Some(pair)) = (chain.project_token, chain.project_pair) {
            let gains_feed = holder_gains_feed(
                market.clone(),
                chain,
                account.clone(),
                token.to_string(),
                pair.to_string(),
                feed.subscribe(),
                every(polling.holder_gains_ms),
                &cancellation_token,
            );
            loggers.push(log_updates(
                gains_feed.name().to_string(),
                gains_feed.subscribe(),
                cancellation_token.child_token(),
                |holder| match &holder.gains {
                    Some(gains) => format!(
                        "balance {:.0}, reflections {:.0}, airdropped {:.0}, gained {:.0}",
                        holder.balance,
                        holder.reflections.total_gained,
                        gains.airdropped,
                        gains.total_gained
                    ),
                    None => "no balance".to_string(),
                },
            ));
            gains.push(gains_feed);
        }

        sells.push(sells_feed);
        accounts.push(feed);
    }

    let mut pairs = Vec::new();
    if !settings.watch.pairs.is_empty() {
        let feed = pair_transactions_feed(
            subgraph.clone(),
            chain,
            settings.watch.pairs.clone(),
            every(polling.pair_transactions_ms),
            &cancellation_token,
        );
        loggers.push(log_updates(
            feed.name().to_string(),
            feed.subscribe(),
            cancellation_token.child_token(),
            |transactions| {
                format!(
                    "{} swaps, {} mints, {} burns",
                    transactions.swaps.len(),
                    transactions.mints.len(),
                    transactions.burns.len()
                )
            },
        ));
        pairs.push(feed);
    }

    log_top_movers(&market, &settings.watch.tokens).await;

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Feeds running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
        };
    }

    info!("Stopping feeds...");
    cancellation_token.cancel();

    join_all(tokens.iter().map(Feed::shutdown)).await;
    join_all(screeners.iter().map(Feed::shutdown)).await;
    join_all(holders.iter().map(Feed::shutdown)).await;
    join_all(gains.iter().map(Feed::shutdown)).await;
    join_all(accounts.iter().map(Feed::shutdown)).await;
    join_all(sells.iter().map(Feed::shutdown)).await;
    join_all(pairs.iter().map(Feed::shutdown)).await;

    join_all(loggers).await;

    info!("All feeds stopped");
    Ok(())
}
