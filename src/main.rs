//! Application entry point for liveball-bot.
//!
//! Wires the store, feed, messenger and services, then runs the webhook
//! server and the match update poller until Ctrl+C.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use liveball_bot::bot::controller::BotController;
use liveball_bot::bot::webhook;
use liveball_bot::bot::webhook::AppState;
use liveball_bot::config::Config;
use liveball_bot::event::MatchUpdateEvent;
use liveball_bot::event::event_bus::EventBus;
use liveball_bot::feed::Feed;
use liveball_bot::feed::cached_feed::CachedFeed;
use liveball_bot::feed::sports_db_feed::SportsDbFeed;
use liveball_bot::logging::setup_logging;
use liveball_bot::messenger::Messenger;
use liveball_bot::messenger::whatsapp_messenger::WhatsAppMessenger;
use liveball_bot::repository::Repository;
use liveball_bot::service::Services;
use liveball_bot::subscriber::whatsapp_subscriber::WhatsAppSubscriber;
use liveball_bot::task::match_update_publisher::MatchUpdatePublisher;
use log::debug;
use log::error;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let config = load_config().await?;
    let event_bus = Arc::new(EventBus::new());

    let db = setup_database(&config, init_start).await?;
    let feed = setup_feed(&config)?;
    let messenger = setup_messenger(&config)?;
    let services = Arc::new(Services::new(db, feed, config.display_timezone));

    setup_subscribers(&event_bus, messenger.clone());
    let publisher = setup_publishers(&config, &services, event_bus, init_start)?;
    setup_webhook(&config, &services, messenger, init_start);

    run(publisher, init_start).await
}

async fn load_config() -> Result<Arc<Config>> {
    debug!("Loading configuration...");
    let mut config = Config::new();
    config.load()?;
    let config = Arc::new(config);
    setup_logging(&config)?;
    info!("Starting liveball-bot...");
    Ok(config)
}

async fn setup_database(config: &Config, init_start: Instant) -> Result<Arc<Repository>> {
    debug!("Setting up Database...");
    let db = Arc::new(Repository::new(&config.db_url, &config.db_path).await?);

    info!("Running database migrations...");
    db.run_migrations().await?;
    info!(
        "Database setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );

    Ok(db)
}

fn setup_feed(config: &Config) -> Result<Arc<dyn Feed>> {
    debug!("Setting up Feed...");
    let upstream = SportsDbFeed::new(
        &config.sportsdb_api_url,
        &config.sportsdb_key,
        config.fetch_timeout,
    )?;
    Ok(Arc::new(CachedFeed::new(Arc::new(upstream), config.cache_ttl)))
}

fn setup_messenger(config: &Config) -> Result<Arc<dyn Messenger>> {
    debug!("Setting up Messenger...");
    Ok(Arc::new(WhatsAppMessenger::new(
        &config.graph_api_url,
        &config.graph_version,
        &config.whatsapp_phone_id,
        &config.whatsapp_access_token,
        config.fetch_timeout,
    )?))
}

fn setup_subscribers(event_bus: &EventBus, messenger: Arc<dyn Messenger>) {
    debug!("Setting up Subscribers...");
    let whatsapp_subscriber = Arc::new(WhatsAppSubscriber::new(messenger));
    event_bus.register_subscriber::<MatchUpdateEvent, _>(whatsapp_subscriber);
}

fn setup_publishers(
    config: &Config,
    services: &Services,
    event_bus: Arc<EventBus>,
    init_start: Instant,
) -> Result<Option<Arc<MatchUpdatePublisher>>> {
    if !config.features.auto_updates {
        info!("Match update alerts are disabled.");
        return Ok(None);
    }
    debug!("Setting up Publishers...");

    let publisher = MatchUpdatePublisher::new(
        services.subscription.clone(),
        services.match_tracking.clone(),
        services.maintenance.clone(),
        services.feed.clone(),
        event_bus,
        config.poll_interval,
        config.state_retention,
    );
    publisher.clone().start()?;

    info!(
        "Publishers setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );
    Ok(Some(publisher))
}

fn setup_webhook(
    config: &Config,
    services: &Arc<Services>,
    messenger: Arc<dyn Messenger>,
    init_start: Instant,
) {
    let state = AppState {
        verify_token: Arc::new(config.verify_token.clone()),
        controller: Arc::new(BotController::new(services.clone())),
        inbox: services.inbox.clone(),
        messenger,
    };
    let addr = config.bind_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = webhook::serve(&addr, state).await {
            error!("Webhook server stopped: {e:?}");
        }
    });
    debug!(
        "Webhook setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );
}

async fn run(publisher: Option<Arc<MatchUpdatePublisher>>, init_start: Instant) -> Result<()> {
    info!(
        "liveball-bot is up in {:.2}s. Press Ctrl+C to stop.",
        init_start.elapsed().as_secs_f64()
    );

    tokio::signal::ctrl_c().await?;
    info!("Ctrl+C received, shutting down.");
    if let Some(publisher) = publisher {
        publisher.stop()?;
    }

    Ok(())
}
