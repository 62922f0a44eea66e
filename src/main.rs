use std::{process, sync::Arc, time::Duration};

use carta::{
    application::{
        dishes::DishService,
        error::AppError,
        menus::MenuService,
        repos::{AggregateCountsRepo, DishesRepo, HealthRepo, MenusRepo, SubMenusRepo},
        submenus::SubMenuService,
    },
    cache::{
        CacheConfig, CacheConsumer, CacheLayer, CacheTrigger, EventQueue, MemoryStore, WarmSources,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        log_startup_failure(&error);
        process::exit(1);
    }
}

// The global subscriber is not installed yet when configuration loading
// fails, so log through a throwaway one in that case.
fn log_startup_failure(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "fatal error, exiting");
        return;
    }

    let fallback = tracing_fmt().with_max_level(Level::ERROR).finish();
    dispatcher::with_default(&Dispatch::new(fallback), || {
        error!(error = %error, "fatal error, exiting");
    });
}

fn db_error(err: impl std::fmt::Display) -> AppError {
    AppError::from(InfraError::database(err.to_string()))
}

async fn run() -> Result<(), AppError> {
    let (args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("could not load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let command = args
        .command
        .unwrap_or_else(|| config::Command::Serve(Box::default()));
    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
        config::Command::Health(_) => run_health(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let app = wire_services(repositories, &settings);

    // Queue a warmup event so the list and tree keys are hot before traffic.
    app.trigger.warmup_on_startup().await;

    let ticker = app
        .trigger
        .config()
        .is_enabled()
        .then(|| spawn_consume_timer(app.trigger.clone()));

    let result = serve_http(&settings, app.state).await;

    if let Some(task) = ticker {
        task.abort();
        let _ = task.await;
    }
    result
}

/// Periodic safety net behind the synchronous write-path consumption.
fn spawn_consume_timer(trigger: Arc<CacheTrigger>) -> tokio::task::JoinHandle<()> {
    let period = Duration::from_millis(trigger.config().auto_consume_interval_ms);
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(period);
        // The first tick of an interval fires immediately.
        ticks.tick().await;
        loop {
            ticks.tick().await;
            trigger.consumer().consume().await;
        }
    })
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let url = require_database_url(&settings)?;

    let pool = PostgresRepositories::connect(url, 1).await.map_err(db_error)?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(db_error)?;

    info!(target = "carta::migrate", "Migrations applied");
    Ok(())
}

async fn run_health(settings: config::Settings) -> Result<(), AppError> {
    let url = require_database_url(&settings)?;

    let pool = PostgresRepositories::connect(url, 1).await.map_err(db_error)?;
    let repositories = PostgresRepositories::new(pool);
    repositories.health_check().await.map_err(db_error)?;

    info!(target = "carta::health", "Database reachable");
    Ok(())
}

struct ServiceWiring {
    state: AppState,
    trigger: Arc<CacheTrigger>,
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let url = require_database_url(settings)?;
    let budget = settings.database.max_connections.get();

    let pool = PostgresRepositories::connect(url, budget)
        .await
        .map_err(db_error)?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(db_error)?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn require_database_url(settings: &config::Settings) -> Result<&str, AppError> {
    match settings.database.url.as_deref() {
        Some(url) => Ok(url),
        None => Err(AppError::from(InfraError::configuration(
            "database url is not configured",
        ))),
    }
}

fn wire_services(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> ServiceWiring {
    let menus_repo: Arc<dyn MenusRepo> = repositories.clone();
    let submenus_repo: Arc<dyn SubMenusRepo> = repositories.clone();
    let dishes_repo: Arc<dyn DishesRepo> = repositories.clone();
    let counts_repo: Arc<dyn AggregateCountsRepo> = repositories.clone();
    let health_repo: Arc<dyn HealthRepo> = repositories.clone();

    // A disabled cache layer stays wired in and answers every read with
    // a miss.
    let cache_config = CacheConfig::from(&settings.cache);
    let store = Arc::new(MemoryStore::new());
    let layer = Arc::new(CacheLayer::new(store, &cache_config));
    let queue = Arc::new(EventQueue::new());
    let sources = WarmSources {
        menus: menus_repo.clone(),
        submenus: submenus_repo.clone(),
        dishes: dishes_repo.clone(),
        counts: counts_repo.clone(),
    };
    let consumer = Arc::new(CacheConsumer::new(
        cache_config.clone(),
        layer.clone(),
        queue.clone(),
        sources,
    ));
    let trigger = Arc::new(CacheTrigger::new(cache_config, queue, consumer));

    let menu_service = Arc::new(MenuService::new(
        menus_repo.clone(),
        submenus_repo.clone(),
        dishes_repo.clone(),
        counts_repo.clone(),
        layer.clone(),
        trigger.clone(),
    ));
    let submenu_service = Arc::new(SubMenuService::new(
        menus_repo.clone(),
        submenus_repo.clone(),
        counts_repo,
        layer.clone(),
        trigger.clone(),
    ));
    let dish_service = Arc::new(DishService::new(
        menus_repo,
        submenus_repo,
        dishes_repo,
        layer,
        trigger.clone(),
    ));

    let state = AppState {
        menus: menu_service,
        submenus: submenu_service,
        dishes: dish_service,
        health: health_repo,
    };

    ServiceWiring { state, trigger }
}

async fn serve_http(settings: &config::Settings, state: AppState) -> Result<(), AppError> {
    let app = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::Infra(err.into()))?;
    info!(target = "carta::serve", addr = %settings.server.addr, "Listening");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("http server terminated: {err}")))?;
    Ok(())
}
