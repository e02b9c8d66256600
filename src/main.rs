use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use lotto_sim::{
    cache::DashboardCache,
    config::Config,
    database::{create_pool, run_migrations},
    external::{DrawSource, LottoApiClient},
    handlers,
    middlewares::create_cors,
    services::*,
    strategies::StrategyEngine,
    tasks::{self, SchedulerContext},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to load configuration")?;

    // 数据库连接与迁移
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database connection pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    // 外部开奖数据源
    let source: Arc<dyn DrawSource> =
        Arc::new(LottoApiClient::new(&config.lotto_api).context("Failed to build lotto API client")?);

    // 创建服务
    let draw_service = DrawService::new(pool.clone(), source);
    let engine = StrategyEngine::new(draw_service.clone());
    let recommend_service =
        RecommendService::new(pool.clone(), draw_service.clone(), engine.clone());
    let purchase_service = PurchaseService::new(pool.clone(), draw_service.clone());
    let evaluation_service = EvaluationService::new(pool.clone(), draw_service.clone());
    let dashboard_service = DashboardService::new(pool.clone());
    let dashboard_cache = DashboardCache::new();

    // 后台定时任务
    let scheduler = if config.scheduler.enabled {
        Some(tasks::spawn_all(
            SchedulerContext {
                draws: draw_service.clone(),
                engine: engine.clone(),
                recommends: recommend_service.clone(),
                purchases: purchase_service.clone(),
                evaluations: evaluation_service.clone(),
                dashboard: dashboard_service.clone(),
                cache: dashboard_cache.clone(),
                config: config.scheduler.clone(),
            },
            CancellationToken::new(),
        ))
    } else {
        log::info!("Scheduler disabled by configuration");
        None
    };

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors(&cors_config))
            .app_data(web::Data::new(draw_service.clone()))
            .app_data(web::Data::new(recommend_service.clone()))
            .app_data(web::Data::new(purchase_service.clone()))
            .app_data(web::Data::new(evaluation_service.clone()))
            .app_data(web::Data::new(dashboard_service.clone()))
            .app_data(web::Data::new(dashboard_cache.clone()))
            .service(
                web::scope("/api/v1")
                    .configure(handlers::recommend_config)
                    .configure(handlers::purchase_config)
                    .configure(handlers::draw_config)
                    .configure(handlers::evaluate_config)
                    .configure(handlers::dashboard_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    // HTTP 服务停止后再停后台任务
    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }
    Ok(())
}
