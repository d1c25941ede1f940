use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use pretty_env_logger::env_logger::{Builder, Env};

use commission_ledger::config::AppConfig;
use commission_ledger::handlers;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let logger_env = Env::default().default_filter_or("info");
    let mut logger_builder = Builder::from_env(logger_env);
    logger_builder.init();

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Application initialization failed: {:#}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let state = config.create_app_state().await.map_err(|e| {
        log::error!("Application initialization failed: {:#}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    log::info!("App state initialized successfully");

    let data = web::Data::new(state);

    log::info!("Starting ledger service on {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Logger::new("%a %t %r %s  %{Referer}i %Dms"))
            .service(
                web::scope("/api/v1")
                    .service(handlers::index)
                    .service(handlers::process_transaction)
                    .service(handlers::get_transactions)
                    .service(handlers::get_transaction)
                    .service(handlers::get_commission_summary),
            )
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
