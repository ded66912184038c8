use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};

use todo_api::{routes, store::PgStore, AppState, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("loaded configuration: {:?}", config);

    let store = match PgStore::connect(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("failed to connect to the database: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = store.migrate().await {
        error!("failed to run database migrations: {}", e);
        std::process::exit(1);
    }

    let state = match AppState::from_postgres(&config, store.clone()) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            error!("failed to initialise application state: {}", e);
            std::process::exit(1);
        }
    };

    info!("starting todo API server at {}", config.server_url());
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    info!("server stopped, closing database pool");
    store.close().await;
    Ok(())
}
