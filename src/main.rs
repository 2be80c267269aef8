mod analytics;
mod app;
mod auth;
mod categories;
mod config;
mod db;
mod error;
mod logging;
mod money;
mod response;
mod state;
mod store;
mod transactions;

#[cfg(test)]
mod test_utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let app_state = state::AppState::init().await?;
    let app = app::build_app(app_state);

    app::serve(app).await
}
