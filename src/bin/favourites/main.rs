use std::sync::Arc;

use anyhow::Context;
use meal_favourites::{
    catalog::Catalog,
    config::Config,
    favourites::FavouritesStore,
    storage::{KeyValueStore, SqliteStore},
};
use tokio::io::{AsyncBufReadExt, BufReader};

mod handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_ansi(true)
        .with_file(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("fail to setup logging")?;

    let catalog = Arc::new(Catalog::bundled()?);
    let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open(&config.database_url).await?);
    let store = FavouritesStore::load(storage, config.favourites_key.as_str()).await;

    let mut app = handlers::App::new(catalog, store);
    app.show_tab();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("fail to read stdin")? {
        if !app.handle(&line).await {
            break;
        }
    }

    app.shutdown().await;
    Ok(())
}
