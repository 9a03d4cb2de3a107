use tracing::info;

use crate::App;

pub async fn run(app: App) -> anyhow::Result<()> {
    app.database.migrate().await?;
    info!("schema is up to date");
    Ok(())
}
