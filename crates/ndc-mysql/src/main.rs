use ndc_mysql::MySqlConnector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ndc_connector::start(MySqlConnector).await
}
