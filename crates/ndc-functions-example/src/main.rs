use ndc_functions_example::GeneratedConnector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ndc_connector::start(GeneratedConnector::default()).await
}
