#[tokio::main]
async fn main() -> std::io::Result<()> {
    interaction_server::run_with_config().await
}
