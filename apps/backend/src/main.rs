#[tokio::main]
async fn main() -> anyhow::Result<()> {
    matemico_backend::run().await
}
