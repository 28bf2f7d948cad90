#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wyctl::run().await
}
