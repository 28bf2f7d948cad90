#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wyoming_whisper_daemon::run().await
}
