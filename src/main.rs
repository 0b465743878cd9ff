#[tokio::main]
async fn main() -> anyhow::Result<()> {
    morsetone_lib::run().await
}
