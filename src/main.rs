#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = riyaziyyat::run().await {
        eprintln!("riyaziyyat fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
