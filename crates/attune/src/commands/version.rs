pub fn run() -> anyhow::Result<()> {
    println!("attune {}", env!("CARGO_PKG_VERSION"));
    println!("Attention-scored context routing with a shared coordination pool");
    Ok(())
}
