use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    binja_mcp::main_entry().await
}
