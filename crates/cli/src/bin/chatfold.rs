use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    chatfold_cli::main_entry().await
}
