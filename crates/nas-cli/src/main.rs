//! `nas` binary entrypoint.

#[tokio::main]
async fn main() {
    let code = nas_cli::run().await;
    std::process::exit(code);
}
