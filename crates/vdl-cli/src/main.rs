mod cli;

#[tokio::main]
async fn main() {
    // Parse CLI, set up logging, run the batch.
    match cli::run_from_args().await {
        Ok(status) => std::process::exit(status.exit_code()),
        Err(err) => {
            eprintln!("vdl error: {:#}", err);
            std::process::exit(1);
        }
    }
}
