//! Support bot — console entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config from the environment
//!   3. Init diagnostics logger
//!   4. Load FAQ + orders datasets
//!   5. Build the LLM gateway
//!   6. Open the session (id + transcript file)
//!   7. Spawn Ctrl-C → shutdown signal watcher
//!   8. Run the dialog loop on stdin/stdout until exit or interrupt

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::info;

use support_bot::config;
use support_bot::error::AppError;
use support_bot::knowledge::KnowledgeStore;
use support_bot::llm::gateway::LlmGateway;
use support_bot::llm::providers;
use support_bot::logger;
use support_bot::session::{self, Session, SessionController};

fn main() {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(run());

    // The stdin reader may still be parked on a blocking thread after Ctrl-C;
    // don't wait for it.
    runtime.shutdown_background();

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;

    logger::init(&config.log_level, config.log_file.as_deref())?;

    info!(
        provider = %config.llm.provider,
        mode = %config.llm.mode,
        faq = %config.session.faq_path.display(),
        orders = %config.session.orders_path.display(),
        log_dir = %config.session.log_dir.display(),
        "config loaded"
    );

    let knowledge = KnowledgeStore::load(&config.session.faq_path, &config.session.orders_path)?;
    let gateway = LlmGateway::new(providers::build(&config.llm)?, config.llm.mode);
    let primer = session::load_primer(config.session.system_prompt_path.as_deref());
    let session = Session::open(&config.session.log_dir)?;

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let mut controller =
        SessionController::new(session, knowledge, gateway, primer, config.session.memory_cap);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    let state = controller.run(stdin, &mut stdout, shutdown).await?;
    info!(?state, "session finished");

    Ok(())
}
