//! booth-board: live slot board for one booth
//!
//! Prints the booth's slots and reprints them on every committed change
//! until Ctrl-C.

use booth_client::logger::init_logger_with_file;
use booth_client::{ReservationResult, Session};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let session = match Session::load() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", e.notice());
            return Err(e.into());
        }
    };

    let config = session.config();
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    let result = run(&session).await;
    if let Err(e) = &result {
        error!(error = %e, code = %e.code(), "Slot board stopped");
        eprintln!("{}", e.notice());
    }
    session.close();
    Ok(result?)
}

async fn run(session: &Session) -> ReservationResult<()> {
    session.open_configured_slots().await?;
    let mut board = session.slot_board().await?;
    info!(
        booth_id = board.booth_id(),
        slots = board.labels().len(),
        "Slot board ready"
    );
    println!("{}", board.render());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
            update = board.next_update() => match update {
                Some(Ok(())) => println!("{}", board.render()),
                Some(Err(e)) => warn!(error = %e, "Failed to refresh slot board"),
                None => {
                    warn!("Change stream closed");
                    break;
                }
            },
        }
    }
    Ok(())
}
