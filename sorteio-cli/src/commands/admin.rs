use super::{wait_for_shutdown, AppContext};
use crate::views::{history_table, TerminalAdminView};
use clap::Subcommand;
use dialoguer::Confirm;
use sorteio_raffle::{AdminController, RaffleError, Result};
use std::sync::Arc;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Draw a number between MIN and MAX (inclusive)
    Draw {
        /// Lower bound
        #[arg(allow_hyphen_values = true)]
        min: String,
        /// Upper bound, greater than MIN
        #[arg(allow_hyphen_values = true)]
        max: String,
    },
    /// Show participant count, last draw and repeat winners
    Status,
    /// List past draws, newest first
    History {
        /// Show at most this many draws
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Follow participants and draws until Ctrl-C
    Watch,
    /// Remove all participants and draws
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn handle_admin_command(cmd: AdminCommands, ctx: &AppContext) -> Result<()> {
    let admin = AdminController::new(
        ctx.store.clone(),
        Arc::new(TerminalAdminView),
        ctx.raffle.clone(),
    );

    match cmd {
        AdminCommands::Draw { min, max } => {
            let pending = admin.execute_draw(&min, &max)?;
            let key = pending.write.wait().await?;

            println!("Draw saved as {}", key);
            println!("  Range: {} to {}", pending.draw.min, pending.draw.max);
            println!("  Token: {}", pending.draw.token);
        }

        AdminCommands::Status => {
            let status = admin.status().await?;

            println!("Raffle Status:");
            println!("  Participants: {}", status.participants);
            match &status.last_draw {
                Some(draw) => println!(
                    "  Last draw: {} (from {} to {})",
                    draw.number, draw.min, draw.max
                ),
                None => println!("  Last draw: -"),
            }
            println!();

            if status.repeat_winners.is_empty() {
                println!(
                    "No repeated numbers in the last {} draws.",
                    admin.config().history_window
                );
            } else {
                println!(
                    "Repeated numbers in the last {} draws:",
                    admin.config().history_window
                );
                println!("{}", history_table(&status.repeat_winners));
            }
        }

        AdminCommands::History { limit } => {
            let history = admin.history(limit).await?;

            if history.is_empty() {
                println!("No draws yet.");
                println!("Draw a number with: sorteio admin draw <MIN> <MAX>");
                return Ok(());
            }

            println!("{}", history_table(&history));
        }

        AdminCommands::Watch => {
            let poller = ctx.follow_external_writes().await?;
            let watchers = admin.observe().await?;
            println!("Watching raffle, press Ctrl-C to stop");

            wait_for_shutdown().await?;
            watchers.abort();
            poller.abort();
        }

        AdminCommands::Reset { force } => {
            if !force {
                let confirm = Confirm::new()
                    .with_prompt("Remove all participants and draws?")
                    .default(false)
                    .interact()
                    .map_err(|e| RaffleError::Internal(format!("Prompt failed: {}", e)))?;

                if !confirm {
                    println!("Reset cancelled.");
                    return Ok(());
                }
            }

            admin.reset().await?;
            println!("Raffle state cleared.");
        }
    }

    Ok(())
}
