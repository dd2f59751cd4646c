use super::{wait_for_shutdown, AppContext};
use crate::views::TerminalClientView;
use clap::Subcommand;
use sorteio_core::{FileLocalStorage, LocalIdentity};
use sorteio_raffle::{ClientController, Result};
use std::sync::Arc;

#[derive(Subcommand)]
pub enum ClientCommands {
    /// Register for the current draw and reveal the outcome
    Join,
    /// Follow draws and participants until Ctrl-C
    Watch,
    /// Show this profile's stored identity
    Whoami,
}

pub async fn handle_client_command(cmd: ClientCommands, ctx: &AppContext) -> Result<()> {
    let local = Arc::new(FileLocalStorage::new(ctx.cli.profile_path()));

    match cmd {
        ClientCommands::Join => {
            let client = ClientController::new(
                ctx.store.clone(),
                local,
                Arc::new(TerminalClientView::new()),
                &ctx.raffle,
            )?;

            let Some(reconciliation) = client.join().await? else {
                println!("No draw yet. Wait for the admin to draw a number.");
                return Ok(());
            };

            println!(
                "Participant {} in draw from {} to {}",
                reconciliation.registration.key(),
                reconciliation.draw.min,
                reconciliation.draw.max
            );
            reconciliation.reveal.shown().await?;
        }

        ClientCommands::Watch => {
            let client = Arc::new(ClientController::new(
                ctx.store.clone(),
                local,
                Arc::new(TerminalClientView::new()),
                &ctx.raffle,
            )?);

            let poller = ctx.follow_external_writes().await?;
            let watchers = client.observe().await?;
            println!(
                "Profile '{}' watching for draws, press Ctrl-C to stop",
                ctx.cli.profile
            );

            wait_for_shutdown().await?;
            watchers.abort();
            poller.abort();
        }

        ClientCommands::Whoami => {
            let identity = LocalIdentity::load(local.as_ref())?;

            println!("Profile: {}", ctx.cli.profile);
            println!("  Storage: {}", local.path().display());
            println!(
                "  Participant key: {}",
                identity.participant_key.as_deref().unwrap_or("-")
            );
            match identity.last_draw_ts {
                Some(ts) => println!("  Last draw seen: {}", ts),
                None => println!("  Last draw seen: -"),
            }
        }
    }

    Ok(())
}
