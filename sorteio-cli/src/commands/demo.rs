use crate::views::{TerminalAdminView, TerminalClientView};
use anyhow::{bail, Context};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Table};
use sorteio_core::{MemoryLocalStorage, MemoryStore, RaffleConfig};
use sorteio_raffle::{AdminController, ClientController, Outcome};
use std::sync::Arc;
use tokio::task::JoinSet;

#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Number of simulated clients
    #[arg(short, long, default_value_t = 5)]
    pub clients: usize,
    /// Lower bound of the draw
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    pub min: i64,
    /// Upper bound of the draw
    #[arg(long, default_value_t = 10, allow_hyphen_values = true)]
    pub max: i64,
}

struct ClientResult {
    label: String,
    key: String,
    pseudo: Option<i64>,
    outcome: Option<Outcome>,
}

/// One admin and several clients sharing an in-memory store
pub async fn run_demo(args: DemoArgs, raffle: RaffleConfig) -> anyhow::Result<()> {
    if args.clients == 0 {
        bail!("The demo needs at least one client");
    }

    let store = Arc::new(MemoryStore::new());
    let admin = AdminController::new(store.clone(), Arc::new(TerminalAdminView), raffle.clone());
    let admin_watchers = admin.observe().await?;

    let mut clients = Vec::with_capacity(args.clients);
    for i in 1..=args.clients {
        let label = format!("client-{}", i);
        let client = ClientController::new(
            store.clone(),
            Arc::new(MemoryLocalStorage::new()),
            Arc::new(TerminalClientView::labelled(label.clone())),
            &raffle,
        )?;
        clients.push((label, Arc::new(client)));
    }

    println!(
        "Drawing a number from {} to {} for {} clients...",
        args.min, args.max, args.clients
    );
    let pending = admin.execute_draw(&args.min.to_string(), &args.max.to_string())?;
    pending
        .write
        .wait()
        .await
        .context("Failed to publish the draw")?;
    let number = pending.draw.number;

    let mut reveals = JoinSet::new();
    for (label, client) in clients {
        reveals.spawn(async move {
            let reconciliation = client
                .join()
                .await?
                .context("Draw disappeared before the client joined")?;
            let key = reconciliation.registration.key().to_string();
            let pseudo = reconciliation.pseudo;
            let outcome = reconciliation.reveal.shown().await?;
            Ok::<_, anyhow::Error>(ClientResult {
                label,
                key,
                pseudo,
                outcome,
            })
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = reveals.join_next().await {
        results.push(joined.context("Client task failed")??);
    }
    results.sort_by(|a, b| a.label.cmp(&b.label));
    admin_watchers.abort();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Client", "Participant Key", "Pseudo-number", "Outcome"]);

    let mut winners = 0;
    for result in &results {
        let outcome = match &result.outcome {
            Some(outcome) if outcome.is_win() => {
                winners += 1;
                "Won"
            }
            Some(_) => "Lost",
            None => "Cancelled",
        };
        table.add_row(vec![
            result.label.clone(),
            result.key.clone(),
            result
                .pseudo
                .map(|pseudo| pseudo.to_string())
                .unwrap_or_else(|| "-".to_string()),
            outcome.to_string(),
        ]);
    }

    println!();
    println!("Number drawn: {}", number);
    println!("{}", table);
    println!(
        "{} of {} clients won. Participants registered: {}",
        winners,
        results.len(),
        admin.status().await?.participants
    );

    Ok(())
}
