//! Tableside CLI — menu listing and scripted order composition.
//!
//! Commands:
//! - `menu` — print the categories and items of a menu file
//! - `compose` — replay a composition script for a table, print the cart
//!   grouped by category and the submission payload, optionally submit it

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tableside_core::{Cart, Catalog, MenuItemRef, StaffId, TableId};
use tableside_runner::{
    HttpSubmitter, OrderSession, OrderSubmitter, PlacedOrder, RecordingSubmitter, Script,
    ServiceConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tableside",
    about = "Tableside CLI — front-of-house order composition"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the categories and items of a menu file.
    Menu {
        /// Path to the menu TOML file.
        #[arg(long)]
        menu: PathBuf,
    },
    /// Replay a composition script for a table and print the resulting order.
    Compose {
        /// Path to the menu TOML file.
        #[arg(long)]
        menu: PathBuf,

        /// Path to the composition script (TOML list of steps).
        #[arg(long)]
        script: PathBuf,

        /// Table the order is for.
        #[arg(long)]
        table: u64,

        /// Staff member placing the order. Falls back to the config's default_staff_id.
        #[arg(long)]
        staff: Option<u64>,

        /// Order service config (TOML). Required with --submit.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Send the order to the order service. Without this flag the order is
        /// only recorded locally.
        #[arg(long, default_value_t = false)]
        submit: bool,

        /// Print the submission payload as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Menu { menu } => run_menu(&menu),
        Commands::Compose {
            menu,
            script,
            table,
            staff,
            config,
            submit,
            json,
        } => run_compose(&menu, &script, table, staff, config, submit, json),
    }
}

/// Logs go to stderr so payload JSON on stdout stays pipeable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run_menu(menu_path: &Path) -> Result<()> {
    let catalog = Catalog::from_file(menu_path)?;

    for category in catalog.categories_in_order() {
        println!("{}", category.name);
        for item in catalog.items_in(category.id) {
            print_menu_item(item);
        }
        println!();
    }

    let uncategorized = catalog.uncategorized_items();
    if !uncategorized.is_empty() {
        println!("Other");
        for item in uncategorized {
            print_menu_item(item);
        }
    }

    Ok(())
}

fn print_menu_item(item: &MenuItemRef) {
    let availability = if item.is_available { "" } else { "  (unavailable)" };
    println!(
        "  [{:>3}] {:<28} {:>8}{availability}",
        item.id.0,
        item.name,
        item.unit_price.round_dp(2)
    );
    let removable = item.removable_ingredient_names();
    if !removable.is_empty() {
        println!("        removable: {}", removable.join(", "));
    }
}

fn run_compose(
    menu_path: &Path,
    script_path: &Path,
    table: u64,
    staff: Option<u64>,
    config_path: Option<PathBuf>,
    submit: bool,
    json: bool,
) -> Result<()> {
    if submit && config_path.is_none() {
        bail!("--submit requires --config");
    }

    let catalog = Catalog::from_file(menu_path)?;
    let script = Script::from_file(script_path)?;
    let config = config_path
        .as_deref()
        .map(ServiceConfig::from_file)
        .transpose()?;

    let staff_id = match (staff, config.as_ref().and_then(|c| c.default_staff_id)) {
        (Some(id), _) => StaffId(id),
        (None, Some(id)) => id,
        (None, None) => bail!("no staff member: pass --staff or set default_staff_id in --config"),
    };

    let mut session = OrderSession::new(TableId(table), staff_id);
    let cart = session
        .cart_mut()
        .context("new session is not accepting edits")?;
    let report = script.replay(&catalog, cart)?;

    for (step, err) in report.rejected() {
        eprintln!("step {step} skipped: {err}");
    }
    info!(
        applied = report.applied(),
        noops = report.noops(),
        rejected = report.rejected().len(),
        "script replayed"
    );

    print_cart(session.cart(), &catalog);

    let payload = session.begin_submission()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    let submitter: Box<dyn OrderSubmitter> = match (&config, submit) {
        (Some(config), true) => Box::new(HttpSubmitter::new(config)?),
        _ => Box::new(RecordingSubmitter::new()),
    };
    let result = submitter.submit(&payload);
    let placed = session.complete_submission(result)?;

    println!("\n{}", order_summary(&placed, submitter.name(), submit));
    if submit {
        if let Some(id) = placed.order_id {
            println!("Order id: {id}");
        }
    }
    println!("Fingerprint: {}", placed.fingerprint);

    Ok(())
}

/// One-line outcome. Without `--submit` nothing leaves the process, and the
/// summary says so.
fn order_summary(placed: &PlacedOrder, submitter: &str, sent: bool) -> String {
    let outcome = if sent {
        format!("sent via {submitter}")
    } else {
        "dry run (not sent)".to_string()
    };
    format!(
        "Order for table {}: {outcome}, {} item(s), total {}",
        placed.table_id,
        placed.item_count,
        placed.total.round_dp(2)
    )
}

fn print_cart(cart: &Cart, catalog: &Catalog) {
    println!("Table order");
    println!("{}", "=".repeat(48));
    for group in cart.group_by_category(catalog) {
        let heading = group
            .category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Other");
        println!("{heading}");
        for line in &group.lines {
            println!(
                "  {:>2} x {:<26} {:>10}",
                line.quantity(),
                line.menu_item_name,
                line.subtotal().round_dp(2)
            );
            if let Some(note) = line.note() {
                println!("         {note}");
            }
        }
    }
    println!("{}", "-".repeat(48));
    println!("  {:<31} {:>10}", "Total", cart.compute_total().round_dp(2));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableside_core::MenuItemId;

    fn placed_order() -> PlacedOrder {
        let catalog = Catalog::from_toml(
            "[[items]]\nid = 1\nname = \"Burger\"\nunit_price = \"10.00\"\n",
        )
        .unwrap();
        let mut session = OrderSession::new(TableId(4), StaffId(1));
        let burger = catalog.item(MenuItemId(1)).unwrap();
        let cart = session.cart_mut().unwrap();
        cart.add_item(burger).unwrap();
        cart.add_item(burger).unwrap();
        session.submit_with(&RecordingSubmitter::new()).unwrap()
    }

    #[test]
    fn summary_without_submit_is_a_dry_run() {
        let summary = order_summary(&placed_order(), "recording", false);
        assert_eq!(
            summary,
            "Order for table 4: dry run (not sent), 2 item(s), total 20.00"
        );
        assert!(!summary.contains("sent via"));
    }

    #[test]
    fn summary_with_submit_names_the_submitter() {
        let summary = order_summary(&placed_order(), "http", true);
        assert_eq!(
            summary,
            "Order for table 4: sent via http, 2 item(s), total 20.00"
        );
    }
}
