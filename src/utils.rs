use crate::models::CopyPlan;
use colored::*;
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};

// --- SHARED SPINNER ---
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

// --- COPY SUMMARY ---
pub fn copy_table(namespace: &str, plans: &[CopyPlan]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Namespace", "Source", "Destination"]);
    for plan in plans {
        table.add_row(vec![
            namespace.to_string(),
            plan.source_arg(),
            plan.destination.to_string(),
        ]);
    }
    table
}

pub fn print_summary(namespace: &str, plans: &[CopyPlan]) {
    println!("\n{}", "--- COPIED TO JUPYTER ---".bold().bright_white());
    println!("{}", copy_table(namespace, plans));
    println!("{}", "Done.".green());
}
