use crate::cli::ui::{self, StyleType};
use crate::core::history::HistoryLog;
use crate::store::Store;

/// Renders the conversion history panel. Newest entries come first.
pub fn render_history(log: &HistoryLog) {
    if log.is_empty() {
        println!("{}", ui::style_text("No conversions yet.", StyleType::Subtle));
        return;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("When"),
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Amount"),
        ui::header_cell("Result"),
    ]);

    for entry in log.entries() {
        table.add_row(vec![
            comfy_table::Cell::new(&entry.timestamp),
            comfy_table::Cell::new(entry.source.to_uppercase()),
            comfy_table::Cell::new(entry.target.to_uppercase()),
            ui::numeric_cell(&format!("{}", entry.amount)),
            ui::numeric_cell(&entry.result),
        ]);
    }

    println!("{table}");
}

/// `history` subcommand: prints the persisted log.
pub fn show_history(store: &dyn Store) {
    let log = HistoryLog::load(store);
    render_history(&log);
}
