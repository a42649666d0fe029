use crate::cli::ui::{self, StyleType};
use crate::core::rates::RateProvider;
use anyhow::Result;

/// `rates` subcommand: prints every known rate for one base currency.
pub async fn show_rates(provider: &dyn RateProvider, base: &str) -> Result<()> {
    let base = base.to_lowercase();

    let spinner = ui::new_spinner(&format!("Fetching rates for {}...", base.to_uppercase()));
    let result = provider.rates(&base).await;
    spinner.finish_and_clear();

    let mapping = result?;

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {}", base.to_uppercase())),
    ]);
    for code in mapping.currencies() {
        if let Some(rate) = mapping.rate(code) {
            table.add_row(vec![
                comfy_table::Cell::new(code.to_uppercase()),
                ui::numeric_cell(&format!("{rate}")),
            ]);
        }
    }

    println!("{table}");
    println!(
        "{}",
        ui::style_text(
            &format!("{} currencies known for {}", mapping.len(), base.to_uppercase()),
            StyleType::Subtle,
        )
    );
    Ok(())
}
