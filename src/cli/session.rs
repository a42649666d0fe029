use crate::cli::history::render_history;
use crate::cli::ui::{self, StyleType};
use crate::core::converter::{Converter, FetchTicket, RatesState};
use crate::core::rates::RateProvider;
use anyhow::Result;
use chrono::Local;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{FuzzySelect, Input, Select};

/// Fixed message shown while rates are unavailable after a failed fetch.
const FETCH_ERROR_MESSAGE: &str = "Failed to fetch currency data.";

/// Interactive conversion session. Rates for the source currency load on
/// entry; every action maps to one controller operation.
pub async fn run(mut converter: Converter, provider: &dyn RateProvider) -> Result<()> {
    let ticket = converter.begin_fetch();
    resolve_fetch(&mut converter, provider, ticket).await;

    loop {
        print_form(&converter);

        let actions = [
            "Convert",
            "Swap currencies",
            "Change source currency",
            "Change target currency",
            "Show history",
            "Quit",
        ];
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Action")
            .items(&actions)
            .default(0)
            .interact()?;

        match choice {
            0 => prompt_convert(&mut converter)?,
            1 => {
                let ticket = converter.swap();
                resolve_fetch(&mut converter, provider, ticket).await;
            }
            2 => {
                let picked =
                    prompt_currency("Source currency", converter.currencies(), converter.source())?;
                if let Some(code) = picked {
                    let ticket = converter.set_source(&code);
                    resolve_fetch(&mut converter, provider, ticket).await;
                }
            }
            3 => {
                let picked =
                    prompt_currency("Target currency", converter.currencies(), converter.target())?;
                if let Some(code) = picked {
                    converter.set_target(&code);
                }
            }
            4 => render_history(converter.history()),
            _ => break,
        }
    }
    Ok(())
}

async fn resolve_fetch(converter: &mut Converter, provider: &dyn RateProvider, ticket: FetchTicket) {
    let spinner = ui::new_spinner(&format!(
        "Fetching rates for {}...",
        ticket.base.to_uppercase()
    ));
    let result = provider.rates(&ticket.base).await;
    spinner.finish_and_clear();
    converter.apply_rates(ticket, result);
}

fn print_form(converter: &Converter) {
    ui::print_separator();
    match converter.rates_state() {
        RatesState::Ready(mapping) => println!(
            "{}",
            ui::style_text(
                &format!("{} currencies available", mapping.len()),
                StyleType::Subtle
            )
        ),
        RatesState::Failed => println!("{}", ui::style_text(FETCH_ERROR_MESSAGE, StyleType::Error)),
        RatesState::Loading => println!("{}", ui::style_text("Loading rates...", StyleType::Subtle)),
        RatesState::Idle => {}
    }
    println!(
        "{} {:>12}  {}",
        ui::style_text("From", StyleType::Label),
        converter.amount(),
        converter.source().to_uppercase()
    );
    println!(
        "{}   {:>12.2}  {}",
        ui::style_text("To", StyleType::Label),
        converter.converted(),
        converter.target().to_uppercase()
    );
}

/// Reads an amount and converts it. Anything that does not parse becomes
/// NaN and is rejected by the controller like any other invalid amount.
fn prompt_convert(converter: &mut Converter) -> Result<()> {
    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Amount in {}", converter.source().to_uppercase()))
        .allow_empty(true)
        .interact_text()?;
    converter.set_amount(raw.trim().parse().unwrap_or(f64::NAN));

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    match converter.convert(timestamp) {
        Ok(entry) => println!(
            "{} {} {} = {} {}",
            ui::style_text("✔", StyleType::Value),
            entry.amount,
            entry.source.to_uppercase(),
            ui::style_text(&entry.result, StyleType::Value),
            entry.target.to_uppercase()
        ),
        Err(e) => println!("{}", ui::style_text(&e.to_string(), StyleType::Error)),
    }
    Ok(())
}

/// Currency picker over the available codes; falls back to manual entry
/// when no mapping is loaded. Returns `None` when the user backs out.
fn prompt_currency(prompt: &str, options: Vec<&str>, current: &str) -> Result<Option<String>> {
    if options.is_empty() {
        let raw: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{prompt} (3-letter code)"))
            .allow_empty(true)
            .interact_text()?;
        let code = raw.trim().to_lowercase();
        return Ok((!code.is_empty()).then_some(code));
    }

    let labels: Vec<String> = options.iter().map(|code| code.to_uppercase()).collect();
    let default = options.iter().position(|code| *code == current).unwrap_or(0);
    let selection = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{prompt} (type to filter)"))
        .items(&labels)
        .default(default)
        .max_length(10)
        .interact()?;
    Ok(Some(options[selection].to_string()))
}
