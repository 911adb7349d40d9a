//! Plain-text table rendering for chat replies

use crate::api::{OptionContract, Recommendation};
use comfy_table::{Table, presets};

/// Width recommendation cells are centred in
const CELL_WIDTH: usize = 10;

/// Render rows as a markdown-style table that survives monospace chat
pub fn markdown_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::ASCII_MARKDOWN)
        .set_header(headers.to_vec());
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

/// Centre `value` in a fixed-width field padded with underscores
pub fn pad_cell(value: impl ToString) -> String {
    format!("{:_^width$}", value.to_string(), width = CELL_WIDTH)
}

/// Analyst recommendations, one row per period
pub fn recommendation_table(trends: &[Recommendation]) -> String {
    let rows = trends
        .iter()
        .map(|r| {
            vec![
                r.period.clone(),
                pad_cell(r.buy),
                pad_cell(r.hold),
                pad_cell(r.sell),
                pad_cell(r.strong_buy),
                pad_cell(r.strong_sell),
            ]
        })
        .collect();

    markdown_table(
        &["period", "buy", "hold", "sell", "strongBuy", "strongSell"],
        rows,
    )
}

/// Options chain rows around a strike
pub fn option_table(contracts: &[OptionContract]) -> String {
    let rows = contracts
        .iter()
        .map(|c| {
            vec![
                format!("{}", c.strike),
                format!("{:.2}", c.ask),
                format!("{:.2}", c.bid),
                c.volume.map_or_else(|| "-".to_string(), |v| v.to_string()),
                format!("{:.4}", c.implied_volatility),
                if c.in_the_money { "True" } else { "False" }.to_string(),
            ]
        })
        .collect();

    markdown_table(&["strike", "ask", "bid", "volume", "IV", "ITM"], rows)
}
