use super::window::{TimeWindowPrice, pair_windows};
use crate::error::{EpexError, Result};
use scraper::{ElementRef, Html, Selector};

/// Container holding the ordered time-window labels
pub const TIMES_SELECTOR: &str = "div.fixed-column.js-table-times";
/// Table holding one price row per time window
pub const TABLE_SELECTOR: &str = "table.table-01.table-length-1";
/// Header/metadata rows at the top of the price table
pub const HEADER_ROWS: usize = 3;
/// Zero-based cell index of the price column
pub const PRICE_CELL: usize = 3;

const CURRENCY_SUFFIXES: [&str; 2] = ["€/MWh", "â‚¬/MWh"];

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EpexError::parse(format!("selector '{css}': {e}")))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Parse a price cell such as `"45,30 €/MWh"`
pub fn parse_price_text(text: &str) -> Result<f64> {
    let mut s = text.trim().to_string();
    for suffix in CURRENCY_SUFFIXES {
        s = s.replace(suffix, "");
    }
    let normalized: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let price = normalized.parse::<f64>()?;
    if !price.is_finite() {
        return Err(EpexError::parse(format!("non-finite price '{}'", text.trim())));
    }
    Ok(price)
}

/// Extract the labels and the price column from a market-data page
pub fn extract_columns(html: &str) -> Result<(Vec<String>, Vec<f64>)> {
    let document = Html::parse_document(html);

    let times = document
        .select(&selector(TIMES_SELECTOR)?)
        .next()
        .ok_or_else(|| EpexError::parse("time-window list not found on page"))?;
    let table = document
        .select(&selector(TABLE_SELECTOR)?)
        .next()
        .ok_or_else(|| EpexError::parse("price table not found on page"))?;

    let li = selector("li")?;
    let labels: Vec<String> = times.select(&li).map(element_text).collect();

    let tr = selector("tr")?;
    let td = selector("td")?;
    let mut prices = Vec::new();
    for row in table.select(&tr).skip(HEADER_ROWS) {
        if let Some(cell) = row.select(&td).nth(PRICE_CELL) {
            prices.push(parse_price_text(&element_text(cell))?);
        }
    }

    Ok((labels, prices))
}

/// Parse a market-data page into priced time windows, in page order
pub fn parse_page(html: &str) -> Result<Vec<TimeWindowPrice>> {
    let (labels, prices) = extract_columns(html)?;
    pair_windows(&labels, &prices)
}
