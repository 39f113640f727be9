//! Fixed partitions used by the price and stock distributions.
//!
//! A band matches when the value is strictly below `below`; the last band
//! has no bound and catches the rest. Bands are checked in order, so a value
//! sitting exactly on a boundary lands in the upper band.

pub struct Band {
    pub label: &'static str,
    pub below: Option<f64>,
}

pub const PRICE_BANDS: [Band; 4] = [
    Band { label: "Under $50", below: Some(50.0) },
    Band { label: "$50-$100", below: Some(100.0) },
    Band { label: "$100-$500", below: Some(500.0) },
    Band { label: "Over $500", below: None },
];

// Stock is integral, so `< 1` is the `= 0` band.
pub const STOCK_BANDS: [Band; 4] = [
    Band { label: "Out of Stock", below: Some(1.0) },
    Band { label: "Low Stock", below: Some(25.0) },
    Band { label: "Medium Stock", below: Some(100.0) },
    Band { label: "High Stock", below: None },
];

fn classify(bands: &'static [Band], value: f64) -> &'static str {
    bands
        .iter()
        .find(|b| b.below.map_or(true, |below| value < below))
        .map(|b| b.label)
        .unwrap_or(bands[bands.len() - 1].label)
}

pub fn classify_price(price: f64) -> &'static str {
    classify(&PRICE_BANDS, price)
}

pub fn classify_stock(stock: i64) -> &'static str {
    classify(&STOCK_BANDS, stock as f64)
}

/// Renders the SQL `CASE` selecting a band label for `column`.
///
/// Only ever called with the constant tables above, so labels can be
/// embedded as literals.
pub(crate) fn case_expression(column: &str, bands: &[Band]) -> String {
    let mut sql = String::from("CASE");
    let mut fallback = "";
    for band in bands {
        match band.below {
            Some(below) => sql.push_str(&format!(" WHEN {column} < {below} THEN '{}'", band.label)),
            None => fallback = band.label,
        }
    }
    sql.push_str(&format!(" ELSE '{fallback}' END"));
    sql
}
