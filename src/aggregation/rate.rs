// src/aggregation/rate.rs
use crate::models::RateRange;

/// Band labels in display order.
pub const RATE_CATEGORIES: [&str; 5] = ["≤$149", "$150-$249", "$250-$399", "$400-$549", "$550+"];

/// Lower edge of each band after the first. A band covers
/// `[lower, next_lower)`, so integer rates land exactly on the labelled
/// bounds and fractional rates between labels (149.5) are never left out.
const BAND_LOWER_EDGES: [f64; 4] = [150.0, 250.0, 400.0, 550.0];

/// Rate band for a nightly rate; `None` for missing, NaN or infinite input.
pub fn categorize(rate: Option<f64>) -> Option<&'static str> {
    let rate = rate.filter(|r| r.is_finite())?;
    let band = BAND_LOWER_EDGES
        .iter()
        .take_while(|edge| rate >= **edge)
        .count();
    Some(RATE_CATEGORIES[band])
}

pub fn is_standard_category(category: &str) -> bool {
    RATE_CATEGORIES.contains(&category)
}

fn rough_bucket(rate: f64) -> &'static str {
    if rate < 50.0 {
        "$0-50"
    } else if rate < 100.0 {
        "$50-100"
    } else if rate < 150.0 {
        "$100-150"
    } else if rate < 200.0 {
        "$150-200"
    } else if rate < 300.0 {
        "$200-300"
    } else if rate < 500.0 {
        "$300-500"
    } else {
        "$500+"
    }
}

/// Upper display bound for a maximum rate; `None` means open-ended (500+).
fn upper_bound(max: f64) -> Option<u32> {
    [100, 150, 200, 300, 500]
        .into_iter()
        .find(|bound| max < f64::from(*bound))
}

fn lower_bound(min: f64) -> u32 {
    [(100.0, 50), (150.0, 100), (200.0, 150), (300.0, 200), (500.0, 300)]
        .into_iter()
        .find(|(limit, _)| min < *limit)
        .map(|(_, bound)| bound)
        .unwrap_or(500)
}

/// Coarse public label for a rate range. Exact scraped rates are never shown;
/// the minimum is clamped to 1 so a label never starts at $0.
pub fn rough_rate_label(range: &RateRange) -> String {
    let min = range.min.max(1.0);
    let max = range.max;

    let min_bucket = rough_bucket(min);
    if min_bucket == rough_bucket(max) {
        return min_bucket.to_string();
    }

    if min < 50.0 {
        if max < 50.0 {
            return "< $50".to_string();
        }
        return match upper_bound(max) {
            Some(upper) => format!("< $50 - ${}", upper),
            None => "< $500+".to_string(),
        };
    }

    let lower = lower_bound(min);
    match upper_bound(max) {
        None if lower == 500 => "$500+".to_string(),
        None => format!("${}+", lower),
        Some(upper) if upper == lower => rough_bucket(max).to_string(),
        Some(upper) => format!("${}-{}", lower, upper),
    }
}
