use rust_decimal::RoundingStrategy;

use crate::models::{Movie, MovieDetails, MovieSummary, RawBudget};

/// Renders a dollar amount as `$1,500,000.75`, rounded half away from zero to
/// cents. A missing budget renders as zero so every formatted row carries a
/// string.
pub fn usd(amount: RawBudget) -> String {
    let amount = amount
        .map(|n| n.0)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };

    let text = format!("{:.2}", amount.abs());
    let (digits, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{cents}")
}

/// Replaces a record's raw budget with its currency string.
pub trait FormatBudget {
    type Output;

    fn format_budget(self) -> Self::Output;
}

impl FormatBudget for Movie {
    type Output = Movie<String>;

    fn format_budget(self) -> Self::Output {
        self.map_budget(usd)
    }
}

impl FormatBudget for MovieSummary {
    type Output = MovieSummary<String>;

    fn format_budget(self) -> Self::Output {
        self.map_budget(usd)
    }
}

impl FormatBudget for MovieDetails {
    type Output = MovieDetails<String>;

    fn format_budget(self) -> Self::Output {
        self.map_budget(usd)
    }
}

impl<T: FormatBudget> FormatBudget for Vec<T> {
    type Output = Vec<T::Output>;

    fn format_budget(self) -> Self::Output {
        self.into_iter().map(FormatBudget::format_budget).collect()
    }
}
