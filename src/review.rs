use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Review document as stored in the review index. Indexed values are passed
/// through as-is, so only the counters are given a concrete type.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Review {
    pub date: Option<Value>,
    pub username: Option<Value>,
    pub location: Option<Value>,
    pub product: Option<Value>,
    pub stars: Option<Value>,
    pub title: Option<Value>,
    pub review_text: Option<Value>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub helpful_votes: i64,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub verified: bool,
}

impl Review {
    /// Star rating as displayed in prompt context, `0` when absent.
    pub fn stars_display(&self) -> String {
        value_text(&self.stars, "0")
    }
}

/// Renders a passed-through field for prompt text: strings unquoted, other
/// values as JSON, `absent` for missing or null.
pub fn value_text(value: &Option<Value>, absent: &str) -> String {
    match value {
        Some(Value::Null) | None => absent.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Whole count from an integer, a float, or a numeric string. Anything else is `0`.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let count = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    };
    Ok(count)
}

/// Boolean from a bool or a `"true"`/`"false"` string. Anything else is `false`.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let flag = match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    };
    Ok(flag)
}

/// Caller-facing projection of a review hit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReviewView {
    pub id: String,
    pub date: Option<Value>,
    pub username: Option<Value>,
    pub location: Option<Value>,
    pub product_description: Option<Value>,
    pub stars: Option<Value>,
    pub title: Option<Value>,
    pub description: Option<Value>,
    pub helpful_count: i64,
    pub verified_purchase: bool,
    pub images: Vec<String>,
}

impl ReviewView {
    pub fn from_hit(id: &str, review: &Review) -> Self {
        Self {
            id: id.to_string(),
            date: review.date.clone(),
            username: review.username.clone(),
            location: review.location.clone(),
            product_description: review.product.clone(),
            stars: review.stars.clone(),
            title: review.title.clone(),
            description: review.review_text.clone(),
            helpful_count: review.helpful_votes,
            verified_purchase: review.verified,
            images: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PastPurchase {
    #[serde(default)]
    pub price: f64,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PastReview {
    #[serde(default)]
    pub review_text: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Preferences {
    pub price_sensitivity: Option<String>,
    #[serde(default)]
    pub feature_priorities: Vec<String>,
}

/// Shopper profile kept in the profile index, keyed by username.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UserProfile {
    pub username: Option<String>,
    pub occupation: Option<String>,
    #[serde(default)]
    pub annual_income: f64,
    #[serde(default)]
    pub credit_limit: f64,
    #[serde(default)]
    pub past_purchases: Vec<PastPurchase>,
    #[serde(default)]
    pub past_reviews: Vec<PastReview>,
    #[serde(default)]
    pub preferences: Preferences,
}

impl UserProfile {
    /// Mean price of past purchases, `0.0` with no purchase history.
    pub fn average_purchase_price(&self) -> f64 {
        if self.past_purchases.is_empty() {
            return 0.0;
        }
        let total: f64 = self.past_purchases.iter().map(|p| p.price).sum();
        total / self.past_purchases.len() as f64
    }
}

impl std::fmt::Display for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let own_review = self
            .past_reviews
            .first()
            .map_or("", |r| r.review_text.as_str());
        writeln!(f)?;
        writeln!(f, "User Profile:")?;
        writeln!(f, "- Username: {}", display_or_none(&self.username))?;
        writeln!(f, "- Occupation: {}", display_or_none(&self.occupation))?;
        writeln!(f, "- Annual Income: ${}", group_thousands(self.annual_income, 0))?;
        writeln!(f, "- Credit Limit: ${}", group_thousands(self.credit_limit, 0))?;
        writeln!(
            f,
            "- Past Purchases Average Price: ${}",
            group_thousands(self.average_purchase_price(), 2)
        )?;
        writeln!(f, "- Their Own Review: \"{}\"", own_review)?;
        writeln!(
            f,
            "- Price Sensitivity: {}",
            self.preferences
                .price_sensitivity
                .as_deref()
                .unwrap_or("unknown")
        )?;
        writeln!(
            f,
            "- Feature Priorities: {}",
            self.preferences.feature_priorities.join(", ")
        )
    }
}

fn display_or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

/// Formats `value` with `decimals` fraction digits and comma-grouped thousands.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (formatted.as_str(), None),
    };
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 1);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}
