use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{Days, Months, NaiveDate};

use crate::task::Item;
use crate::types::DType;

/// A runtime value produced by evaluating a QQL expression.
///
/// Every variant corresponds to exactly one [`DType`]; the checker guarantees
/// that the value an expression produces at runtime has the type it inferred.
///
/// # Examples
///
/// ```
/// use qql_lang::{DType, Value};
///
/// let value = Value::Int(42);
/// assert_eq!(value.dtype(), DType::Int);
/// assert_eq!(value.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),

    /// Signed integer; also used for priority ordinals
    Int(i64),

    String(String),

    /// Calendar date (no time of day)
    Date(NaiveDate),

    Duration(Duration),

    /// A single task
    Item(Arc<Item>),

    /// An ordered collection of tasks, shared with the list it came from
    Items(Arc<Vec<Arc<Item>>>),

    /// An ordered collection of strings (projects, contexts, tag values)
    Strings(Vec<String>),
}

impl Value {
    pub fn dtype(&self) -> DType {
        match self {
            Value::Bool(_) => DType::Bool,
            Value::Int(_) => DType::Int,
            Value::String(_) => DType::String,
            Value::Date(_) => DType::Date,
            Value::Duration(_) => DType::Duration,
            Value::Item(_) => DType::Item,
            Value::Items(_) => DType::ItemCollection,
            Value::Strings(_) => DType::StringCollection,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            other => invariant_violation(DType::Bool, other),
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(n) => *n,
            other => invariant_violation(DType::Int, other),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Value::String(s) => s,
            other => invariant_violation(DType::String, other),
        }
    }

    pub fn as_date(&self) -> NaiveDate {
        match self {
            Value::Date(d) => *d,
            other => invariant_violation(DType::Date, other),
        }
    }

    pub fn as_duration(&self) -> Duration {
        match self {
            Value::Duration(d) => *d,
            other => invariant_violation(DType::Duration, other),
        }
    }

    pub fn as_item(&self) -> &Arc<Item> {
        match self {
            Value::Item(item) => item,
            other => invariant_violation(DType::Item, other),
        }
    }

    pub fn as_items(&self) -> &Arc<Vec<Arc<Item>>> {
        match self {
            Value::Items(items) => items,
            other => invariant_violation(DType::ItemCollection, other),
        }
    }

    pub fn as_strings(&self) -> &[String] {
        match self {
            Value::Strings(strings) => strings,
            other => invariant_violation(DType::StringCollection, other),
        }
    }

    /// Orders two values of the same orderable type.
    ///
    /// Booleans order `false < true`, strings lexicographically and durations
    /// by their normalised length. Collections and items have no order.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Duration(a), Value::Duration(b)) => a.cmp(b),
            (a, b) => panic!(
                "internal invariant violated: cannot order {} against {}",
                a.dtype(),
                b.dtype()
            ),
        }
    }
}

fn invariant_violation(expected: DType, found: &Value) -> ! {
    panic!(
        "internal invariant violated: validated expression produced {} where {} was expected",
        found.dtype(),
        expected
    )
}

/// Formats a value the way it would be written in a query where possible.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "\"{}\"", escape(s)),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Duration(d) => write!(f, "{}", d),
            Value::Item(item) => write!(f, "{}", item.raw()),
            Value::Items(items) => write!(f, "<{} items>", items.len()),
            Value::Strings(strings) => {
                let quoted: Vec<String> = strings
                    .iter()
                    .map(|s| format!("\"{}\"", escape(s)))
                    .collect();
                write!(f, "[{}]", quoted.join(", "))
            }
        }
    }
}

/// Escapes a string for use inside a double-quoted QQL literal.
pub fn escape(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '"' => vec!['\\', '"'],
            '\\' => vec!['\\', '\\'],
            '\n' => vec!['\\', 'n'],
            '\t' => vec!['\\', 't'],
            c => vec![c],
        })
        .collect()
}

/// A calendar-aware span of time.
///
/// Months and days are kept apart because a month has no fixed length in
/// days. For comparison both are normalised into twelfths of a day, which
/// makes `1y` equal to `365d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Duration {
    pub months: i64,
    pub days: i64,
}

impl Duration {
    pub fn days(days: i64) -> Self {
        Duration { months: 0, days }
    }

    pub fn weeks(weeks: i64) -> Self {
        Duration::days(weeks.saturating_mul(7))
    }

    /// `None` when the week count does not fit in days.
    pub fn checked_weeks(weeks: i64) -> Option<Self> {
        weeks.checked_mul(7).map(Duration::days)
    }

    pub fn months(months: i64) -> Self {
        Duration { months, days: 0 }
    }

    pub fn years(years: i64) -> Self {
        Duration::months(years.saturating_mul(12))
    }

    /// `None` when the year count does not fit in months.
    pub fn checked_years(years: i64) -> Option<Self> {
        years.checked_mul(12).map(Duration::months)
    }

    /// Length in twelfths of a day.
    fn normalized(&self) -> i128 {
        self.months as i128 * 365 + self.days as i128 * 12
    }

    /// Length in whole days, truncated towards zero.
    pub fn whole_days(&self) -> i64 {
        (self.normalized() / 12) as i64
    }

    pub fn negate(self) -> Self {
        Duration {
            months: self.months.wrapping_neg(),
            days: self.days.wrapping_neg(),
        }
    }

    pub fn plus(self, other: Duration) -> Self {
        Duration {
            months: self.months.wrapping_add(other.months),
            days: self.days.wrapping_add(other.days),
        }
    }

    /// Shifts a date by this duration: months first, then days.
    ///
    /// Month arithmetic clamps to the end of the target month. Results that
    /// fall outside the representable range saturate.
    pub fn apply_to(&self, date: NaiveDate) -> NaiveDate {
        let saturate = if self.normalized() < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        };

        let months = u32::try_from(self.months.unsigned_abs()).ok();
        let shifted = match months {
            Some(m) if self.months >= 0 => date.checked_add_months(Months::new(m)),
            Some(m) => date.checked_sub_months(Months::new(m)),
            None => None,
        };
        let Some(shifted) = shifted else {
            return saturate;
        };

        let days = Days::new(self.days.unsigned_abs());
        let result = if self.days >= 0 {
            shifted.checked_add_days(days)
        } else {
            shifted.checked_sub_days(days)
        };
        result.unwrap_or(saturate)
    }
}

impl PartialEq for Duration {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Duration {}

impl Ord for Duration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized().cmp(&other.normalized())
    }
}

impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Canonical literal form: the largest unit that represents the value exactly.
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.months, self.days) {
            (0, 0) => write!(f, "0d"),
            (0, d) if d % 7 == 0 => write!(f, "{}w", d / 7),
            (0, d) => write!(f, "{}d", d),
            (m, 0) if m % 12 == 0 => write!(f, "{}y", m / 12),
            (m, 0) => write!(f, "{}m", m),
            (m, d) => write!(f, "{}m{:+}d", m, d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_duration_normalised_ordering() {
        assert_eq!(Duration::years(1).cmp(&Duration::days(365)), Ordering::Equal);
        assert!(Duration::months(1) > Duration::days(30));
        assert!(Duration::weeks(1) == Duration::days(7));
        assert!(Duration::days(-1) < Duration::days(0));
    }

    #[test]
    fn test_checked_units() {
        assert_eq!(Duration::checked_weeks(2), Some(Duration::days(14)));
        assert!(Duration::checked_weeks(i64::MAX).is_none());
        assert!(Duration::checked_years(i64::MAX / 6).is_none());
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(Duration::days(3).to_string(), "3d");
        assert_eq!(Duration::weeks(2).to_string(), "2w");
        assert_eq!(Duration::months(5).to_string(), "5m");
        assert_eq!(Duration::years(2).to_string(), "2y");
    }

    #[test]
    fn test_apply_months_clamps_to_month_end() {
        let d = Duration::months(1).apply_to(date(2024, 1, 31));
        assert_eq!(d, date(2024, 2, 29));
    }

    #[test]
    fn test_apply_negative_duration() {
        let d = Duration::days(10).negate().apply_to(date(2024, 3, 5));
        assert_eq!(d, date(2024, 2, 24));
    }

    #[test]
    fn test_whole_days() {
        assert_eq!(Duration::weeks(2).whole_days(), 14);
        assert_eq!(Duration::years(1).whole_days(), 365);
        assert_eq!(Duration::months(1).whole_days(), 30);
    }

    #[test]
    #[should_panic(expected = "internal invariant violated")]
    fn test_wrong_accessor_panics() {
        Value::Int(1).as_bool();
    }
}
