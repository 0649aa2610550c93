//! Tokenizer for contract amounts such as `"650€/mois"` or `"€ 1 200,50 par mois"`.
//!
//! Currency and unit text around the number is ignored. The leading number may
//! use spaces, no-break spaces or apostrophes as thousands separators, and a
//! comma or dot as decimal separator. When both a comma and a dot appear, the
//! last one is the decimal separator. A lone comma or dot followed by exactly
//! three digits is read as a thousands separator.

use crate::decimal::Money;
use crate::errors::{AnalyticsError, Result};

const NO_BREAK_SPACE: char = '\u{a0}';
const NARROW_NO_BREAK_SPACE: char = '\u{202f}';
const MINUS_SIGN: char = '\u{2212}';
const CURRENCY_TOKENS: [&str; 7] = ["€", "$", "£", "EUR", "USD", "GBP", "CHF"];

/// parse the rent figure out of a contract amount string
pub fn parse_contract_amount(input: &str) -> Result<Money> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AnalyticsError::EmptyAmount);
    }

    let start = trimmed
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| AnalyticsError::MissingDigits {
            input: input.to_string(),
        })?;

    if is_signed(&trimmed[..start]) {
        return Err(AnalyticsError::NegativeAmount {
            input: input.to_string(),
        });
    }

    let token = number_token(&trimmed[start..]);
    let normalized = normalize_number(&token).ok_or_else(|| AnalyticsError::MalformedNumber {
        input: input.to_string(),
        number: token.clone(),
    })?;

    Money::from_str_exact(&normalized).map_err(|_| AnalyticsError::MalformedNumber {
        input: input.to_string(),
        number: token,
    })
}

/// true when the text before the digits is a minus sign surrounded only by
/// currency tokens, as in `-650`, `€ -650` or `- EUR 650`
fn is_signed(prefix: &str) -> bool {
    let mut rest = prefix;
    let mut signed = false;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return signed;
        }
        if let Some(after) = rest.strip_prefix(['-', MINUS_SIGN]) {
            if signed {
                return false;
            }
            signed = true;
            rest = after;
            continue;
        }
        match strip_currency(rest) {
            Some(after) => rest = after,
            None => return false,
        }
    }
}

fn strip_currency(text: &str) -> Option<&str> {
    CURRENCY_TOKENS.iter().find_map(|token| {
        let head = text.get(..token.len())?;
        head.eq_ignore_ascii_case(token).then(|| &text[token.len()..])
    })
}

fn is_grouping_space(c: char) -> bool {
    matches!(c, ' ' | NO_BREAK_SPACE | NARROW_NO_BREAK_SPACE | '\'')
}

fn is_separator(c: char) -> bool {
    is_grouping_space(c) || c == '.' || c == ','
}

/// leading run of digits joined by single separators
fn number_token(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut token = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let next_is_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
        if c.is_ascii_digit() || (is_separator(c) && next_is_digit) {
            token.push(c);
        } else {
            break;
        }
    }

    token
}

/// rewrite a number token as `digits[.digits]`, None when the grouping is inconsistent
fn normalize_number(token: &str) -> Option<String> {
    let mut groups: Vec<String> = vec![String::new()];
    let mut separators: Vec<char> = Vec::new();

    for c in token.chars() {
        if c.is_ascii_digit() {
            groups.last_mut()?.push(c);
        } else {
            separators.push(c);
            groups.push(String::new());
        }
    }

    let marks: Vec<usize> = separators
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == '.' || **c == ',')
        .map(|(i, _)| i)
        .collect();
    let has_dot = separators.contains(&'.');
    let has_comma = separators.contains(&',');

    let decimal_at = if has_dot && has_comma {
        marks.last().copied()
    } else if marks.len() == 1 && groups[marks[0] + 1].len() != 3 {
        Some(marks[0])
    } else {
        None
    };

    let (integer_groups, fraction) = match decimal_at {
        Some(at) if at + 1 == separators.len() => (&groups[..=at], Some(&groups[at + 1])),
        Some(_) => return None,
        None => (&groups[..], None),
    };

    // every group after the first must be a full thousands group
    if integer_groups.iter().skip(1).any(|g| g.len() != 3) {
        return None;
    }

    let mut normalized: String = integer_groups.concat();
    if let Some(fraction) = fraction {
        normalized.push('.');
        normalized.push_str(fraction);
    }
    Some(normalized)
}
