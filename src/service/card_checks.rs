use crate::host::RawCard;
use chrono::{Datelike, Utc};

/// Pre-flight checks on raw card input, reported as field-level messages
/// before any request is sent. Stored and tokenized card references skip
/// these entirely.
pub fn validate_card(card: &RawCard) -> Vec<String> {
    let mut errors = Vec::new();

    if card.cardholder_name.trim().is_empty() {
        errors.push("Cardholder name is required".to_string());
    }

    let digits: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
    if !(13..=19).contains(&digits.len())
        || !digits.chars().all(|c| c.is_ascii_digit())
        || !luhn_valid(&digits)
    {
        errors.push("Card number is wrong".to_string());
    }

    if !(card.cvv2.len() == 3 || card.cvv2.len() == 4)
        || !card.cvv2.chars().all(|c| c.is_ascii_digit())
    {
        errors.push("Card code is wrong".to_string());
    }

    if !(1..=12).contains(&card.expire_month) {
        errors.push("Expiration month is wrong".to_string());
    } else {
        let now = Utc::now();
        let expired = (i32::from(card.expire_year), u32::from(card.expire_month))
            < (now.year(), now.month());
        if expired {
            errors.push("Card is expired".to_string());
        }
    }

    errors
}

fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_card() -> RawCard {
        RawCard {
            cardholder_name: "Jo Shopper".to_string(),
            number: "4111111111111111".to_string(),
            expire_month: 12,
            expire_year: 2031,
            cvv2: "123".to_string(),
        }
    }

    #[test]
    fn well_formed_card_passes() {
        assert!(validate_card(&valid_card()).is_empty());
    }

    #[test]
    fn luhn_failure_is_reported() {
        let mut card = valid_card();
        card.number = "4111111111111112".to_string();
        let errors = validate_card(&card);
        assert!(errors.iter().any(|e| e.contains("Card number")));
    }

    #[test]
    fn short_cvv_is_reported() {
        let mut card = valid_card();
        card.cvv2 = "12".to_string();
        let errors = validate_card(&card);
        assert!(errors.iter().any(|e| e.contains("Card code")));
    }

    #[test]
    fn past_expiry_is_reported() {
        let mut card = valid_card();
        card.expire_year = 2020;
        let errors = validate_card(&card);
        assert!(errors.iter().any(|e| e.contains("expired")));
    }

    #[test]
    fn multiple_problems_are_all_reported() {
        let card = RawCard {
            cardholder_name: " ".to_string(),
            number: "12".to_string(),
            expire_month: 13,
            expire_year: 2031,
            cvv2: "x".to_string(),
        };
        assert_eq!(validate_card(&card).len(), 4);
    }
}
