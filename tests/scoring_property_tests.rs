/// Property-based tests using proptest
/// Tests invariants of the scoring table and the normalization helpers.
use proptest::prelude::*;

use leadcapture_api::models::LeadCategory;
use leadcapture_api::normalizer::{classify_document, digits_only, is_valid_email};
use leadcapture_api::scoring::{
    category_for_score, parse_capital, process_capital, score_for_capital,
};

// Property: scoring is total, monotone and lands in the fixed codomain
proptest! {
    #[test]
    fn score_is_monotone_in_capital(a in 0i64..=10_000_000, b in 0i64..=10_000_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(score_for_capital(lo) <= score_for_capital(hi));
    }

    #[test]
    fn score_codomain_is_fixed(capital in 0i64..=i64::MAX) {
        let score = score_for_capital(capital);
        prop_assert!([50, 55, 60, 70, 80, 90, 95].contains(&score));
    }

    #[test]
    fn category_matches_banding(score in 0i32..=100) {
        let categoria = category_for_score(score);
        if score >= 80 {
            prop_assert_eq!(categoria, LeadCategory::Hot);
        } else if score >= 60 {
            prop_assert_eq!(categoria, LeadCategory::Warm);
        } else {
            prop_assert_eq!(categoria, LeadCategory::Cold);
        }
    }
}

// Property: capital parsing never panics and never goes negative
proptest! {
    #[test]
    fn parse_capital_never_panics(raw in "\\PC*") {
        let capital = parse_capital(&raw);
        prop_assert!(capital >= 0);
    }

    #[test]
    fn parse_capital_is_digit_extraction(amount in 0i64..=999_999_999) {
        // Currency formatting around the digits must not change the value.
        let formatted = format!("R$ {} reais", amount);
        prop_assert_eq!(parse_capital(&formatted), amount);
    }

    #[test]
    fn process_capital_is_consistent(raw in "\\PC*") {
        let (capital, score, categoria) = process_capital(&raw);
        prop_assert_eq!(score, score_for_capital(capital));
        prop_assert_eq!(categoria, category_for_score(score));
    }
}

// Property: digit stripping preserves digit order
proptest! {
    #[test]
    fn digit_extraction_preserves_order(cpf in "[0-9]{11}") {
        let formatted = format!("{}.{}.{}-{}",
            &cpf[0..3], &cpf[3..6], &cpf[6..9], &cpf[9..11]);
        prop_assert_eq!(digits_only(&formatted), cpf);
    }

    #[test]
    fn document_classification_by_length(digits in "[0-9]{0,20}") {
        let tipo = classify_document(&digits);
        match digits.len() {
            11 => prop_assert!(tipo.is_some()),
            14 => prop_assert!(tipo.is_some()),
            _ => prop_assert!(tipo.is_none()),
        }
    }
}

// Property: email validation is total
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn simple_addresses_are_accepted(
        local in "[a-z]{1,10}",
        domain in "[a-z]{1,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email));
    }
}
