//! High-traffic holding fee
//!
//! A date listed in `high_traffic_dates` needs a card on file. Only the last
//! four digits and the expiry are kept; the full number and CVV are checked
//! for shape and dropped.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::models::HoldingFeeStatus;
use shared::{AppError, AppResult, ErrorCode};

use crate::db::repository::credit_card::NewCardHold;

/// Card details as submitted with a reservation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardInput {
    pub number: Option<String>,
    pub last_four_digits: Option<String>,
    pub expiry_month: i32,
    pub expiry_year: i32,
    pub cvv: Option<String>,
}

/// Fee applicable to a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingFee {
    pub is_high_traffic_day: bool,
    pub holding_fee_status: HoldingFeeStatus,
    pub holding_fee_cents: i64,
}

impl HoldingFee {
    pub fn for_date(is_high_traffic: bool, fee_cents: i64) -> Self {
        Self {
            is_high_traffic_day: is_high_traffic,
            holding_fee_status: HoldingFeeStatus::for_high_traffic(is_high_traffic),
            holding_fee_cents: if is_high_traffic { fee_cents } else { 0 },
        }
    }

    pub fn is_required(&self) -> bool {
        self.holding_fee_status == HoldingFeeStatus::Required
    }
}

/// Decide which card hold (if any) to store for a reservation.
///
/// High-traffic dates require a valid card. On other dates any submitted
/// card is ignored.
pub fn card_hold_for(
    fee: &HoldingFee,
    card: Option<&CreditCardInput>,
    today: NaiveDate,
) -> AppResult<Option<NewCardHold>> {
    if !fee.is_required() {
        return Ok(None);
    }
    let card = card.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::CreditCardRequired,
            "A credit card is required for reservations on high-traffic days",
        )
    })?;
    validate_card(card, today).map(Some)
}

/// Check a submitted card and reduce it to hold metadata
pub fn validate_card(card: &CreditCardInput, today: NaiveDate) -> AppResult<NewCardHold> {
    let last_four_digits = match (&card.number, &card.last_four_digits) {
        (Some(number), _) if !number.trim().is_empty() => {
            let digits: String = number.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
            if !(12..=19).contains(&digits.len()) || !all_digits(&digits) {
                return Err(invalid("card number must be 12 to 19 digits"));
            }
            digits[digits.len() - 4..].to_string()
        }
        (_, Some(last4)) if last4.len() == 4 && all_digits(last4) => last4.clone(),
        _ => return Err(invalid("card number or last four digits required")),
    };

    if let Some(cvv) = &card.cvv
        && !((3..=4).contains(&cvv.len()) && all_digits(cvv))
    {
        return Err(invalid("CVV must be 3 or 4 digits"));
    }

    if !(1..=12).contains(&card.expiry_month) {
        return Err(invalid("expiry month must be between 1 and 12"));
    }
    let expiry_year = match card.expiry_year {
        y @ 0..=99 => 2000 + y,
        y => y,
    };
    if (expiry_year, card.expiry_month as u32) < (today.year(), today.month()) {
        return Err(invalid("card has expired"));
    }

    Ok(NewCardHold {
        last_four_digits,
        expiry_month: card.expiry_month,
        expiry_year,
    })
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn invalid(reason: &str) -> AppError {
    AppError::with_message(ErrorCode::CreditCardInvalid, format!("Invalid credit card: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, 15).unwrap()
    }

    fn card(number: &str) -> CreditCardInput {
        CreditCardInput {
            number: Some(number.into()),
            last_four_digits: None,
            expiry_month: 12,
            expiry_year: 2031,
            cvv: Some("123".into()),
        }
    }

    #[test]
    fn test_fee_for_date() {
        let fee = HoldingFee::for_date(true, 1000);
        assert!(fee.is_required());
        assert_eq!(fee.holding_fee_cents, 1000);

        let fee = HoldingFee::for_date(false, 1000);
        assert_eq!(fee.holding_fee_status, HoldingFeeStatus::NotRequired);
        assert_eq!(fee.holding_fee_cents, 0);
    }

    #[test]
    fn test_full_number_reduced_to_last_four() {
        let hold = validate_card(&card("4242 4242 4242 4242"), today()).unwrap();
        assert_eq!(hold.last_four_digits, "4242");
        assert_eq!(hold.expiry_year, 2031);
    }

    #[test]
    fn test_last_four_only_and_two_digit_year() {
        let input = CreditCardInput {
            last_four_digits: Some("1881".into()),
            expiry_month: 7,
            expiry_year: 30,
            ..Default::default()
        };
        let hold = validate_card(&input, today()).unwrap();
        assert_eq!(hold.last_four_digits, "1881");
        assert_eq!(hold.expiry_year, 2030);
    }

    #[test]
    fn test_rejects_bad_cards() {
        assert!(validate_card(&card("1234"), today()).is_err());
        assert!(validate_card(&card("4242-4242-4242-abcd"), today()).is_err());

        let mut expired = card("4242424242424242");
        expired.expiry_year = 2030;
        expired.expiry_month = 5;
        let err = validate_card(&expired, today()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CreditCardInvalid);

        let mut bad_month = card("4242424242424242");
        bad_month.expiry_month = 13;
        assert!(validate_card(&bad_month, today()).is_err());

        let mut bad_cvv = card("4242424242424242");
        bad_cvv.cvv = Some("12a".into());
        assert!(validate_card(&bad_cvv, today()).is_err());
    }

    #[test]
    fn test_current_month_still_valid() {
        let mut c = card("4242424242424242");
        c.expiry_year = 2030;
        c.expiry_month = 6;
        assert!(validate_card(&c, today()).is_ok());
    }

    #[test]
    fn test_card_hold_for() {
        let high = HoldingFee::for_date(true, 1000);
        let normal = HoldingFee::for_date(false, 1000);

        let err = card_hold_for(&high, None, today()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CreditCardRequired);

        assert!(card_hold_for(&high, Some(&card("4242424242424242")), today())
            .unwrap()
            .is_some());
        assert!(card_hold_for(&normal, Some(&card("4242424242424242")), today())
            .unwrap()
            .is_none());
    }
}
