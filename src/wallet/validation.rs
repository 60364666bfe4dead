use super::error::WalletError;
use crate::money::Money;

/// ISO-4217 three-letter code: exactly three ASCII uppercase letters.
pub fn validate_currency(currency: &str) -> Result<(), WalletError> {
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(WalletError::Validation(format!(
            "currency must be a three-letter ISO-4217 code, got '{currency}'"
        )));
    }
    Ok(())
}

/// Transfer/deposit/withdraw amount: strict decimal grammar, max four
/// fractional digits, strictly positive.
pub fn validate_amount(amount: &str) -> Result<Money, WalletError> {
    Ok(Money::parse_positive(amount)?)
}

pub fn validate_idempotency_key(key: &str) -> Result<(), WalletError> {
    if key.trim().is_empty() {
        return Err(WalletError::Validation(
            "idempotency_key is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_must_be_three_uppercase_letters() {
        assert!(validate_currency("USD").is_ok());
        assert!(validate_currency("EUR").is_ok());
        assert!(validate_currency("usd").is_err());
        assert!(validate_currency("US").is_err());
        assert!(validate_currency("USDT").is_err());
        assert!(validate_currency("U5D").is_err());
    }

    #[test]
    fn amount_must_be_positive_with_four_decimals_max() {
        assert!(validate_amount("50.00").is_ok());
        assert!(validate_amount("0.0001").is_ok());
        assert!(validate_amount("0").is_err());
        assert!(validate_amount("0.0000").is_err());
        assert!(validate_amount("-5").is_err());
        assert!(validate_amount("1.23456").is_err());
        assert!(validate_amount("abc").is_err());
    }

    #[test]
    fn idempotency_key_must_be_non_empty() {
        assert!(validate_idempotency_key("k1").is_ok());
        assert!(validate_idempotency_key("").is_err());
        assert!(validate_idempotency_key("   ").is_err());
    }
}
