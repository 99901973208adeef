//! Small pure helpers.

/// Check a candidate EVM address: `0x` followed by exactly 40 hex digits.
pub fn is_valid_evm_address(address: &str) -> bool {
    let hex = match address.strip_prefix("0x") {
        Some(rest) => rest,
        None => return false,
    };
    hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Shorten an address for log output, keeping both ends.
pub fn shorten_address(address: &str) -> String {
    if address.len() > 14 {
        format!("{}...{}", &address[..8], &address[address.len() - 6..])
    } else {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_addresses() {
        assert!(is_valid_evm_address(
            "0x52908400098527886E0F7030069857D2E4169EE7"
        ));
        assert!(is_valid_evm_address(
            "0xde709f2102306220921060314715629080e2fb77"
        ));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_evm_address("not-an-address"));
        assert!(!is_valid_evm_address(""));
        assert!(!is_valid_evm_address("0x"));
        // one digit short
        assert!(!is_valid_evm_address(
            "0x52908400098527886E0F7030069857D2E4169EE"
        ));
        // one digit long
        assert!(!is_valid_evm_address(
            "0x52908400098527886E0F7030069857D2E4169EE7A"
        ));
        // non-hex character
        assert!(!is_valid_evm_address(
            "0x5290840009852788gE0F7030069857D2E4169EE7"
        ));
        // missing prefix
        assert!(!is_valid_evm_address(
            "52908400098527886E0F7030069857D2E4169EE7"
        ));
    }

    #[test]
    fn shortens_long_addresses_only() {
        assert_eq!(
            shorten_address("0x52908400098527886E0F7030069857D2E4169EE7"),
            "0x529084...169EE7"
        );
        assert_eq!(shorten_address("0x1234"), "0x1234");
    }
}
