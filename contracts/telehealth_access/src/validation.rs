use soroban_sdk::{Env, String};

use crate::{ContractError, GrantStatus};

const MIN_NAME_LEN: u32 = 2;
const MAX_NAME_LEN: u32 = 64;

pub const MAX_PATIENT_CODE_LEN: u32 = 32;

const MAX_TEXT_LEN: u32 = 256;

pub const MIN_GRANT_DURATION: u64 = 60; // 1 minute
pub const MAX_GRANT_DURATION: u64 = 2_592_000; // 30 days

/// Names must be printable ASCII between MIN_NAME_LEN and MAX_NAME_LEN bytes.
pub fn validate_name(name: &String) -> Result<(), ContractError> {
    let len = name.len();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(ContractError::InvalidInput);
    }

    let mut buf = [0u8; MAX_NAME_LEN as usize];
    name.copy_into_slice(&mut buf[..len as usize]);

    if buf[..len as usize].iter().any(|b| !(32..=126).contains(b)) {
        return Err(ContractError::InvalidInput);
    }

    Ok(())
}

/// Trims surrounding ASCII whitespace from an external patient code.
///
/// The result is non-empty, at most MAX_PATIENT_CODE_LEN bytes and made of
/// `[A-Za-z0-9_-]` only, so the same patient always maps to the same key.
pub fn normalize_patient_code(env: &Env, code: &String) -> Result<String, ContractError> {
    let len = code.len();
    if len == 0 || len > MAX_PATIENT_CODE_LEN * 2 {
        return Err(ContractError::InvalidInput);
    }

    let mut buf = [0u8; (MAX_PATIENT_CODE_LEN * 2) as usize];
    code.copy_into_slice(&mut buf[..len as usize]);
    let raw = &buf[..len as usize];

    let start = raw
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .ok_or(ContractError::InvalidInput)?;
    let end = raw
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    let trimmed = &raw[start..end];

    if trimmed.len() > MAX_PATIENT_CODE_LEN as usize {
        return Err(ContractError::InvalidInput);
    }
    if !trimmed
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
    {
        return Err(ContractError::InvalidInput);
    }

    Ok(String::from_bytes(env, trimmed))
}

/// Free-form report metadata (type, url, filename): non-empty, bounded length.
pub fn validate_text(text: &String) -> Result<(), ContractError> {
    let len = text.len();
    if len == 0 || len > MAX_TEXT_LEN {
        return Err(ContractError::InvalidInput);
    }
    Ok(())
}

pub fn validate_grant_duration(duration_seconds: u64) -> Result<(), ContractError> {
    if !(MIN_GRANT_DURATION..=MAX_GRANT_DURATION).contains(&duration_seconds) {
        return Err(ContractError::InvalidDuration);
    }
    Ok(())
}

/// Maps a patient's decision string onto the status it transitions to.
pub fn parse_decision(env: &Env, decision: &String) -> Result<GrantStatus, ContractError> {
    if *decision == String::from_str(env, "accepted") {
        Ok(GrantStatus::Accepted)
    } else if *decision == String::from_str(env, "rejected") {
        Ok(GrantStatus::Rejected)
    } else {
        Err(ContractError::InvalidDecision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        let env = Env::default();

        assert_eq!(validate_name(&String::from_str(&env, "Dr. Meera Rao")), Ok(()));
        assert_eq!(
            validate_name(&String::from_str(&env, "A")),
            Err(ContractError::InvalidInput)
        );
        let long_name = "A".repeat(65);
        assert_eq!(
            validate_name(&String::from_str(&env, &long_name)),
            Err(ContractError::InvalidInput)
        );
        assert_eq!(
            validate_name(&String::from_str(&env, "John\nDoe")),
            Err(ContractError::InvalidInput)
        );
    }

    #[test]
    fn test_normalize_patient_code_trims() {
        let env = Env::default();

        assert_eq!(
            normalize_patient_code(&env, &String::from_str(&env, "  PAT688885 ")),
            Ok(String::from_str(&env, "PAT688885"))
        );
        assert_eq!(
            normalize_patient_code(&env, &String::from_str(&env, "PAT001")),
            Ok(String::from_str(&env, "PAT001"))
        );
    }

    #[test]
    fn test_normalize_patient_code_rejects_malformed() {
        let env = Env::default();

        for bad in ["", "    ", "PAT 001", "PAT#1"] {
            assert_eq!(
                normalize_patient_code(&env, &String::from_str(&env, bad)),
                Err(ContractError::InvalidInput)
            );
        }

        let long_code = "P".repeat(33);
        assert_eq!(
            normalize_patient_code(&env, &String::from_str(&env, &long_code)),
            Err(ContractError::InvalidInput)
        );
    }

    #[test]
    fn test_validate_grant_duration() {
        assert_eq!(validate_grant_duration(60), Ok(()));
        assert_eq!(validate_grant_duration(3600), Ok(()));
        assert_eq!(validate_grant_duration(2_592_000), Ok(()));

        assert_eq!(validate_grant_duration(0), Err(ContractError::InvalidDuration));
        assert_eq!(validate_grant_duration(59), Err(ContractError::InvalidDuration));
        assert_eq!(
            validate_grant_duration(2_592_001),
            Err(ContractError::InvalidDuration)
        );
    }

    #[test]
    fn test_parse_decision() {
        let env = Env::default();

        assert_eq!(
            parse_decision(&env, &String::from_str(&env, "accepted")),
            Ok(GrantStatus::Accepted)
        );
        assert_eq!(
            parse_decision(&env, &String::from_str(&env, "rejected")),
            Ok(GrantStatus::Rejected)
        );
        for bad in ["pending", "Accepted", "", "yes"] {
            assert_eq!(
                parse_decision(&env, &String::from_str(&env, bad)),
                Err(ContractError::InvalidDecision)
            );
        }
    }
}
