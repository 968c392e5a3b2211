//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Uses both custom validators and the `validator` crate.

use validator::ValidateEmail;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a student/staff login id: 4-20 ASCII alphanumerics
pub fn validate_student_id(student_id: &str) -> Result<(), String> {
    let re = regex_lite::Regex::new(r"^[A-Za-z0-9]{4,20}$")
        .map_err(|e| format!("Invalid student id pattern: {}", e))?;
    if !re.is_match(student_id) {
        return Err("Student ID must be 4-20 letters or digits".to_string());
    }
    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if trimmed.chars().count() > 100 {
        return Err("Name too long".to_string());
    }
    Ok(())
}

/// Validate a classroom or assignment title
pub fn validate_title(title: &str) -> Result<(), String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if trimmed.chars().count() > 200 {
        return Err("Title too long".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("prof@example.com", true)]
    #[case("student.kim@univ.ac.kr", true)]
    #[case("", false)]
    #[case("no-at-sign.com", false)]
    #[case("user@", false)]
    fn test_validate_email(#[case] email: &str, #[case] ok: bool) {
        assert_eq!(validate_email(email).is_ok(), ok);
    }

    #[rstest]
    #[case("20231234", true)]
    #[case("P001", true)]
    #[case("abc", false)]
    #[case("has space", false)]
    #[case("123456789012345678901", false)]
    fn test_validate_student_id(#[case] id: &str, #[case] ok: bool) {
        assert_eq!(validate_student_id(id).is_ok(), ok);
    }

    #[test]
    fn test_validate_name_rejects_blank() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Kim Minsu").is_ok());
    }

    proptest! {
        #[test]
        fn prop_short_passwords_rejected(pw in "[a-z]{0,7}") {
            prop_assert!(validate_password(&pw).is_err());
        }

        #[test]
        fn prop_reasonable_passwords_accepted(pw in "[a-zA-Z0-9]{8,128}") {
            prop_assert!(validate_password(&pw).is_ok());
        }
    }
}
