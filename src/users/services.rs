use lazy_static::lazy_static;
use regex::Regex;
use time::Duration;

use crate::auth::password;
use crate::error::ApiError;
use crate::users::dto::SignUpRequest;
use crate::users::repo::User;

/// How long a password-reset token stays usable.
pub const RESET_TOKEN_TTL: Duration = Duration::minutes(10);

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Lowercase, uppercase, digit, and symbol, at least 8 characters.
pub(crate) fn is_strong_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
}

pub(crate) fn is_alpha(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_alphabetic())
}

pub(crate) fn is_alpha_with_spaces(value: &str) -> bool {
    !value.trim().is_empty() && value.chars().all(|c| c.is_alphabetic() || c == ' ')
}

/// Validated sign-up attributes with the plaintext password still attached;
/// the caller hashes it before anything is stored.
#[derive(Debug)]
pub struct ValidSignUp {
    pub first_name: String,
    pub last_name: String,
    pub image: String,
    pub email: String,
    pub password: String,
    pub location: String,
    pub occupation: Option<String>,
}

pub fn validate_sign_up(payload: SignUpRequest) -> Result<ValidSignUp, ApiError> {
    let first_name = payload
        .first_name
        .ok_or_else(|| ApiError::Validation("A first name is required.".into()))?;
    if !is_alpha(&first_name) {
        return Err(ApiError::Validation(
            "Please provide a name only containing characters.".into(),
        ));
    }

    let last_name = payload
        .last_name
        .ok_or_else(|| ApiError::Validation("A last name is required.".into()))?;
    if !is_alpha(&last_name) {
        return Err(ApiError::Validation(
            "Please provide a last name only containing characters.".into(),
        ));
    }

    let image = payload
        .image
        .ok_or_else(|| ApiError::Validation("Please add an image.".into()))?;

    let email = payload
        .email
        .ok_or_else(|| {
            ApiError::Validation("An email is required to sign up for an account.".into())
        })?
        .trim()
        .to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::Validation(
            "Please provide an actual email address.".into(),
        ));
    }

    let password = payload
        .password
        .ok_or_else(|| ApiError::Validation("Please input your password.".into()))?;
    if !is_strong_password(&password) {
        return Err(ApiError::Validation(
            "Please make sure your password has lowercase, uppercase letters, symbols, and numbers."
                .into(),
        ));
    }

    let password_confirm = payload
        .password_confirm
        .ok_or_else(|| ApiError::Validation("Please confirm your password".into()))?;
    if password_confirm != password {
        return Err(ApiError::Validation("Passwords must match".into()));
    }

    let location = payload
        .location
        .ok_or_else(|| ApiError::Validation("Please input your current location.".into()))?;

    if let Some(occupation) = &payload.occupation {
        if !is_alpha_with_spaces(occupation) {
            return Err(ApiError::Validation(
                "An occupation must only contain characters".into(),
            ));
        }
    }

    Ok(ValidSignUp {
        first_name,
        last_name,
        image,
        email,
        password,
        location,
        occupation: payload.occupation,
    })
}

/// New-password validation shared by the reset flow.
pub fn validate_new_password(
    password: Option<String>,
    password_confirm: Option<String>,
) -> Result<String, ApiError> {
    let password =
        password.ok_or_else(|| ApiError::Validation("Please input your password.".into()))?;
    if !is_strong_password(&password) {
        return Err(ApiError::Validation(
            "Please make sure your password has lowercase, uppercase letters, symbols, and numbers."
                .into(),
        ));
    }
    let password_confirm = password_confirm
        .ok_or_else(|| ApiError::Validation("Please confirm your password".into()))?;
    if password_confirm != password {
        return Err(ApiError::Validation("Passwords must match".into()));
    }
    Ok(password)
}

/// Credential check for login: password match first, then the active flag.
/// An unverified account is rejected even with correct credentials.
pub fn check_login(user: &User, password: &str) -> Result<(), ApiError> {
    if !password::verify_password(password, &user.password_hash)? {
        return Err(ApiError::Auth(
            "No user found with those inputs. Please check your email or password.".into(),
        ));
    }
    if !user.active {
        return Err(ApiError::Auth(
            "Please verify your account before logging in.".into(),
        ));
    }
    Ok(())
}

pub fn verification_email_body(base_url: &str, activation_string: &str) -> String {
    format!(
        "Please click the following link to activate your account: \
         {base_url}/api/v1/users/verify/{activation_string}"
    )
}

pub fn reset_email_body(base_url: &str, token: &str) -> String {
    format!(
        "Forgot your password? Submit a PATCH request with your new password and \
         passwordConfirm to: {base_url}/api/v1/users/resetPassword/{token}\n\
         If you didn't forget your password, please ignore this email."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> SignUpRequest {
        SignUpRequest {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            image: Some("ada.png".into()),
            email: Some("Ada@Example.COM ".into()),
            password: Some("Str0ng!Pass".into()),
            password_confirm: Some("Str0ng!Pass".into()),
            location: Some("London".into()),
            occupation: Some("Mathematician".into()),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@x.com"));
    }

    #[test]
    fn strong_password_needs_all_character_classes() {
        assert!(is_strong_password("Str0ng!Pass"));
        assert!(!is_strong_password("Sh0r!t1"));
        assert!(!is_strong_password("alllowercase1!"));
        assert!(!is_strong_password("ALLUPPERCASE1!"));
        assert!(!is_strong_password("NoDigitsHere!"));
        assert!(!is_strong_password("NoSymbols123"));
    }

    #[test]
    fn name_validation() {
        assert!(is_alpha("Ada"));
        assert!(!is_alpha("Ada2"));
        assert!(!is_alpha(""));
        assert!(is_alpha_with_spaces("Software Engineer"));
        assert!(!is_alpha_with_spaces("Engineer 2"));
    }

    #[test]
    fn valid_sign_up_lowercases_the_email() {
        let valid = validate_sign_up(full_payload()).expect("payload is valid");
        assert_eq!(valid.email, "ada@example.com");
    }

    #[test]
    fn sign_up_rejects_mismatched_confirmation() {
        let mut payload = full_payload();
        payload.password_confirm = Some("Different1!".into());
        let err = validate_sign_up(payload).unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m == "Passwords must match"));
    }

    #[test]
    fn sign_up_rejects_missing_first_name() {
        let mut payload = full_payload();
        payload.first_name = None;
        let err = validate_sign_up(payload).unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m == "A first name is required."));
    }

    #[test]
    fn sign_up_rejects_weak_password() {
        let mut payload = full_payload();
        payload.password = Some("weakpass".into());
        payload.password_confirm = Some("weakpass".into());
        assert!(matches!(
            validate_sign_up(payload),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn sign_up_rejects_numeric_occupation() {
        let mut payload = full_payload();
        payload.occupation = Some("Engineer 2".into());
        assert!(matches!(
            validate_sign_up(payload),
            Err(ApiError::Validation(_))
        ));
    }

    fn sample_user(password: &str, active: bool) -> User {
        use time::OffsetDateTime;
        use uuid::Uuid;

        User {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            image: "ada.png".into(),
            email: "a@x.com".into(),
            password_hash: password::hash_password(password).unwrap(),
            location: "London".into(),
            occupation: None,
            active,
            activation_string: if active { None } else { Some("pending".into()) },
            password_reset_token: None,
            password_reset_expires: None,
            changed_password_at: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn login_succeeds_for_an_active_account_with_correct_credentials() {
        let user = sample_user("Str0ng!Pass", true);
        assert!(check_login(&user, "Str0ng!Pass").is_ok());
    }

    #[test]
    fn login_rejects_a_wrong_password() {
        let user = sample_user("Str0ng!Pass", true);
        assert!(matches!(
            check_login(&user, "Wr0ng!Pass"),
            Err(ApiError::Auth(_))
        ));
    }

    #[test]
    fn login_rejects_an_unverified_account_despite_correct_credentials() {
        let user = sample_user("Str0ng!Pass", false);
        let err = check_login(&user, "Str0ng!Pass").unwrap_err();
        assert!(matches!(err, ApiError::Auth(m) if m.contains("verify")));
    }

    #[test]
    fn email_bodies_link_to_the_expected_routes() {
        let verify = verification_email_body("http://127.0.0.1:8080", "abc123");
        assert!(verify.contains("/api/v1/users/verify/abc123"));

        let reset = reset_email_body("http://127.0.0.1:8080", "tok456");
        assert!(reset.contains("/api/v1/users/resetPassword/tok456"));
    }
}
