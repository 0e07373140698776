/// Why a phone number was rejected. The messages are shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhoneError {
    #[error("Invalid input. The phone number contains invalid characters.")]
    InvalidCharacters,
    #[error("Invalid input. Wrong number of digits.")]
    WrongLength,
}

/// Separators accepted between digits.
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '(' | ')' | '-' | '.' | '+')
}

/// Normalize a phone number to `8-XXX-XXX-XX-XX`.
///
/// Digits may be separated by spaces, parentheses, hyphens, dots and `+`.
/// Ten digits are taken as a number without the trunk prefix; eleven
/// digits starting with `7` or `8` have that prefix replaced by `8`.
/// Other eleven-digit numbers keep their first digit.
///
/// # Errors
///
/// [`PhoneError::InvalidCharacters`] if anything other than digits and
/// separators is present (including empty input), [`PhoneError::WrongLength`]
/// if the digit count is not 10 or 11.
pub fn normalize(input: &str) -> Result<String, PhoneError> {
    if input.chars().any(|c| !c.is_ascii_digit() && !is_separator(c)) {
        return Err(PhoneError::InvalidCharacters);
    }

    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(PhoneError::InvalidCharacters);
    }

    let digits = match digits.len() {
        10 => format!("8{digits}"),
        11 if digits.starts_with('7') || digits.starts_with('8') => format!("8{}", &digits[1..]),
        11 => digits,
        _ => return Err(PhoneError::WrongLength),
    };

    Ok(format!(
        "{}-{}-{}-{}-{}",
        &digits[0..1],
        &digits[1..4],
        &digits[4..7],
        &digits[7..9],
        &digits[9..11]
    ))
}
