//! Player registration rules.

use chrono::{DateTime, Utc};
use crisis_core::error::DomainError;
use crisis_core::model::Player;
use uuid::Uuid;

use super::commands::RegisterPlayer;

/// Youngest accepted age.
pub const MIN_AGE: i32 = 18;

/// Oldest accepted age.
pub const MAX_AGE: i32 = 100;

const MAX_NAME_LEN: usize = 50;

fn clean_name(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

/// Validates a registration and builds the player row.
///
/// # Errors
///
/// Returns `DomainError::Validation` for blank or overlong names and ages
/// outside `MIN_AGE..=MAX_AGE`.
pub fn new_player(command: &RegisterPlayer, now: DateTime<Utc>) -> Result<Player, DomainError> {
    let firstname = clean_name("firstname", &command.firstname)?;
    let lastname = clean_name("lastname", &command.lastname)?;
    if !(MIN_AGE..=MAX_AGE).contains(&command.age) {
        return Err(DomainError::Validation(format!(
            "age must be between {MIN_AGE} and {MAX_AGE}, got {}",
            command.age
        )));
    }

    Ok(Player {
        user_id: Uuid::new_v4(),
        firstname,
        lastname,
        age: command.age,
        crisis_ready: command.crisis_ready,
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisis_test_support::fixed_now;

    fn command(firstname: &str, age: i32) -> RegisterPlayer {
        RegisterPlayer {
            correlation_id: Uuid::new_v4(),
            firstname: firstname.to_owned(),
            lastname: "Berg".to_owned(),
            age,
            crisis_ready: None,
        }
    }

    #[test]
    fn test_new_player_trims_names_and_stamps_time() {
        let player = new_player(&command("  Maja ", 22), fixed_now()).unwrap();

        assert_eq!(player.firstname, "Maja");
        assert_eq!(player.lastname, "Berg");
        assert_eq!(player.created_at, fixed_now());
    }

    #[test]
    fn test_new_player_rejects_blank_name() {
        let err = new_player(&command("   ", 22), fixed_now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_new_player_rejects_out_of_range_ages() {
        for age in [MIN_AGE - 1, MAX_AGE + 1] {
            let err = new_player(&command("Maja", age), fixed_now()).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
        assert!(new_player(&command("Maja", MIN_AGE), fixed_now()).is_ok());
        assert!(new_player(&command("Maja", MAX_AGE), fixed_now()).is_ok());
    }
}
