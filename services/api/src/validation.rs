//! Input validation utilities

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::models::recipe::IngredientAmount;

/// Maximum length of a username
pub const MAX_USERNAME_LENGTH: usize = 150;
/// Maximum length of an email address
pub const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum length of name-like fields (recipe names, tag names)
pub const MAX_NAME_LENGTH: usize = 200;
/// Minimum cooking time in minutes
pub const MIN_COOKING_TIME: i32 = 1;
/// Maximum cooking time in minutes (one day)
pub const MAX_COOKING_TIME: i32 = 1440;
/// Minimum ingredient amount in a recipe
pub const MIN_INGREDIENT_AMOUNT: i32 = 1;
/// Maximum ingredient amount in a recipe
pub const MAX_INGREDIENT_AMOUNT: i32 = 1000;

/// Usernames that collide with API routes and may not be registered
const RESERVED_USERNAMES: &[&str] = &["me", "subscriptions"];

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    // Limits count characters, not bytes, so multibyte names get the full length
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Username must be at most {} characters long",
            MAX_USERNAME_LENGTH
        ));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        let forbidden: String = username
            .chars()
            .filter(|c| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-')))
            .collect::<HashSet<_>>()
            .into_iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(format!(
            "Username contains forbidden characters: {}",
            forbidden
        ));
    }

    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Err(format!("\"{}\" is not allowed as a username", username));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(format!(
            "Email must be at most {} characters long",
            MAX_EMAIL_LENGTH
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;

    for c in password.chars() {
        if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_lowercase() {
            has_lower = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        }
    }

    if !has_upper {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !has_lower {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !has_digit {
        return Err("Password must contain at least one digit".to_string());
    }

    Ok(())
}

/// Validate a recipe name
pub fn validate_recipe_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Recipe name is required".to_string());
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "Recipe name must be at most {} characters long",
            MAX_NAME_LENGTH
        ));
    }

    Ok(())
}

/// Validate cooking time bounds
pub fn validate_cooking_time(cooking_time: i32) -> Result<(), String> {
    if cooking_time < MIN_COOKING_TIME {
        return Err(format!(
            "Cooking time must be at least {} minute",
            MIN_COOKING_TIME
        ));
    }

    if cooking_time > MAX_COOKING_TIME {
        return Err(format!(
            "Cooking time must be at most {} minutes",
            MAX_COOKING_TIME
        ));
    }

    Ok(())
}

/// Validate the tag set of a recipe payload
pub fn validate_tag_ids(tags: &[Uuid]) -> Result<(), String> {
    if tags.is_empty() {
        return Err("Add at least one tag".to_string());
    }

    let unique: HashSet<&Uuid> = tags.iter().collect();
    if unique.len() != tags.len() {
        return Err("Tags must be unique".to_string());
    }

    Ok(())
}

/// Validate the ingredient list of a recipe payload
pub fn validate_ingredient_amounts(ingredients: &[IngredientAmount]) -> Result<(), String> {
    if ingredients.is_empty() {
        return Err("Add at least one ingredient".to_string());
    }

    let unique: HashSet<&Uuid> = ingredients.iter().map(|i| &i.id).collect();
    if unique.len() != ingredients.len() {
        return Err("Ingredients must be unique".to_string());
    }

    for ingredient in ingredients {
        if ingredient.amount < MIN_INGREDIENT_AMOUNT {
            return Err(format!(
                "Ingredient amount must be at least {}",
                MIN_INGREDIENT_AMOUNT
            ));
        }
        if ingredient.amount > MAX_INGREDIENT_AMOUNT {
            return Err(format!(
                "Ingredient amount must be at most {}",
                MAX_INGREDIENT_AMOUNT
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(id: Uuid, amount: i32) -> IngredientAmount {
        IngredientAmount { id, amount }
    }

    #[test]
    fn test_valid_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob.smith@example+1").is_ok());
        assert!(validate_username("under_score-dash").is_ok());
    }

    #[test]
    fn test_username_forbidden_characters() {
        assert!(validate_username("al ice").is_err());
        assert!(validate_username("bob!").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_length_limits_count_characters_not_bytes() {
        // Two bytes per character in UTF-8; a full-length value must still pass
        assert!(validate_username(&"é".repeat(MAX_USERNAME_LENGTH)).is_ok());
        assert!(validate_username(&"é".repeat(MAX_USERNAME_LENGTH + 1)).is_err());

        assert!(validate_recipe_name(&"ж".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(validate_recipe_name(&"ж".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_reserved_usernames_rejected() {
        assert!(validate_username("me").is_err());
        assert!(validate_username("Me").is_err());
        assert!(validate_username("ME").is_err());
        assert!(validate_username("subscriptions").is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("Passw0rd!").is_ok());
        assert!(validate_password("short1A").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }

    #[test]
    fn test_cooking_time_bounds() {
        assert!(validate_cooking_time(0).is_err());
        assert!(validate_cooking_time(1).is_ok());
        assert!(validate_cooking_time(1440).is_ok());
        assert!(validate_cooking_time(1441).is_err());
        assert!(validate_cooking_time(-5).is_err());
    }

    #[test]
    fn test_tag_ids_must_be_present_and_unique() {
        assert!(validate_tag_ids(&[]).is_err());

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(validate_tag_ids(&[a, b]).is_ok());
        assert!(validate_tag_ids(&[a, a]).is_err());
    }

    #[test]
    fn test_ingredients_must_be_present() {
        assert!(validate_ingredient_amounts(&[]).is_err());
    }

    #[test]
    fn test_duplicate_ingredient_ids_rejected() {
        let id = Uuid::new_v4();
        let list = vec![ingredient(id, 10), ingredient(id, 20)];
        assert!(validate_ingredient_amounts(&list).is_err());
    }

    #[test]
    fn test_ingredient_amount_bounds() {
        let id = Uuid::new_v4();
        assert!(validate_ingredient_amounts(&[ingredient(id, 0)]).is_err());
        assert!(validate_ingredient_amounts(&[ingredient(id, 1)]).is_ok());
        assert!(validate_ingredient_amounts(&[ingredient(id, 1000)]).is_ok());
        assert!(validate_ingredient_amounts(&[ingredient(id, 1001)]).is_err());
    }
}
