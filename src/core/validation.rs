// src/core/validation.rs

/// Returns `true` when `name` can be interpolated into a remote path and a
/// supervisor command without escaping.
///
/// Accepted: non-empty, ASCII letters, digits, `.`, `_`, `-`. On top of that,
/// names made only of dots (`.`, `..`) and names starting with `-` are refused
/// because they would climb out of the base directory or read as an option.
pub fn validate_project_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('-') {
        return false;
    }
    if name.chars().all(|c| c == '.') {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// `^[A-Za-z_][A-Za-z0-9_]*$`
pub fn is_valid_env_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// A `.env` line holds one value, so line breaks cannot be written.
pub fn is_valid_env_value(value: &str) -> bool {
    !value.contains(['\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_safe_project_names() {
        assert!(validate_project_name("my.project-1_a"));
        assert!(validate_project_name("demo"));
        assert!(validate_project_name("api.v2"));
    }

    #[test]
    fn test_rejects_unsafe_project_names() {
        for bad in ["../etc", "a b", "a;rm -rf /", "", "a/b", "$(id)", "name\n", "ü"] {
            assert!(!validate_project_name(bad), "'{}' should be rejected", bad);
        }
    }

    #[test]
    fn test_rejects_dot_only_and_option_like_names() {
        assert!(!validate_project_name("."));
        assert!(!validate_project_name(".."));
        assert!(!validate_project_name("-rf"));
        // A leading dot followed by other characters is still a plain name.
        assert!(validate_project_name(".hidden"));
    }

    #[test]
    fn test_env_key_rules() {
        assert!(is_valid_env_key("FOO"));
        assert!(is_valid_env_key("_PRIVATE"));
        assert!(is_valid_env_key("DATABASE_URL2"));
        assert!(!is_valid_env_key(""));
        assert!(!is_valid_env_key("2FA"));
        assert!(!is_valid_env_key("FOO-BAR"));
        assert!(!is_valid_env_key("FOO=1"));
        assert!(!is_valid_env_key("A B"));
    }

    #[test]
    fn test_env_value_rules() {
        assert!(is_valid_env_value(""));
        assert!(is_valid_env_value("postgres://u:p@h/db?a=b"));
        assert!(is_valid_env_value("it's $HOME"));
        assert!(!is_valid_env_value("x\nB=evil"));
        assert!(!is_valid_env_value("x\r"));
    }
}
