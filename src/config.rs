use std::env;

use crate::errors::BackendError;

/// The environment variable holding the database connection string.
pub const DB_CONNECTION_STRING: &str = "BACKEND_DB_CONNECTION_STRING";

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    require_variable(name).unwrap_or_else(|e| panic!("{}", e))
}

/// Returns the value of the named environment variable, treating an
/// unset or blank value as a configuration error.
pub fn require_variable(name: &str) -> Result<String, BackendError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(BackendError::MissingConfiguration {
            name: name.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variables_are_reported_by_name() {
        let name = "DEVEVENT_TEST_VARIABLE_THAT_IS_NEVER_SET";

        match require_variable(name) {
            Err(BackendError::MissingConfiguration { name: reported }) => {
                assert_eq!(reported, name)
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "Invalid or missing environment variable")]
    fn get_variable_panics_when_unset() {
        get_variable("DEVEVENT_TEST_OTHER_VARIABLE_THAT_IS_NEVER_SET");
    }

    #[test]
    fn present_variables_are_returned() {
        let name = "DEVEVENT_TEST_PRESENT_VARIABLE";
        env::set_var(name, "postgres://localhost/devevent");

        assert_eq!(
            require_variable(name).expect("read variable"),
            "postgres://localhost/devevent"
        );
    }
}
