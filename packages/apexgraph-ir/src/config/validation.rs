//! Range checks for engine configuration

use super::error::{ConfigError, ConfigResult};

/// Configuration whose fields carry range constraints
pub trait Validatable: Sized {
    fn validate(&self) -> ConfigResult<()>;

    /// `self`, once every range check passes
    fn validated(self) -> ConfigResult<Self> {
        self.validate()?;
        Ok(self)
    }
}

/// Limit fields: negative means unlimited, zero would forbid all work
pub(crate) fn check_limit(field: &str, value: i64) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::range_with_hint(
            field,
            value,
            1,
            i64::MAX,
            "Use a negative value for unlimited",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_is_rejected() {
        assert!(check_limit("stack_depth_limit", -1).is_ok());
        assert!(check_limit("stack_depth_limit", 7).is_ok());
        let err = check_limit("stack_depth_limit", 0).unwrap_err();
        assert!(err.to_string().contains("stack_depth_limit"));
    }
}
