//! Password policy
//!
//! Rules a new password must meet before it is handed to
//! [`Store::set_password`](crate::Store::set_password). The store itself
//! accepts any string.

use crate::error::{Result, StoreError};

/// Length and character constraints for new passwords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_len: 4,
            max_len: 32,
        }
    }
}

impl PasswordPolicy {
    /// Check `new` against the policy; `confirm` must repeat it exactly
    pub fn validate(&self, new: &str, confirm: &str) -> Result<()> {
        if new != confirm {
            return Err(StoreError::WeakPassword(
                "both new password entries must match".to_string(),
            ));
        }

        let len = new.chars().count();
        if len < self.min_len || len > self.max_len {
            return Err(StoreError::WeakPassword(format!(
                "length must be between {} and {}",
                self.min_len, self.max_len
            )));
        }

        if !new.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StoreError::WeakPassword(
                "only ASCII letters and digits are allowed".to_string(),
            ));
        }

        Ok(())
    }
}
