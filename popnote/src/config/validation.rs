//! Setting value validation.

use super::defaults::*;
use super::{Corner, MouseAction, StackAxis};

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        POPUP_CORNER => {
            value.parse::<Corner>()?;
        }
        POPUP_STACK => {
            value.parse::<StackAxis>()?;
        }
        POPUP_ANIMATE => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        POPUP_DURATION_SECS => validate_int_range(value, 1, 60)?,
        POPUP_THROTTLE => validate_int_range(value, 0, 50)?,
        POPUP_SCREEN => validate_int_range(value, 0, 16)?,
        POPUP_ACTION_LEFT | POPUP_ACTION_MIDDLE | POPUP_ACTION_RIGHT => {
            value.parse::<MouseAction>()?;
        }
        THEME_SYSTEM_DIR => {
            if value.is_empty() {
                return Err("must not be empty".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if !(min..=max).contains(&v) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
