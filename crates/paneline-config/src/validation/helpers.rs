//! Shared range-validation helpers.

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_pushes_nothing() {
        let mut errors = Vec::new();
        validate_range(&mut errors, "x", 5, 1, 10);
        validate_range(&mut errors, "x", 1, 1, 10);
        validate_range(&mut errors, "x", 10, 1, 10);
        assert!(errors.is_empty());
    }

    #[test]
    fn out_of_range_names_the_field() {
        let mut errors = Vec::new();
        validate_range(&mut errors, "dialog.width_percent", 0, 1, 100);
        assert_eq!(
            errors,
            vec!["dialog.width_percent = 0 is out of range [1, 100]".to_string()]
        );
    }
}
