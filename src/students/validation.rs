use super::types::{NewStudent, ValidationError};

/// Check the required fields of an incoming record.
///
/// Only presence is enforced: any non-empty email passes, with no format check.
pub fn validate_student(student: &NewStudent) -> Result<(), ValidationError> {
    if student.name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if student.age <= 0 {
        return Err(ValidationError::InvalidAge);
    }
    if student.email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str, age: i64, email: &str) -> NewStudent {
        NewStudent {
            name: name.into(),
            age,
            email: email.into(),
        }
    }

    #[test]
    fn accepts_complete_record() {
        assert_eq!(validate_student(&student("Ann", 30, "a@x.com")), Ok(()));
    }

    #[test]
    fn accepts_email_without_at_sign() {
        assert_eq!(validate_student(&student("Ann", 30, "not-an-email")), Ok(()));
    }

    #[test]
    fn rejects_empty_name_first() {
        assert_eq!(
            validate_student(&student("", 0, "")),
            Err(ValidationError::NameRequired)
        );
    }

    #[test]
    fn rejects_non_positive_age_before_email() {
        assert_eq!(
            validate_student(&student("Ann", 0, "")),
            Err(ValidationError::InvalidAge)
        );
        assert_eq!(
            validate_student(&student("Ann", -4, "a@x.com")),
            Err(ValidationError::InvalidAge)
        );
    }

    #[test]
    fn rejects_empty_email() {
        assert_eq!(
            validate_student(&student("Ann", 30, "")),
            Err(ValidationError::EmailRequired)
        );
    }

    #[test]
    fn each_rule_has_a_distinct_message() {
        let messages = [
            ValidationError::NameRequired.to_string(),
            ValidationError::InvalidAge.to_string(),
            ValidationError::EmailRequired.to_string(),
        ];
        assert_eq!(messages[0], "name is required");
        assert_eq!(messages[1], "age must be a positive number");
        assert_eq!(messages[2], "email is required");
    }
}
