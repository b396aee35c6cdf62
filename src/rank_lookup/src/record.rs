use crate::error::RecordError;

/// One line of a test password file.
///
/// Fields stay as raw bytes end to end: passwords are byte strings and the
/// output must echo them untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub user: Vec<u8>,
    pub policy: Vec<u8>,
    pub password: Vec<u8>,
}

impl InputRecord {
    /// Parse either the 3-column `user-id\tpolicy\tpassword` format or, with
    /// `single_column`, a bare password per line.
    pub fn parse(line: &[u8], single_column: bool, line_number: usize) -> Result<InputRecord, RecordError> {
        if single_column {
            return Ok(InputRecord{user: Vec::new(), policy: Vec::new(), password: line.to_vec()})
        }
        let mut columns = line.splitn(3, |byte| *byte == b'\t');
        let user = columns.next().unwrap_or(b"").to_vec();
        let (Some(policy), Some(password)) = (columns.next(), columns.next()) else {
            return Err(RecordError::MissingColumns{line: line_number})
        };
        Ok(InputRecord{user, policy: policy.to_vec(), password: password.to_vec()})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn three_column_format() {
        let record = InputRecord::parse(b"u042\tcorp2013\thunter2", false, 1).unwrap();
        assert_eq!(record.user, b"u042");
        assert_eq!(record.policy, b"corp2013");
        assert_eq!(record.password, b"hunter2");
    }

    #[test]
    fn single_column_format() {
        let record = InputRecord::parse(b"hunter2", true, 1).unwrap();
        assert!(record.user.is_empty());
        assert!(record.policy.is_empty());
        assert_eq!(record.password, b"hunter2");
    }

    #[test]
    fn missing_columns_is_an_error() {
        assert!(matches!(
            InputRecord::parse(b"u042\thunter2", false, 7),
            Err(RecordError::MissingColumns{line: 7})
        ));
    }

    #[test]
    fn empty_columns_are_preserved() {
        let record = InputRecord::parse(b"\t\tp4ss", false, 1).unwrap();
        assert!(record.user.is_empty());
        assert!(record.policy.is_empty());
        assert_eq!(record.password, b"p4ss");
    }
}
