use std::fmt;

#[derive(Debug)]
pub enum CoreError {
    InvalidConfig(String),
    SerializationError(String),
    DeserializationError(String),
    UnsupportedSchema { found: u8, expected: u8 },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoreError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            CoreError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            CoreError::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            CoreError::UnsupportedSchema { found, expected } => {
                write!(f, "Unsupported schema version: found {}, expected {}", found, expected)
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CoreError::DeserializationError(err.to_string())
        } else {
            CoreError::SerializationError(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let err = CoreError::InvalidConfig("court too narrow".into());
        assert_eq!(err.to_string(), "Invalid config: court too narrow");

        let err = CoreError::UnsupportedSchema { found: 9, expected: 1 };
        assert!(err.to_string().contains("found 9"));
    }

    #[test]
    fn test_bad_json_maps_to_deserialization() {
        let parse_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: CoreError = parse_err.into();
        assert!(matches!(err, CoreError::DeserializationError(_)));
    }
}
