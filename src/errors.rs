use std::error::Error;
use std::fmt;

/// Errors reported by the learners. All of them are detected before any accumulator is touched,
/// so a failed call leaves the model exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum LearnerError {
    InvalidInput(String),
    MissingPositiveLabel { positives: usize },
    MalformedRecord(String),
}

impl Error for LearnerError {}

impl fmt::Display for LearnerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LearnerError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            LearnerError::MissingPositiveLabel { positives } => write!(
                f,
                "Ranking group needs exactly one positive label, found {}",
                positives
            ),
            LearnerError::MalformedRecord(msg) => write!(f, "Malformed record: {}", msg),
        }
    }
}

impl LearnerError {
    /// Group-level rejections that a training loop can skip over and continue.
    pub fn is_recoverable(&self) -> bool {
        match self {
            LearnerError::InvalidInput(_) | LearnerError::MissingPositiveLabel { .. } => true,
            LearnerError::MalformedRecord(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = LearnerError::MissingPositiveLabel { positives: 0 };
        assert_eq!(
            format!("{}", e),
            "Ranking group needs exactly one positive label, found 0"
        );
        let e = LearnerError::MalformedRecord("bad field id in \"x:1\"".to_string());
        assert_eq!(format!("{}", e), "Malformed record: bad field id in \"x:1\"");
    }

    #[test]
    fn test_boxing() {
        // Outer layers work with Box<dyn Error>, the variant must survive the trip
        let boxed: Box<dyn Error> = Box::new(LearnerError::InvalidInput("len".to_string()));
        let back = boxed.downcast_ref::<LearnerError>().unwrap();
        assert_eq!(*back, LearnerError::InvalidInput("len".to_string()));
        assert!(back.is_recoverable());
        assert!(!LearnerError::MalformedRecord(String::new()).is_recoverable());
    }
}
