/// The errors that may occur while parsing captions or driving tracks.
#[derive(Debug)]
pub struct Error {
    invalid_input: bool,
    invalid_mode: bool,
    reason: String,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix_reason = if self.invalid_input {
            "Invalid input, "
        } else if self.invalid_mode {
            "Invalid mode, "
        } else {
            ""
        };

        write!(f, "{}{}.", prefix_reason, self.reason)
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a new uncategorized error.
    pub fn new<T: Into<String>>(reason: T) -> Self {
        Self {
            invalid_input: false,
            invalid_mode: false,
            reason: reason.into(),
        }
    }

    /// Create a new invalid input error.
    pub fn new_invalid_input<T: Into<String>>(reason: T) -> Self {
        Self {
            invalid_input: true,
            invalid_mode: false,
            reason: reason.into(),
        }
    }

    /// Create a new invalid mode error.
    pub fn new_invalid_mode<T: Into<String>>(reason: T) -> Self {
        Self {
            invalid_input: false,
            invalid_mode: true,
            reason: reason.into(),
        }
    }

    /// Returns true if the error is an invalid input error.
    pub fn is_invalid_input(&self) -> bool {
        self.invalid_input
    }

    /// Returns true if the error is an invalid mode error.
    pub fn is_invalid_mode(&self) -> bool {
        self.invalid_mode
    }
}
