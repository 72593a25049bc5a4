//! Code ranges

use super::codes::ErrorCode;

/// Which part of the system an [`ErrorCode`] belongs to, by thousands range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    General,
    Order,
    Dish,
    Table,
    /// Infrastructure failures; these are logged server-side when answered
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            4 => Self::Order,
            6 => Self::Dish,
            7 => Self::Table,
            9.. => Self::System,
            _ => Self::General,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
