use core::{error::Error, fmt};

/// One recoverable parser diagnostic, tagged with the source line the
/// lexer was on when the mismatch was noticed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {})", self.message, self.line)
    }
}

impl Error for ParseError {}

/// Every diagnostic accumulated over one parse. A non-empty list means the
/// tree is not trustworthy and must not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorList(pub Vec<ParseError>);

impl ParseErrorList {
    pub fn errors(&self) -> &[ParseError] {
        &self.0
    }
}

impl fmt::Display for ParseErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl Error for ParseErrorList {}
