//! # Callback Tokens
//!
//! Functions cannot cross the context boundary, so every callback in a
//! component descriptor travels as a token: a fixed literal prefix followed
//! by a non-negative decimal ordinal. The ordinal indexes the controller's
//! callback registry for one mount session.
//!
//! Code on either side of the boundary handles tokens only through
//! [`CallbackToken`]; raw strings appear exactly once, at the wire leaves.

use std::fmt;

/// Literal prefix of the token string encoding.
///
/// Collision with a legitimate string prop is guarded by convention only: a
/// user prop that is exactly this prefix plus a decimal number would be
/// misread as a token.
pub const TOKEN_PREFIX: &str = "__tok_";

/// Typed stand-in for a callback function on the wire.
///
/// Unique within one mount session's registry. Displays as the canonical
/// string encoding (`__tok_0`, `__tok_17`).
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct CallbackToken(pub u64);

impl CallbackToken {
    /// The registry index this token stands for.
    pub fn ordinal(self) -> u64 {
        self.0
    }

    /// Parses the canonical string encoding.
    ///
    /// Accepts exactly `TOKEN_PREFIX` followed by one or more ASCII digits
    /// and nothing else. Anything that does not match is not a token; the
    /// caller treats it as an ordinary string value.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix(TOKEN_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(CallbackToken)
    }
}

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", TOKEN_PREFIX, self.0)
    }
}
