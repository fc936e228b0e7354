// Error reporting utilities
// Data-access errors are observed here on their way to the caller, never swallowed

use crate::types::CodedError;

/// Emit a structured error event for `error` under the given `context`.
pub fn log_error<E: CodedError + ?Sized>(context: &str, error: &E) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error_category = %error.category(),
        error = %error,
        "Credgate error occurred"
    );
}
