//! Category advice tables used by the enhancer

use faultline_taxonomy::ErrorCategory;

/// One-line elaboration appended to messages of a category
pub(crate) fn elaboration(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Configuration => {
            "The application or environment is configured inconsistently."
        }
        ErrorCategory::StateManagement => {
            "State was read or written outside the lifecycle its owner expects."
        }
        ErrorCategory::Navigation => "A route could not be resolved or the navigation stack is in an unexpected state.",
        ErrorCategory::Testing => "A test expectation failed or the harness is misconfigured.",
        ErrorCategory::Performance => "A performance budget was exceeded.",
        ErrorCategory::CodeGeneration => {
            "Generated code is missing or stale relative to its annotated source."
        }
        ErrorCategory::DevelopmentTools => "A development tool failed; the app itself may be fine.",
        ErrorCategory::FileSystem => "A file or directory could not be accessed.",
        ErrorCategory::Network => "A network request failed before a valid response arrived.",
        ErrorCategory::Validation => "Input did not satisfy its declared constraints.",
        ErrorCategory::Unknown => "No category-specific information is available.",
    }
}

/// Fallback suggestion when no table entry matches
pub(crate) fn generic_suggestion(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Configuration => "Review configuration files and environment variables.",
        ErrorCategory::StateManagement => {
            "Check that state is created above its consumers and disposed exactly once."
        }
        ErrorCategory::Navigation => "Verify the route table and the arguments passed to it.",
        ErrorCategory::Testing => "Re-run the failing test in isolation and inspect its setup.",
        ErrorCategory::Performance => "Profile the hot path and move heavy work off the UI thread.",
        ErrorCategory::CodeGeneration => "Re-run the code generator and commit the output.",
        ErrorCategory::DevelopmentTools => "Restart the tooling session and update the toolchain.",
        ErrorCategory::FileSystem => "Check that the path exists and the process may access it.",
        ErrorCategory::Network => "Check connectivity, the endpoint URL and TLS configuration.",
        ErrorCategory::Validation => "Validate input at the boundary and report field-level errors.",
        ErrorCategory::Unknown => "Inspect the stack trace and surrounding logs.",
    }
}

/// Message substring → suggestion, first match wins
///
/// Needles are lowercase; messages are lowercased before lookup.
pub(crate) fn suggestion_table(category: ErrorCategory) -> &'static [(&'static str, &'static str)] {
    match category {
        ErrorCategory::Configuration => &[
            ("missing key", "Add the missing key to every environment's configuration."),
            ("environment variable", "Export the variable or provide a default in code."),
            ("manifest", "Regenerate the manifest and check its schema version."),
        ],
        ErrorCategory::StateManagement => &[
            ("provider", "Wrap the consuming subtree in the provider or move it higher."),
            ("disposed", "Stop listening before dispose and guard async callbacks."),
            ("setstate", "Check `mounted` before updating state after an await."),
        ],
        ErrorCategory::Navigation => &[
            ("route", "Register the route or add an unknown-route fallback."),
            ("navigator", "Use a context that sits below the Navigator."),
            ("deep link", "Validate deep link parameters before pushing."),
        ],
        ErrorCategory::Testing => &[
            ("timeout", "Pump pending timers or raise the test timeout."),
            ("mock", "Stub every call the code under test makes on the mock."),
            ("golden", "Regenerate golden files on the reference platform."),
        ],
        ErrorCategory::Performance => &[
            ("frame", "Split the build and cache expensive widgets."),
            ("memory", "Release caches and check for retained listeners."),
            ("slow", "Move the work to a background isolate or task."),
        ],
        ErrorCategory::CodeGeneration => &[
            ("part of", "Add the `part` directive and re-run the generator."),
            ("conflicting outputs", "Run the generator with --delete-conflicting-outputs."),
            ("annotation", "Check the annotation arguments against the generator docs."),
        ],
        ErrorCategory::DevelopmentTools => &[
            ("hot reload", "Perform a hot restart; some changes need a full restart."),
            ("debugger", "Reconnect the debugger or restart the debug session."),
        ],
        ErrorCategory::FileSystem => &[
            ("no such file", "Create the file or fix the path before opening it."),
            ("permission denied", "Fix ownership or write to an app-owned directory."),
            ("too many open files", "Close handles promptly or raise the descriptor limit."),
        ],
        ErrorCategory::Network => &[
            ("timeout", "Increase the timeout or add retries with backoff."),
            ("connection refused", "Ensure the server is running and reachable from this device."),
            ("certificate", "Check the certificate chain and system clock."),
            ("cleartext", "Switch the endpoint to HTTPS."),
        ],
        ErrorCategory::Validation => &[
            ("required", "Provide every required field."),
            ("format", "Match the documented input format."),
        ],
        ErrorCategory::Unknown => &[],
    }
}

/// Suggestion for `message`: table match, else the category fallback
pub(crate) fn lookup_suggestion(category: ErrorCategory, message: &str) -> &'static str {
    let lower = message.to_lowercase();
    suggestion_table(category)
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map_or_else(|| generic_suggestion(category), |(_, suggestion)| *suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_entry_wins() {
        assert_eq!(
            lookup_suggestion(ErrorCategory::Network, "Timeout after connection refused"),
            "Increase the timeout or add retries with backoff."
        );
    }

    #[test]
    fn falls_back_to_generic() {
        assert_eq!(
            lookup_suggestion(ErrorCategory::Validation, "bad value"),
            generic_suggestion(ErrorCategory::Validation)
        );
        assert_eq!(
            lookup_suggestion(ErrorCategory::Unknown, "anything"),
            generic_suggestion(ErrorCategory::Unknown)
        );
    }

    #[test]
    fn tables_use_lowercase_needles() {
        for category in ErrorCategory::ALL {
            for (needle, _) in suggestion_table(category) {
                assert_eq!(*needle, needle.to_lowercase());
            }
        }
    }
}
