use crate::ErrorLocation;

/// **VALUE**: Verifies that `ErrorLocation::caller()` captures file, line, and column.
///
/// **WHY THIS MATTERS**: Every error enum in the workspace embeds an
/// ErrorLocation. If capture breaks, all bridge error messages lose their
/// debugging value at once.
///
/// **BUG THIS CATCHES**: Would catch if caller tracking stops being
/// propagated or file/line extraction breaks.
#[test]
fn given_location_caller_when_error_location_created_then_captures_file_line_column() {
    // GIVEN / WHEN: Creating ErrorLocation from the current caller
    let location = ErrorLocation::caller();

    // THEN: Should capture file, line, and column
    assert!(
        location.file.contains("error_location.rs"),
        "Should capture file path"
    );
    assert!(location.line > 0, "Should capture line number");
    assert!(location.column > 0, "Should capture column number");
}

/// **VALUE**: Verifies the Display format stays "[file:line:column]".
///
/// **WHY THIS MATTERS**: Error messages interpolate `{location}` directly;
/// a format change silently degrades every log line in the bridge.
///
/// **BUG THIS CATCHES**: Would catch removed brackets, missing fields, or
/// a wrong separator count.
#[test]
fn given_error_location_when_formatted_then_produces_bracketed_format() {
    // GIVEN: An ErrorLocation
    let location = ErrorLocation::caller();

    // WHEN: Formatting as string
    let formatted = format!("{}", location);

    // THEN: Should produce "[file:line:column]" format
    assert!(formatted.starts_with('['), "Should start with '['");
    assert!(formatted.ends_with(']'), "Should end with ']'");
    assert!(
        formatted.contains(&location.line.to_string()),
        "Should include line number"
    );
    assert_eq!(
        formatted.matches(':').count(),
        2,
        "Should have exactly 2 colons"
    );
}

/// **VALUE**: Verifies `#[track_caller]` propagation gives each call site
/// its own coordinates.
///
/// **BUG THIS CATCHES**: Would catch a dropped `#[track_caller]` attribute,
/// which would make every error report the constructor's location.
#[test]
fn given_multiple_call_sites_when_capturing_location_then_each_has_unique_line() {
    #[track_caller]
    fn capture_location() -> ErrorLocation {
        ErrorLocation::caller()
    }

    let first = capture_location();
    let second = capture_location();

    assert_eq!(first.file, second.file, "Should have same file");
    assert_eq!(first.line + 1, second.line, "Lines should be sequential");
}
