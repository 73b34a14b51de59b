use crate::cli::error::CliError;
use crate::cli::utils::*;

#[test]
fn test_truncate_with_ellipsis_short_string() {
    let result = truncate_with_ellipsis("hello", 10);
    assert_eq!(result, "hello");
}

#[test]
fn test_truncate_with_ellipsis_long_string() {
    let result = truncate_with_ellipsis("Orientation week for freshmen", 10);
    assert_eq!(result, "Orienta...");
}

#[test]
fn test_truncate_with_ellipsis_unicode() {
    let result = truncate_with_ellipsis("camp 世界", 7);
    assert_eq!(result, "camp 世界");

    let result2 = truncate_with_ellipsis("camp 世界!", 7);
    assert_eq!(result2, "camp...");
}

#[test]
fn test_format_list_empty() {
    let items: Vec<String> = vec![];
    assert_eq!(format_list(&items), "-");
}

#[test]
fn test_format_list_joins() {
    assert_eq!(format_list(["S1", "S2"]), "S1, S2");
}

#[test]
fn test_parse_format() {
    assert_eq!(parse_format("table").unwrap(), OutputFormat::Table);
    assert_eq!(parse_format("json").unwrap(), OutputFormat::Json);
    assert!(matches!(
        parse_format("yaml"),
        Err(CliError::InvalidFormat { .. })
    ));
}
