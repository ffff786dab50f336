//! proptest strategies for todo inputs.

use proptest::prelude::*;

/// A label that survives trimming
pub fn todo_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 ]{0,15}"
}

/// A label that is empty once trimmed
pub fn blank_text() -> impl Strategy<Value = String> {
    "[ \t\n]{0,6}"
}

/// A small HTML fragment, possibly empty
pub fn html_content() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z ]{1,12}".prop_map(|text| format!("<p>{text}</p>")),
        "[a-z]{1,8}".prop_map(|text| format!("<ul><li>{text}</li></ul>")),
    ]
}
