use indicatif::{ProgressBar, ProgressStyle};

/// `"HP"` and `"HP:"` both become `"HP:"`.
pub fn with_separator(prefix: &str) -> String {
    format!("{}:", prefix.trim_end_matches(':'))
}

/// Returns the CURIE prefix of `term`, e.g. `HP` for `HP:0000118`.
pub fn curie_prefix(term: &str) -> Option<&str> {
    term.split_once(':').map(|(prefix, _)| prefix)
}

pub fn has_prefix(term: &str, prefix: &str) -> bool {
    term.strip_prefix(prefix.trim_end_matches(':'))
        .map_or(false, |rest| rest.starts_with(':'))
}

/// Splits a comma-delimited CLI value, dropping empty items.
pub fn split_comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect()
}

/// Turns `http://purl.obolibrary.org/obo/HP_0000118` into `HP:0000118`.
pub fn normalize_id(raw: &str) -> String {
    let local = raw.trim().rsplit('/').next().unwrap_or_default();
    local.replacen('_', ":", 1)
}

/// Identifier form used by the legacy phenodigm files: `HP_0000118`.
pub fn to_legacy_id(term: &str) -> String {
    term.replace(':', "_")
}

pub fn generate_progress_bar_of_length_and_message(length: u64, message: &str) -> ProgressBar {
    let progress_bar = ProgressBar::new(length);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "[{{elapsed_precise}}] {} {{bar:40.cyan/blue}} {{percent}}%",
                message
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress_bar
}
