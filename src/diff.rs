#[cfg(feature = "color")]
use colored::Colorize;
use similar::{ChangeTag, TextDiff};

pub fn compare(expected: &str, actual: &str) -> String {
    let mut result = String::new();

    let clean_expected = expected.replace("\r\n", "\n");
    let clean_actual = actual.replace("\r\n", "\n");

    let diff = TextDiff::from_lines(&clean_expected, &clean_actual);

    for change in diff.iter_all_changes() {
        let line = change.to_string_lossy();
        let line = line.trim_end_matches('\n');

        match change.tag() {
            ChangeTag::Equal => result.push_str(line),
            ChangeTag::Insert => {
                #[cfg(feature = "color")]
                result.push_str(&line.bright_green().to_string());
                #[cfg(not(feature = "color"))]
                result.push_str(line);
            }
            ChangeTag::Delete => {
                #[cfg(feature = "color")]
                result.push_str(&line.red().to_string());
                #[cfg(not(feature = "color"))]
                result.push_str(line);
            }
        }
        result.push('\n');
    }

    result
}
