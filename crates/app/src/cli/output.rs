//! Table rendering for command output.

use std::{fmt::Display, io};

use tabled::{
    builder::Builder,
    settings::{Style, Theme},
};

/// Render rows under a header with the rounded table style.
pub(crate) fn table<const N: usize>(
    header: [&str; N],
    rows: impl IntoIterator<Item = [String; N]>,
) -> String {
    let mut builder = Builder::default();

    builder.push_record(header);

    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));

    table.to_string()
}

/// Yes/blank marker for boolean columns.
pub(crate) fn flag(value: bool) -> String {
    if value { "yes" } else { "" }.to_string()
}

/// Write one block of output.
pub(crate) fn emit(out: &mut impl io::Write, text: impl Display) -> Result<(), String> {
    writeln!(out, "{text}").map_err(|error| format!("failed to write output: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_contains_header_and_rows() {
        let rendered = table(["Id", "Name"], [["1".to_string(), "Acme".to_string()]]);

        assert!(rendered.contains("Id"), "missing header: {rendered}");
        assert!(rendered.contains("Acme"), "missing row: {rendered}");
        assert!(rendered.contains('╭'), "expected rounded corners: {rendered}");
    }
}
