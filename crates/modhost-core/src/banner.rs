//! Startup banner.

use chrono::{DateTime, Local};

use crate::sink::{ConsoleColor, LogSink};

const LOGO: [&str; 6] = [
    " ███╗   ███╗ ██████╗ ██████╗ ██╗  ██╗ ██████╗ ███████╗████████╗",
    " ████╗ ████║██╔═══██╗██╔══██╗██║  ██║██╔═══██╗██╔════╝╚══██╔══╝",
    " ██╔████╔██║██║   ██║██║  ██║███████║██║   ██║███████╗   ██║",
    " ██║╚██╔╝██║██║   ██║██║  ██║██╔══██║██║   ██║╚════██║   ██║",
    " ██║ ╚═╝ ██║╚██████╔╝██████╔╝██║  ██║╚██████╔╝███████║   ██║",
    " ╚═╝     ╚═╝ ╚═════╝ ╚═════╝ ╚═╝  ╚═╝ ╚═════╝ ╚══════╝   ╚═╝",
];

const RULE: &str = " =====================================";

/// Banner lines for a start at `now`, each paired with its colour.
pub fn lines(now: DateTime<Local>) -> Vec<(String, ConsoleColor)> {
    let mut text = vec![" ".to_string()];
    text.extend(LOGO.iter().map(|l| l.to_string()));
    text.extend([
        " ".to_string(),
        format!(" modhost extension framework v{}", env!("CARGO_PKG_VERSION")),
        RULE.to_string(),
        " Plugins and patches for the host runtime".to_string(),
        RULE.to_string(),
        format!(" Loaded at: {}", now.format("%Y-%m-%d %H:%M:%S")),
        " ".to_string(),
    ]);

    text.into_iter()
        .map(|line| {
            let color = line_color(&line);
            (line, color)
        })
        .collect()
}

/// Block-glyph lines are DarkMagenta, rule lines Gray, everything else Yellow.
pub fn line_color(line: &str) -> ConsoleColor {
    if line.contains('█') {
        ConsoleColor::DarkMagenta
    } else if line.contains("===") {
        ConsoleColor::Gray
    } else {
        ConsoleColor::Yellow
    }
}

/// Write the banner to `sink`.
pub fn display(sink: &dyn LogSink) {
    for (line, color) in lines(Local::now()) {
        sink.log(&line, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use chrono::TimeZone;

    #[test]
    fn test_line_colors() {
        assert_eq!(line_color(" ███╗"), ConsoleColor::DarkMagenta);
        assert_eq!(line_color(RULE), ConsoleColor::Gray);
        assert_eq!(line_color(" Loaded at: now"), ConsoleColor::Yellow);
    }

    #[test]
    fn test_loaded_at_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let lines = lines(now);
        assert!(lines
            .iter()
            .any(|(line, _)| line == " Loaded at: 2024-03-09 07:05:01"));
        assert_eq!(
            lines
                .iter()
                .filter(|(_, c)| *c == ConsoleColor::DarkMagenta)
                .count(),
            5
        );
    }

    #[test]
    fn test_display_writes_every_line() {
        let sink = MemorySink::new();
        display(&sink);
        assert_eq!(sink.lines().len(), lines(Local::now()).len());
        assert_eq!(sink.count_containing("Loaded at:"), 1);
    }
}
