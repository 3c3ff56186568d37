//! Constants and default values for SongDesk

/// Default bind address for the HTTP server
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Default directory holding the daily order spreadsheets
pub const DEFAULT_LOG_DIR: &str = "admin_logs";

/// Default filename prefix of a daily order spreadsheet
pub const DEFAULT_FILE_PREFIX: &str = "rendelesek";

/// Extension of the daily order spreadsheet
pub const LOG_FILE_EXTENSION: &str = "xlsx";

/// Content type sent with a spreadsheet download
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Environment variable holding the generation backend key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Key used when `OPENAI_API_KEY` is not set
pub const PLACEHOLDER_API_KEY: &str = "sk-...";

/// Worksheet name used for new spreadsheets
pub const SHEET_NAME: &str = "orders";

/// Header row of every order spreadsheet, in column order
pub const LOG_HEADER: &[&str] = &[
    "email",
    "style",
    "vocal",
    "language",
    "event_type",
    "brief",
    "lyrics",
    "mp3_link_1",
    "mp3_link_2",
    "date",
    "time",
];

/// Date format embedded in file names and the `date` column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format of the `time` column
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "songdesk.toml",
    "songdesk.yaml",
    "songdesk.yml",
    "songdesk.json",
];

/// Placeholder lyrics returned by the stub composer
pub const PLACEHOLDER_LYRICS: &str = "Lyrics will appear here...";

/// Placeholder song links returned by the stub composer
pub const PLACEHOLDER_SONG_URLS: &[&str] =
    &["https://suno.fake/1.mp3", "https://suno.fake/2.mp3"];

/// File name of the spreadsheet for a given date string
pub fn log_file_name(prefix: &str, date: &str) -> String {
    format!("{}_{}.{}", prefix, date, LOG_FILE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name() {
        assert_eq!(
            log_file_name("rendelesek", "2025-03-01"),
            "rendelesek_2025-03-01.xlsx"
        );
    }

    #[test]
    fn test_header_shape() {
        assert_eq!(LOG_HEADER.len(), 11);
        assert_eq!(LOG_HEADER[0], "email");
        assert_eq!(LOG_HEADER[LOG_HEADER.len() - 1], "time");
    }
}
