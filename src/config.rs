use std::path::PathBuf;

use clap::Parser;

use crate::pagination::{DEFAULT_PAGE_SIZE, PageWindow};

#[derive(Parser, Debug)]
#[command(author, version, about = "Order status editor for SQLite stores")]
pub struct Args {
    /// Path to SQLite database file
    #[arg(value_name = "DB_PATH", default_value = "order_status.db")]
    pub db_path: PathBuf,

    /// Page size (rows per page)
    #[arg(short = 'n', long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = parse_page_size)]
    pub page_size: usize,

    /// Insert the stock order statuses when the store is empty
    #[arg(long)]
    pub seed: bool,

    /// File that receives the log output (the terminal is taken by the UI)
    #[arg(long, value_name = "PATH", default_value = "order-status-editor.log")]
    pub log_file: PathBuf,
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    PageWindow::new(n).map_err(|e| e.to_string())?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["order-status-editor"]).unwrap();
        assert_eq!(args.db_path, PathBuf::from("order_status.db"));
        assert_eq!(args.page_size, DEFAULT_PAGE_SIZE);
        assert!(!args.seed);
    }

    #[test]
    fn explicit_values() {
        let args = Args::try_parse_from([
            "order-status-editor",
            "shop.db",
            "-n",
            "25",
            "--seed",
            "--log-file",
            "/tmp/editor.log",
        ])
        .unwrap();
        assert_eq!(args.db_path, PathBuf::from("shop.db"));
        assert_eq!(args.page_size, 25);
        assert!(args.seed);
        assert_eq!(args.log_file, PathBuf::from("/tmp/editor.log"));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(Args::try_parse_from(["order-status-editor", "-n", "0"]).is_err());
        assert!(Args::try_parse_from(["order-status-editor", "-n", "ten"]).is_err());
    }
}
