//! Timestamped, level-tagged console output.
//!
//! The operator watches this console while scanning, so every line
//! carries a wall-clock timestamp and a colored severity tag.

use chrono::Local;
use colored::*;

fn stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn info(message: &str) {
    println!("{}", format!("[{}] [Info]\t{}", stamp(), message).cyan());
}

pub fn warn(message: &str) {
    println!("{}", format!("[{}] [Warn]\t{}", stamp(), message).yellow());
}

pub fn error(message: &str) {
    println!("{}", format!("[{}] [Error]\t{}", stamp(), message).red());
}

pub fn log(message: &str) {
    println!("[{}] [Log]\t{}", stamp(), message);
}
