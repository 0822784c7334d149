//! UI utilities for the client.

use std::io::Write;

/// Prompt shown while in a room
pub fn prompt(room_name: &str) -> String {
    format!("{}> ", room_name)
}

/// Print a message above the prompt and redisplay the prompt
pub fn print_above_prompt(message: &str, prompt: &str) {
    print!("{}", message);
    redisplay_prompt(prompt);
}

/// Redisplay the prompt after printing asynchronously
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}
