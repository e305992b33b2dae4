//! UI utilities for the client.

use std::io::Write;

/// ANSI sequence: carriage return, then erase the whole line
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Input prompt shown once the client has joined
pub fn prompt_for(name: &str) -> String {
    format!("{}> ", name)
}

/// Print an incoming message above the prompt, then redisplay the prompt
pub fn print_incoming(message: &str, prompt: &str) {
    print!("{}{}\n{}", CLEAR_LINE, message, prompt);
    std::io::stdout().flush().ok();
}
