use anyhow::Result;
use colored::Colorize;
use std::io::{self, IsTerminal, Write};

/// Prompts only make sense when a person is at stdin.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal()
}

fn read_answer() -> Result<String> {
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}

/// Confirm prompt with default Yes. Non-interactive returns true.
pub fn confirm_yes(msg: &str, interactive: bool) -> Result<bool> {
    if !interactive {
        return Ok(true);
    }
    o_print!("  {} [Y/n]: ", msg);
    let answer = read_answer()?;
    Ok(answer.is_empty() || is_yes(&answer))
}

/// Confirm prompt with default No. Non-interactive returns false.
pub fn confirm_no(msg: &str, interactive: bool) -> Result<bool> {
    if !interactive {
        return Ok(false);
    }
    o_print!("  {} [y/N]: ", msg);
    Ok(is_yes(&read_answer()?))
}

/// Text input with a default value. Non-interactive returns the default.
pub fn input_with_default(prompt: &str, default: &str, interactive: bool) -> Result<String> {
    if !interactive {
        return Ok(default.to_string());
    }
    o_print!("  {} [{}]: ", prompt, default.dimmed());
    let answer = read_answer()?;
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer)
    }
}

/// Optional text input. Non-interactive returns empty string.
pub fn input_optional(prompt: &str, interactive: bool) -> Result<String> {
    if !interactive {
        return Ok(String::new());
    }
    o_print!("  {} ", prompt);
    read_answer()
}

/// Comma- or space-separated answer split into trimmed items.
pub fn split_list(answer: &str) -> Vec<String> {
    answer
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_choice(choice: &str, len: usize, default_index: usize) -> usize {
    match choice.parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => n - 1,
        _ => default_index,
    }
}

/// Menu selection. Non-interactive returns default_index.
pub fn select(prompt: &str, options: &[&str], default_index: usize, interactive: bool) -> Result<usize> {
    if !interactive {
        return Ok(default_index);
    }
    for (i, opt) in options.iter().enumerate() {
        o_detail!("   {} {}", format!("{})", i + 1).cyan(), opt);
    }
    o_print!("\n   {} [{}]: ", prompt, default_index + 1);
    Ok(parse_choice(&read_answer()?, options.len(), default_index))
}
