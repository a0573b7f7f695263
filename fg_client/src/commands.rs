use std::fmt;

/// Errors that can occur during shell command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Attendance command missing the member id.
    AttendanceMissingMemberId,
    /// Rename command missing the new name.
    RenameMissingName,
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttendanceMissingMemberId => {
                write!(f, "Attendance requires a member id (e.g., 'attendance F3-0001')")
            }
            Self::RenameMissingName => {
                write!(f, "Rename requires a new name (e.g., 'rename Asha Rao')")
            }
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Type 'help' to see available commands"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// A shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show available commands.
    Help,
    /// Show the current profile.
    WhoAmI,
    /// List membership plans.
    Plans,
    /// List gym announcements.
    Announcements,
    /// List members and trainers (admin only).
    Members,
    /// Show dashboard counters (admin only).
    Stats,
    /// Mark a check-in for a member id.
    MarkAttendance(String),
    /// Show today's check-ins.
    TodayAttendance,
    /// Change the profile name.
    Rename(String),
    /// End the session and clear stored credentials.
    Logout,
    /// Leave the shell, keeping the session.
    Quit,
}

/// Parse a shell input line into a [`Command`].
///
/// # Examples
///
/// ```
/// use fg_client::commands::{Command, parse_command};
///
/// assert!(matches!(parse_command("plans"), Ok(Command::Plans)));
/// assert!(matches!(parse_command("attendance F3-0007"), Ok(Command::MarkAttendance(_))));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    match trimmed {
        "help" => return Ok(Command::Help),
        "whoami" => return Ok(Command::WhoAmI),
        "plans" => return Ok(Command::Plans),
        "announcements" => return Ok(Command::Announcements),
        "members" => return Ok(Command::Members),
        "stats" => return Ok(Command::Stats),
        "today" => return Ok(Command::TodayAttendance),
        "logout" => return Ok(Command::Logout),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"attendance") => match parts.get(1) {
            Some(member_id) => Ok(Command::MarkAttendance((*member_id).to_string())),
            None => Err(ParseError::AttendanceMissingMemberId),
        },
        Some(&"rename") => {
            let name = trimmed.strip_prefix("rename").unwrap_or("").trim();
            if name.is_empty() {
                Err(ParseError::RenameMissingName)
            } else {
                Ok(Command::Rename(name.to_string()))
            }
        }
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}
