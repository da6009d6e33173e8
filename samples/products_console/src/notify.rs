use crate::input::StdinInput;
use catalog::controller::{Confirm, NotificationKind, Notifier};
use crossterm::style::{Color, ContentStyle, StyledContent, Stylize};
use std::fmt::Display;
use std::io::Write;

pub fn flush() {
    // A failed flush only delays the output.
    std::io::stdout().flush().ok();
}

pub fn print_styled<S: Display>(styled: StyledContent<S>) {
    println!("{}", styled);
    flush();
}

pub fn print_error<S: Display>(message: S) {
    print_styled(StyledContent::new(
        ContentStyle::new().with(Color::Red),
        message,
    ));
}

/// Prints notifications as colored lines.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Success => print_styled(StyledContent::new(
                ContentStyle::new().with(Color::Green).bold(),
                message,
            )),
            NotificationKind::Error => print_error(message),
        }
    }
}

/// Asks on stdin, anything but yes is a no.
pub struct StdinConfirm(pub StdinInput);

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!(
            "{} ",
            StyledContent::new(ContentStyle::new().with(Color::Yellow), prompt)
        );
        print!("[y/N] ");
        flush();

        match self.0.next_line_blocking() {
            Ok(Some(answer)) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}
