//! Binary entrypoint for `action-items`.

use std::process::ExitCode;

use action_items::start_action_items;

/// Extract action items from a file or stdin and print them as JSON.
fn main() -> ExitCode {
    start_action_items::run()
}
