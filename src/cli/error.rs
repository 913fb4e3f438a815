// Error classification for consistent messages and exit codes

use crate::error::TrackerError;

/// Exit code for a top-level failure: 1 for user errors (unknown names,
/// rejected input), 2 for anything that points at storage or a bug.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<TrackerError>().is_some() {
        1
    } else {
        2
    }
}

/// Print a top-level failure to stderr. User errors get a single line;
/// internal failures include the cause chain.
pub fn report_failure(err: &anyhow::Error) {
    if err.downcast_ref::<TrackerError>().is_some() {
        eprintln!("Error: {}", err);
        return;
    }

    log::error!("internal failure: {:#}", err);
    eprintln!("Internal error: {}", err);

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        eprintln!("\nCaused by:");
        let mut indent = 1;
        for cause in causes {
            eprintln!("{:indent$}  {}", "", cause);
            indent += 1;
        }
    }
}
