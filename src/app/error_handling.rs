//! Fatal error reporting for the binary

use crate::error::TripAggError;
use tracing::error;

/// Report a fatal error on stderr and exit
///
/// A [`TripAggError`] anywhere in the chain picks the exit code and is shown
/// with its error-code description. With `-v` the full cause chain follows.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {:#}", error);
    std::process::exit(report(&error, verbose))
}

fn report(error: &anyhow::Error, verbose: u8) -> i32 {
    let exit_code = match find_tripagg_error(error) {
        Some(err) => {
            eprintln!("Error: {}", err.user_message());
            err.exit_code()
        }
        None => {
            eprintln!("Error: {error}");
            1
        }
    };

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    exit_code
}

fn find_tripagg_error(error: &anyhow::Error) -> Option<&TripAggError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<TripAggError>())
}
