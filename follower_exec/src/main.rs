//! # Line Follower Executable
//!
//! Runs the line following and box retrieval task against the simulated
//! robot driving the demonstration course.
//!
//! Usage: `follower_exec [params.toml]`. Without an argument the parameters
//! are loaded from `params/follower_exec.toml` under the software root.
//!
//! Ctrl-C cancels the run, stopping the drive.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info};
use std::env;

// Internal
use follower_lib::{
    cancel::CancelToken,
    params::FollowerParams,
    sim,
    task_mgr::{RunOutcome, TaskMgr},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Modules whose debug and trace output is written to the log file only.
const CONSOLE_QUIET_TARGETS: &[&str] = &["follower_lib::line_ctrl", "follower_lib::sim"];

// ---------------------------------------------------------------------------
// MAIN
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("follower_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger, keeping per-tick traces in the log file only
    logger_init(LevelFilter::Trace, CONSOLE_QUIET_TARGETS, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Line Follower Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let params: FollowerParams = match args.len() {
        1 => util::params::load("follower_exec.toml").wrap_err("Could not load params")?,
        2 => {
            info!("Loading parameters from \"{}\"", &args[1]);
            util::params::load_from_path(&args[1])
                .wrap_err_with(|| format!("Could not load params from {}", &args[1]))?
        }
        n => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                n - 1
            ))
        }
    };

    info!("Parameters loaded");
    info!("Port bindings: {:#?}", params.ports);

    // ---- CANCELLATION ----

    let cancel = CancelToken::new();
    {
        let handler_token = cancel.clone();
        ctrlc::set_handler(move || handler_token.cancel())
            .wrap_err("Failed to set the Ctrl-C handler")?;
    }

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let (drive, sensors) = sim::demo_course(&params);
    let mut task_mgr = TaskMgr::new(&params, drive, sensors, cancel)
        .wrap_err("Failed to initialise TaskMgr")?;

    task_mgr
        .line_ctrl_mut()
        .archive_to(&session)
        .wrap_err("Failed to open the LineCtrl archive")?;

    info!("Module initialisation complete\n");

    // ---- RUN ----

    let outcome = task_mgr.run().wrap_err("Task failed")?;

    match outcome {
        RunOutcome::Done => info!("Task complete"),
        RunOutcome::Cancelled => info!("Run cancelled by the operator"),
    }

    info!(
        "Final state {:?}, simulated pose {:?}",
        task_mgr.task_state(),
        task_mgr.maneuvers().drive().pose()
    );
    info!(
        "Run lasted {:.02} s",
        session::get_elapsed_seconds()
    );

    Ok(())
}
