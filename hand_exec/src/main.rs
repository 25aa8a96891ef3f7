//! Main hand executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise HandCtrl on the simulated hand
//!     - Main loop:
//!         - Telecommand processing (from a script if one is given)
//!         - Hand control processing
//!         - Simulated hand physics step
//!         - Archiving
//!
//! # Usage
//!
//! `hand_exec [script]`. Without a script the hand is left at rest for the number of cycles set
//! in `hand_exec.toml`.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use hand_lib::{
    data_store::DataStore,
    hand_ctrl::{self, HandCtrlError},
    sim_hand::SimHand,
};

mod params;
mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};
use color_eyre::{Report, eyre::{WrapErr, eyre}};

// Internal
use params::HandExecParams;
use util::{
    module::State,
    archive::Archived,
    logger::{logger_init, LevelFilter},
    session::Session,
    script_interpreter::{ScriptInterpreter, PendingTcs},
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "hand_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Barrett Hand Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: HandExecParams = util::params::load(
        "hand_exec.toml"
    ).wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let mut script = match args.len() {
        1 => {
            info!(
                "No script provided, running {} cycles without commands\n",
                exec_params.num_cycles
            );
            None
        },
        2 => {
            info!("Loading script from \"{}\"", &args[1]);

            let si = ScriptInterpreter::new(&args[1])
                .wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} TCs\n",
                si.get_duration(),
                si.get_num_tcs()
            );

            Some(si)
        },
        n => return Err(eyre!(
            "Expected either zero or one argument, found {}", n - 1
        ))
    };

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::<SimHand>::default();

    // ---- INITIALISE MODULES ----

    ds.hand_ctrl.init(
        hand_ctrl::InitData {
            params_path: "hand_ctrl.toml",
            actuator: Some(SimHand::new(exec_params.sim.clone())),
            archive: exec_params.archive,
        },
        &session
    ).wrap_err("Failed to initialise HandCtrl")?;
    info!("HandCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        ds.cycle_start(exec_params.cycle_period_s);

        // ---- TELECOMMAND PROCESSING ----

        match script {
            Some(ref mut si) => match si.get_pending_tcs(ds.sim_time_s) {
                PendingTcs::None => (),
                PendingTcs::Some(tc_vec) => {
                    for tc in tc_vec.iter() {
                        tc_processor::exec(&mut ds, tc);
                    }
                },
                // Exit if end of script reached
                PendingTcs::EndOfScript => {
                    info!("End of TC script reached, stopping");
                    break
                }
            },
            None => if ds.num_cycles >= exec_params.num_cycles {
                info!("All {} cycles executed, stopping", exec_params.num_cycles);
                break
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.hand_ctrl.proc(&ds.hand_ctrl_input) {
            Ok((o, r)) => {
                ds.hand_ctrl_output = o;
                ds.hand_ctrl_status_rpt = r;
            },
            // Nothing can be done once the runtime state is lost
            Err(e @ HandCtrlError::StatePoisoned) | Err(e @ HandCtrlError::NotInitialised) => {
                return Err(e).wrap_err("HandCtrl can no longer run")
            },
            Err(e) => warn!("Error during HandCtrl processing: {}", e)
        };

        // ---- SIMULATION ----

        ds.hand_ctrl.with_actuator(|sim| sim.step_physics())
            .wrap_err("Could not step the simulated hand")?;

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.hand_ctrl.write() {
            warn!("Could not write the HandCtrl archives: {}", e);
        }

        ds.cycle_end();

        // ---- CYCLE MANAGEMENT ----

        if exec_params.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            // Get sleep duration
            match Duration::from_secs_f64(exec_params.cycle_period_s)
                .checked_sub(cycle_dur)
            {
                Some(d) => {
                    ds.num_consec_cycle_overruns = 0;
                    thread::sleep(d);
                },
                None => {
                    warn!(
                        "Cycle overran by {:.06} s",
                        cycle_dur.as_secs_f64() - exec_params.cycle_period_s
                    );
                    ds.num_consec_cycle_overruns += 1;
                }
            }
        }
    }

    // ---- SHUTDOWN ----

    info!(
        "Executed {} cycles ({} not applied), final outputs: {:#?}",
        ds.num_cycles, ds.num_skipped_cycles, ds.hand_ctrl_output
    );

    session.save("hand_ctrl/final_status_report.json", ds.hand_ctrl_status_rpt);
    session.save("hand_ctrl/final_output.json", ds.hand_ctrl_output);
    session.exit();

    info!("End of execution");

    Ok(())
}
