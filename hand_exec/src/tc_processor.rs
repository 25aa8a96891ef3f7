//! # Telecommand processor module
//!
//! The telecommand processor handles the TCs coming from the script.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use hand_if::tc::{hand_ctrl::DofCmd, Tc};
use hand_lib::{actuator::JointActuator, data_store::DataStore};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to HandCtrl.
pub(crate) fn exec<A: JointActuator>(ds: &mut DataStore<A>, tc: &Tc) {

    // Handle different Tcs
    match tc {
        Tc::None => (),
        Tc::HandMove(cmd) => {
            debug!("Recieved HandMove command");
            ds.hand_ctrl_input.cmd = *cmd;
        },
        Tc::MoveDof { dof, target_angle_rad, step_rad } => {
            debug!("Recieved MoveDof command for DOF {}", dof);
            match ds.hand_ctrl_input.cmd.dofs.get_mut(*dof) {
                Some(d) => *d = DofCmd {
                    target_angle_rad: *target_angle_rad,
                    step_rad: *step_rad,
                    move_trigger: true,
                },
                None => warn!("MoveDof command for unknown DOF {} ignored", dof)
            }
        },
        Tc::Hold(hold) => {
            debug!("Recieved Hold({}) command", hold);
            ds.hand_ctrl_input.cmd.hold = *hold;
        }
    }

}

#[cfg(test)]
mod test {
    use super::*;
    use hand_lib::sim_hand::SimHand;

    #[test]
    fn test_move_dof_sets_trigger() {
        let mut ds = DataStore::<SimHand>::default();

        exec(&mut ds, &Tc::MoveDof {
            dof: 2,
            target_angle_rad: 1.2,
            step_rad: 0.02,
        });
        exec(&mut ds, &Tc::Hold(true));

        let cmd = ds.hand_ctrl_input.cmd;
        assert!(cmd.dofs[2].move_trigger);
        assert_eq!(cmd.dofs[2].target_angle_rad, 1.2);
        assert!(!cmd.dofs[0].move_trigger);
        assert!(cmd.hold);

        exec(&mut ds, &Tc::MoveDof {
            dof: 7,
            target_angle_rad: 1.2,
            step_rad: 0.02,
        });
        assert_eq!(ds.hand_ctrl_input.cmd, cmd);
    }
}
