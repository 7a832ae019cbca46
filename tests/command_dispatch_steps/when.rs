//! When steps for command dispatch BDD scenarios.

use super::world::{DispatchWorld, run_async};
use rstest_bdd_macros::when;

#[when(r#"the user sends "{text}""#)]
fn user_sends(world: &mut DispatchWorld, text: String) {
    let result = run_async(world.service().execute_command(&text));
    world.last_result = Some(result);
}
