//! Then steps for command dispatch BDD scenarios.

use super::world::DispatchWorld;
use command_deck::command::domain::DisplayMode;
use rstest_bdd_macros::then;
use serde_json::json;

#[then("the command succeeds")]
fn command_succeeds(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    if !result.success {
        return Err(eyre::eyre!("expected success, got {result:?}"));
    }
    Ok(())
}

#[then("the command fails")]
fn command_fails(world: &DispatchWorld) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    if result.success {
        return Err(eyre::eyre!("expected failure, got {result:?}"));
    }
    Ok(())
}

#[then(r#"the reply content is "{content}""#)]
fn reply_content_is(world: &DispatchWorld, content: String) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    if result.content.as_deref() != Some(content.as_str()) {
        return Err(eyre::eyre!(
            "expected content '{content}', got {:?}",
            result.content
        ));
    }
    Ok(())
}

#[then(r#"the first suggestion is "{suggestion}""#)]
fn first_suggestion_is(world: &DispatchWorld, suggestion: String) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    let first = result.suggested_next_commands.first();
    if first != Some(&suggestion) {
        return Err(eyre::eyre!(
            "expected first suggestion '{suggestion}', got {:?}",
            result.suggested_next_commands
        ));
    }
    Ok(())
}

#[then(r#"the reply message mentions "{fragment}""#)]
fn reply_message_mentions(world: &DispatchWorld, fragment: String) -> Result<(), eyre::Report> {
    let message = world.last_result()?.message.clone().unwrap_or_default();
    if !message.contains(&fragment) {
        return Err(eyre::eyre!("expected '{fragment}' in message:\n{message}"));
    }
    Ok(())
}

#[then(r#"the error is "{error}""#)]
fn error_is(world: &DispatchWorld, error: String) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    if result.error.as_deref() != Some(error.as_str()) {
        return Err(eyre::eyre!("expected error '{error}', got {:?}", result.error));
    }
    Ok(())
}

#[then(r#"setup instructions titled "{title}" are shown"#)]
fn setup_instructions_shown(world: &DispatchWorld, title: String) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    if result.display_mode != DisplayMode::Markdown {
        return Err(eyre::eyre!(
            "expected markdown setup instructions, got {:?}",
            result.display_mode
        ));
    }
    let content = result.content.clone().unwrap_or_default();
    if !content.contains(&format!("## {title}")) {
        return Err(eyre::eyre!("expected heading '{title}' in:\n{content}"));
    }
    let kind = result.data.as_ref().and_then(|data| data.get("type"));
    if kind != Some(&json!("plugin_setup_required")) {
        return Err(eyre::eyre!("expected setup data, got {:?}", result.data));
    }
    Ok(())
}

#[then(r#"the latest arguments for "{plugin}" command "{command}" are "{argument}""#)]
fn latest_arguments_are(
    world: &mut DispatchWorld,
    plugin: String,
    command: String,
    argument: String,
) -> Result<(), eyre::Report> {
    let recent = world.service().preferred_args(&plugin, &command);
    let latest = recent.first().cloned().unwrap_or_default();
    if latest != vec![json!(argument)] {
        return Err(eyre::eyre!(
            "expected latest arguments [{argument}], got {recent:?}"
        ));
    }
    Ok(())
}
