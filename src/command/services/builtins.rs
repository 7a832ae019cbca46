//! Built-in `core` commands.
//!
//! Five commands live under six keys: `help` aliases `/help`. Each handler
//! reads the live registry tables through a weak reference, so listings
//! always reflect the latest rebuild.

use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, RwLock, Weak};

use super::registry::{CommandCatalog, CommandTables};
use crate::command::domain::{
    CommandAddress, CommandResult, CommandUsage, DisplayMode, HandlerOutput,
};
use crate::command::locks::{read, write};
use crate::command::ports::{CommandHandler, HandlerError, HandlerInvocation, HandlerResult};

/// Currently selected model and the configured catalogue.
#[derive(Debug)]
pub(crate) struct ModelSelection {
    available: Vec<String>,
    current: RwLock<Option<String>>,
}

impl ModelSelection {
    pub(crate) const fn new(available: Vec<String>, current: Option<String>) -> Self {
        Self {
            available,
            current: RwLock::new(current),
        }
    }

    pub(crate) fn current(&self) -> Option<String> {
        read(&self.current).clone()
    }

    fn select(&self, model: &str) -> Result<(), HandlerError> {
        if !self.available.iter().any(|known| known == model) {
            return Err(HandlerError::InvalidArguments(format!(
                "unknown model '{model}'; available: {}",
                self.available.join(", ")
            )));
        }
        *write(&self.current) = Some(model.to_owned());
        Ok(())
    }
}

/// Installs the built-in commands into freshly built tables.
pub(crate) fn install(
    tables: &mut CommandTables,
    catalog: &Weak<CommandCatalog>,
    models: &Arc<ModelSelection>,
) {
    let core = CommandAddress::core();
    let help: Arc<dyn CommandHandler> = Arc::new(Help {
        catalog: Weak::clone(catalog),
        at_only: false,
    });

    tables.insert(
        &core,
        "/help",
        Arc::clone(&help),
        Some(
            CommandUsage::new(core.clone(), "/help", "List available commands")
                .with_examples(["/help"]),
        ),
    );
    tables.insert(&core, "help", help, None);
    tables.insert(
        &core,
        "/help:at",
        Arc::new(Help {
            catalog: Weak::clone(catalog),
            at_only: true,
        }),
        Some(CommandUsage::new(
            core.clone(),
            "/help:at",
            "List @domain and @agent commands",
        )),
    );
    tables.insert(
        &core,
        "/model",
        Arc::new(Model {
            models: Arc::clone(models),
        }),
        Some(
            CommandUsage::new(core.clone(), "/model", "Show or switch the active model")
                .with_syntax("/model [name]")
                .with_examples(["/model", "/model gpt-4o"]),
        ),
    );
    tables.insert(
        &core,
        "/debug",
        Arc::new(DebugStats {
            catalog: Weak::clone(catalog),
            models: Arc::clone(models),
        }),
        Some(CommandUsage::new(
            core.clone(),
            "/debug",
            "Show registry diagnostics",
        )),
    );
    tables.insert(
        &core,
        "models",
        Arc::new(Models {
            models: Arc::clone(models),
        }),
        Some(CommandUsage::new(
            core.clone(),
            "models",
            "List available models",
        )),
    );
}

fn tables(catalog: &Weak<CommandCatalog>) -> Result<Arc<CommandTables>, HandlerError> {
    catalog
        .upgrade()
        .map(|live| live.snapshot())
        .ok_or_else(|| HandlerError::failed("command registry is no longer available"))
}

struct Help {
    catalog: Weak<CommandCatalog>,
    at_only: bool,
}

#[async_trait]
impl CommandHandler for Help {
    async fn handle(&self, _invocation: HandlerInvocation) -> HandlerResult {
        let snapshot = tables(&self.catalog)?;
        let usages: Vec<CommandUsage> = snapshot
            .all_usages()
            .into_iter()
            .filter(|usage| !self.at_only || !usage.address.is_core())
            .collect();

        let heading = if self.at_only {
            "## @ commands"
        } else {
            "## Available commands"
        };
        let mut listing = format!("{heading}\n");
        if usages.is_empty() {
            listing.push_str("\nNo commands are registered.\n");
        }
        for usage in &usages {
            if usage.description.is_empty() {
                listing.push_str(&format!("- `{}`\n", usage.syntax));
            } else {
                listing.push_str(&format!("- `{}`: {}\n", usage.syntax, usage.description));
            }
        }

        Ok(HandlerOutput::Result(
            CommandResult::success(listing)
                .with_display_mode(DisplayMode::Markdown)
                .with_data(json!({ "commands": usages.len() })),
        ))
    }
}

struct Model {
    models: Arc<ModelSelection>,
}

#[async_trait]
impl CommandHandler for Model {
    async fn handle(&self, invocation: HandlerInvocation) -> HandlerResult {
        if let Some(requested) = invocation.first_arg() {
            self.models.select(&requested)?;
            return Ok(HandlerOutput::Result(
                CommandResult::success(format!("Switched model to {requested}"))
                    .with_data(json!({ "model": requested })),
            ));
        }

        let message = self.models.current().map_or_else(
            || "No model is selected".to_owned(),
            |model| format!("Current model: {model}"),
        );
        Ok(HandlerOutput::Result(
            CommandResult::success(message).with_data(json!({ "model": self.models.current() })),
        ))
    }
}

struct Models {
    models: Arc<ModelSelection>,
}

#[async_trait]
impl CommandHandler for Models {
    async fn handle(&self, _invocation: HandlerInvocation) -> HandlerResult {
        let current = self.models.current();
        let mut listing = String::from("## Available models\n");
        for model in &self.models.available {
            let marker = if current.as_deref() == Some(model.as_str()) {
                " (current)"
            } else {
                ""
            };
            listing.push_str(&format!("- {model}{marker}\n"));
        }
        Ok(HandlerOutput::Markdown(listing))
    }
}

struct DebugStats {
    catalog: Weak<CommandCatalog>,
    models: Arc<ModelSelection>,
}

#[async_trait]
impl CommandHandler for DebugStats {
    async fn handle(&self, _invocation: HandlerInvocation) -> HandlerResult {
        let snapshot = tables(&self.catalog)?;
        Ok(HandlerOutput::Json(json!({
            "agents": snapshot.agent_ids(),
            "domains": snapshot.domains(),
            "handlers": snapshot.handler_count(),
            "usages": snapshot.all_usages().len(),
            "model": self.models.current(),
        })))
    }
}
